//! Expired Row Sweep Task
//!
//! Background task that periodically deletes expired rows from the in-memory
//! row store. The cache never relies on it: reads already treat expired rows
//! as absent.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::expiry::current_timestamp_ms;
use crate::rowstore::MemoryRowStore;

/// Spawns a background task that periodically removes expired rows.
///
/// # Arguments
/// * `store` - Shared in-memory row store
/// * `table` - Table to sweep
/// * `expiration_attribute` - Name of the expiration column
/// * `interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(MemoryRowStore::new());
/// let handle = spawn_sweep_task(store.clone(), "cache".into(), "expires_at".into(), 60);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweep_task(
    store: Arc<MemoryRowStore>,
    table: String,
    expiration_attribute: String,
    interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expired-row sweep on '{}' every {} seconds",
            table, interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            match store
                .sweep_expired(&table, &expiration_attribute, current_timestamp_ms())
                .await
            {
                Ok(0) => debug!("Sweep: no expired rows found"),
                Ok(removed) => info!("Sweep: removed {} expired rows", removed),
                Err(e) => warn!("Sweep failed: {}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, DEFAULT_EXPIRATION_ATTRIBUTE, DEFAULT_KEY_ATTRIBUTE};
    use serde_json::json;

    const TABLE: &str = "cache";

    async fn setup() -> (Arc<MemoryRowStore>, CacheStore) {
        let client = Arc::new(MemoryRowStore::new());
        client.create_table(TABLE, DEFAULT_KEY_ATTRIBUTE).await;
        let store = CacheStore::new(client.clone(), TABLE);
        (client, store)
    }

    #[tokio::test]
    async fn test_sweep_task_removes_expired_rows() {
        let (client, store) = setup().await;
        store.put("expire_soon", &json!("value"), 1).await.unwrap();

        let handle = spawn_sweep_task(
            client.clone(),
            TABLE.to_string(),
            DEFAULT_EXPIRATION_ATTRIBUTE.to_string(),
            1,
        );

        // Wait for entry to expire and the sweep to run
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(client.row_count(TABLE).await.unwrap(), 0);
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_preserves_live_rows() {
        let (client, store) = setup().await;
        store.put("long_lived", &json!("value"), 3600).await.unwrap();

        let handle = spawn_sweep_task(
            client.clone(),
            TABLE.to_string(),
            DEFAULT_EXPIRATION_ATTRIBUTE.to_string(),
            1,
        );

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(store.get("long_lived").await.unwrap(), Some(json!("value")));
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let (client, _) = setup().await;

        let handle = spawn_sweep_task(
            client,
            TABLE.to_string(),
            DEFAULT_EXPIRATION_ATTRIBUTE.to_string(),
            1,
        );
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
