//! In-Memory Row Store
//!
//! A `RowStore` that keeps tables in process memory. Conditions are evaluated
//! under the table write guard, which gives the same single-row atomicity a
//! networked store provides server-side.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::types::{
    ColumnUpdate, ColumnValue, Condition, PrimaryKey, Row, RowResult, RowStoreError, WriteOutcome,
};
use super::{RowStore, RowStoreResult};

// == Table ==
#[derive(Debug)]
struct Table {
    /// Name of the single primary key column
    key_column: String,
    rows: HashMap<String, Row>,
}

impl Table {
    fn check_key(&self, primary_key: &PrimaryKey) -> RowStoreResult<()> {
        if primary_key.column != self.key_column {
            return Err(RowStoreError::Backend {
                code: "OTSInvalidPK".to_string(),
                message: format!(
                    "primary key column '{}' does not match table schema '{}'",
                    primary_key.column, self.key_column
                ),
            });
        }
        Ok(())
    }
}

// == Memory Row Store ==
/// Row store backed by `HashMap`s behind a tokio `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryRowStore {
    tables: RwLock<HashMap<String, Table>>,
    /// Number of requests served, batch calls counting once
    requests: AtomicU64,
}

impl MemoryRowStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table keyed by `key_column`. Existing tables are left untouched.
    pub async fn create_table(&self, name: &str, key_column: &str) {
        let mut tables = self.tables.write().await;
        tables.entry(name.to_string()).or_insert_with(|| Table {
            key_column: key_column.to_string(),
            rows: HashMap::new(),
        });
    }

    /// Number of physical rows in `table`, expired ones included.
    pub async fn row_count(&self, table: &str) -> RowStoreResult<usize> {
        let tables = self.tables.read().await;
        let table = tables
            .get(table)
            .ok_or_else(|| RowStoreError::TableNotFound(table.to_string()))?;
        Ok(table.rows.len())
    }

    /// Total number of requests this store has served.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    // == Sweep Expired ==
    /// Physically deletes rows whose `expiration_column` is `<= now_ms`, or is
    /// missing or not an integer.
    ///
    /// This is the garbage collection a hosted store runs outside the cache's
    /// control; the cache itself never deletes on expiry.
    pub async fn sweep_expired(
        &self,
        table: &str,
        expiration_column: &str,
        now_ms: i64,
    ) -> RowStoreResult<usize> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table)
            .ok_or_else(|| RowStoreError::TableNotFound(table.to_string()))?;

        let before = table.rows.len();
        table.rows.retain(|_, row| {
            matches!(row.column(expiration_column), Some(ColumnValue::Integer(expires)) if *expires > now_ms)
        });
        Ok(before - table.rows.len())
    }

    fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn get_row(&self, table: &str, primary_key: &PrimaryKey) -> RowStoreResult<Option<Row>> {
        self.record_request();
        let tables = self.tables.read().await;
        let table = tables
            .get(table)
            .ok_or_else(|| RowStoreError::TableNotFound(table.to_string()))?;
        table.check_key(primary_key)?;

        Ok(table.rows.get(&primary_key.value).cloned())
    }

    async fn batch_get_row(
        &self,
        table: &str,
        primary_keys: &[PrimaryKey],
    ) -> RowStoreResult<Vec<Option<Row>>> {
        self.record_request();
        let tables = self.tables.read().await;
        let table = tables
            .get(table)
            .ok_or_else(|| RowStoreError::TableNotFound(table.to_string()))?;

        primary_keys
            .iter()
            .map(|pk| {
                table.check_key(pk)?;
                Ok(table.rows.get(&pk.value).cloned())
            })
            .collect()
    }

    async fn put_row(
        &self,
        table: &str,
        row: Row,
        condition: Condition,
    ) -> RowStoreResult<WriteOutcome> {
        self.record_request();
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table)
            .ok_or_else(|| RowStoreError::TableNotFound(table.to_string()))?;
        table.check_key(&row.primary_key)?;

        if !condition.evaluate(table.rows.get(&row.primary_key.value)) {
            debug!(key = %row.primary_key.value, "put_row condition failed");
            return Ok(WriteOutcome::ConditionFailed);
        }

        table.rows.insert(row.primary_key.value.clone(), row);
        Ok(WriteOutcome::Applied)
    }

    async fn update_row(
        &self,
        table: &str,
        primary_key: &PrimaryKey,
        updates: Vec<ColumnUpdate>,
        condition: Condition,
    ) -> RowStoreResult<WriteOutcome> {
        self.record_request();
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table)
            .ok_or_else(|| RowStoreError::TableNotFound(table.to_string()))?;
        table.check_key(primary_key)?;

        if !condition.evaluate(table.rows.get(&primary_key.value)) {
            debug!(key = %primary_key.value, "update_row condition failed");
            return Ok(WriteOutcome::ConditionFailed);
        }

        let row = table
            .rows
            .entry(primary_key.value.clone())
            .or_insert_with(|| Row::new(primary_key.clone()));
        for update in updates {
            match update {
                ColumnUpdate::Put(name, value) => {
                    row.columns.insert(name, value);
                }
                ColumnUpdate::Delete(name) => {
                    row.columns.remove(&name);
                }
            }
        }
        Ok(WriteOutcome::Applied)
    }

    async fn batch_write_row(&self, table: &str, rows: Vec<Row>) -> RowStoreResult<Vec<RowResult>> {
        self.record_request();
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table)
            .ok_or_else(|| RowStoreError::TableNotFound(table.to_string()))?;

        let results = rows
            .into_iter()
            .map(|row| {
                let primary_key = row.primary_key.clone();
                let outcome = table.check_key(&primary_key).map(|()| {
                    table.rows.insert(primary_key.value.clone(), row);
                    WriteOutcome::Applied
                });
                RowResult {
                    primary_key,
                    outcome,
                }
            })
            .collect();
        Ok(results)
    }

    async fn delete_row(
        &self,
        table: &str,
        primary_key: &PrimaryKey,
        condition: Condition,
    ) -> RowStoreResult<WriteOutcome> {
        self.record_request();
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table)
            .ok_or_else(|| RowStoreError::TableNotFound(table.to_string()))?;
        table.check_key(primary_key)?;

        if !condition.evaluate(table.rows.get(&primary_key.value)) {
            debug!(key = %primary_key.value, "delete_row condition failed");
            return Ok(WriteOutcome::ConditionFailed);
        }

        table.rows.remove(&primary_key.value);
        Ok(WriteOutcome::Applied)
    }
}
