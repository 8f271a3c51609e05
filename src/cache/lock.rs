//! Lock Module
//!
//! Lease-based mutual exclusion stored as a single cache row. The row's value
//! is the holder's owner token and its expiration is the end of the lease.
//! Nothing renews a lease: a lock frees itself once the lease elapses, whether
//! or not the holder is done.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::expiry::{current_timestamp_ms, forever_expiration};
use crate::cache::{CacheStore, CacheValue};
use crate::error::{CacheError, Result};

/// Pause between attempts in [`Lock::block`].
pub const BLOCK_RETRY_INTERVAL: Duration = Duration::from_millis(250);

// == Lock ==
/// A named lock owned by one token.
#[derive(Debug, Clone)]
pub struct Lock {
    store: CacheStore,
    name: String,
    /// Lease length; zero or less holds the lock until released
    seconds: i64,
    owner: String,
}

impl Lock {
    pub(crate) fn new(store: CacheStore, name: String, seconds: i64, owner: Option<String>) -> Self {
        Self {
            store,
            name,
            seconds,
            owner: owner.unwrap_or_else(|| Uuid::new_v4().simple().to_string()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The token written into the lock row when this handle acquires it.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    // == Acquire ==
    /// Attempts to take the lock. Returns `Ok(false)` if someone holds it.
    pub async fn acquire(&self) -> Result<bool> {
        let token = self.token();
        let acquired = if self.seconds > 0 {
            self.store.add(&self.name, &token, self.seconds).await?
        } else {
            let expiration = forever_expiration(current_timestamp_ms());
            self.store.add_until(&self.name, &token, expiration).await?
        };

        debug!(lock = %self.name, owner = %self.owner, acquired, "acquire");
        Ok(acquired)
    }

    // == Release ==
    /// Releases the lock if this handle's owner still holds it.
    ///
    /// The delete is conditional on the stored owner, so a lock taken over by
    /// someone else after our lease expired is left alone.
    pub async fn release(&self) -> Result<bool> {
        if !self.is_owned_by_current_process().await? {
            debug!(lock = %self.name, owner = %self.owner, "release refused, not the owner");
            return Ok(false);
        }

        let released = self.store.forget_if(&self.name, &self.token()).await?;
        debug!(lock = %self.name, owner = %self.owner, released, "release");
        Ok(released)
    }

    /// Deletes the lock row regardless of who holds it.
    pub async fn force_release(&self) -> Result<()> {
        self.store.forget(&self.name).await?;
        info!(lock = %self.name, "lock force released");
        Ok(())
    }

    // == Ownership ==
    /// The owner token currently stored for this lock, if the lock is held.
    ///
    /// A stored value that is not a string is reported as an error.
    pub async fn current_owner(&self) -> Result<Option<String>> {
        match self.store.get(&self.name).await? {
            None => Ok(None),
            Some(Value::String(owner)) => Ok(Some(owner)),
            Some(other) => Err(CacheError::UnexpectedType {
                key: self.name.clone(),
                expected: "string owner token",
                found: json_type_name(&other),
            }),
        }
    }

    pub async fn is_owned_by_current_process(&self) -> Result<bool> {
        Ok(self.current_owner().await?.as_deref() == Some(self.owner.as_str()))
    }

    // == Scoped Use ==
    /// Runs `f` while holding the lock, then releases it.
    ///
    /// Returns `Ok(None)` without running `f` if the lock is taken.
    pub async fn run<F, Fut, T>(&self, f: F) -> Result<Option<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if !self.acquire().await? {
            return Ok(None);
        }

        let output = f().await;
        self.release().await?;
        Ok(Some(output))
    }

    /// Retries `acquire` until it succeeds or `wait` has elapsed.
    pub async fn block(&self, wait: Duration) -> Result<()> {
        let started = Instant::now();

        loop {
            if self.acquire().await? {
                return Ok(());
            }
            if started.elapsed() >= wait {
                return Err(CacheError::LockTimeout(self.name.clone()));
            }
            tokio::time::sleep(BLOCK_RETRY_INTERVAL).await;
        }
    }

    /// Waits for the lock, runs `f`, then releases it.
    pub async fn block_and_run<F, Fut, T>(&self, wait: Duration, f: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.block(wait).await?;
        let output = f().await;
        self.release().await?;
        Ok(output)
    }

    fn token(&self) -> CacheValue {
        Value::String(self.owner.clone())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
