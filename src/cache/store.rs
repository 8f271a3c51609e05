//! Cache Store Module
//!
//! Main cache engine translating cache operations onto row store calls:
//! prefixing, TTL encoding, value encoding and the conditional writes behind
//! `add`, `increment` and `decrement`.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::codec;
use crate::cache::expiry::{current_timestamp_ms, expiration_for, forever_expiration, is_expired};
use crate::cache::{CacheValue, Lock};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::rowstore::{
    ColumnCondition, ColumnUpdate, ColumnValue, Comparator, Condition, PrimaryKey, Row,
    RowExistence, RowStore, WriteOutcome,
};

/// Default name of the primary key column.
pub const DEFAULT_KEY_ATTRIBUTE: &str = "key";
/// Default name of the payload column.
pub const DEFAULT_VALUE_ATTRIBUTE: &str = "value";
/// Default name of the expiration column.
pub const DEFAULT_EXPIRATION_ATTRIBUTE: &str = "expires_at";

// == Cache Store ==
/// Cache store over one row store table.
///
/// Cloning is cheap; clones share the same client.
#[derive(Clone)]
pub struct CacheStore {
    /// Row store client
    client: Arc<dyn RowStore>,
    /// Table holding every entry of this store
    table: String,
    key_attribute: String,
    value_attribute: String,
    expiration_attribute: String,
    /// Namespace prepended to every physical key, `""` or ending in `:`
    prefix: String,
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("table", &self.table)
            .field("key_attribute", &self.key_attribute)
            .field("value_attribute", &self.value_attribute)
            .field("expiration_attribute", &self.expiration_attribute)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl CacheStore {
    // == Constructor ==
    /// Creates a CacheStore over `table` with default column names and no prefix.
    pub fn new(client: Arc<dyn RowStore>, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            key_attribute: DEFAULT_KEY_ATTRIBUTE.to_string(),
            value_attribute: DEFAULT_VALUE_ATTRIBUTE.to_string(),
            expiration_attribute: DEFAULT_EXPIRATION_ATTRIBUTE.to_string(),
            prefix: String::new(),
        }
    }

    /// Creates a CacheStore from configuration.
    pub fn from_config(client: Arc<dyn RowStore>, config: &Config) -> Self {
        Self::new(client, config.table.clone())
            .with_attributes(
                config.key_attribute.clone(),
                config.value_attribute.clone(),
                config.expiration_attribute.clone(),
            )
            .with_prefix(&config.prefix)
    }

    /// Sets the key namespace. A non-empty prefix is joined to keys with `:`.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = if prefix.is_empty() {
            String::new()
        } else {
            format!("{}:", prefix)
        };
        self
    }

    /// Overrides the key, value and expiration column names.
    pub fn with_attributes(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        expiration: impl Into<String>,
    ) -> Self {
        self.key_attribute = key.into();
        self.value_attribute = value.into();
        self.expiration_attribute = expiration.into();
        self
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Missing and expired entries both return `Ok(None)`.
    pub async fn get(&self, key: &str) -> Result<Option<CacheValue>> {
        let row = self
            .client
            .get_row(&self.table, &self.primary_key(key))
            .await?;

        let value = self.live_value(key, row.as_ref(), current_timestamp_ms())?;
        debug!(key, hit = value.is_some(), "get");
        Ok(value)
    }

    // == Many ==
    /// Retrieves several values with a single batch read.
    ///
    /// Every requested key is present in the result; missing and expired
    /// entries map to `None`.
    pub async fn many<K: AsRef<str>>(
        &self,
        keys: &[K],
    ) -> Result<HashMap<String, Option<CacheValue>>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let primary_keys: Vec<PrimaryKey> =
            keys.iter().map(|k| self.primary_key(k.as_ref())).collect();
        let rows = self
            .client
            .batch_get_row(&self.table, &primary_keys)
            .await?;

        let now = current_timestamp_ms();
        let mut result: HashMap<String, Option<CacheValue>> = keys
            .iter()
            .map(|k| (k.as_ref().to_string(), None))
            .collect();

        // Rows are matched by their own key, not by response position
        for row in rows.into_iter().flatten() {
            let Some(key) = self.strip_prefix(&row.primary_key.value) else {
                continue;
            };
            if let Some(slot) = result.get_mut(key) {
                *slot = self.live_value(key, Some(&row), now)?;
            }
        }

        debug!(requested = keys.len(), "many");
        Ok(result)
    }

    // == Put ==
    /// Stores a value for `ttl_seconds`. A TTL of zero or less stores an
    /// already-expired entry.
    pub async fn put(&self, key: &str, value: &CacheValue, ttl_seconds: i64) -> Result<bool> {
        let expiration = expiration_for(ttl_seconds, current_timestamp_ms());
        self.write(key, value, expiration).await
    }

    // == Put Many ==
    /// Stores several values with a single batch write.
    ///
    /// The batch is not atomic: when some rows fail, the others stay written
    /// and `CacheError::PartialBatch` names the failed keys.
    pub async fn put_many<I, K, V>(&self, values: I, ttl_seconds: i64) -> Result<bool>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Borrow<CacheValue>,
    {
        let expiration = expiration_for(ttl_seconds, current_timestamp_ms());
        let rows = values
            .into_iter()
            .map(|(key, value)| self.build_row(key.as_ref(), value.borrow(), expiration))
            .collect::<Result<Vec<Row>>>()?;

        if rows.is_empty() {
            return Ok(true);
        }

        let count = rows.len();
        let results = self.client.batch_write_row(&self.table, rows).await?;

        let failed: Vec<String> = results
            .into_iter()
            .filter(|r| r.outcome != Ok(WriteOutcome::Applied))
            .map(|r| self.strip_prefix(&r.primary_key.value).unwrap_or_default().to_string())
            .collect();

        if !failed.is_empty() {
            warn!(failed = failed.len(), total = count, "put_many partially failed");
            return Err(CacheError::PartialBatch { failed });
        }

        debug!(count, expiration, "put_many");
        Ok(true)
    }

    // == Add ==
    /// Stores a value only if the key is missing or expired.
    ///
    /// Returns `Ok(false)` without writing when a live entry exists.
    pub async fn add(&self, key: &str, value: &CacheValue, ttl_seconds: i64) -> Result<bool> {
        let now = current_timestamp_ms();
        self.insert_if_vacant(key, value, expiration_for(ttl_seconds, now), now)
            .await
    }

    /// `add` with an explicit expiration timestamp.
    pub(crate) async fn add_until(
        &self,
        key: &str,
        value: &CacheValue,
        expiration: i64,
    ) -> Result<bool> {
        self.insert_if_vacant(key, value, expiration, current_timestamp_ms())
            .await
    }

    async fn insert_if_vacant(
        &self,
        key: &str,
        value: &CacheValue,
        expiration: i64,
        now: i64,
    ) -> Result<bool> {
        let row = self.build_row(key, value, expiration)?;

        // Passes for a missing row, or one whose expiration <= now
        let condition = Condition::new(
            RowExistence::Ignore,
            Some(ColumnCondition::single(
                self.expiration_attribute.as_str(),
                Comparator::LessEqual,
                ColumnValue::Integer(now),
                true,
            )),
        );

        match self.client.put_row(&self.table, row, condition).await? {
            WriteOutcome::Applied => {
                debug!(key, expiration, "add applied");
                Ok(true)
            }
            WriteOutcome::ConditionFailed => {
                debug!(key, "add skipped, live entry exists");
                Ok(false)
            }
        }
    }

    // == Increment / Decrement ==
    /// Adds `delta` to an integer entry and returns the new value.
    ///
    /// Returns `Ok(None)` when the entry is missing or expired, or when another
    /// writer changed it between the read and the write.
    pub async fn increment(&self, key: &str, delta: i64) -> Result<Option<i64>> {
        self.adjust(key, delta, i64::checked_add).await
    }

    /// Subtracts `delta` from an integer entry and returns the new value.
    ///
    /// Same outcomes as [`CacheStore::increment`].
    pub async fn decrement(&self, key: &str, delta: i64) -> Result<Option<i64>> {
        self.adjust(key, delta, i64::checked_sub).await
    }

    async fn adjust(
        &self,
        key: &str,
        delta: i64,
        apply: fn(i64, i64) -> Option<i64>,
    ) -> Result<Option<i64>> {
        let primary_key = self.primary_key(key);
        let now = current_timestamp_ms();

        let Some(row) = self.client.get_row(&self.table, &primary_key).await? else {
            return Ok(None);
        };
        if is_expired(row.column(&self.expiration_attribute), now) {
            return Ok(None);
        }

        let current = match row.column(&self.value_attribute) {
            Some(ColumnValue::Integer(current)) => *current,
            other => {
                return Err(CacheError::UnexpectedType {
                    key: key.to_string(),
                    expected: "integer",
                    found: other.map_or("nothing", ColumnValue::type_name),
                })
            }
        };
        let next = apply(current, delta).ok_or_else(|| {
            CacheError::CounterOverflow(format!("{} (current {}, delta {})", key, current, delta))
        })?;

        // Compare-and-swap: the row must still hold `current` and still be live
        let condition = Condition::new(
            RowExistence::ExpectExist,
            Some(ColumnCondition::And(vec![
                ColumnCondition::single(
                    self.value_attribute.as_str(),
                    Comparator::Equal,
                    ColumnValue::Integer(current),
                    false,
                ),
                ColumnCondition::single(
                    self.expiration_attribute.as_str(),
                    Comparator::GreaterThan,
                    ColumnValue::Integer(now),
                    false,
                ),
            ])),
        );
        let updates = vec![ColumnUpdate::Put(
            self.value_attribute.clone(),
            ColumnValue::Integer(next),
        )];

        match self
            .client
            .update_row(&self.table, &primary_key, updates, condition)
            .await?
        {
            WriteOutcome::Applied => {
                debug!(key, current, next, "counter updated");
                Ok(Some(next))
            }
            WriteOutcome::ConditionFailed => {
                debug!(key, current, "counter changed concurrently");
                Ok(None)
            }
        }
    }

    // == Forever ==
    /// Stores a value that does not expire for several years.
    pub async fn forever(&self, key: &str, value: &CacheValue) -> Result<bool> {
        let expiration = forever_expiration(current_timestamp_ms());
        self.write(key, value, expiration).await
    }

    // == Forget ==
    /// Removes an entry. Removing a missing key succeeds.
    pub async fn forget(&self, key: &str) -> Result<bool> {
        self.client
            .delete_row(&self.table, &self.primary_key(key), Condition::none())
            .await?;
        debug!(key, "forget");
        Ok(true)
    }

    /// Removes an entry only if its stored value still equals `expected`.
    pub(crate) async fn forget_if(&self, key: &str, expected: &CacheValue) -> Result<bool> {
        let condition = Condition::new(
            RowExistence::ExpectExist,
            Some(ColumnCondition::single(
                self.value_attribute.as_str(),
                Comparator::Equal,
                codec::serialize(expected)?,
                false,
            )),
        );

        let outcome = self
            .client
            .delete_row(&self.table, &self.primary_key(key), condition)
            .await?;
        Ok(outcome.is_applied())
    }

    // == Flush ==
    /// Always fails: the row store cannot truncate a table.
    pub async fn flush(&self) -> Result<bool> {
        Err(CacheError::Unsupported(format!(
            "the row store cannot flush table '{}'; create a new table instead",
            self.table
        )))
    }

    // == Locks ==
    /// Returns a lock handle. Does not touch storage.
    ///
    /// Without an `owner`, a random token identifies this handle.
    pub fn lock(&self, name: impl Into<String>, seconds: i64, owner: Option<String>) -> Lock {
        Lock::new(self.clone(), name.into(), seconds, owner)
    }

    /// Rebuilds a lock handle for a known owner token, e.g. to release it elsewhere.
    pub fn restore_lock(&self, name: impl Into<String>, owner: impl Into<String>) -> Lock {
        self.lock(name, 0, Some(owner.into()))
    }

    // == Accessors ==
    /// The key prefix including its `:` separator, or `""`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// The underlying row store client.
    pub fn client(&self) -> &Arc<dyn RowStore> {
        &self.client
    }

    // == Helpers ==
    fn primary_key(&self, key: &str) -> PrimaryKey {
        PrimaryKey::new(self.key_attribute.as_str(), format!("{}{}", self.prefix, key))
    }

    fn strip_prefix<'a>(&self, physical: &'a str) -> Option<&'a str> {
        physical.strip_prefix(self.prefix.as_str())
    }

    fn build_row(&self, key: &str, value: &CacheValue, expiration: i64) -> Result<Row> {
        Ok(Row::new(self.primary_key(key))
            .with_column(self.value_attribute.as_str(), codec::serialize(value)?)
            .with_column(
                self.expiration_attribute.as_str(),
                ColumnValue::Integer(expiration),
            ))
    }

    async fn write(&self, key: &str, value: &CacheValue, expiration: i64) -> Result<bool> {
        let row = self.build_row(key, value, expiration)?;
        self.client
            .put_row(&self.table, row, Condition::none())
            .await?;
        debug!(key, expiration, "put");
        Ok(true)
    }

    /// Decodes a row's value unless the row is missing or expired.
    fn live_value(&self, key: &str, row: Option<&Row>, now: i64) -> Result<Option<CacheValue>> {
        let Some(row) = row else {
            return Ok(None);
        };
        if is_expired(row.column(&self.expiration_attribute), now) {
            return Ok(None);
        }

        let cell = row.column(&self.value_attribute).ok_or_else(|| {
            CacheError::Corruption(format!("entry '{}' has no value column", key))
        })?;
        codec::deserialize(cell).map(Some)
    }
}
