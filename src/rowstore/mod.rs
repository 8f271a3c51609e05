//! Row Store Module
//!
//! The wide-column, single-row-transaction store the cache is built on.
//! Every write is evaluated atomically against an optional `Condition`; a
//! failed condition is reported as `WriteOutcome::ConditionFailed`, never as an
//! error.

mod memory;
mod types;

use async_trait::async_trait;

pub use memory::MemoryRowStore;
pub use types::{
    ColumnCondition, ColumnUpdate, ColumnValue, Comparator, Condition, PrimaryKey, Row,
    RowExistence, RowResult, RowStoreError, WriteOutcome,
};

/// Result type returned by row store calls.
pub type RowStoreResult<T> = std::result::Result<T, RowStoreError>;

// == Row Store Trait ==
/// Client interface of the row store.
///
/// Implementations must evaluate each condition and apply the write as one
/// indivisible operation. Batch calls carry no cross-row atomicity.
#[async_trait]
pub trait RowStore: Send + Sync + 'static {
    /// Reads a single row. Returns `None` when no row exists for the key.
    async fn get_row(&self, table: &str, primary_key: &PrimaryKey) -> RowStoreResult<Option<Row>>;

    /// Reads many rows in one request.
    ///
    /// The returned rows carry their own primary key; callers must match on it
    /// rather than on position.
    async fn batch_get_row(
        &self,
        table: &str,
        primary_keys: &[PrimaryKey],
    ) -> RowStoreResult<Vec<Option<Row>>>;

    /// Replaces the whole row if `condition` holds.
    async fn put_row(&self, table: &str, row: Row, condition: Condition)
        -> RowStoreResult<WriteOutcome>;

    /// Applies column mutations to an existing or new row if `condition` holds.
    async fn update_row(
        &self,
        table: &str,
        primary_key: &PrimaryKey,
        updates: Vec<ColumnUpdate>,
        condition: Condition,
    ) -> RowStoreResult<WriteOutcome>;

    /// Writes many rows unconditionally in one request, reporting each row separately.
    async fn batch_write_row(&self, table: &str, rows: Vec<Row>) -> RowStoreResult<Vec<RowResult>>;

    /// Deletes a row if `condition` holds. Deleting a missing row is not an error.
    async fn delete_row(
        &self,
        table: &str,
        primary_key: &PrimaryKey,
        condition: Condition,
    ) -> RowStoreResult<WriteOutcome>;
}
