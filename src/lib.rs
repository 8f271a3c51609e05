//! Row Cache - a cache store and distributed lock over a row store
//!
//! Maps cache semantics (TTL expiry, create-if-absent, counters, prefixes,
//! typed values) onto a wide-column store that only offers single-row
//! conditional writes.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod rowstore;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheStore, CacheValue, Lock};
pub use config::Config;
pub use error::{CacheError, Result};
pub use rowstore::{MemoryRowStore, RowStore};
pub use tasks::spawn_sweep_task;
