//! Cache Module
//!
//! Cache semantics over a row store: TTL expiry, create-if-absent, counters,
//! prefix namespacing, type-preserving values and leased locks.

pub mod codec;
pub mod expiry;
mod lock;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use lock::{Lock, BLOCK_RETRY_INTERVAL};
pub use store::{
    CacheStore, DEFAULT_EXPIRATION_ATTRIBUTE, DEFAULT_KEY_ATTRIBUTE, DEFAULT_VALUE_ATTRIBUTE,
};

/// A cached value. Integers, floats and booleans map to native columns; all
/// other values are stored as JSON text.
pub type CacheValue = serde_json::Value;

// == Public Constants ==
/// Step used by `increment` and `decrement` when no amount is given.
pub const DEFAULT_COUNTER_STEP: i64 = 1;
