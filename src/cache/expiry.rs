//! Expiry Module
//!
//! TTL encoding for rows. Expirations are Unix milliseconds stored in an
//! integer column, and a row is expired once `expiration <= now`.

use chrono::{DateTime, Months, Utc};

use crate::rowstore::ColumnValue;

/// How far in the future "forever" entries expire.
pub const FOREVER_MONTHS: u32 = 12 * 5;

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Expiration timestamp for a TTL given in seconds.
///
/// A zero or negative TTL yields `now_ms`, so the entry is stale immediately.
pub fn expiration_for(ttl_seconds: i64, now_ms: i64) -> i64 {
    if ttl_seconds > 0 {
        now_ms.saturating_add(ttl_seconds.saturating_mul(1000))
    } else {
        now_ms
    }
}

/// Expiration timestamp used for entries without a TTL.
pub fn forever_expiration(now_ms: i64) -> i64 {
    DateTime::<Utc>::from_timestamp_millis(now_ms)
        .and_then(|now| now.checked_add_months(Months::new(FOREVER_MONTHS)))
        .map_or(i64::MAX, |at| at.timestamp_millis())
}

// == Is Expired ==
/// Checks a row's expiration cell against `now_ms`.
///
/// A missing or non-integer cell counts as expired.
pub fn is_expired(expiration: Option<&ColumnValue>, now_ms: i64) -> bool {
    match expiration {
        Some(ColumnValue::Integer(expires)) => *expires <= now_ms,
        _ => true,
    }
}
