//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::collections::HashMap;

use serde::Deserialize;

use crate::cache::CacheValue;

/// Maximum accepted key length in bytes.
pub const MAX_KEY_LENGTH: usize = 1024;

/// Checks a cache key or lock name.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}

/// Request body for `put` and `add` (PUT /cache/:key, POST /cache/:key/add)
#[derive(Debug, Clone, Deserialize)]
pub struct WriteRequest {
    /// The value to store
    pub value: CacheValue,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<i64>,
}

/// Request body for `forever` (PUT /cache/:key/forever)
#[derive(Debug, Clone, Deserialize)]
pub struct ForeverRequest {
    pub value: CacheValue,
}

/// Request body for increment and decrement
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CounterRequest {
    /// Amount to add or subtract, defaults to 1
    #[serde(default)]
    pub by: Option<i64>,
}

/// Request body for `many` (POST /cache)
#[derive(Debug, Clone, Deserialize)]
pub struct ManyRequest {
    pub keys: Vec<String>,
}

impl ManyRequest {
    pub fn validate(&self) -> Option<String> {
        self.keys.iter().find_map(|k| validate_key(k))
    }
}

/// Request body for `putMany` (PUT /cache)
#[derive(Debug, Clone, Deserialize)]
pub struct PutManyRequest {
    pub values: HashMap<String, CacheValue>,
    #[serde(default)]
    pub ttl: Option<i64>,
}

impl PutManyRequest {
    pub fn validate(&self) -> Option<String> {
        self.values.keys().find_map(|k| validate_key(k))
    }
}

/// Request body for POST /locks/:name/acquire
#[derive(Debug, Clone, Deserialize)]
pub struct AcquireRequest {
    /// Lease in seconds; zero holds the lock until released
    pub seconds: i64,
    /// Owner token, generated when omitted
    #[serde(default)]
    pub owner: Option<String>,
}

/// Request body for POST /locks/:name/release
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseRequest {
    pub owner: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_request_deserialize() {
        let req: WriteRequest = serde_json::from_str(r#"{"value": {"a": [1, 2]}}"#).unwrap();
        assert_eq!(req.value, json!({"a": [1, 2]}));
        assert!(req.ttl.is_none());
    }

    #[test]
    fn test_write_request_with_ttl() {
        let req: WriteRequest = serde_json::from_str(r#"{"value": 5, "ttl": 60}"#).unwrap();
        assert_eq!(req.ttl, Some(60));
    }

    #[test]
    fn test_write_request_null_value() {
        let req: WriteRequest = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert!(req.value.is_null());
    }

    #[test]
    fn test_counter_request_defaults() {
        let req: CounterRequest = serde_json::from_str("{}").unwrap();
        assert!(req.by.is_none());
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("").is_some());
        assert!(validate_key(&"x".repeat(MAX_KEY_LENGTH + 1)).is_some());
        assert!(validate_key("valid_key").is_none());
    }

    #[test]
    fn test_many_request_rejects_empty_key() {
        let req = ManyRequest {
            keys: vec!["a".into(), "".into()],
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_acquire_request_optional_owner() {
        let req: AcquireRequest = serde_json::from_str(r#"{"seconds": 10}"#).unwrap();
        assert_eq!(req.seconds, 10);
        assert!(req.owner.is_none());
    }
}
