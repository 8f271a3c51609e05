//! Error types for the cache store
//!
//! Provides unified error handling using thiserror. A failed write condition
//! is not an error anywhere in this crate; it surfaces as `false` or `None`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::rowstore::RowStoreError;

// == Cache Error Enum ==
/// Unified error type for the cache store and lock.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache (HTTP layer only; the store returns `None`)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Operation the row store cannot perform
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// A stored payload could not be decoded
    #[error("Corrupted cache entry: {0}")]
    Corruption(String),

    /// A stored value has a different type than the operation requires
    #[error("Unexpected type for '{key}': expected {expected}, found {found}")]
    UnexpectedType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Counter arithmetic left the i64 range
    #[error("Counter overflow: {0}")]
    CounterOverflow(String),

    /// Some rows of a batch write were rejected
    #[error("Batch write failed for keys: {}", .failed.join(", "))]
    PartialBatch { failed: Vec<String> },

    /// A lock could not be acquired in time
    #[error("Timed out waiting for lock: {0}")]
    LockTimeout(String),

    /// Encoding a value failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other failure of the underlying row store
    #[error(transparent)]
    Store(#[from] RowStoreError),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Unsupported(_) => StatusCode::NOT_IMPLEMENTED,
            CacheError::LockTimeout(_) => StatusCode::LOCKED,
            CacheError::Store(_) => StatusCode::BAD_GATEWAY,
            CacheError::Corruption(_)
            | CacheError::UnexpectedType { .. }
            | CacheError::CounterOverflow(_)
            | CacheError::PartialBatch { .. }
            | CacheError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache store.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (CacheError::NotFound("k".into()), StatusCode::NOT_FOUND),
            (CacheError::InvalidRequest("bad".into()), StatusCode::BAD_REQUEST),
            (CacheError::Unsupported("flush".into()), StatusCode::NOT_IMPLEMENTED),
            (CacheError::Corruption("tag".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (CacheError::LockTimeout("job".into()), StatusCode::LOCKED),
            (
                CacheError::Store(RowStoreError::Unavailable("down".into())),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_partial_batch_message() {
        let error = CacheError::PartialBatch {
            failed: vec!["a".into(), "b".into()],
        };
        assert_eq!(error.to_string(), "Batch write failed for keys: a, b");
    }
}
