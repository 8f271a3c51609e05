//! API Module
//!
//! HTTP handlers and routing exposing the cache store and its locks as a
//! JSON API.
//!
//! # Endpoints
//! - `GET /cache/:key` - Retrieve a value
//! - `PUT /cache/:key` - Store a value with a TTL
//! - `POST /cache/:key/add` - Store a value only if absent
//! - `POST /cache/:key/increment`, `/decrement` - Adjust a counter
//! - `DELETE /cache/:key` - Forget a key
//! - `POST /cache`, `PUT /cache` - Batch read and write
//! - `POST /locks/:name/acquire`, `/release` - Lease locks
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
