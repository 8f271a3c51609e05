//! Request and Response models for the cache server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    validate_key, AcquireRequest, CounterRequest, ForeverRequest, ManyRequest, PutManyRequest,
    ReleaseRequest, WriteRequest,
};
pub use responses::{
    AddResponse, CounterResponse, DeleteResponse, ErrorResponse, FlushResponse, GetResponse,
    HealthResponse, LockResponse, ManyResponse, PutManyResponse, ReleaseResponse, SetResponse,
};
