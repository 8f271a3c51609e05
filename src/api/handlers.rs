//! API Handlers
//!
//! HTTP request handlers for each cache and lock endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheStore, DEFAULT_COUNTER_STEP};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, AcquireRequest, AddResponse, CounterRequest, CounterResponse, DeleteResponse,
    FlushResponse, ForeverRequest, GetResponse, HealthResponse, LockResponse, ManyRequest, ManyResponse,
    PutManyRequest, PutManyResponse, ReleaseRequest, ReleaseResponse, SetResponse, WriteRequest,
};
use crate::rowstore::RowStore;

/// Application state shared across all handlers.
///
/// The cache store is cheap to clone and needs no outer lock: atomicity comes
/// from the row store.
#[derive(Debug, Clone)]
pub struct AppState {
    pub cache: CacheStore,
    /// TTL applied when a write does not specify one
    pub default_ttl: i64,
}

impl AppState {
    /// Creates a new AppState with the given cache store.
    pub fn new(cache: CacheStore, default_ttl: i64) -> Self {
        Self { cache, default_ttl }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(client: Arc<dyn RowStore>, config: &Config) -> Self {
        Self::new(CacheStore::from_config(client, config), config.default_ttl)
    }
}

fn checked(key: &str) -> Result<()> {
    match validate_key(key) {
        Some(error_msg) => Err(CacheError::InvalidRequest(error_msg)),
        None => Ok(()),
    }
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    checked(&key)?;
    let value = state
        .cache
        .get(&key)
        .await?
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for PUT /cache/:key
pub async fn put_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<WriteRequest>,
) -> Result<Json<SetResponse>> {
    checked(&key)?;
    let ttl = req.ttl.unwrap_or(state.default_ttl);
    state.cache.put(&key, &req.value, ttl).await?;

    Ok(Json(SetResponse::new(key)))
}

/// Handler for PUT /cache/:key/forever
pub async fn forever_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<ForeverRequest>,
) -> Result<Json<SetResponse>> {
    checked(&key)?;
    state.cache.forever(&key, &req.value).await?;

    Ok(Json(SetResponse::new(key)))
}

/// Handler for POST /cache/:key/add
pub async fn add_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<WriteRequest>,
) -> Result<Json<AddResponse>> {
    checked(&key)?;
    let ttl = req.ttl.unwrap_or(state.default_ttl);
    let added = state.cache.add(&key, &req.value, ttl).await?;

    Ok(Json(AddResponse { key, added }))
}

/// Handler for POST /cache/:key/increment
pub async fn increment_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<CounterRequest>,
) -> Result<Json<CounterResponse>> {
    checked(&key)?;
    let value = state
        .cache
        .increment(&key, req.by.unwrap_or(DEFAULT_COUNTER_STEP))
        .await?;

    Ok(Json(CounterResponse { key, value }))
}

/// Handler for POST /cache/:key/decrement
pub async fn decrement_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<CounterRequest>,
) -> Result<Json<CounterResponse>> {
    checked(&key)?;
    let value = state
        .cache
        .decrement(&key, req.by.unwrap_or(DEFAULT_COUNTER_STEP))
        .await?;

    Ok(Json(CounterResponse { key, value }))
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    checked(&key)?;
    state.cache.forget(&key).await?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for POST /cache
pub async fn many_handler(
    State(state): State<AppState>,
    Json(req): Json<ManyRequest>,
) -> Result<Json<ManyResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }
    let values = state.cache.many(&req.keys).await?;

    Ok(Json(ManyResponse { values }))
}

/// Handler for PUT /cache
pub async fn put_many_handler(
    State(state): State<AppState>,
    Json(req): Json<PutManyRequest>,
) -> Result<Json<PutManyResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }
    let ttl = req.ttl.unwrap_or(state.default_ttl);
    let stored = req.values.len();
    state.cache.put_many(req.values, ttl).await?;

    Ok(Json(PutManyResponse { stored }))
}

/// Handler for DELETE /cache
///
/// Always answers 501: tables cannot be flushed.
pub async fn flush_handler(State(state): State<AppState>) -> Result<Json<FlushResponse>> {
    let flushed = state.cache.flush().await?;
    Ok(Json(FlushResponse { flushed }))
}

/// Handler for POST /locks/:name/acquire
pub async fn acquire_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<AcquireRequest>,
) -> Result<Json<LockResponse>> {
    checked(&name)?;
    let lock = state.cache.lock(name.as_str(), req.seconds, req.owner);
    let acquired = lock.acquire().await?;

    Ok(Json(LockResponse {
        owner: lock.owner().to_string(),
        name,
        acquired,
    }))
}

/// Handler for POST /locks/:name/release
pub async fn release_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<ReleaseRequest>,
) -> Result<Json<ReleaseResponse>> {
    checked(&name)?;
    let released = state
        .cache
        .restore_lock(name.as_str(), req.owner)
        .release()
        .await?;

    Ok(Json(ReleaseResponse { name, released }))
}

/// Handler for DELETE /locks/:name
pub async fn force_release_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ReleaseResponse>> {
    checked(&name)?;
    state.cache.lock(name.as_str(), 0, None).force_release().await?;

    Ok(Json(ReleaseResponse {
        name,
        released: true,
    }))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
