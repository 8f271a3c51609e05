//! API Routes
//!
//! Configures the Axum router with all cache and lock endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    acquire_handler, add_handler, decrement_handler, delete_handler, flush_handler,
    force_release_handler, forever_handler, get_handler, health_handler, increment_handler,
    many_handler, put_handler, put_many_handler, release_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `POST /cache` - Retrieve many entries; `PUT /cache` - store many entries
/// - `DELETE /cache` - flush (always 501)
/// - `GET|PUT|DELETE /cache/:key` - get, put, forget
/// - `PUT /cache/:key/forever`, `POST /cache/:key/{add,increment,decrement}`
/// - `POST /locks/:name/{acquire,release}`, `DELETE /locks/:name`
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/cache",
            post(many_handler)
                .put(put_many_handler)
                .delete(flush_handler),
        )
        .route(
            "/cache/:key",
            get(get_handler).put(put_handler).delete(delete_handler),
        )
        .route("/cache/:key/forever", put(forever_handler))
        .route("/cache/:key/add", post(add_handler))
        .route("/cache/:key/increment", post(increment_handler))
        .route("/cache/:key/decrement", post(decrement_handler))
        .route("/locks/:name", delete(force_release_handler))
        .route("/locks/:name/acquire", post(acquire_handler))
        .route("/locks/:name/release", post(release_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::rowstore::MemoryRowStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    async fn create_test_app() -> Router {
        let client = Arc::new(MemoryRowStore::new());
        client.create_table("cache", "key").await;
        create_router(AppState::new(CacheStore::new(client, "cache"), 300))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_put_endpoint() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/cache/test")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"value":"hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/cache/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_key_named_many_is_an_ordinary_key() {
        let app = create_test_app().await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/cache/many")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"value":"batch"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/cache/many")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_flush_not_implemented() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/cache")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }
}
