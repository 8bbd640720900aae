//! Router setup and configuration.

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{health, id, types};
use crate::api::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/metrics", get(health::metrics));

    let id_routes = Router::new()
        .route("/{id_type}", get(id::acquire))
        .route("/{id_type}/batch", get(id::acquire_batch));

    Router::new()
        .merge(health_routes)
        .nest("/v1/id", id_routes)
        .route("/v1/types", get(types::list_types))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use async_trait::async_trait;

    use super::*;
    use crate::config::AppConfig;
    use crate::counter::{CounterClient, MemoryCounter};
    use crate::error::{CounterError, CounterResult, ErrorCode};

    struct DownCounter;

    #[async_trait]
    impl CounterClient for DownCounter {
        async fn reserve(&self, _counter: &str, _amount: u64) -> CounterResult<u64> {
            Err(CounterError::Transient("connection refused".to_string()))
        }

        async fn health_check(&self) -> CounterResult<()> {
            Err(CounterError::Transient("connection refused".to_string()))
        }

        fn backend_name(&self) -> &'static str {
            "down"
        }
    }

    fn app() -> Router {
        let state = AppState::new(&AppConfig::default(), Arc::new(MemoryCounter::new())).unwrap();
        create_router(state)
    }

    async fn status_of(uri: &str) -> StatusCode {
        app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_routes() {
        assert_eq!(status_of("/health").await, StatusCode::OK);
        assert_eq!(status_of("/ready").await, StatusCode::OK);
        assert_eq!(status_of("/v1/id/1").await, StatusCode::OK);
        assert_eq!(status_of("/v1/id/1/batch?count=3").await, StatusCode::OK);
        assert_eq!(status_of("/v1/types").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_error_routes() {
        assert_eq!(status_of("/v1/id/2").await, StatusCode::NOT_FOUND);
        assert_eq!(
            status_of("/v1/id/1/batch?count=0").await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of("/v1/id/abc").await, StatusCode::BAD_REQUEST);
        assert_eq!(status_of("/nowhere").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ready_reports_unavailable_counter() {
        let state = AppState::new(&AppConfig::default(), Arc::new(DownCounter)).unwrap();
        let response = create_router(state)
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], ErrorCode::COUNTER_UNAVAILABLE.as_i32());
        assert_eq!(body["data"]["ready"], false);
    }
}
