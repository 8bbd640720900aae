//! Health check handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::api::state::AppState;
use crate::error::ErrorCode;

/// Liveness probe - always returns OK if the service is running.
pub async fn health() -> Json<Value> {
    Json(json!({
        "code": 0,
        "message": "success",
        "data": {
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION")
        }
    }))
}

/// Readiness probe - checks that the counter backend is reachable.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let counter_ok = match state.counter.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                backend = state.counter.backend_name(),
                error = %e,
                "Counter health check failed"
            );
            false
        }
    };

    let status_code = if counter_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = Json(json!({
        "code": if counter_ok { 0 } else { ErrorCode::COUNTER_UNAVAILABLE.as_i32() },
        "message": if counter_ok { "success" } else { "counter unavailable" },
        "data": {
            "ready": counter_ok,
            "components": {
                "counter": state.counter.backend_name()
            }
        }
    }));

    (status_code, response)
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<AppState>) -> String {
    let mut output = String::from(
        "# HELP idpool_up Whether the service is up\n# TYPE idpool_up gauge\nidpool_up 1\n",
    );

    if let Some(handle) = &state.metrics {
        output.push_str(&handle.render());
    }

    output
}
