use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use eventbuddy_shared::{HealthCheck, HealthResponse, HealthStatus};

use crate::{AppState, SERVICE_NAME};

/// Checks the database and, when configured, Redis. A Redis failure only
/// degrades the service since it backs rate limiting alone.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let mut checks = Vec::with_capacity(2);

    checks.push(match state.store().ping() {
        Ok(()) => HealthCheck::passed("database"),
        Err(e) => HealthCheck::failed("database", HealthStatus::Unhealthy, e.to_string()),
    });

    if let Some(redis) = &state.redis {
        checks.push(match redis.ping().await {
            Ok(()) => HealthCheck::passed("redis"),
            Err(e) => HealthCheck::failed("redis", HealthStatus::Degraded, e.to_string()),
        });
    }

    let response = HealthResponse::healthy(SERVICE_NAME, env!("CARGO_PKG_VERSION")).with_checks(checks);
    (response.http_status(), Json(response)).into_response()
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics_handle {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
