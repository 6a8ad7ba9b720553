pub mod attendance;
pub mod connections;
pub mod events;
pub mod health;
pub mod messages;
pub mod profiles;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::{middleware, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use eventbuddy_shared::middleware::metrics_middleware;

use crate::rate_limit::rate_limit;
use crate::AppState;

/// `/health` and `/metrics` at the root, everything else under `/api`.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(profiles::routes())
        .merge(connections::routes())
        .merge(messages::routes())
        .merge(events::routes())
        .merge(attendance::routes())
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .nest("/api", api)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config.cors_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new().allow_origin(origin),
        Err(_) => {
            tracing::warn!(origin = %origin, "invalid CORS origin, cross-origin requests disabled");
            CorsLayer::new()
        }
    };

    cors.allow_methods(AllowMethods::list([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ]))
    .allow_headers(AllowHeaders::list([
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        header::ACCEPT,
    ]))
    .allow_credentials(true)
}
