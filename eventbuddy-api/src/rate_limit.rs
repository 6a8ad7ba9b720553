use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use eventbuddy_shared::errors::{AppError, ErrorCode};

use crate::AppState;

/// Fixed-window limit per client IP, counted in Redis.
///
/// Key: `rl:{ip}:{window_index}` where the index is the unix time divided
/// by the window length. Redis errors let the request through.
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(redis) = &state.redis else {
        return Ok(next.run(req).await);
    };

    let ip = client_ip(
        req.headers(),
        connect_info.map(|ConnectInfo(addr)| addr),
        state.config.trust_forwarded_for,
    );
    let window_secs = state.config.rate_limit_window_secs.max(1);
    let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
    let key = window_key(&ip, now, window_secs);

    match redis.hit_window(&key, window_secs).await {
        Ok(count) if count > state.config.rate_limit_max => {
            tracing::warn!(ip = %ip, count, "rate limit exceeded");
            Err(AppError::new(
                ErrorCode::RateLimited,
                "too many requests, please try again later",
            ))
        }
        Ok(_) => Ok(next.run(req).await),
        Err(e) => {
            tracing::error!(error = %e, "rate limit counter unavailable");
            Ok(next.run(req).await)
        }
    }
}

pub fn window_key(ip: &str, unix_secs: u64, window_secs: u64) -> String {
    format!("rl:{}:{}", ip, unix_secs / window_secs.max(1))
}

/// The socket peer, or the first `X-Forwarded-For` hop when the deployment
/// sits behind a trusted proxy.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded: bool) -> String {
    let forwarded = trust_forwarded
        .then(|| headers.get("x-forwarded-for"))
        .flatten();
    forwarded
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}
