use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use uuid::Uuid;

use eventbuddy_shared::errors::AppResult;
use eventbuddy_shared::types::auth::AuthUser;
use eventbuddy_shared::types::{ApiResponse, Created};

use crate::matching::MatchSuggestion;
use crate::models::{Connection, ConnectionWithPeer};
use crate::services::connection_service::{
    self, ListConnectionsQuery, RespondConnectionRequest, SendConnectionRequest,
};
use crate::services::match_service;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/connections", get(list_connections).post(send_request))
        .route("/connections/:id", put(respond).delete(remove_connection))
        .route("/connections/pending/received", get(pending_received))
        .route("/connections/pending/sent", get(pending_sent))
        .route("/connections/matches/suggestions", get(match_suggestions))
}

// --- GET /connections ---

pub async fn list_connections(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListConnectionsQuery>,
) -> AppResult<Json<ApiResponse<Vec<ConnectionWithPeer>>>> {
    let connections = connection_service::list(state.store(), user.id, query)?;
    Ok(Json(ApiResponse::ok(connections)))
}

// --- POST /connections ---

pub async fn send_request(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendConnectionRequest>,
) -> AppResult<Created<Connection>> {
    let connection = connection_service::send_request(state.store(), user.id, req.receiver_id)?;
    Ok(Created(connection))
}

// --- PUT /connections/:id ---

pub async fn respond(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<RespondConnectionRequest>,
) -> AppResult<Json<ApiResponse<Connection>>> {
    let connection = connection_service::respond(state.store(), id, user.id, req)?;
    Ok(Json(ApiResponse::ok(connection)))
}

// --- DELETE /connections/:id ---

pub async fn remove_connection(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    connection_service::delete(state.store(), id, user.id)?;
    Ok(StatusCode::NO_CONTENT)
}

// --- GET /connections/pending/* ---

pub async fn pending_received(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ConnectionWithPeer>>>> {
    let pending = connection_service::pending_received(state.store(), user.id)?;
    Ok(Json(ApiResponse::ok(pending)))
}

pub async fn pending_sent(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ConnectionWithPeer>>>> {
    let pending = connection_service::pending_sent(state.store(), user.id)?;
    Ok(Json(ApiResponse::ok(pending)))
}

// --- GET /connections/matches/suggestions ---

pub async fn match_suggestions(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<MatchSuggestion>>>> {
    let suggestions = match_service::suggestions(state.store(), user.id)?;
    Ok(Json(ApiResponse::ok(suggestions)))
}
