use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use uuid::Uuid;

use eventbuddy_shared::errors::AppResult;
use eventbuddy_shared::types::auth::AuthUser;
use eventbuddy_shared::types::pagination::Paginated;
use eventbuddy_shared::types::{ApiResponse, Created};

use crate::models::Message;
use crate::services::message_service::{
    self, ConversationSummary, ListMessagesQuery, SendMessageRequest, UnreadCount,
};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/messages", get(list_messages).post(send_message))
        .route("/messages/conversations", get(list_conversations))
        .route("/messages/conversation/:user_id", get(get_conversation))
        .route("/messages/unread/count", get(unread_count))
        .route("/messages/:id/read", put(mark_read))
        .route("/messages/:id", delete(delete_message))
}

pub async fn list_messages(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListMessagesQuery>,
) -> AppResult<Json<ApiResponse<Paginated<Message>>>> {
    let page = message_service::list(state.store(), user.id, query)?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn send_message(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Created<Message>> {
    let message = message_service::send(state.store(), user.id, req)?;
    Ok(Created(message))
}

pub async fn list_conversations(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ConversationSummary>>>> {
    let conversations = message_service::conversations(state.store(), user.id)?;
    Ok(Json(ApiResponse::ok(conversations)))
}

pub async fn get_conversation(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(partner_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Message>>>> {
    let messages = message_service::conversation(state.store(), user.id, partner_id)?;
    Ok(Json(ApiResponse::ok(messages)))
}

pub async fn mark_read(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Message>>> {
    let message = message_service::mark_read(state.store(), user.id, id)?;
    Ok(Json(ApiResponse::ok(message)))
}

pub async fn delete_message(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    message_service::delete(state.store(), user.id, id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unread_count(user: AuthUser, State(state): State<Arc<AppState>>) -> AppResult<Json<ApiResponse<UnreadCount>>> {
    let count = message_service::unread_count(state.store(), user.id)?;
    Ok(Json(ApiResponse::ok(count)))
}
