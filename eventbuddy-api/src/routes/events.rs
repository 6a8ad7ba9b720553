use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use eventbuddy_shared::errors::AppResult;
use eventbuddy_shared::types::auth::AuthUser;
use eventbuddy_shared::types::pagination::Paginated;
use eventbuddy_shared::types::{ApiResponse, Created};

use crate::models::Event;
use crate::services::event_service::{self, CreateEventRequest, ListEventsQuery, UpdateEventRequest};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/my/created", get(my_events))
        .route(
            "/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
}

// --- Public ---

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListEventsQuery>,
) -> AppResult<Json<ApiResponse<Paginated<Event>>>> {
    let page = event_service::list(state.store(), query)?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn get_event(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> AppResult<Json<ApiResponse<Event>>> {
    let event = event_service::get(state.store(), id)?;
    Ok(Json(ApiResponse::ok(event)))
}

// --- Host ---

pub async fn create_event(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEventRequest>,
) -> AppResult<Created<Event>> {
    let event = event_service::create(state.store(), user.id, req)?;
    Ok(Created(event))
}

pub async fn update_event(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> AppResult<Json<ApiResponse<Event>>> {
    let event = event_service::update(state.store(), user.id, id, req)?;
    Ok(Json(ApiResponse::ok(event)))
}

pub async fn delete_event(user: AuthUser, State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> AppResult<StatusCode> {
    event_service::delete(state.store(), user.id, id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn my_events(user: AuthUser, State(state): State<Arc<AppState>>) -> AppResult<Json<ApiResponse<Vec<Event>>>> {
    let events = event_service::hosted_by(state.store(), user.id)?;
    Ok(Json(ApiResponse::ok(events)))
}
