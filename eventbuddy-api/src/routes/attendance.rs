use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use uuid::Uuid;

use eventbuddy_shared::errors::AppResult;
use eventbuddy_shared::middleware::OptionalAuthUser;
use eventbuddy_shared::types::auth::AuthUser;
use eventbuddy_shared::types::{ApiResponse, Created};

use crate::models::{Attendance, AttendanceWithEvent};
use crate::services::attendance_service::{
    self, EventAttendance, EventRatings, EventRef, RateAttendanceRequest,
};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/attend/checkin", post(check_in))
        .route("/attend/checkout", post(check_out))
        .route("/attend/my", get(my_attendance))
        .route("/attend/:attend_id/rate", put(rate))
        .route("/attend/event/:event_id", get(event_attendance))
        .route("/attend/event/:event_id/ratings", get(event_ratings))
}

pub async fn check_in(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<EventRef>,
) -> AppResult<Created<Attendance>> {
    let attendance = attendance_service::check_in(state.store(), user.id, req.event_id)?;
    Ok(Created(attendance))
}

pub async fn check_out(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<EventRef>,
) -> AppResult<Json<ApiResponse<Attendance>>> {
    let attendance = attendance_service::check_out(state.store(), user.id, req.event_id)?;
    Ok(Json(ApiResponse::ok(attendance)))
}

pub async fn my_attendance(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<AttendanceWithEvent>>>> {
    let records = attendance_service::my_attendance(state.store(), user.id)?;
    Ok(Json(ApiResponse::ok(records)))
}

pub async fn rate(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(attend_id): Path<Uuid>,
    Json(req): Json<RateAttendanceRequest>,
) -> AppResult<Json<ApiResponse<Attendance>>> {
    let attendance = attendance_service::rate(state.store(), user.id, attend_id, req)?;
    Ok(Json(ApiResponse::ok(attendance)))
}

/// Public; the host gets the full list when signed in.
pub async fn event_attendance(
    OptionalAuthUser(viewer): OptionalAuthUser,
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<EventAttendance>>> {
    let attendance = attendance_service::event_attendance(state.store(), event_id, viewer.map(|u| u.id))?;
    Ok(Json(ApiResponse::ok(attendance)))
}

pub async fn event_ratings(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<EventRatings>>> {
    let ratings = attendance_service::event_ratings(state.store(), event_id)?;
    Ok(Json(ApiResponse::ok(ratings)))
}
