use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use uuid::Uuid;

use eventbuddy_shared::errors::AppResult;
use eventbuddy_shared::types::auth::AuthUser;
use eventbuddy_shared::types::pagination::Paginated;
use eventbuddy_shared::types::{ApiResponse, Created};

use crate::models::{Block, Interest, Profile, ProfileWithInterests, Report};
use crate::services::moderation_service::{self, ReportUserRequest};
use crate::services::profile_service::{
    self, AddInterestRequest, CreateProfileRequest, ReplaceInterestsRequest, SearchProfilesQuery,
    UpdateProfileRequest,
};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profiles", get(search_profiles).post(create_profile))
        .route(
            "/profiles/me",
            get(get_my_profile).put(update_profile).delete(delete_profile),
        )
        .route("/profiles/me/profile", get(get_my_profile))
        .route("/profiles/me/interests", put(replace_interests).post(add_interest))
        .route("/profiles/me/interests/:interest_id", delete(remove_interest))
        .route("/profiles/me/blocks", get(list_blocks))
        .route("/profiles/:id", get(get_profile))
        .route("/profiles/:id/interests", get(profile_interests))
        .route("/profiles/:id/block", post(block_user).delete(unblock_user))
        .route("/profiles/:id/report", post(report_user))
        .route("/interests", get(list_interests))
}

// --- GET /profiles ---

pub async fn search_profiles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchProfilesQuery>,
) -> AppResult<Json<ApiResponse<Paginated<Profile>>>> {
    let page = profile_service::search_profiles(state.store(), query)?;
    Ok(Json(ApiResponse::ok(page)))
}

// --- POST /profiles ---

pub async fn create_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProfileRequest>,
) -> AppResult<Created<ProfileWithInterests>> {
    let profile = profile_service::create_profile(state.store(), &user, req)?;
    Ok(Created(profile))
}

// --- GET /profiles/me ---

pub async fn get_my_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<ProfileWithInterests>>> {
    let profile = profile_service::get_profile(state.store(), user.id)?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- PUT /profiles/me ---

pub async fn update_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<ProfileWithInterests>>> {
    let profile = profile_service::update_profile(state.store(), user.id, req)?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- DELETE /profiles/me ---

pub async fn delete_profile(user: AuthUser, State(state): State<Arc<AppState>>) -> AppResult<StatusCode> {
    profile_service::delete_profile(state.store(), user.id)?;
    Ok(StatusCode::NO_CONTENT)
}

// --- GET /profiles/:id ---

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProfileWithInterests>>> {
    let profile = profile_service::get_profile(state.store(), id)?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- Interests ---

pub async fn list_interests(State(state): State<Arc<AppState>>) -> AppResult<Json<ApiResponse<Vec<Interest>>>> {
    let interests = profile_service::list_interests(state.store())?;
    Ok(Json(ApiResponse::ok(interests)))
}

pub async fn profile_interests(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Interest>>>> {
    let interests = profile_service::profile_interests(state.store(), id)?;
    Ok(Json(ApiResponse::ok(interests)))
}

pub async fn replace_interests(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReplaceInterestsRequest>,
) -> AppResult<Json<ApiResponse<Vec<Interest>>>> {
    let interests = profile_service::replace_interests(state.store(), user.id, req)?;
    Ok(Json(ApiResponse::ok(interests)))
}

pub async fn add_interest(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddInterestRequest>,
) -> AppResult<Created<Interest>> {
    let interest = profile_service::add_interest(state.store(), user.id, req)?;
    Ok(Created(interest))
}

pub async fn remove_interest(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(interest_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    profile_service::remove_interest(state.store(), user.id, interest_id)?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Blocks & reports ---

pub async fn list_blocks(user: AuthUser, State(state): State<Arc<AppState>>) -> AppResult<Json<ApiResponse<Vec<Block>>>> {
    let blocks = moderation_service::list_blocks(state.store(), user.id)?;
    Ok(Json(ApiResponse::ok(blocks)))
}

pub async fn block_user(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Created<Block>> {
    let block = moderation_service::block(state.store(), user.id, id)?;
    Ok(Created(block))
}

pub async fn unblock_user(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    moderation_service::unblock(state.store(), user.id, id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn report_user(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReportUserRequest>,
) -> AppResult<Created<Report>> {
    let report = moderation_service::report(state.store(), user.id, id, req)?;
    Ok(Created(report))
}
