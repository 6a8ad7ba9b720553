//! Business operations over `dyn Store`. Handlers stay thin; everything
//! that can fail with a domain error lives here.

pub mod attendance_service;
pub mod connection_service;
pub mod event_service;
pub mod match_service;
pub mod message_service;
pub mod moderation_service;
pub mod profile_service;

use uuid::Uuid;

use eventbuddy_shared::errors::{AppError, AppResult, ErrorCode};
use eventbuddy_shared::types::pagination::PageParams;

use crate::models::Profile;
use crate::store::Store;

pub(crate) fn require_profile(store: &dyn Store, id: Uuid) -> AppResult<Profile> {
    store
        .find_profile(id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
}

/// Treats missing and whitespace-only strings alike.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn page_params(limit: Option<i64>, offset: Option<i64>) -> PageParams {
    let defaults = PageParams::default();
    PageParams::new(limit.unwrap_or(defaults.limit), offset.unwrap_or(defaults.offset))
}
