use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use eventbuddy_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Attendance, AttendanceChanges, AttendanceWithEvent, NewAttendance};
use crate::store::Store;

use super::event_service::require_event;
use super::{non_blank, require_profile};

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

#[derive(Debug, Deserialize)]
pub struct EventRef {
    pub event_id: Uuid,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct RateAttendanceRequest {
    pub rating: Option<i16>,
    #[validate(length(max = 2000))]
    pub reflection: Option<String>,
    #[validate(length(max = 500))]
    pub companions: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct AttendanceStats {
    pub total: usize,
    pub average_rating: Option<f64>,
    pub rated_count: usize,
}

/// Hosts see every record; everyone else only the head count.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum EventAttendance {
    Host {
        attendees: Vec<Attendance>,
        stats: AttendanceStats,
    },
    Public {
        count: usize,
    },
}

#[derive(Debug, Serialize)]
pub struct EventRatings {
    pub ratings: Vec<Attendance>,
    pub average_rating: Option<f64>,
    pub count: usize,
}

/// Mean of the given ratings rounded to one decimal, `None` when empty.
pub fn average_rating(ratings: &[i16]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: f64 = ratings.iter().map(|r| f64::from(*r)).sum();
    let mean = sum / ratings.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

fn ratings_of(records: &[Attendance]) -> Vec<i16> {
    records.iter().filter_map(|a| a.rating).collect()
}

/// One record per profile and event; a second check-in is a conflict even
/// after checking out.
pub fn check_in(store: &dyn Store, profile_id: Uuid, event_id: Uuid) -> AppResult<Attendance> {
    require_profile(store, profile_id)?;
    require_event(store, event_id)?;
    if store.attendance_for(profile_id, event_id)?.is_some() {
        return Err(AppError::new(ErrorCode::AlreadyCheckedIn, "already checked in to this event"));
    }

    let attendance = store.insert_attendance(NewAttendance {
        profile_id,
        event_id,
        checked_in_at: Utc::now(),
    })?;

    tracing::info!(attendance_id = %attendance.id, profile_id = %profile_id, event_id = %event_id, "checked in");
    Ok(attendance)
}

pub fn check_out(store: &dyn Store, profile_id: Uuid, event_id: Uuid) -> AppResult<Attendance> {
    let attendance = store
        .attendance_for(profile_id, event_id)?
        .ok_or_else(|| AppError::new(ErrorCode::AttendanceNotFound, "not checked in to this event"))?;

    let attendance = store.check_out(attendance.id, Utc::now())?;
    tracing::info!(attendance_id = %attendance.id, "checked out");
    Ok(attendance)
}

pub fn my_attendance(store: &dyn Store, profile_id: Uuid) -> AppResult<Vec<AttendanceWithEvent>> {
    store.attendance_with_events(profile_id)
}

pub fn rate(
    store: &dyn Store,
    profile_id: Uuid,
    attendance_id: Uuid,
    req: RateAttendanceRequest,
) -> AppResult<Attendance> {
    req.validate()?;
    if let Some(rating) = req.rating {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::new(
                ErrorCode::InvalidRating,
                format!("rating must be between {MIN_RATING} and {MAX_RATING}"),
            ));
        }
    }

    let attendance = store
        .find_attendance(attendance_id)?
        .ok_or_else(|| AppError::new(ErrorCode::AttendanceNotFound, "attendance not found"))?;
    if attendance.profile_id != profile_id {
        return Err(AppError::new(ErrorCode::NotAttendanceOwner, "you can only rate your own attendance"));
    }

    let updated = store.update_attendance(
        attendance.id,
        AttendanceChanges {
            rating: req.rating,
            reflection: non_blank(req.reflection.as_deref()).map(str::to_string),
            companions: non_blank(req.companions.as_deref()).map(str::to_string),
        },
    )?;

    tracing::info!(attendance_id = %updated.id, rating = ?updated.rating, "attendance rated");
    Ok(updated)
}

pub fn event_attendance(store: &dyn Store, event_id: Uuid, viewer_id: Option<Uuid>) -> AppResult<EventAttendance> {
    let event = require_event(store, event_id)?;
    let attendees = store.attendance_for_event(event_id)?;

    if viewer_id != Some(event.host_id) {
        return Ok(EventAttendance::Public { count: attendees.len() });
    }

    let ratings = ratings_of(&attendees);
    let stats = AttendanceStats {
        total: attendees.len(),
        average_rating: average_rating(&ratings),
        rated_count: ratings.len(),
    };
    Ok(EventAttendance::Host { attendees, stats })
}

pub fn event_ratings(store: &dyn Store, event_id: Uuid) -> AppResult<EventRatings> {
    require_event(store, event_id)?;
    let ratings: Vec<Attendance> = store
        .attendance_for_event(event_id)?
        .into_iter()
        .filter(|a| a.rating.is_some())
        .collect();

    Ok(EventRatings {
        average_rating: average_rating(&ratings_of(&ratings)),
        count: ratings.len(),
        ratings,
    })
}
