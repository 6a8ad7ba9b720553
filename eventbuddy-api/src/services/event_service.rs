use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use eventbuddy_shared::errors::{AppError, AppResult, ErrorCode};
use eventbuddy_shared::types::pagination::Paginated;

use crate::models::{Event, EventChanges, EventType, NewEvent};
use crate::store::{EventFilter, Store};

use super::{non_blank, page_params, require_profile};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub event_type: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub event_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    pub event_type: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn parse_event_type(value: &str) -> AppResult<EventType> {
    value.trim().parse::<EventType>().map_err(|_| {
        AppError::new(
            ErrorCode::InvalidEventType,
            "event_type must be one of Event, Club Meeting, Fair",
        )
    })
}

pub(crate) fn require_event(store: &dyn Store, id: Uuid) -> AppResult<Event> {
    store
        .find_event(id)?
        .ok_or_else(|| AppError::new(ErrorCode::EventNotFound, "event not found"))
}

fn require_host(store: &dyn Store, event_id: Uuid, user_id: Uuid) -> AppResult<Event> {
    let event = require_event(store, event_id)?;
    if event.host_id != user_id {
        return Err(AppError::new(ErrorCode::NotEventHost, "only the host can change this event"));
    }
    Ok(event)
}

pub fn list(store: &dyn Store, query: ListEventsQuery) -> AppResult<Paginated<Event>> {
    let filter = EventFilter {
        event_type: non_blank(query.event_type.as_deref()).map(parse_event_type).transpose()?,
        from: query.from,
        to: query.to,
        search: non_blank(query.search.as_deref()).map(str::to_string),
    };
    let params = page_params(query.limit, query.offset);

    let (items, total) = store.list_events(&filter, &params)?;
    Ok(Paginated::new(items, total, &params))
}

pub fn get(store: &dyn Store, id: Uuid) -> AppResult<Event> {
    require_event(store, id)
}

pub fn create(store: &dyn Store, host_id: Uuid, req: CreateEventRequest) -> AppResult<Event> {
    req.validate()?;
    let title = non_blank(Some(req.title.as_str()))
        .ok_or_else(|| AppError::Validation("title is required".into()))?
        .to_string();
    let event_type = parse_event_type(&req.event_type)?;
    require_profile(store, host_id)?;

    let event = store.insert_event(NewEvent {
        host_id,
        title,
        description: req.description,
        location: req.location,
        starts_at: req.starts_at,
        event_type,
    })?;

    tracing::info!(event_id = %event.id, host_id = %host_id, event_type = %event.event_type, "event created");
    Ok(event)
}

pub fn update(store: &dyn Store, user_id: Uuid, event_id: Uuid, req: UpdateEventRequest) -> AppResult<Event> {
    req.validate()?;
    let title = match req.title {
        Some(title) => Some(
            non_blank(Some(title.as_str()))
                .ok_or_else(|| AppError::Validation("title cannot be empty".into()))?
                .to_string(),
        ),
        None => None,
    };
    let event_type = req.event_type.as_deref().map(parse_event_type).transpose()?;
    require_host(store, event_id, user_id)?;

    let event = store.update_event(
        event_id,
        EventChanges {
            title,
            description: req.description,
            location: req.location,
            starts_at: req.starts_at,
            event_type,
        },
    )?;

    tracing::info!(event_id = %event.id, "event updated");
    Ok(event)
}

pub fn delete(store: &dyn Store, user_id: Uuid, event_id: Uuid) -> AppResult<()> {
    require_host(store, event_id, user_id)?;
    store.delete_event(event_id)?;
    tracing::info!(event_id = %event_id, "event deleted");
    Ok(())
}

pub fn hosted_by(store: &dyn Store, host_id: Uuid) -> AppResult<Vec<Event>> {
    store.events_hosted_by(host_id)
}
