//! Persistence seam. Services only talk to `dyn Store`; `PgStore` backs it
//! with diesel in production.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use eventbuddy_shared::errors::AppResult;
use eventbuddy_shared::types::pagination::PageParams;

use crate::models::{
    Attendance, AttendanceChanges, AttendanceWithEvent, Block, Connection, ConnectionStatus, Event,
    EventChanges, EventType, Interest, Message, NewAttendance, NewBlock, NewConnection, NewEvent,
    NewMessage, NewProfile, NewReport, PersonalityType, Profile, ProfileChanges,
    ProfileWithInterests, Report,
};
use crate::social::PairKey;

#[cfg(test)]
pub mod memory;
pub mod pg;

pub use pg::PgStore;

#[derive(Debug, Default, Clone)]
pub struct ProfileFilter {
    /// Substring of username or full name.
    pub search: Option<String>,
    /// Interest names; a profile matches if it has any of them.
    pub interests: Vec<String>,
    pub personality_type: Option<PersonalityType>,
    /// Case-insensitive substring.
    pub major: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct EventFilter {
    pub event_type: Option<EventType>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Substring of title or description.
    pub search: Option<String>,
}

pub trait ProfileStore {
    fn find_profile(&self, id: Uuid) -> AppResult<Option<Profile>>;
    fn profile_with_interests(&self, id: Uuid) -> AppResult<Option<ProfileWithInterests>>;
    /// Every profile but `id`, oldest first, with interests loaded.
    fn profiles_with_interests_except(&self, id: Uuid) -> AppResult<Vec<ProfileWithInterests>>;
    fn profiles_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Profile>>;
    /// Newest first. Returns the page and the total match count.
    fn search_profiles(&self, filter: &ProfileFilter, page: &PageParams) -> AppResult<(Vec<Profile>, i64)>;
    fn insert_profile(&self, profile: NewProfile) -> AppResult<Profile>;
    fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> AppResult<Option<Profile>>;
    fn delete_profile(&self, id: Uuid) -> AppResult<bool>;

    fn list_interests(&self) -> AppResult<Vec<Interest>>;
    fn interests_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Interest>>;
    fn interests_of(&self, profile_id: Uuid) -> AppResult<Vec<Interest>>;
    /// Looks the name up case-insensitively before inserting.
    fn find_or_create_interest(&self, name: &str, category: Option<&str>) -> AppResult<Interest>;
    fn replace_profile_interests(&self, profile_id: Uuid, interest_ids: &[Uuid]) -> AppResult<()>;
    fn attach_interest(&self, profile_id: Uuid, interest_id: Uuid) -> AppResult<()>;
    fn detach_interest(&self, profile_id: Uuid, interest_id: Uuid) -> AppResult<bool>;
}

pub trait SocialStore {
    fn find_connection(&self, id: Uuid) -> AppResult<Option<Connection>>;
    fn connection_for_pair(&self, pair: PairKey) -> AppResult<Option<Connection>>;
    /// Newest first, optionally narrowed to one status.
    fn connections_involving(&self, user_id: Uuid, status: Option<ConnectionStatus>) -> AppResult<Vec<Connection>>;
    fn insert_connection(&self, connection: NewConnection) -> AppResult<Connection>;
    fn set_connection_status(&self, id: Uuid, status: ConnectionStatus) -> AppResult<Connection>;
    fn delete_connection(&self, id: Uuid) -> AppResult<bool>;

    /// Blocks in either direction.
    fn blocks_involving(&self, user_id: Uuid) -> AppResult<Vec<Block>>;
    fn blocks_by(&self, blocker_id: Uuid) -> AppResult<Vec<Block>>;
    fn is_blocked(&self, pair: PairKey) -> AppResult<bool>;
    fn insert_block(&self, block: NewBlock) -> AppResult<Block>;
    fn delete_block(&self, blocker_id: Uuid, blocked_id: Uuid) -> AppResult<bool>;

    fn insert_report(&self, report: NewReport) -> AppResult<Report>;
}

pub trait MessageStore {
    fn insert_message(&self, message: NewMessage) -> AppResult<Message>;
    /// Newest first, optionally only the exchange with `with`.
    fn messages_involving(
        &self,
        user_id: Uuid,
        with: Option<Uuid>,
        page: &PageParams,
    ) -> AppResult<(Vec<Message>, i64)>;
    /// Every message sent or received by `user_id`, newest first.
    fn message_history(&self, user_id: Uuid) -> AppResult<Vec<Message>>;
    /// The exchange between two users, oldest first.
    fn conversation(&self, user_id: Uuid, partner_id: Uuid) -> AppResult<Vec<Message>>;
    fn find_message(&self, id: Uuid) -> AppResult<Option<Message>>;
    fn mark_read(&self, id: Uuid) -> AppResult<Message>;
    fn delete_message(&self, id: Uuid) -> AppResult<bool>;
    fn unread_count(&self, receiver_id: Uuid) -> AppResult<i64>;
}

pub trait EventStore {
    /// Ascending by start time.
    fn list_events(&self, filter: &EventFilter, page: &PageParams) -> AppResult<(Vec<Event>, i64)>;
    fn find_event(&self, id: Uuid) -> AppResult<Option<Event>>;
    fn insert_event(&self, event: NewEvent) -> AppResult<Event>;
    fn update_event(&self, id: Uuid, changes: EventChanges) -> AppResult<Event>;
    fn delete_event(&self, id: Uuid) -> AppResult<bool>;
    fn events_hosted_by(&self, host_id: Uuid) -> AppResult<Vec<Event>>;

    fn find_attendance(&self, id: Uuid) -> AppResult<Option<Attendance>>;
    fn attendance_for(&self, profile_id: Uuid, event_id: Uuid) -> AppResult<Option<Attendance>>;
    fn insert_attendance(&self, attendance: NewAttendance) -> AppResult<Attendance>;
    fn check_out(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Attendance>;
    fn update_attendance(&self, id: Uuid, changes: AttendanceChanges) -> AppResult<Attendance>;
    /// Oldest check-in first.
    fn attendance_for_event(&self, event_id: Uuid) -> AppResult<Vec<Attendance>>;
    /// Newest check-in first.
    fn attendance_with_events(&self, profile_id: Uuid) -> AppResult<Vec<AttendanceWithEvent>>;
}

pub trait Store: ProfileStore + SocialStore + MessageStore + EventStore + Send + Sync {
    /// Cheap round trip used by the health check.
    fn ping(&self) -> AppResult<()>;
}

/// Escapes `%`, `_` and `\` so user text matches literally inside LIKE.
pub(crate) fn like_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Substring pattern for ILIKE.
pub(crate) fn like_pattern(text: &str) -> String {
    format!("%{}%", like_literal(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("chess"), "%chess%");
        assert_eq!(like_pattern("100%_fun"), "%100\\%\\_fun%");
        assert_eq!(like_literal("a\\b"), "a\\\\b");
    }
}
