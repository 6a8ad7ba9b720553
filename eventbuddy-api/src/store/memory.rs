//! In-process store for tests. Vectors keep insertion order, so "newest
//! first" is reverse insertion order and timestamps never have to differ.

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use diesel::result::DatabaseErrorKind;
use uuid::Uuid;

use eventbuddy_shared::errors::{AppError, AppResult, ErrorCode};
use eventbuddy_shared::types::pagination::PageParams;

use crate::models::{
    Attendance, AttendanceChanges, AttendanceWithEvent, Block, Connection, ConnectionStatus, Event,
    EventChanges, Interest, Message, NewAttendance, NewBlock, NewConnection, NewEvent, NewMessage,
    NewProfile, NewReport, Profile, ProfileChanges, ProfileWithInterests, Report,
};
use crate::social::PairKey;

use super::{EventFilter, EventStore, MessageStore, ProfileFilter, ProfileStore, SocialStore, Store};

#[derive(Default)]
struct Tables {
    profiles: Vec<Profile>,
    interests: Vec<Interest>,
    profile_interests: Vec<(Uuid, Uuid)>,
    connections: Vec<Connection>,
    blocks: Vec<Block>,
    reports: Vec<Report>,
    messages: Vec<Message>,
    events: Vec<Event>,
    attendances: Vec<Attendance>,
}

impl Tables {
    fn interests_of(&self, profile_id: Uuid) -> Vec<Interest> {
        let mut interests: Vec<Interest> = self
            .profile_interests
            .iter()
            .filter(|(p, _)| *p == profile_id)
            .filter_map(|(_, i)| self.interests.iter().find(|interest| interest.id == *i).cloned())
            .collect();
        interests.sort_by(|a, b| a.name.cmp(&b.name));
        interests
    }

    /// Mirrors the `profiles(id)` foreign keys on every user column.
    fn profiles_exist(&self, ids: &[Uuid]) -> AppResult<()> {
        match ids.iter().find(|id| !self.profiles.iter().any(|p| p.id == **id)) {
            Some(_) => Err(foreign_key_violation("profiles")),
            None => Ok(()),
        }
    }

    fn interests_exist(&self, ids: &[Uuid]) -> AppResult<()> {
        match ids.iter().find(|id| !self.interests.iter().any(|i| i.id == **id)) {
            Some(_) => Err(foreign_key_violation("interests")),
            None => Ok(()),
        }
    }

    fn with_interests(&self, profile: &Profile) -> ProfileWithInterests {
        ProfileWithInterests {
            profile: profile.clone(),
            interests: self.interests_of(profile.id),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> AppResult<std::sync::MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::internal("memory store lock poisoned"))
    }
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(&needle.to_lowercase()))
        .unwrap_or(false)
}

fn page<T: Clone>(items: Vec<T>, page: &PageParams) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    (items, total)
}

fn missing() -> AppError {
    AppError::Database(diesel::result::Error::NotFound)
}

/// Same error diesel reports when Postgres rejects a dangling reference.
fn foreign_key_violation(table: &str) -> AppError {
    AppError::Database(diesel::result::Error::DatabaseError(
        DatabaseErrorKind::ForeignKeyViolation,
        Box::new(format!("insert violates foreign key into {table}")),
    ))
}

impl ProfileStore for MemoryStore {
    fn find_profile(&self, id: Uuid) -> AppResult<Option<Profile>> {
        let tables = self.tables()?;
        Ok(tables.profiles.iter().find(|p| p.id == id).cloned())
    }

    fn profile_with_interests(&self, id: Uuid) -> AppResult<Option<ProfileWithInterests>> {
        let tables = self.tables()?;
        Ok(tables
            .profiles
            .iter()
            .find(|p| p.id == id)
            .map(|p| tables.with_interests(p)))
    }

    fn profiles_with_interests_except(&self, id: Uuid) -> AppResult<Vec<ProfileWithInterests>> {
        let tables = self.tables()?;
        Ok(tables
            .profiles
            .iter()
            .filter(|p| p.id != id)
            .map(|p| tables.with_interests(p))
            .collect())
    }

    fn profiles_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Profile>> {
        let tables = self.tables()?;
        Ok(tables
            .profiles
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    fn search_profiles(&self, filter: &ProfileFilter, params: &PageParams) -> AppResult<(Vec<Profile>, i64)> {
        let tables = self.tables()?;
        let wanted: HashSet<String> = filter.interests.iter().map(|n| n.trim().to_lowercase()).collect();

        let matches: Vec<Profile> = tables
            .profiles
            .iter()
            .rev()
            .filter(|p| match filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                Some(s) => contains_ci(p.username.as_deref(), s) || contains_ci(p.full_name.as_deref(), s),
                None => true,
            })
            .filter(|p| {
                wanted.is_empty()
                    || tables
                        .interests_of(p.id)
                        .iter()
                        .any(|i| wanted.contains(&i.name.to_lowercase()))
            })
            .filter(|p| filter.personality_type.map_or(true, |t| p.personality_type == Some(t)))
            .filter(|p| match filter.major.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
                Some(m) => contains_ci(p.major.as_deref(), m),
                None => true,
            })
            .cloned()
            .collect();

        Ok(page(matches, params))
    }

    fn insert_profile(&self, profile: NewProfile) -> AppResult<Profile> {
        let mut tables = self.tables()?;
        let taken = tables.profiles.iter().any(|p| {
            p.id == profile.id || (profile.username.is_some() && p.username == profile.username)
        });
        if taken {
            return Err(AppError::new(ErrorCode::ProfileAlreadyExists, "profile or username already exists"));
        }
        let now = Utc::now();
        let row = Profile {
            id: profile.id,
            email: profile.email,
            username: profile.username,
            full_name: profile.full_name,
            avatar_url: profile.avatar_url,
            bio: profile.bio,
            personality_type: profile.personality_type,
            major: profile.major,
            class_year: profile.class_year,
            created_at: now,
            updated_at: now,
        };
        tables.profiles.push(row.clone());
        Ok(row)
    }

    fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> AppResult<Option<Profile>> {
        let mut tables = self.tables()?;
        if let Some(username) = &changes.username {
            if tables.profiles.iter().any(|p| p.id != id && p.username.as_ref() == Some(username)) {
                return Err(AppError::conflict("username already taken"));
            }
        }
        let Some(profile) = tables.profiles.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(v) = changes.username { profile.username = Some(v); }
        if let Some(v) = changes.full_name { profile.full_name = Some(v); }
        if let Some(v) = changes.avatar_url { profile.avatar_url = Some(v); }
        if let Some(v) = changes.bio { profile.bio = Some(v); }
        if let Some(v) = changes.personality_type { profile.personality_type = Some(v); }
        if let Some(v) = changes.major { profile.major = Some(v); }
        if let Some(v) = changes.class_year { profile.class_year = Some(v); }
        profile.updated_at = Utc::now();
        Ok(Some(profile.clone()))
    }

    fn delete_profile(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables()?;
        let before = tables.profiles.len();
        tables.profiles.retain(|p| p.id != id);
        if tables.profiles.len() == before {
            return Ok(false);
        }

        // Mirror the ON DELETE CASCADE foreign keys.
        tables.profile_interests.retain(|(p, _)| *p != id);
        tables.connections.retain(|c| !c.involves(id));
        tables.blocks.retain(|b| b.blocker_id != id && b.blocked_id != id);
        tables.reports.retain(|r| r.reporter_id != id && r.reported_id != id);
        tables.messages.retain(|m| m.sender_id != id && m.receiver_id != id);
        let hosted: HashSet<Uuid> = tables.events.iter().filter(|e| e.host_id == id).map(|e| e.id).collect();
        tables.events.retain(|e| e.host_id != id);
        tables
            .attendances
            .retain(|a| a.profile_id != id && !hosted.contains(&a.event_id));
        Ok(true)
    }

    fn list_interests(&self) -> AppResult<Vec<Interest>> {
        let tables = self.tables()?;
        let mut interests = tables.interests.clone();
        interests.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(interests)
    }

    fn interests_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Interest>> {
        let tables = self.tables()?;
        Ok(tables
            .interests
            .iter()
            .filter(|i| ids.contains(&i.id))
            .cloned()
            .collect())
    }

    fn interests_of(&self, profile_id: Uuid) -> AppResult<Vec<Interest>> {
        Ok(self.tables()?.interests_of(profile_id))
    }

    fn find_or_create_interest(&self, name: &str, category: Option<&str>) -> AppResult<Interest> {
        let mut tables = self.tables()?;
        if let Some(existing) = tables.interests.iter().find(|i| i.name.eq_ignore_ascii_case(name)) {
            return Ok(existing.clone());
        }
        let interest = Interest {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: category.map(str::to_string),
        };
        tables.interests.push(interest.clone());
        Ok(interest)
    }

    fn replace_profile_interests(&self, profile_id: Uuid, interest_ids: &[Uuid]) -> AppResult<()> {
        let mut tables = self.tables()?;
        tables.profiles_exist(&[profile_id])?;
        tables.interests_exist(interest_ids)?;
        tables.profile_interests.retain(|(p, _)| *p != profile_id);
        for interest_id in interest_ids {
            if !tables.profile_interests.contains(&(profile_id, *interest_id)) {
                tables.profile_interests.push((profile_id, *interest_id));
            }
        }
        Ok(())
    }

    fn attach_interest(&self, profile_id: Uuid, interest_id: Uuid) -> AppResult<()> {
        let mut tables = self.tables()?;
        tables.profiles_exist(&[profile_id])?;
        tables.interests_exist(&[interest_id])?;
        if tables.profile_interests.contains(&(profile_id, interest_id)) {
            return Err(AppError::new(ErrorCode::InterestAlreadyAdded, "interest already added"));
        }
        tables.profile_interests.push((profile_id, interest_id));
        Ok(())
    }

    fn detach_interest(&self, profile_id: Uuid, interest_id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables()?;
        let before = tables.profile_interests.len();
        tables.profile_interests.retain(|row| *row != (profile_id, interest_id));
        Ok(tables.profile_interests.len() < before)
    }
}

impl SocialStore for MemoryStore {
    fn find_connection(&self, id: Uuid) -> AppResult<Option<Connection>> {
        let tables = self.tables()?;
        Ok(tables.connections.iter().find(|c| c.id == id).cloned())
    }

    fn connection_for_pair(&self, pair: PairKey) -> AppResult<Option<Connection>> {
        let tables = self.tables()?;
        Ok(tables
            .connections
            .iter()
            .find(|c| c.user_low == pair.low && c.user_high == pair.high)
            .cloned())
    }

    fn connections_involving(&self, user_id: Uuid, status: Option<ConnectionStatus>) -> AppResult<Vec<Connection>> {
        let tables = self.tables()?;
        Ok(tables
            .connections
            .iter()
            .rev()
            .filter(|c| c.involves(user_id))
            .filter(|c| status.map_or(true, |s| c.status == s))
            .cloned()
            .collect())
    }

    fn insert_connection(&self, connection: NewConnection) -> AppResult<Connection> {
        let mut tables = self.tables()?;
        tables.profiles_exist(&[connection.requester_id, connection.receiver_id])?;
        let exists = tables
            .connections
            .iter()
            .any(|c| c.user_low == connection.user_low && c.user_high == connection.user_high);
        if exists {
            return Err(AppError::new(
                ErrorCode::ConnectionAlreadyExists,
                "a connection already exists between these users",
            ));
        }
        let now = Utc::now();
        let row = Connection {
            id: Uuid::new_v4(),
            requester_id: connection.requester_id,
            receiver_id: connection.receiver_id,
            user_low: connection.user_low,
            user_high: connection.user_high,
            status: connection.status,
            created_at: now,
            updated_at: now,
        };
        tables.connections.push(row.clone());
        Ok(row)
    }

    fn set_connection_status(&self, id: Uuid, status: ConnectionStatus) -> AppResult<Connection> {
        let mut tables = self.tables()?;
        let connection = tables.connections.iter_mut().find(|c| c.id == id).ok_or_else(missing)?;
        connection.status = status;
        connection.updated_at = Utc::now();
        Ok(connection.clone())
    }

    fn delete_connection(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables()?;
        let before = tables.connections.len();
        tables.connections.retain(|c| c.id != id);
        Ok(tables.connections.len() < before)
    }

    fn blocks_involving(&self, user_id: Uuid) -> AppResult<Vec<Block>> {
        let tables = self.tables()?;
        Ok(tables
            .blocks
            .iter()
            .filter(|b| b.blocker_id == user_id || b.blocked_id == user_id)
            .cloned()
            .collect())
    }

    fn blocks_by(&self, blocker_id: Uuid) -> AppResult<Vec<Block>> {
        let tables = self.tables()?;
        Ok(tables
            .blocks
            .iter()
            .rev()
            .filter(|b| b.blocker_id == blocker_id)
            .cloned()
            .collect())
    }

    fn is_blocked(&self, pair: PairKey) -> AppResult<bool> {
        let tables = self.tables()?;
        Ok(tables
            .blocks
            .iter()
            .any(|b| b.user_low == pair.low && b.user_high == pair.high))
    }

    fn insert_block(&self, block: NewBlock) -> AppResult<Block> {
        let mut tables = self.tables()?;
        tables.profiles_exist(&[block.blocker_id, block.blocked_id])?;
        if tables
            .blocks
            .iter()
            .any(|b| b.blocker_id == block.blocker_id && b.blocked_id == block.blocked_id)
        {
            return Err(AppError::new(ErrorCode::AlreadyBlocked, "user already blocked"));
        }
        let row = Block {
            id: Uuid::new_v4(),
            blocker_id: block.blocker_id,
            blocked_id: block.blocked_id,
            user_low: block.user_low,
            user_high: block.user_high,
            created_at: Utc::now(),
        };
        tables.blocks.push(row.clone());
        Ok(row)
    }

    fn delete_block(&self, blocker_id: Uuid, blocked_id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables()?;
        let before = tables.blocks.len();
        tables
            .blocks
            .retain(|b| !(b.blocker_id == blocker_id && b.blocked_id == blocked_id));
        Ok(tables.blocks.len() < before)
    }

    fn insert_report(&self, report: NewReport) -> AppResult<Report> {
        let mut tables = self.tables()?;
        tables.profiles_exist(&[report.reporter_id, report.reported_id])?;
        let row = Report {
            id: Uuid::new_v4(),
            reporter_id: report.reporter_id,
            reported_id: report.reported_id,
            report_type: report.report_type,
            reason: report.reason,
            description: report.description,
            status: "pending".to_string(),
            created_at: Utc::now(),
        };
        tables.reports.push(row.clone());
        Ok(row)
    }
}

impl MessageStore for MemoryStore {
    fn insert_message(&self, message: NewMessage) -> AppResult<Message> {
        let mut tables = self.tables()?;
        tables.profiles_exist(&[message.sender_id, message.receiver_id])?;
        let row = Message {
            id: Uuid::new_v4(),
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            content: message.content,
            is_read: false,
            created_at: Utc::now(),
        };
        tables.messages.push(row.clone());
        Ok(row)
    }

    fn messages_involving(
        &self,
        user_id: Uuid,
        with: Option<Uuid>,
        params: &PageParams,
    ) -> AppResult<(Vec<Message>, i64)> {
        let matches: Vec<Message> = match with {
            Some(partner_id) => {
                let mut conversation = self.conversation(user_id, partner_id)?;
                conversation.reverse();
                conversation
            }
            None => self.message_history(user_id)?,
        };
        Ok(page(matches, params))
    }

    fn message_history(&self, user_id: Uuid) -> AppResult<Vec<Message>> {
        let tables = self.tables()?;
        Ok(tables
            .messages
            .iter()
            .rev()
            .filter(|m| m.sender_id == user_id || m.receiver_id == user_id)
            .cloned()
            .collect())
    }

    fn conversation(&self, user_id: Uuid, partner_id: Uuid) -> AppResult<Vec<Message>> {
        let pair = PairKey::new(user_id, partner_id);
        let tables = self.tables()?;
        Ok(tables
            .messages
            .iter()
            .filter(|m| PairKey::new(m.sender_id, m.receiver_id) == pair)
            .cloned()
            .collect())
    }

    fn find_message(&self, id: Uuid) -> AppResult<Option<Message>> {
        let tables = self.tables()?;
        Ok(tables.messages.iter().find(|m| m.id == id).cloned())
    }

    fn mark_read(&self, id: Uuid) -> AppResult<Message> {
        let mut tables = self.tables()?;
        let message = tables.messages.iter_mut().find(|m| m.id == id).ok_or_else(missing)?;
        message.is_read = true;
        Ok(message.clone())
    }

    fn delete_message(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables()?;
        let before = tables.messages.len();
        tables.messages.retain(|m| m.id != id);
        Ok(tables.messages.len() < before)
    }

    fn unread_count(&self, receiver_id: Uuid) -> AppResult<i64> {
        let tables = self.tables()?;
        Ok(tables
            .messages
            .iter()
            .filter(|m| m.receiver_id == receiver_id && !m.is_read)
            .count() as i64)
    }
}

impl EventStore for MemoryStore {
    fn list_events(&self, filter: &EventFilter, params: &PageParams) -> AppResult<(Vec<Event>, i64)> {
        let tables = self.tables()?;
        let mut matches: Vec<Event> = tables
            .events
            .iter()
            .filter(|e| filter.event_type.map_or(true, |t| e.event_type == t))
            .filter(|e| filter.from.map_or(true, |from| e.starts_at >= from))
            .filter(|e| filter.to.map_or(true, |to| e.starts_at <= to))
            .filter(|e| match filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                Some(s) => contains_ci(Some(&e.title), s) || contains_ci(e.description.as_deref(), s),
                None => true,
            })
            .cloned()
            .collect();
        matches.sort_by_key(|e| e.starts_at);
        Ok(page(matches, params))
    }

    fn find_event(&self, id: Uuid) -> AppResult<Option<Event>> {
        let tables = self.tables()?;
        Ok(tables.events.iter().find(|e| e.id == id).cloned())
    }

    fn insert_event(&self, event: NewEvent) -> AppResult<Event> {
        let mut tables = self.tables()?;
        tables.profiles_exist(&[event.host_id])?;
        let now = Utc::now();
        let row = Event {
            id: Uuid::new_v4(),
            host_id: event.host_id,
            title: event.title,
            description: event.description,
            location: event.location,
            starts_at: event.starts_at,
            event_type: event.event_type,
            created_at: now,
            updated_at: now,
        };
        tables.events.push(row.clone());
        Ok(row)
    }

    fn update_event(&self, id: Uuid, changes: EventChanges) -> AppResult<Event> {
        let mut tables = self.tables()?;
        let event = tables.events.iter_mut().find(|e| e.id == id).ok_or_else(missing)?;
        if let Some(v) = changes.title { event.title = v; }
        if let Some(v) = changes.description { event.description = Some(v); }
        if let Some(v) = changes.location { event.location = Some(v); }
        if let Some(v) = changes.starts_at { event.starts_at = v; }
        if let Some(v) = changes.event_type { event.event_type = v; }
        event.updated_at = Utc::now();
        Ok(event.clone())
    }

    fn delete_event(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables()?;
        let before = tables.events.len();
        tables.events.retain(|e| e.id != id);
        if tables.events.len() == before {
            return Ok(false);
        }
        tables.attendances.retain(|a| a.event_id != id);
        Ok(true)
    }

    fn events_hosted_by(&self, host_id: Uuid) -> AppResult<Vec<Event>> {
        let tables = self.tables()?;
        let mut hosted: Vec<Event> = tables.events.iter().filter(|e| e.host_id == host_id).cloned().collect();
        hosted.sort_by_key(|e| e.starts_at);
        Ok(hosted)
    }

    fn find_attendance(&self, id: Uuid) -> AppResult<Option<Attendance>> {
        let tables = self.tables()?;
        Ok(tables.attendances.iter().find(|a| a.id == id).cloned())
    }

    fn attendance_for(&self, profile_id: Uuid, event_id: Uuid) -> AppResult<Option<Attendance>> {
        let tables = self.tables()?;
        Ok(tables
            .attendances
            .iter()
            .find(|a| a.profile_id == profile_id && a.event_id == event_id)
            .cloned())
    }

    fn insert_attendance(&self, attendance: NewAttendance) -> AppResult<Attendance> {
        let mut tables = self.tables()?;
        tables.profiles_exist(&[attendance.profile_id])?;
        if !tables.events.iter().any(|e| e.id == attendance.event_id) {
            return Err(foreign_key_violation("events"));
        }
        if tables
            .attendances
            .iter()
            .any(|a| a.profile_id == attendance.profile_id && a.event_id == attendance.event_id)
        {
            return Err(AppError::new(ErrorCode::AlreadyCheckedIn, "already checked in to this event"));
        }
        let row = Attendance {
            id: Uuid::new_v4(),
            profile_id: attendance.profile_id,
            event_id: attendance.event_id,
            checked_in_at: attendance.checked_in_at,
            checked_out_at: None,
            rating: None,
            reflection: None,
            companions: None,
        };
        tables.attendances.push(row.clone());
        Ok(row)
    }

    fn check_out(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Attendance> {
        let mut tables = self.tables()?;
        let attendance = tables.attendances.iter_mut().find(|a| a.id == id).ok_or_else(missing)?;
        attendance.checked_out_at = Some(at);
        Ok(attendance.clone())
    }

    fn update_attendance(&self, id: Uuid, changes: AttendanceChanges) -> AppResult<Attendance> {
        let mut tables = self.tables()?;
        let attendance = tables.attendances.iter_mut().find(|a| a.id == id).ok_or_else(missing)?;
        if let Some(v) = changes.rating { attendance.rating = Some(v); }
        if let Some(v) = changes.reflection { attendance.reflection = Some(v); }
        if let Some(v) = changes.companions { attendance.companions = Some(v); }
        Ok(attendance.clone())
    }

    fn attendance_for_event(&self, event_id: Uuid) -> AppResult<Vec<Attendance>> {
        let tables = self.tables()?;
        Ok(tables
            .attendances
            .iter()
            .filter(|a| a.event_id == event_id)
            .cloned()
            .collect())
    }

    fn attendance_with_events(&self, profile_id: Uuid) -> AppResult<Vec<AttendanceWithEvent>> {
        let tables = self.tables()?;
        Ok(tables
            .attendances
            .iter()
            .rev()
            .filter(|a| a.profile_id == profile_id)
            .filter_map(|a| {
                tables
                    .events
                    .iter()
                    .find(|e| e.id == a.event_id)
                    .map(|e| AttendanceWithEvent {
                        attendance: a.clone(),
                        event: e.clone(),
                    })
            })
            .collect())
    }
}

impl Store for MemoryStore {
    fn ping(&self) -> AppResult<()> {
        self.tables().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventType;
    use crate::services::test_support::seed_profile;

    fn is_foreign_key_violation(err: &AppError) -> bool {
        matches!(
            err,
            AppError::Database(diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _))
        )
    }

    #[test]
    fn rows_must_reference_existing_profiles() {
        let store = MemoryStore::new();
        let known = seed_profile(&store);
        let ghost = Uuid::new_v4();
        let pair = PairKey::new(ghost, known.id);

        let err = store
            .insert_connection(NewConnection {
                requester_id: ghost,
                receiver_id: known.id,
                user_low: pair.low,
                user_high: pair.high,
                status: ConnectionStatus::Pending,
            })
            .unwrap_err();
        assert!(is_foreign_key_violation(&err));

        let err = store
            .insert_block(NewBlock {
                blocker_id: ghost,
                blocked_id: known.id,
                user_low: pair.low,
                user_high: pair.high,
            })
            .unwrap_err();
        assert!(is_foreign_key_violation(&err));

        let err = store
            .insert_message(NewMessage {
                sender_id: ghost,
                receiver_id: known.id,
                content: "hi".into(),
            })
            .unwrap_err();
        assert!(is_foreign_key_violation(&err));

        let err = store
            .insert_event(NewEvent {
                host_id: ghost,
                title: "Expo".into(),
                description: None,
                location: None,
                starts_at: Utc::now(),
                event_type: EventType::Fair,
            })
            .unwrap_err();
        assert!(is_foreign_key_violation(&err));

        assert!(store.connections_involving(known.id, None).unwrap().is_empty());
        assert!(!store.is_blocked(pair).unwrap());
    }

    #[test]
    fn attendance_and_interests_check_both_sides() {
        let store = MemoryStore::new();
        let student = seed_profile(&store);

        let err = store
            .insert_attendance(NewAttendance {
                profile_id: student.id,
                event_id: Uuid::new_v4(),
                checked_in_at: Utc::now(),
            })
            .unwrap_err();
        assert!(is_foreign_key_violation(&err));

        let err = store.attach_interest(student.id, Uuid::new_v4()).unwrap_err();
        assert!(is_foreign_key_violation(&err));

        let chess = store.find_or_create_interest("Chess", None).unwrap();
        let err = store.replace_profile_interests(Uuid::new_v4(), &[chess.id]).unwrap_err();
        assert!(is_foreign_key_violation(&err));

        store.attach_interest(student.id, chess.id).unwrap();
        assert_eq!(store.interests_of(student.id).unwrap().len(), 1);
    }
}
