use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::Connection as _;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use eventbuddy_shared::clients::db::{DbConn, DbPool};
use eventbuddy_shared::errors::{AppError, AppResult, ErrorCode};
use eventbuddy_shared::types::pagination::PageParams;

use crate::models::{
    Attendance, AttendanceChanges, AttendanceWithEvent, Block, Connection, ConnectionStatus, Event,
    EventChanges, Interest, Message, NewAttendance, NewBlock, NewConnection, NewEvent,
    NewInterest, NewMessage, NewProfile, NewReport, Profile, ProfileChanges, ProfileWithInterests,
    Report,
};
use crate::schema::{
    attendances, blocks, connections, events, interests, messages, profile_interests, profiles,
    reports,
};
use crate::social::PairKey;

use super::{
    like_literal, like_pattern, EventFilter, EventStore, MessageStore, ProfileFilter, ProfileStore,
    SocialStore, Store,
};

/// Postgres-backed store. Diesel is synchronous; each call checks a
/// connection out of the r2d2 pool for its duration.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> AppResult<DbConn> {
        self.pool.get().map_err(|e| AppError::internal(e.to_string()))
    }
}

fn with_interests(conn: &mut PgConnection, profiles: Vec<Profile>) -> QueryResult<Vec<ProfileWithInterests>> {
    let ids: Vec<Uuid> = profiles.iter().map(|p| p.id).collect();
    let rows: Vec<(Uuid, Interest)> = profile_interests::table
        .inner_join(interests::table)
        .filter(profile_interests::profile_id.eq_any(&ids))
        .select((profile_interests::profile_id, interests::all_columns))
        .order(interests::name.asc())
        .load(conn)?;

    let mut by_profile: HashMap<Uuid, Vec<Interest>> = HashMap::new();
    for (profile_id, interest) in rows {
        by_profile.entry(profile_id).or_default().push(interest);
    }

    Ok(profiles
        .into_iter()
        .map(|profile| {
            let interests = by_profile.remove(&profile.id).unwrap_or_default();
            ProfileWithInterests { profile, interests }
        })
        .collect())
}

fn profile_query(filter: &ProfileFilter, interest_ids: Option<&[Uuid]>) -> profiles::BoxedQuery<'static, Pg> {
    let mut query = profiles::table.into_boxed::<Pg>();

    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search.trim());
        query = query.filter(
            profiles::username
                .ilike(pattern.clone())
                .or(profiles::full_name.ilike(pattern)),
        );
    }
    if let Some(ids) = interest_ids {
        query = query.filter(
            profiles::id.eq_any(
                profile_interests::table
                    .filter(profile_interests::interest_id.eq_any(ids.to_vec()))
                    .select(profile_interests::profile_id),
            ),
        );
    }
    if let Some(personality) = filter.personality_type {
        query = query.filter(profiles::personality_type.eq(personality));
    }
    if let Some(major) = filter.major.as_deref().filter(|m| !m.trim().is_empty()) {
        query = query.filter(profiles::major.ilike(like_pattern(major.trim())));
    }

    query
}

fn event_query(filter: &EventFilter) -> events::BoxedQuery<'static, Pg> {
    let mut query = events::table.into_boxed::<Pg>();

    if let Some(event_type) = filter.event_type {
        query = query.filter(events::event_type.eq(event_type));
    }
    if let Some(from) = filter.from {
        query = query.filter(events::starts_at.ge(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(events::starts_at.le(to));
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search.trim());
        query = query.filter(
            events::title
                .ilike(pattern.clone())
                .nullable()
                .or(events::description.ilike(pattern)),
        );
    }

    query
}

fn message_query(user_id: Uuid, with: Option<Uuid>) -> messages::BoxedQuery<'static, Pg> {
    let query = messages::table.into_boxed::<Pg>();
    match with {
        Some(partner_id) => query.filter(
            messages::sender_id
                .eq(user_id)
                .and(messages::receiver_id.eq(partner_id))
                .or(messages::sender_id.eq(partner_id).and(messages::receiver_id.eq(user_id))),
        ),
        None => query.filter(messages::sender_id.eq(user_id).or(messages::receiver_id.eq(user_id))),
    }
}

impl ProfileStore for PgStore {
    fn find_profile(&self, id: Uuid) -> AppResult<Option<Profile>> {
        let mut conn = self.conn()?;
        Ok(profiles::table.find(id).first::<Profile>(&mut conn).optional()?)
    }

    fn profile_with_interests(&self, id: Uuid) -> AppResult<Option<ProfileWithInterests>> {
        let mut conn = self.conn()?;
        let Some(profile) = profiles::table.find(id).first::<Profile>(&mut conn).optional()? else {
            return Ok(None);
        };
        Ok(with_interests(&mut conn, vec![profile])?.pop())
    }

    fn profiles_with_interests_except(&self, id: Uuid) -> AppResult<Vec<ProfileWithInterests>> {
        let mut conn = self.conn()?;
        let profiles = profiles::table
            .filter(profiles::id.ne(id))
            .order(profiles::created_at.asc())
            .load::<Profile>(&mut conn)?;
        Ok(with_interests(&mut conn, profiles)?)
    }

    fn profiles_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Profile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn()?;
        Ok(profiles::table
            .filter(profiles::id.eq_any(ids.to_vec()))
            .load::<Profile>(&mut conn)?)
    }

    fn search_profiles(&self, filter: &ProfileFilter, page: &PageParams) -> AppResult<(Vec<Profile>, i64)> {
        let mut conn = self.conn()?;

        // The catalogue is small; resolve names case-insensitively up front.
        let interest_ids = if filter.interests.is_empty() {
            None
        } else {
            let wanted: HashSet<String> = filter
                .interests
                .iter()
                .map(|name| name.trim().to_lowercase())
                .collect();
            let ids: Vec<Uuid> = interests::table
                .load::<Interest>(&mut conn)?
                .into_iter()
                .filter(|i| wanted.contains(&i.name.to_lowercase()))
                .map(|i| i.id)
                .collect();
            Some(ids)
        };

        let total = profile_query(filter, interest_ids.as_deref())
            .count()
            .get_result::<i64>(&mut conn)?;
        let items = profile_query(filter, interest_ids.as_deref())
            .order(profiles::created_at.desc())
            .limit(page.limit())
            .offset(page.offset())
            .load::<Profile>(&mut conn)?;

        Ok((items, total))
    }

    fn insert_profile(&self, profile: NewProfile) -> AppResult<Profile> {
        let mut conn = self.conn()?;
        diesel::insert_into(profiles::table)
            .values(&profile)
            .get_result::<Profile>(&mut conn)
            .map_err(|e| AppError::unique_or(e, ErrorCode::ProfileAlreadyExists, "profile or username already exists"))
    }

    fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> AppResult<Option<Profile>> {
        let mut conn = self.conn()?;
        diesel::update(profiles::table.find(id))
            .set((&changes, profiles::updated_at.eq(Utc::now())))
            .get_result::<Profile>(&mut conn)
            .optional()
            .map_err(|e| AppError::unique_or(e, ErrorCode::Conflict, "username already taken"))
    }

    fn delete_profile(&self, id: Uuid) -> AppResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(profiles::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn list_interests(&self) -> AppResult<Vec<Interest>> {
        let mut conn = self.conn()?;
        Ok(interests::table.order(interests::name.asc()).load::<Interest>(&mut conn)?)
    }

    fn interests_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Interest>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn()?;
        Ok(interests::table
            .filter(interests::id.eq_any(ids.to_vec()))
            .load::<Interest>(&mut conn)?)
    }

    fn interests_of(&self, profile_id: Uuid) -> AppResult<Vec<Interest>> {
        let mut conn = self.conn()?;
        Ok(profile_interests::table
            .inner_join(interests::table)
            .filter(profile_interests::profile_id.eq(profile_id))
            .select(interests::all_columns)
            .order(interests::name.asc())
            .load::<Interest>(&mut conn)?)
    }

    fn find_or_create_interest(&self, name: &str, category: Option<&str>) -> AppResult<Interest> {
        let mut conn = self.conn()?;
        let exact = like_literal(name);

        let existing = interests::table
            .filter(interests::name.ilike(exact.clone()))
            .first::<Interest>(&mut conn)
            .optional()?;
        if let Some(interest) = existing {
            return Ok(interest);
        }

        let inserted = diesel::insert_into(interests::table)
            .values(&NewInterest { name, category })
            .get_result::<Interest>(&mut conn);

        match inserted {
            Ok(interest) => {
                tracing::info!(interest_id = %interest.id, name = %interest.name, "interest created");
                Ok(interest)
            }
            // Lost a race with a concurrent insert of the same name.
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => Ok(interests::table
                .filter(interests::name.ilike(exact))
                .first::<Interest>(&mut conn)?),
            Err(e) => Err(e.into()),
        }
    }

    fn replace_profile_interests(&self, profile_id: Uuid, interest_ids: &[Uuid]) -> AppResult<()> {
        let mut conn = self.conn()?;
        conn.transaction::<_, DieselError, _>(|conn| {
            diesel::delete(profile_interests::table.filter(profile_interests::profile_id.eq(profile_id)))
                .execute(conn)?;

            let rows: Vec<_> = interest_ids
                .iter()
                .map(|interest_id| {
                    (
                        profile_interests::profile_id.eq(profile_id),
                        profile_interests::interest_id.eq(*interest_id),
                    )
                })
                .collect();
            if !rows.is_empty() {
                diesel::insert_into(profile_interests::table)
                    .values(rows)
                    .on_conflict_do_nothing()
                    .execute(conn)?;
            }
            Ok(())
        })?;
        Ok(())
    }

    fn attach_interest(&self, profile_id: Uuid, interest_id: Uuid) -> AppResult<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(profile_interests::table)
            .values((
                profile_interests::profile_id.eq(profile_id),
                profile_interests::interest_id.eq(interest_id),
            ))
            .execute(&mut conn)
            .map_err(|e| AppError::unique_or(e, ErrorCode::InterestAlreadyAdded, "interest already added"))?;
        Ok(())
    }

    fn detach_interest(&self, profile_id: Uuid, interest_id: Uuid) -> AppResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            profile_interests::table
                .filter(profile_interests::profile_id.eq(profile_id))
                .filter(profile_interests::interest_id.eq(interest_id)),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }
}

impl SocialStore for PgStore {
    fn find_connection(&self, id: Uuid) -> AppResult<Option<Connection>> {
        let mut conn = self.conn()?;
        Ok(connections::table.find(id).first::<Connection>(&mut conn).optional()?)
    }

    fn connection_for_pair(&self, pair: PairKey) -> AppResult<Option<Connection>> {
        let mut conn = self.conn()?;
        Ok(connections::table
            .filter(connections::user_low.eq(pair.low))
            .filter(connections::user_high.eq(pair.high))
            .first::<Connection>(&mut conn)
            .optional()?)
    }

    fn connections_involving(&self, user_id: Uuid, status: Option<ConnectionStatus>) -> AppResult<Vec<Connection>> {
        let mut conn = self.conn()?;
        let mut query = connections::table
            .filter(
                connections::requester_id
                    .eq(user_id)
                    .or(connections::receiver_id.eq(user_id)),
            )
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(connections::status.eq(status));
        }
        Ok(query
            .order(connections::created_at.desc())
            .load::<Connection>(&mut conn)?)
    }

    fn insert_connection(&self, connection: NewConnection) -> AppResult<Connection> {
        let mut conn = self.conn()?;
        diesel::insert_into(connections::table)
            .values(&connection)
            .get_result::<Connection>(&mut conn)
            .map_err(|e| {
                AppError::unique_or(
                    e,
                    ErrorCode::ConnectionAlreadyExists,
                    "a connection already exists between these users",
                )
            })
    }

    fn set_connection_status(&self, id: Uuid, status: ConnectionStatus) -> AppResult<Connection> {
        let mut conn = self.conn()?;
        Ok(diesel::update(connections::table.find(id))
            .set((connections::status.eq(status), connections::updated_at.eq(Utc::now())))
            .get_result::<Connection>(&mut conn)?)
    }

    fn delete_connection(&self, id: Uuid) -> AppResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(connections::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn blocks_involving(&self, user_id: Uuid) -> AppResult<Vec<Block>> {
        let mut conn = self.conn()?;
        Ok(blocks::table
            .filter(blocks::blocker_id.eq(user_id).or(blocks::blocked_id.eq(user_id)))
            .load::<Block>(&mut conn)?)
    }

    fn blocks_by(&self, blocker_id: Uuid) -> AppResult<Vec<Block>> {
        let mut conn = self.conn()?;
        Ok(blocks::table
            .filter(blocks::blocker_id.eq(blocker_id))
            .order(blocks::created_at.desc())
            .load::<Block>(&mut conn)?)
    }

    fn is_blocked(&self, pair: PairKey) -> AppResult<bool> {
        let mut conn = self.conn()?;
        Ok(diesel::select(exists(
            blocks::table
                .filter(blocks::user_low.eq(pair.low))
                .filter(blocks::user_high.eq(pair.high)),
        ))
        .get_result::<bool>(&mut conn)?)
    }

    fn insert_block(&self, block: NewBlock) -> AppResult<Block> {
        let mut conn = self.conn()?;
        diesel::insert_into(blocks::table)
            .values(&block)
            .get_result::<Block>(&mut conn)
            .map_err(|e| AppError::unique_or(e, ErrorCode::AlreadyBlocked, "user already blocked"))
    }

    fn delete_block(&self, blocker_id: Uuid, blocked_id: Uuid) -> AppResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            blocks::table
                .filter(blocks::blocker_id.eq(blocker_id))
                .filter(blocks::blocked_id.eq(blocked_id)),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn insert_report(&self, report: NewReport) -> AppResult<Report> {
        let mut conn = self.conn()?;
        Ok(diesel::insert_into(reports::table)
            .values(&report)
            .get_result::<Report>(&mut conn)?)
    }
}

impl MessageStore for PgStore {
    fn insert_message(&self, message: NewMessage) -> AppResult<Message> {
        let mut conn = self.conn()?;
        Ok(diesel::insert_into(messages::table)
            .values(&message)
            .get_result::<Message>(&mut conn)?)
    }

    fn messages_involving(
        &self,
        user_id: Uuid,
        with: Option<Uuid>,
        page: &PageParams,
    ) -> AppResult<(Vec<Message>, i64)> {
        let mut conn = self.conn()?;
        let total = message_query(user_id, with).count().get_result::<i64>(&mut conn)?;
        let items = message_query(user_id, with)
            .order(messages::created_at.desc())
            .limit(page.limit())
            .offset(page.offset())
            .load::<Message>(&mut conn)?;
        Ok((items, total))
    }

    fn message_history(&self, user_id: Uuid) -> AppResult<Vec<Message>> {
        let mut conn = self.conn()?;
        Ok(message_query(user_id, None)
            .order(messages::created_at.desc())
            .load::<Message>(&mut conn)?)
    }

    fn conversation(&self, user_id: Uuid, partner_id: Uuid) -> AppResult<Vec<Message>> {
        let mut conn = self.conn()?;
        Ok(message_query(user_id, Some(partner_id))
            .order(messages::created_at.asc())
            .load::<Message>(&mut conn)?)
    }

    fn find_message(&self, id: Uuid) -> AppResult<Option<Message>> {
        let mut conn = self.conn()?;
        Ok(messages::table.find(id).first::<Message>(&mut conn).optional()?)
    }

    fn mark_read(&self, id: Uuid) -> AppResult<Message> {
        let mut conn = self.conn()?;
        Ok(diesel::update(messages::table.find(id))
            .set(messages::is_read.eq(true))
            .get_result::<Message>(&mut conn)?)
    }

    fn delete_message(&self, id: Uuid) -> AppResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(messages::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn unread_count(&self, receiver_id: Uuid) -> AppResult<i64> {
        let mut conn = self.conn()?;
        Ok(messages::table
            .filter(messages::receiver_id.eq(receiver_id))
            .filter(messages::is_read.eq(false))
            .count()
            .get_result::<i64>(&mut conn)?)
    }
}

impl EventStore for PgStore {
    fn list_events(&self, filter: &EventFilter, page: &PageParams) -> AppResult<(Vec<Event>, i64)> {
        let mut conn = self.conn()?;
        let total = event_query(filter).count().get_result::<i64>(&mut conn)?;
        let items = event_query(filter)
            .order((events::starts_at.asc(), events::id.asc()))
            .limit(page.limit())
            .offset(page.offset())
            .load::<Event>(&mut conn)?;
        Ok((items, total))
    }

    fn find_event(&self, id: Uuid) -> AppResult<Option<Event>> {
        let mut conn = self.conn()?;
        Ok(events::table.find(id).first::<Event>(&mut conn).optional()?)
    }

    fn insert_event(&self, event: NewEvent) -> AppResult<Event> {
        let mut conn = self.conn()?;
        Ok(diesel::insert_into(events::table)
            .values(&event)
            .get_result::<Event>(&mut conn)?)
    }

    fn update_event(&self, id: Uuid, changes: EventChanges) -> AppResult<Event> {
        let mut conn = self.conn()?;
        Ok(diesel::update(events::table.find(id))
            .set((&changes, events::updated_at.eq(Utc::now())))
            .get_result::<Event>(&mut conn)?)
    }

    fn delete_event(&self, id: Uuid) -> AppResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(events::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn events_hosted_by(&self, host_id: Uuid) -> AppResult<Vec<Event>> {
        let mut conn = self.conn()?;
        Ok(events::table
            .filter(events::host_id.eq(host_id))
            .order(events::starts_at.asc())
            .load::<Event>(&mut conn)?)
    }

    fn find_attendance(&self, id: Uuid) -> AppResult<Option<Attendance>> {
        let mut conn = self.conn()?;
        Ok(attendances::table.find(id).first::<Attendance>(&mut conn).optional()?)
    }

    fn attendance_for(&self, profile_id: Uuid, event_id: Uuid) -> AppResult<Option<Attendance>> {
        let mut conn = self.conn()?;
        Ok(attendances::table
            .filter(attendances::profile_id.eq(profile_id))
            .filter(attendances::event_id.eq(event_id))
            .first::<Attendance>(&mut conn)
            .optional()?)
    }

    fn insert_attendance(&self, attendance: NewAttendance) -> AppResult<Attendance> {
        let mut conn = self.conn()?;
        diesel::insert_into(attendances::table)
            .values(&attendance)
            .get_result::<Attendance>(&mut conn)
            .map_err(|e| AppError::unique_or(e, ErrorCode::AlreadyCheckedIn, "already checked in to this event"))
    }

    fn check_out(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Attendance> {
        let mut conn = self.conn()?;
        Ok(diesel::update(attendances::table.find(id))
            .set(attendances::checked_out_at.eq(at))
            .get_result::<Attendance>(&mut conn)?)
    }

    fn update_attendance(&self, id: Uuid, changes: AttendanceChanges) -> AppResult<Attendance> {
        let mut conn = self.conn()?;
        if changes.is_empty() {
            return Ok(attendances::table.find(id).first::<Attendance>(&mut conn)?);
        }
        Ok(diesel::update(attendances::table.find(id))
            .set(&changes)
            .get_result::<Attendance>(&mut conn)?)
    }

    fn attendance_for_event(&self, event_id: Uuid) -> AppResult<Vec<Attendance>> {
        let mut conn = self.conn()?;
        Ok(attendances::table
            .filter(attendances::event_id.eq(event_id))
            .order(attendances::checked_in_at.asc())
            .load::<Attendance>(&mut conn)?)
    }

    fn attendance_with_events(&self, profile_id: Uuid) -> AppResult<Vec<AttendanceWithEvent>> {
        let mut conn = self.conn()?;
        let rows = attendances::table
            .inner_join(events::table)
            .filter(attendances::profile_id.eq(profile_id))
            .order(attendances::checked_in_at.desc())
            .select((attendances::all_columns, events::all_columns))
            .load::<(Attendance, Event)>(&mut conn)?;
        Ok(rows
            .into_iter()
            .map(|(attendance, event)| AttendanceWithEvent { attendance, event })
            .collect())
    }
}

impl Store for PgStore {
    fn ping(&self) -> AppResult<()> {
        let mut conn = self.conn()?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }
}
