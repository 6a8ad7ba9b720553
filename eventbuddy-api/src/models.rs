use std::collections::HashSet;

use chrono::{DateTime, Utc};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{
    attendances, blocks, connections, events, interests, messages, profiles, reports,
};
use crate::social::PairKey;

/// Wires a fieldless enum to a Postgres text column through its canonical
/// string form.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("unknown {} value: {s}", stringify!($name))),
                }
            }
        }

        impl ToSql<Text, Pg> for $name {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                <str as ToSql<Text, Pg>>::to_sql(self.as_str(), out)
            }
        }

        impl FromSql<Text, Pg> for $name {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                let raw = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
                raw.parse::<$name>().map_err(Into::into)
            }
        }
    };
}

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum PersonalityType {
    Introvert,
    Extrovert,
    Ambivert,
}

text_enum!(PersonalityType {
    Introvert => "introvert",
    Extrovert => "extrovert",
    Ambivert => "ambivert",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum ClassYear {
    Freshman,
    Sophomore,
    Junior,
    Senior,
    Graduate,
}

text_enum!(ClassYear {
    Freshman => "Freshman",
    Sophomore => "Sophomore",
    Junior => "Junior",
    Senior => "Senior",
    Graduate => "Graduate",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Rejected,
}

text_enum!(ConnectionStatus {
    Pending => "pending",
    Accepted => "accepted",
    Rejected => "rejected",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum EventType {
    Event,
    #[serde(rename = "Club Meeting")]
    ClubMeeting,
    Fair,
}

text_enum!(EventType {
    Event => "Event",
    ClubMeeting => "Club Meeting",
    Fair => "Fair",
});

// --- Profile ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: Uuid,
    pub email: Option<String>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub personality_type: Option<PersonalityType>,
    pub major: Option<String>,
    pub class_year: Option<ClassYear>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub id: Uuid,
    pub email: Option<String>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub personality_type: Option<PersonalityType>,
    pub major: Option<String>,
    pub class_year: Option<ClassYear>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, AsChangeset, Default, Clone)]
#[diesel(table_name = profiles)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub personality_type: Option<PersonalityType>,
    pub major: Option<String>,
    pub class_year: Option<ClassYear>,
}

// --- Interest ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone, PartialEq, Eq)]
#[diesel(table_name = interests)]
pub struct Interest {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = interests)]
pub struct NewInterest<'a> {
    pub name: &'a str,
    pub category: Option<&'a str>,
}

/// A profile together with its interests, the shape used by matching.
#[derive(Debug, Serialize, Clone)]
pub struct ProfileWithInterests {
    #[serde(flatten)]
    pub profile: Profile,
    pub interests: Vec<Interest>,
}

impl ProfileWithInterests {
    pub fn id(&self) -> Uuid {
        self.profile.id
    }

    pub fn interest_ids(&self) -> HashSet<Uuid> {
        self.interests.iter().map(|i| i.id).collect()
    }
}

// --- Connection ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = connections)]
pub struct Connection {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub receiver_id: Uuid,
    #[serde(skip)]
    pub user_low: Uuid,
    #[serde(skip)]
    pub user_high: Uuid,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Connection {
    pub fn pair(&self) -> PairKey {
        PairKey::new(self.requester_id, self.receiver_id)
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.pair().contains(user_id)
    }

    /// The other party, if `user_id` is one of the two.
    pub fn counterpart(&self, user_id: Uuid) -> Option<Uuid> {
        self.pair().other(user_id)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = connections)]
pub struct NewConnection {
    pub requester_id: Uuid,
    pub receiver_id: Uuid,
    pub user_low: Uuid,
    pub user_high: Uuid,
    pub status: ConnectionStatus,
}

/// A connection plus the profile on the other side of it.
#[derive(Debug, Serialize)]
pub struct ConnectionWithPeer {
    #[serde(flatten)]
    pub connection: Connection,
    pub peer: Option<Profile>,
}

// --- Block ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = blocks)]
pub struct Block {
    pub id: Uuid,
    pub blocker_id: Uuid,
    pub blocked_id: Uuid,
    #[serde(skip)]
    pub user_low: Uuid,
    #[serde(skip)]
    pub user_high: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = blocks)]
pub struct NewBlock {
    pub blocker_id: Uuid,
    pub blocked_id: Uuid,
    pub user_low: Uuid,
    pub user_high: Uuid,
}

// --- Report ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = reports)]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub reported_id: Uuid,
    pub report_type: String,
    pub reason: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reports)]
pub struct NewReport {
    pub reporter_id: Uuid,
    pub reported_id: Uuid,
    pub report_type: String,
    pub reason: String,
    pub description: Option<String>,
}

// --- Message ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = messages)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
}

// --- Event ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = events)]
pub struct Event {
    pub id: Uuid,
    pub host_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub event_type: EventType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = events)]
pub struct NewEvent {
    pub host_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub event_type: EventType,
}

#[derive(Debug, AsChangeset, Default, Clone)]
#[diesel(table_name = events)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub event_type: Option<EventType>,
}

// --- Attendance ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = attendances)]
pub struct Attendance {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub event_id: Uuid,
    pub checked_in_at: DateTime<Utc>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub rating: Option<i16>,
    pub reflection: Option<String>,
    pub companions: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = attendances)]
pub struct NewAttendance {
    pub profile_id: Uuid,
    pub event_id: Uuid,
    pub checked_in_at: DateTime<Utc>,
}

#[derive(Debug, AsChangeset, Default, Clone)]
#[diesel(table_name = attendances)]
pub struct AttendanceChanges {
    pub rating: Option<i16>,
    pub reflection: Option<String>,
    pub companions: Option<String>,
}

impl AttendanceChanges {
    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.reflection.is_none() && self.companions.is_none()
    }
}

#[derive(Debug, Serialize)]
pub struct AttendanceWithEvent {
    #[serde(flatten)]
    pub attendance: Attendance,
    pub event: Event,
}
