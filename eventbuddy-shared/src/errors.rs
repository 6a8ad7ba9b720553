use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Profile and interest errors
/// - E2xxx: Connection, block and report errors
/// - E3xxx: Messaging errors
/// - E4xxx: Event and attendance errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    Conflict,
    RateLimited,
    TokenExpired,
    TokenInvalid,

    // Profile (E1xxx)
    ProfileNotFound,
    ProfileAlreadyExists,
    InterestNotFound,
    InterestAlreadyAdded,
    InvalidPersonalityType,
    InvalidClassYear,

    // Social (E2xxx)
    ConnectionNotFound,
    ConnectionAlreadyExists,
    CannotConnectSelf,
    NotConnectionReceiver,
    NotConnectionMember,
    ConnectionNotPending,
    InvalidConnectionDecision,
    UserBlocked,
    CannotBlockSelf,
    AlreadyBlocked,
    BlockNotFound,
    CannotReportSelf,

    // Messaging (E3xxx)
    NotConnected,
    CannotMessageSelf,
    MessageNotFound,
    NotMessageSender,

    // Events (E4xxx)
    EventNotFound,
    NotEventHost,
    InvalidEventType,
    AlreadyCheckedIn,
    AttendanceNotFound,
    NotAttendanceOwner,
    InvalidRating,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::Conflict => "E0006",
            Self::RateLimited => "E0007",
            Self::TokenExpired => "E0008",
            Self::TokenInvalid => "E0009",

            // Profile
            Self::ProfileNotFound => "E1001",
            Self::ProfileAlreadyExists => "E1002",
            Self::InterestNotFound => "E1003",
            Self::InterestAlreadyAdded => "E1004",
            Self::InvalidPersonalityType => "E1005",
            Self::InvalidClassYear => "E1006",

            // Social
            Self::ConnectionNotFound => "E2001",
            Self::ConnectionAlreadyExists => "E2002",
            Self::CannotConnectSelf => "E2003",
            Self::NotConnectionReceiver => "E2004",
            Self::NotConnectionMember => "E2005",
            Self::ConnectionNotPending => "E2006",
            Self::InvalidConnectionDecision => "E2007",
            Self::UserBlocked => "E2008",
            Self::CannotBlockSelf => "E2009",
            Self::AlreadyBlocked => "E2010",
            Self::BlockNotFound => "E2011",
            Self::CannotReportSelf => "E2012",

            // Messaging
            Self::NotConnected => "E3001",
            Self::CannotMessageSelf => "E3002",
            Self::MessageNotFound => "E3003",
            Self::NotMessageSender => "E3004",

            // Events
            Self::EventNotFound => "E4001",
            Self::NotEventHost => "E4002",
            Self::InvalidEventType => "E4003",
            Self::AlreadyCheckedIn => "E4004",
            Self::AttendanceNotFound => "E4005",
            Self::NotAttendanceOwner => "E4006",
            Self::InvalidRating => "E4007",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::InvalidPersonalityType | Self::InvalidClassYear
            | Self::InvalidConnectionDecision | Self::InvalidEventType
            | Self::InvalidRating => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::ProfileNotFound | Self::InterestNotFound
            | Self::ConnectionNotFound | Self::BlockNotFound | Self::MessageNotFound
            | Self::EventNotFound | Self::AttendanceNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::TokenExpired | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::NotConnectionReceiver | Self::NotConnectionMember
            | Self::UserBlocked | Self::NotConnected | Self::NotMessageSender
            | Self::NotEventHost | Self::NotAttendanceOwner => StatusCode::FORBIDDEN,
            Self::Conflict | Self::ProfileAlreadyExists | Self::InterestAlreadyAdded
            | Self::ConnectionAlreadyExists | Self::CannotConnectSelf
            | Self::ConnectionNotPending | Self::CannotBlockSelf | Self::AlreadyBlocked
            | Self::CannotReportSelf | Self::CannotMessageSelf
            | Self::AlreadyCheckedIn => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] DieselError),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Maps a unique-constraint violation to `code`; anything else stays a
    /// database error.
    pub fn unique_or(err: DieselError, code: ErrorCode, message: impl Into<String>) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => Self::new(code, message),
            other => Self::Database(other),
        }
    }

    /// The code reported to the client for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Known { code, .. } => *code,
            AppError::Internal(_) => ErrorCode::InternalError,
            AppError::Database(DieselError::NotFound) => ErrorCode::NotFound,
            AppError::Database(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                ErrorCode::Conflict
            }
            AppError::Database(_) => ErrorCode::InternalError,
            AppError::Validation(_) => ErrorCode::ValidationError,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new(ErrorCode::InternalError.code(), "internal server error"),
                )
            }
            AppError::Database(err) => match err {
                DieselError::NotFound => (
                    StatusCode::NOT_FOUND,
                    ApiErrorResponse::new(ErrorCode::NotFound.code(), "resource not found"),
                ),
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => (
                    StatusCode::CONFLICT,
                    ApiErrorResponse::new(ErrorCode::Conflict.code(), "resource already exists"),
                ),
                _ => {
                    tracing::error!(error = %err, "database error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new(ErrorCode::InternalError.code(), "database error"),
                    )
                }
            },
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new(ErrorCode::ValidationError.code(), msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
