use uuid::Uuid;

use eventbuddy_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Connection, ConnectionStatus};

use super::PairKey;

/// The receiver's answer to a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "accepted" => Ok(Self::Accept),
            "rejected" => Ok(Self::Reject),
            other => Err(AppError::new(
                ErrorCode::InvalidConnectionDecision,
                format!("status must be \"accepted\" or \"rejected\", got \"{other}\""),
            )),
        }
    }

    pub fn status(self) -> ConnectionStatus {
        match self {
            Self::Accept => ConnectionStatus::Accepted,
            Self::Reject => ConnectionStatus::Rejected,
        }
    }
}

/// A new request needs two distinct profiles, no record for the pair in
/// any status, and no block in either direction.
pub fn check_request(
    requester_id: Uuid,
    receiver_id: Uuid,
    existing: Option<&Connection>,
    blocked: bool,
) -> AppResult<()> {
    if PairKey::new(requester_id, receiver_id).is_degenerate() {
        return Err(AppError::new(ErrorCode::CannotConnectSelf, "cannot connect with yourself"));
    }
    if let Some(existing) = existing {
        return Err(AppError::with_details(
            ErrorCode::ConnectionAlreadyExists,
            "a connection already exists between these users",
            serde_json::json!({ "connection_id": existing.id, "status": existing.status }),
        ));
    }
    if blocked {
        return Err(AppError::new(ErrorCode::UserBlocked, "cannot connect with this user"));
    }
    Ok(())
}

/// Only the receiver of a pending request may decide it.
pub fn check_response(connection: &Connection, responder_id: Uuid) -> AppResult<()> {
    if connection.receiver_id != responder_id {
        return Err(AppError::new(
            ErrorCode::NotConnectionReceiver,
            "only the receiver can respond to a connection request",
        ));
    }
    if connection.status != ConnectionStatus::Pending {
        return Err(AppError::new(
            ErrorCode::ConnectionNotPending,
            format!("connection is already {}", connection.status),
        ));
    }
    Ok(())
}

pub fn check_unmatch(connection: &Connection, user_id: Uuid) -> AppResult<()> {
    if !connection.involves(user_id) {
        return Err(AppError::new(
            ErrorCode::NotConnectionMember,
            "you are not part of this connection",
        ));
    }
    Ok(())
}

/// Messages flow only over an accepted connection with no block either way.
pub fn check_message_gate(connection: Option<&Connection>, blocked: bool) -> AppResult<()> {
    if blocked {
        return Err(AppError::new(ErrorCode::UserBlocked, "cannot message this user"));
    }
    match connection {
        Some(c) if c.status == ConnectionStatus::Accepted => Ok(()),
        _ => Err(AppError::new(
            ErrorCode::NotConnected,
            "you can only message accepted connections",
        )),
    }
}
