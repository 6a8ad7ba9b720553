use std::collections::HashMap;

use metrics::counter;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use eventbuddy_shared::errors::{AppError, AppResult, ErrorCode};
use eventbuddy_shared::types::pagination::Paginated;

use crate::models::{Message, NewMessage, Profile};
use crate::social::connection::check_message_gate;
use crate::social::PairKey;
use crate::store::Store;

use super::{page_params, require_profile};

pub const MAX_MESSAGE_CHARS: usize = 4000;

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub receiver_id: Uuid,
    #[validate(length(max = 4000))]
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListMessagesQuery {
    pub conversation_with: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ConversationSummary {
    pub partner_id: Uuid,
    pub partner: Option<Profile>,
    pub last_message: Message,
    pub unread_count: i64,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

/// The gate is evaluated here, at send time, against the current
/// connection and block rows.
pub fn send(store: &dyn Store, sender_id: Uuid, req: SendMessageRequest) -> AppResult<Message> {
    req.validate()?;
    if req.content.trim().is_empty() {
        return Err(AppError::Validation("message content cannot be empty".into()));
    }
    if sender_id == req.receiver_id {
        return Err(AppError::new(ErrorCode::CannotMessageSelf, "cannot message yourself"));
    }
    require_profile(store, sender_id)?;
    require_profile(store, req.receiver_id)?;

    let pair = PairKey::new(sender_id, req.receiver_id);
    let connection = store.connection_for_pair(pair)?;
    let blocked = store.is_blocked(pair)?;
    check_message_gate(connection.as_ref(), blocked)?;

    let message = store.insert_message(NewMessage {
        sender_id,
        receiver_id: req.receiver_id,
        content: req.content,
    })?;

    counter!("messages_sent_total").increment(1);
    tracing::info!(
        message_id = %message.id,
        sender_id = %sender_id,
        receiver_id = %message.receiver_id,
        "message sent"
    );

    Ok(message)
}

pub fn list(store: &dyn Store, user_id: Uuid, query: ListMessagesQuery) -> AppResult<Paginated<Message>> {
    let params = page_params(query.limit, query.offset);
    let (items, total) = store.messages_involving(user_id, query.conversation_with, &params)?;
    Ok(Paginated::new(items, total, &params))
}

/// One entry per partner, most recent conversation first.
pub fn conversations(store: &dyn Store, user_id: Uuid) -> AppResult<Vec<ConversationSummary>> {
    let history = store.message_history(user_id)?;

    let mut order: Vec<Uuid> = Vec::new();
    let mut latest: HashMap<Uuid, Message> = HashMap::new();
    let mut unread: HashMap<Uuid, i64> = HashMap::new();

    for message in history {
        let partner_id = if message.sender_id == user_id {
            message.receiver_id
        } else {
            message.sender_id
        };
        if message.receiver_id == user_id && !message.is_read {
            *unread.entry(partner_id).or_default() += 1;
        }
        if !latest.contains_key(&partner_id) {
            order.push(partner_id);
            latest.insert(partner_id, message);
        }
    }

    let mut partners: HashMap<Uuid, Profile> = store
        .profiles_by_ids(&order)?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    Ok(order
        .into_iter()
        .filter_map(|partner_id| {
            latest.remove(&partner_id).map(|last_message| ConversationSummary {
                partner_id,
                partner: partners.remove(&partner_id),
                last_message,
                unread_count: unread.get(&partner_id).copied().unwrap_or(0),
            })
        })
        .collect())
}

pub fn conversation(store: &dyn Store, user_id: Uuid, partner_id: Uuid) -> AppResult<Vec<Message>> {
    store.conversation(user_id, partner_id)
}

/// Only the receiver can mark a message read; anyone else sees 404.
pub fn mark_read(store: &dyn Store, user_id: Uuid, message_id: Uuid) -> AppResult<Message> {
    let message = store
        .find_message(message_id)?
        .filter(|m| m.receiver_id == user_id)
        .ok_or_else(|| AppError::new(ErrorCode::MessageNotFound, "message not found"))?;

    if message.is_read {
        return Ok(message);
    }
    store.mark_read(message.id)
}

pub fn delete(store: &dyn Store, user_id: Uuid, message_id: Uuid) -> AppResult<()> {
    let message = store
        .find_message(message_id)?
        .ok_or_else(|| AppError::new(ErrorCode::MessageNotFound, "message not found"))?;
    if message.sender_id != user_id {
        return Err(AppError::new(ErrorCode::NotMessageSender, "only the sender can delete a message"));
    }

    store.delete_message(message.id)?;
    tracing::info!(message_id = %message.id, "message deleted");
    Ok(())
}

pub fn unread_count(store: &dyn Store, user_id: Uuid) -> AppResult<UnreadCount> {
    Ok(UnreadCount {
        count: store.unread_count(user_id)?,
    })
}
