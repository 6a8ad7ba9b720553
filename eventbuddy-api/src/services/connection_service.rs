use std::collections::HashMap;

use metrics::counter;
use serde::Deserialize;
use uuid::Uuid;

use eventbuddy_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Connection, ConnectionStatus, ConnectionWithPeer, NewConnection, Profile};
use crate::social::connection::{check_request, check_response, check_unmatch};
use crate::social::{Decision, PairKey};
use crate::store::Store;

use super::{non_blank, require_profile};

#[derive(Debug, Deserialize)]
pub struct SendConnectionRequest {
    pub receiver_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RespondConnectionRequest {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListConnectionsQuery {
    pub status: Option<String>,
}

fn find_connection(store: &dyn Store, id: Uuid) -> AppResult<Connection> {
    store
        .find_connection(id)?
        .ok_or_else(|| AppError::new(ErrorCode::ConnectionNotFound, "connection not found"))
}

fn with_peers(store: &dyn Store, user_id: Uuid, connections: Vec<Connection>) -> AppResult<Vec<ConnectionWithPeer>> {
    let peer_ids: Vec<Uuid> = connections.iter().filter_map(|c| c.counterpart(user_id)).collect();
    let peers: HashMap<Uuid, Profile> = store
        .profiles_by_ids(&peer_ids)?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    Ok(connections
        .into_iter()
        .map(|connection| {
            let peer = connection
                .counterpart(user_id)
                .and_then(|id| peers.get(&id).cloned());
            ConnectionWithPeer { connection, peer }
        })
        .collect())
}

pub fn send_request(store: &dyn Store, requester_id: Uuid, receiver_id: Uuid) -> AppResult<Connection> {
    require_profile(store, requester_id)?;
    if requester_id != receiver_id {
        require_profile(store, receiver_id)?;
    }

    let pair = PairKey::new(requester_id, receiver_id);
    let existing = store.connection_for_pair(pair)?;
    let blocked = store.is_blocked(pair)?;
    check_request(requester_id, receiver_id, existing.as_ref(), blocked)?;

    let connection = store.insert_connection(NewConnection {
        requester_id,
        receiver_id,
        user_low: pair.low,
        user_high: pair.high,
        status: ConnectionStatus::Pending,
    })?;

    counter!("connection_requests_total").increment(1);
    tracing::info!(
        connection_id = %connection.id,
        requester_id = %requester_id,
        receiver_id = %receiver_id,
        "connection requested"
    );

    Ok(connection)
}

pub fn respond(
    store: &dyn Store,
    connection_id: Uuid,
    responder_id: Uuid,
    req: RespondConnectionRequest,
) -> AppResult<Connection> {
    let decision = Decision::parse(&req.status)?;
    let connection = find_connection(store, connection_id)?;
    check_response(&connection, responder_id)?;

    let updated = store.set_connection_status(connection.id, decision.status())?;
    tracing::info!(
        connection_id = %updated.id,
        status = %updated.status,
        "connection request answered"
    );

    Ok(updated)
}

/// Unmatch. Either side may remove the record.
pub fn delete(store: &dyn Store, connection_id: Uuid, user_id: Uuid) -> AppResult<()> {
    let connection = find_connection(store, connection_id)?;
    check_unmatch(&connection, user_id)?;

    store.delete_connection(connection.id)?;
    tracing::info!(connection_id = %connection.id, user_id = %user_id, "connection removed");
    Ok(())
}

pub fn list(store: &dyn Store, user_id: Uuid, query: ListConnectionsQuery) -> AppResult<Vec<ConnectionWithPeer>> {
    let status = non_blank(query.status.as_deref())
        .map(|s| {
            s.parse::<ConnectionStatus>().map_err(|_| {
                AppError::Validation("status must be one of pending, accepted, rejected".into())
            })
        })
        .transpose()?;

    let connections = store.connections_involving(user_id, status)?;
    with_peers(store, user_id, connections)
}

pub fn pending_received(store: &dyn Store, user_id: Uuid) -> AppResult<Vec<ConnectionWithPeer>> {
    let connections = store
        .connections_involving(user_id, Some(ConnectionStatus::Pending))?
        .into_iter()
        .filter(|c| c.receiver_id == user_id)
        .collect();
    with_peers(store, user_id, connections)
}

pub fn pending_sent(store: &dyn Store, user_id: Uuid) -> AppResult<Vec<ConnectionWithPeer>> {
    let connections = store
        .connections_involving(user_id, Some(ConnectionStatus::Pending))?
        .into_iter()
        .filter(|c| c.requester_id == user_id)
        .collect();
    with_peers(store, user_id, connections)
}
