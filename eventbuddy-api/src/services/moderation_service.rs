use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use eventbuddy_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Block, NewBlock, NewReport, Report};
use crate::social::PairKey;
use crate::store::Store;

use super::{non_blank, require_profile};

pub const USER_REPORT_TYPE: &str = "user";

#[derive(Debug, Deserialize, Validate)]
pub struct ReportUserRequest {
    #[validate(length(max = 200))]
    pub reason: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// Blocking leaves any connection row in place; the block alone keeps the
/// pair out of suggestions, requests and messaging.
pub fn block(store: &dyn Store, blocker_id: Uuid, blocked_id: Uuid) -> AppResult<Block> {
    if blocker_id == blocked_id {
        return Err(AppError::new(ErrorCode::CannotBlockSelf, "cannot block yourself"));
    }
    require_profile(store, blocker_id)?;
    require_profile(store, blocked_id)?;

    let pair = PairKey::new(blocker_id, blocked_id);
    let block = store.insert_block(NewBlock {
        blocker_id,
        blocked_id,
        user_low: pair.low,
        user_high: pair.high,
    })?;

    tracing::info!(blocker_id = %blocker_id, blocked_id = %blocked_id, "user blocked");
    Ok(block)
}

pub fn unblock(store: &dyn Store, blocker_id: Uuid, blocked_id: Uuid) -> AppResult<()> {
    if !store.delete_block(blocker_id, blocked_id)? {
        return Err(AppError::new(ErrorCode::BlockNotFound, "no block for this user"));
    }
    tracing::info!(blocker_id = %blocker_id, blocked_id = %blocked_id, "user unblocked");
    Ok(())
}

pub fn list_blocks(store: &dyn Store, blocker_id: Uuid) -> AppResult<Vec<Block>> {
    store.blocks_by(blocker_id)
}

pub fn report(store: &dyn Store, reporter_id: Uuid, reported_id: Uuid, req: ReportUserRequest) -> AppResult<Report> {
    req.validate()?;
    if reporter_id == reported_id {
        return Err(AppError::new(ErrorCode::CannotReportSelf, "cannot report yourself"));
    }
    let reason = non_blank(Some(req.reason.as_str()))
        .ok_or_else(|| AppError::Validation("reason is required".into()))?
        .to_string();
    require_profile(store, reporter_id)?;
    require_profile(store, reported_id)?;

    let report = store.insert_report(NewReport {
        reporter_id,
        reported_id,
        report_type: USER_REPORT_TYPE.to_string(),
        reason,
        description: non_blank(req.description.as_deref()).map(str::to_string),
    })?;

    tracing::warn!(
        report_id = %report.id,
        reporter_id = %reporter_id,
        reported_id = %reported_id,
        "user reported"
    );
    Ok(report)
}
