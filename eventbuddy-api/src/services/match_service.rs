use metrics::counter;
use uuid::Uuid;

use eventbuddy_shared::errors::{AppError, AppResult, ErrorCode};

use crate::matching::{self, MatchSuggestion};
use crate::store::Store;

/// Top suggestions for the viewer. A viewer without a profile gets
/// `ProfileNotFound` rather than a made-up default.
pub fn suggestions(store: &dyn Store, viewer_id: Uuid) -> AppResult<Vec<MatchSuggestion>> {
    let viewer = store
        .profile_with_interests(viewer_id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "create a profile to get suggestions"))?;

    let blocks = store.blocks_involving(viewer_id)?;
    let connections = store.connections_involving(viewer_id, None)?;
    let excluded = matching::excluded_ids(viewer_id, &blocks, &connections);

    let candidates = store.profiles_with_interests_except(viewer_id)?;
    let candidate_count = candidates.len();
    let ranked = matching::rank_candidates(&viewer, candidates, &excluded);

    counter!("match_suggestions_served_total").increment(1);
    tracing::debug!(
        viewer_id = %viewer_id,
        candidates = candidate_count,
        excluded = excluded.len(),
        returned = ranked.len(),
        "match suggestions ranked"
    );

    Ok(ranked)
}
