use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::models::{Block, Connection, Interest, ProfileWithInterests};

use super::scoring;

pub const MAX_SUGGESTIONS: usize = 10;

#[derive(Debug, Serialize)]
pub struct MatchSuggestion {
    #[serde(flatten)]
    pub profile: ProfileWithInterests,
    pub match_score: u32,
    pub shared_interests: Vec<Interest>,
}

/// Everyone the viewer must not be offered: both sides of any block, and
/// anyone with a connection record in any status.
pub fn excluded_ids(viewer_id: Uuid, blocks: &[Block], connections: &[Connection]) -> HashSet<Uuid> {
    let blocked = blocks.iter().filter_map(|b| {
        if b.blocker_id == viewer_id {
            Some(b.blocked_id)
        } else if b.blocked_id == viewer_id {
            Some(b.blocker_id)
        } else {
            None
        }
    });
    let connected = connections.iter().filter_map(|c| c.counterpart(viewer_id));
    blocked.chain(connected).collect()
}

/// Scores every eligible candidate and keeps the best `MAX_SUGGESTIONS`.
/// Ties keep the order the candidates came in.
pub fn rank_candidates(
    viewer: &ProfileWithInterests,
    candidates: Vec<ProfileWithInterests>,
    excluded: &HashSet<Uuid>,
) -> Vec<MatchSuggestion> {
    let mut suggestions: Vec<MatchSuggestion> = candidates
        .into_iter()
        .filter(|c| c.id() != viewer.id() && !excluded.contains(&c.id()))
        .map(|candidate| {
            let compat = scoring::score(viewer, &candidate);
            MatchSuggestion {
                profile: candidate,
                match_score: compat.score,
                shared_interests: compat.shared_interests,
            }
        })
        .collect();

    suggestions.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}
