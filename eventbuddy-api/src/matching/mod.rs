//! Buddy matching: pure scoring and ranking over already-loaded profiles.

pub mod ranking;
pub mod scoring;

pub use ranking::{excluded_ids, rank_candidates, MatchSuggestion, MAX_SUGGESTIONS};
pub use scoring::{score, Compatibility};
