use std::collections::HashSet;

use crate::models::{Interest, PersonalityType, ProfileWithInterests};

// -- Weights --
pub const POINTS_PER_SHARED_INTEREST: u32 = 10;
pub const MAX_INTEREST_POINTS: u32 = 50;
pub const SAME_PERSONALITY_POINTS: u32 = 30;
pub const AMBIVERT_BRIDGE_POINTS: u32 = 15;
pub const SAME_MAJOR_POINTS: u32 = 20;

pub const MAX_SCORE: u32 = MAX_INTEREST_POINTS + SAME_PERSONALITY_POINTS + SAME_MAJOR_POINTS;

/// How well a candidate fits the viewer, with the interests they share.
#[derive(Debug, Clone)]
pub struct Compatibility {
    pub score: u32,
    pub shared_interests: Vec<Interest>,
}

pub fn interest_overlap_points(shared: usize) -> u32 {
    let shared = u32::try_from(shared).unwrap_or(u32::MAX);
    shared.saturating_mul(POINTS_PER_SHARED_INTEREST).min(MAX_INTEREST_POINTS)
}

/// Equal types score full points; an ambivert pairs half-well with anyone.
pub fn personality_points(a: Option<PersonalityType>, b: Option<PersonalityType>) -> u32 {
    match (a, b) {
        (Some(a), Some(b)) if a == b => SAME_PERSONALITY_POINTS,
        (Some(PersonalityType::Ambivert), Some(_)) | (Some(_), Some(PersonalityType::Ambivert)) => {
            AMBIVERT_BRIDGE_POINTS
        }
        _ => 0,
    }
}

/// Exact, case-sensitive match on the stored strings. Profiles trim majors
/// on write, so no normalisation happens here. Empty majors count as unset.
pub fn major_points(a: Option<&str>, b: Option<&str>) -> u32 {
    match (a, b) {
        (Some(a), Some(b)) if !a.is_empty() && a == b => SAME_MAJOR_POINTS,
        _ => 0,
    }
}

pub fn score(viewer: &ProfileWithInterests, candidate: &ProfileWithInterests) -> Compatibility {
    let viewer_interests: HashSet<_> = viewer.interest_ids();
    let mut seen = HashSet::new();
    let shared_interests: Vec<Interest> = candidate
        .interests
        .iter()
        .filter(|i| viewer_interests.contains(&i.id) && seen.insert(i.id))
        .cloned()
        .collect();

    let score = interest_overlap_points(shared_interests.len())
        + personality_points(viewer.profile.personality_type, candidate.profile.personality_type)
        + major_points(viewer.profile.major.as_deref(), candidate.profile.major.as_deref());

    Compatibility { score, shared_interests }
}
