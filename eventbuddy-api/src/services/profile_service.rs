use std::collections::HashSet;

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use eventbuddy_shared::errors::{AppError, AppResult, ErrorCode};
use eventbuddy_shared::types::auth::AuthUser;
use eventbuddy_shared::types::pagination::Paginated;

use crate::models::{ClassYear, Interest, NewProfile, PersonalityType, Profile, ProfileChanges, ProfileWithInterests};
use crate::store::{ProfileFilter, Store};

use super::{non_blank, page_params, require_profile};

// --- Requests ---

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateProfileRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 3, max = 30))]
    pub username: Option<String>,
    #[validate(length(max = 100))]
    pub full_name: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    pub personality_type: Option<String>,
    #[validate(length(max = 100))]
    pub major: Option<String>,
    pub class_year: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 30))]
    pub username: Option<String>,
    #[validate(length(max = 100))]
    pub full_name: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    pub personality_type: Option<String>,
    #[validate(length(max = 100))]
    pub major: Option<String>,
    pub class_year: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchProfilesQuery {
    pub search: Option<String>,
    /// Comma separated interest names.
    pub interests: Option<String>,
    pub personality_type: Option<String>,
    pub major: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceInterestsRequest {
    pub interest_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddInterestRequest {
    #[validate(length(max = 50))]
    pub name: String,
    #[validate(length(max = 50))]
    pub category: Option<String>,
}

fn parse_personality(value: Option<&str>) -> AppResult<Option<PersonalityType>> {
    non_blank(value)
        .map(|v| {
            v.parse::<PersonalityType>().map_err(|_| {
                AppError::new(
                    ErrorCode::InvalidPersonalityType,
                    "personality_type must be one of introvert, extrovert, ambivert",
                )
            })
        })
        .transpose()
}

fn parse_class_year(value: Option<&str>) -> AppResult<Option<ClassYear>> {
    non_blank(value)
        .map(|v| {
            v.parse::<ClassYear>().map_err(|_| {
                AppError::new(
                    ErrorCode::InvalidClassYear,
                    "class_year must be one of Freshman, Sophomore, Junior, Senior, Graduate",
                )
            })
        })
        .transpose()
}

// --- Profiles ---

/// The profile id is the identity-provider user id.
pub fn create_profile(store: &dyn Store, user: &AuthUser, req: CreateProfileRequest) -> AppResult<ProfileWithInterests> {
    req.validate()?;

    let new_profile = NewProfile {
        id: user.id,
        email: req.email.or_else(|| user.email.clone()),
        username: non_blank(req.username.as_deref()).map(str::to_string),
        full_name: req.full_name,
        avatar_url: req.avatar_url,
        bio: req.bio,
        personality_type: parse_personality(req.personality_type.as_deref())?,
        major: non_blank(req.major.as_deref()).map(str::to_string),
        class_year: parse_class_year(req.class_year.as_deref())?,
    };

    let profile = store.insert_profile(new_profile)?;
    tracing::info!(profile_id = %profile.id, "profile created");

    Ok(ProfileWithInterests {
        profile,
        interests: Vec::new(),
    })
}

pub fn get_profile(store: &dyn Store, id: Uuid) -> AppResult<ProfileWithInterests> {
    store
        .profile_with_interests(id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
}

pub fn update_profile(store: &dyn Store, user_id: Uuid, req: UpdateProfileRequest) -> AppResult<ProfileWithInterests> {
    req.validate()?;

    let changes = ProfileChanges {
        username: non_blank(req.username.as_deref()).map(str::to_string),
        full_name: req.full_name,
        avatar_url: req.avatar_url,
        bio: req.bio,
        personality_type: parse_personality(req.personality_type.as_deref())?,
        major: req.major.map(|m| m.trim().to_string()),
        class_year: parse_class_year(req.class_year.as_deref())?,
    };

    store
        .update_profile(user_id, changes)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;
    tracing::info!(profile_id = %user_id, "profile updated");

    get_profile(store, user_id)
}

pub fn delete_profile(store: &dyn Store, user_id: Uuid) -> AppResult<()> {
    if !store.delete_profile(user_id)? {
        return Err(AppError::new(ErrorCode::ProfileNotFound, "profile not found"));
    }
    tracing::info!(profile_id = %user_id, "profile deleted");
    Ok(())
}

pub fn search_profiles(store: &dyn Store, query: SearchProfilesQuery) -> AppResult<Paginated<Profile>> {
    let filter = ProfileFilter {
        search: non_blank(query.search.as_deref()).map(str::to_string),
        interests: query
            .interests
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
        personality_type: parse_personality(query.personality_type.as_deref())?,
        major: non_blank(query.major.as_deref()).map(str::to_string),
    };
    let params = page_params(query.limit, query.offset);

    let (items, total) = store.search_profiles(&filter, &params)?;
    Ok(Paginated::new(items, total, &params))
}

// --- Interests ---

pub fn list_interests(store: &dyn Store) -> AppResult<Vec<Interest>> {
    store.list_interests()
}

pub fn profile_interests(store: &dyn Store, profile_id: Uuid) -> AppResult<Vec<Interest>> {
    require_profile(store, profile_id)?;
    store.interests_of(profile_id)
}

/// Replaces the caller's interest set. Every id must exist.
pub fn replace_interests(store: &dyn Store, user_id: Uuid, req: ReplaceInterestsRequest) -> AppResult<Vec<Interest>> {
    require_profile(store, user_id)?;

    let mut seen = HashSet::new();
    let ids: Vec<Uuid> = req.interest_ids.into_iter().filter(|id| seen.insert(*id)).collect();

    let known: HashSet<Uuid> = store.interests_by_ids(&ids)?.into_iter().map(|i| i.id).collect();
    let unknown: Vec<Uuid> = ids.iter().copied().filter(|id| !known.contains(id)).collect();
    if !unknown.is_empty() {
        return Err(AppError::with_details(
            ErrorCode::ValidationError,
            "unknown interest ids",
            serde_json::json!({ "unknown_ids": unknown }),
        ));
    }

    store.replace_profile_interests(user_id, &ids)?;
    tracing::info!(profile_id = %user_id, count = ids.len(), "profile interests replaced");

    store.interests_of(user_id)
}

/// Attaches an interest by name, creating it in the catalogue if needed.
pub fn add_interest(store: &dyn Store, user_id: Uuid, req: AddInterestRequest) -> AppResult<Interest> {
    req.validate()?;
    let name = non_blank(Some(req.name.as_str()))
        .ok_or_else(|| AppError::Validation("interest name cannot be empty".into()))?;
    require_profile(store, user_id)?;

    let interest = store.find_or_create_interest(name, non_blank(req.category.as_deref()))?;
    store.attach_interest(user_id, interest.id)?;
    tracing::info!(profile_id = %user_id, interest_id = %interest.id, "interest added");

    Ok(interest)
}

pub fn remove_interest(store: &dyn Store, user_id: Uuid, interest_id: Uuid) -> AppResult<()> {
    if !store.detach_interest(user_id, interest_id)? {
        return Err(AppError::new(ErrorCode::InterestNotFound, "interest not on this profile"));
    }
    tracing::info!(profile_id = %user_id, interest_id = %interest_id, "interest removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{seed_profile, seed_profile_with};
    use crate::store::memory::MemoryStore;
    use crate::store::ProfileStore;

    fn caller() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: Some("sam@campus.edu".into()),
        }
    }

    #[test]
    fn create_uses_token_identity() {
        let store = MemoryStore::new();
        let user = caller();
        let req = CreateProfileRequest {
            username: Some("sam".into()),
            personality_type: Some("ambivert".into()),
            class_year: Some("Junior".into()),
            ..Default::default()
        };

        let created = create_profile(&store, &user, req).unwrap();
        assert_eq!(created.profile.id, user.id);
        assert_eq!(created.profile.email.as_deref(), Some("sam@campus.edu"));
        assert_eq!(created.profile.personality_type, Some(PersonalityType::Ambivert));
        assert_eq!(created.profile.class_year, Some(ClassYear::Junior));
    }

    #[test]
    fn create_twice_conflicts() {
        let store = MemoryStore::new();
        let user = caller();
        create_profile(&store, &user, CreateProfileRequest::default()).unwrap();
        let err = create_profile(&store, &user, CreateProfileRequest::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ProfileAlreadyExists);
    }

    #[test]
    fn invalid_fields_are_rejected() {
        let store = MemoryStore::new();
        let req = CreateProfileRequest {
            personality_type: Some("shy".into()),
            ..Default::default()
        };
        let err = create_profile(&store, &caller(), req).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidPersonalityType);

        let req = CreateProfileRequest {
            username: Some("ab".into()),
            ..Default::default()
        };
        let err = create_profile(&store, &caller(), req).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);

        let req = CreateProfileRequest {
            class_year: Some("Fifth".into()),
            ..Default::default()
        };
        let err = create_profile(&store, &caller(), req).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidClassYear);
    }

    #[test]
    fn majors_are_trimmed_on_write() {
        let store = MemoryStore::new();
        let user = caller();
        let req = CreateProfileRequest {
            major: Some("CS ".into()),
            ..Default::default()
        };
        let created = create_profile(&store, &user, req).unwrap();
        assert_eq!(created.profile.major.as_deref(), Some("CS"));

        let req = UpdateProfileRequest {
            major: Some("  Math".into()),
            ..Default::default()
        };
        let updated = update_profile(&store, user.id, req).unwrap();
        assert_eq!(updated.profile.major.as_deref(), Some("Math"));
    }

    #[test]
    fn update_keeps_untouched_fields() {
        let store = MemoryStore::new();
        let profile = seed_profile_with(&store, "river", Some(PersonalityType::Introvert), Some("Art"), &["Chess"]);

        let req = UpdateProfileRequest {
            bio: Some("hi".into()),
            ..Default::default()
        };
        let updated = update_profile(&store, profile.id, req).unwrap();
        assert_eq!(updated.profile.bio.as_deref(), Some("hi"));
        assert_eq!(updated.profile.major.as_deref(), Some("Art"));
        assert_eq!(updated.interests.len(), 1);

        let err = update_profile(&store, Uuid::new_v4(), UpdateProfileRequest::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ProfileNotFound);
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let store = MemoryStore::new();
        let profile = seed_profile(&store);
        delete_profile(&store, profile.id).unwrap();
        assert_eq!(get_profile(&store, profile.id).unwrap_err().code(), ErrorCode::ProfileNotFound);
        assert_eq!(delete_profile(&store, profile.id).unwrap_err().code(), ErrorCode::ProfileNotFound);
    }

    #[test]
    fn search_filters_combine() {
        let store = MemoryStore::new();
        seed_profile_with(&store, "alex", Some(PersonalityType::Introvert), Some("Computer Science"), &["Chess"]);
        seed_profile_with(&store, "blair", Some(PersonalityType::Extrovert), Some("Biology"), &["Hiking"]);
        seed_profile_with(&store, "casey", Some(PersonalityType::Introvert), Some("Biology"), &["Hiking", "Jazz"]);

        let query = SearchProfilesQuery {
            interests: Some("hiking, jazz".into()),
            personality_type: Some("introvert".into()),
            ..Default::default()
        };
        let page = search_profiles(&store, query).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].username.as_deref(), Some("casey"));

        let query = SearchProfilesQuery {
            major: Some("bio".into()),
            limit: Some(1),
            ..Default::default()
        };
        let page = search_profiles(&store, query).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 1);
        // Newest first.
        assert_eq!(page.items[0].username.as_deref(), Some("casey"));
    }

    #[test]
    fn replace_interests_rejects_unknown_ids() {
        let store = MemoryStore::new();
        let profile = seed_profile(&store);
        let chess = store.find_or_create_interest("Chess", None).unwrap();

        let req = ReplaceInterestsRequest {
            interest_ids: vec![chess.id, Uuid::new_v4()],
        };
        let err = replace_interests(&store, profile.id, req).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);

        let req = ReplaceInterestsRequest {
            interest_ids: vec![chess.id, chess.id],
        };
        let interests = replace_interests(&store, profile.id, req).unwrap();
        assert_eq!(interests, vec![chess]);
    }

    #[test]
    fn add_interest_reuses_catalogue_entry() {
        let store = MemoryStore::new();
        let a = seed_profile(&store);
        let b = seed_profile(&store);

        let first = add_interest(&store, a.id, AddInterestRequest { name: "Hiking".into(), category: None }).unwrap();
        let second = add_interest(&store, b.id, AddInterestRequest { name: "  hiking ".into(), category: None }).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(list_interests(&store).unwrap().len(), 1);

        let err = add_interest(&store, a.id, AddInterestRequest { name: "HIKING".into(), category: None }).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InterestAlreadyAdded);

        let err = add_interest(&store, a.id, AddInterestRequest { name: "   ".into(), category: None }).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[test]
    fn remove_interest_requires_attachment() {
        let store = MemoryStore::new();
        let profile = seed_profile_with(&store, "drew", None, None, &["Chess"]);
        let chess = profile_interests(&store, profile.id).unwrap().remove(0);

        remove_interest(&store, profile.id, chess.id).unwrap();
        assert!(profile_interests(&store, profile.id).unwrap().is_empty());

        let err = remove_interest(&store, profile.id, chess.id).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InterestNotFound);
    }
}
