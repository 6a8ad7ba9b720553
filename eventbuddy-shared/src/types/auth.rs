use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience the identity provider stamps on end-user access tokens.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// Access-token claims as issued by the identity provider.
///
/// Only `sub` and `exp` are required; the rest is informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: Option<String>, duration_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id,
            email,
            role: Some(AUTHENTICATED_AUDIENCE.to_string()),
            aud: Some(AUTHENTICATED_AUDIENCE.to_string()),
            iat: now,
            exp: now + duration_secs,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// The caller identity handed to handlers. The id doubles as the profile id.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
        }
    }
}
