//! User identity entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::Role;

/// A registered identity in the TaskHub system.
///
/// This is the full credential-store record. The password hash and the
/// current refresh token never leave the auth flows: both fields are
/// skipped on serialization so the record cannot leak them through a
/// response body or a cache entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Email address; also usable as login key.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// User role (RBAC).
    pub role: Role,
    /// The single refresh token currently considered valid for this user.
    /// `None` when logged out. Overwritten on login and on every rotation.
    #[serde(skip_serializing, default)]
    pub refresh_token: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The public snapshot of this identity — the shape cached by the
    /// session resolver and attached to request contexts.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// Public identity snapshot.
///
/// Deliberately excludes `password_hash` and `refresh_token`; the cache
/// only ever holds this shape, so revocation-sensitive fields cannot be
/// served stale from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID.
    pub id: Uuid,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Role at snapshot time. May lag a role change by at most the
    /// snapshot cache TTL.
    pub role: Role,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role: Role::Manager,
            refresh_token: Some("opaque-refresh-token".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_secrets_never_serialized() {
        let json = serde_json::to_string(&sample_user()).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("refresh_token"));
        assert!(!json.contains("argon2id"));
    }

    #[test]
    fn test_profile_excludes_secrets() {
        let user = sample_user();
        let profile = user.profile();
        assert_eq!(profile.id, user.id);
        assert_eq!(profile.role, Role::Manager);
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("opaque-refresh-token"));
    }
}
