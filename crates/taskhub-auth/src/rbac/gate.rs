//! Authorization gate — checks a resolved identity against the role set
//! an operation declares.
//!
//! The declarative policy lives at the call site: each operation passes the
//! roles it accepts. The gate only performs set membership and surfaces a
//! uniform forbidden error. It is a pure function of its inputs, runs no
//! I/O, and must only ever be applied to an identity the session resolver
//! has already verified.

use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_entity::user::{Role, UserProfile};

/// Enforces per-operation role requirements.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleGate;

impl RoleGate {
    /// Creates a new gate.
    pub fn new() -> Self {
        Self
    }

    /// Accepts the identity iff its role is in the operation's allowed set.
    pub fn authorize(&self, identity: &UserProfile, allowed_roles: &[Role]) -> AppResult<()> {
        if allowed_roles.contains(&identity.role) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Role '{}' is not permitted to perform this operation",
                identity.role
            )))
        }
    }

    /// Membership check without the error wrapping.
    pub fn is_allowed(&self, role: Role, allowed_roles: &[Role]) -> bool {
        allowed_roles.contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use taskhub_core::error::ErrorKind;
    use uuid::Uuid;

    fn identity(role: Role) -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            username: "bob".to_string(),
            email: "bob@example.com".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_allows_member_role() {
        let gate = RoleGate::new();
        assert!(gate
            .authorize(&identity(Role::Manager), &[Role::Admin, Role::Manager])
            .is_ok());
    }

    #[test]
    fn test_user_forbidden_from_admin_operation() {
        let gate = RoleGate::new();
        let err = gate
            .authorize(&identity(Role::User), &[Role::Admin, Role::Manager])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[test]
    fn test_empty_allowed_set_rejects_everyone() {
        let gate = RoleGate::new();
        assert!(gate.authorize(&identity(Role::Admin), &[]).is_err());
    }

    #[test]
    fn test_membership_is_pure() {
        // Same inputs, same answer, however many times it runs.
        let gate = RoleGate::new();
        for _ in 0..3 {
            assert!(gate.is_allowed(Role::Admin, &[Role::Admin]));
            assert!(!gate.is_allowed(Role::User, &[Role::Admin]));
        }
    }
}
