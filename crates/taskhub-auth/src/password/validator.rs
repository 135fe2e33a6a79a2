//! Password policy enforcement for new passwords.

use taskhub_core::config::auth::AuthConfig;
use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;

/// Validates password strength against configured policies.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length.
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Validates a password against all configured policies.
    ///
    /// Returns `Ok(())` if the password meets all requirements,
    /// or an error describing the first violation found.
    pub fn validate(&self, password: &str) -> AppResult<()> {
        if password.len() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if !password.chars().any(|c| c.is_uppercase()) {
            return Err(AppError::validation(
                "Password must contain at least one uppercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_lowercase()) {
            return Err(AppError::validation(
                "Password must contain at least one lowercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::validation(
                "Password must contain at least one digit",
            ));
        }

        Ok(())
    }

    /// Validates that a new password differs from the old one.
    pub fn validate_not_same(&self, old_password: &str, new_password: &str) -> AppResult<()> {
        if old_password == new_password {
            return Err(AppError::validation(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> PasswordValidator {
        PasswordValidator { min_length: 8 }
    }

    #[test]
    fn test_accepts_conforming_password() {
        assert!(validator().validate("Sufficient1").is_ok());
    }

    #[test]
    fn test_rejects_short_password() {
        assert!(validator().validate("Ab1").is_err());
    }

    #[test]
    fn test_rejects_missing_character_classes() {
        let v = validator();
        assert!(v.validate("alllowercase1").is_err());
        assert!(v.validate("ALLUPPERCASE1").is_err());
        assert!(v.validate("NoDigitsHere").is_err());
    }

    #[test]
    fn test_rejects_unchanged_password() {
        assert!(validator().validate_not_same("Same1234", "Same1234").is_err());
        assert!(validator().validate_not_same("Old12345", "New12345").is_ok());
    }
}
