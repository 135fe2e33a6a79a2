//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use taskhub_entity::user::Role;

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username.
    #[validate(length(min = 3, max = 100, message = "Username must be 3-100 characters"))]
    pub username: String,
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Plaintext password; policy is enforced separately.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login request body. The login key may be a username or an email.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request body. Optional: the refresh token may arrive as a
/// cookie instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token, when supplied in the body.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Password change request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    /// New password; policy is enforced separately.
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Role update request (admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    /// New role.
    pub role: Role,
}
