//! Authentication configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for access-token signing (HMAC-SHA256).
    #[serde(default = "default_access_secret")]
    pub access_token_secret: String,
    /// Secret key for refresh-token signing. Must differ from the access
    /// secret so a token of one kind can never verify as the other.
    #[serde(default = "default_refresh_secret")]
    pub refresh_token_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: u64,
    /// When true the `Authorization` header wins over the cookie; the
    /// default is the cookie-first order used by the web client.
    #[serde(default)]
    pub prefer_header_credential: bool,
    /// Upper bound in milliseconds on each cache/store call made while
    /// resolving a request credential.
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_ms: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
}

impl AuthConfig {
    /// Sanity-check the signing secrets after deserialization.
    ///
    /// Startup fails rather than running with an empty secret or with the
    /// same secret for both token kinds.
    pub fn validate_secrets(&self) -> Result<(), AppError> {
        if self.access_token_secret.is_empty() || self.refresh_token_secret.is_empty() {
            return Err(AppError::configuration("Token signing secrets must not be empty"));
        }
        if self.access_token_secret == self.refresh_token_secret {
            return Err(AppError::configuration(
                "Access and refresh token secrets must be distinct",
            ));
        }
        Ok(())
    }
}

fn default_access_secret() -> String {
    "CHANGE_ME_ACCESS_SECRET".to_string()
}

fn default_refresh_secret() -> String {
    "CHANGE_ME_REFRESH_SECRET".to_string()
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    7
}

fn default_lookup_timeout() -> u64 {
    2000
}

fn default_password_min() -> usize {
    8
}
