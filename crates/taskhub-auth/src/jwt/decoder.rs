//! JWT token verification.
//!
//! The decoder is a pure cryptographic/structural check: it never consults
//! a cache or store. Whether a verified refresh token is still *honored*
//! is decided by the rotation coordinator against the stored copy.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use taskhub_core::config::auth::AuthConfig;
use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;

use super::claims::{AccessClaims, RefreshClaims, TokenFault};

/// Validates JWT access and refresh tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for access-token verification.
    access_key: DecodingKey,
    /// HMAC secret key for refresh-token verification.
    refresh_key: DecodingKey,
    /// Validation configuration shared by both kinds.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // 5 seconds leeway for clock skew

        Self {
            access_key: DecodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_key: DecodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and verifies an access token string.
    pub fn verify_access(&self, token: &str) -> AppResult<AccessClaims> {
        let data = decode::<AccessClaims>(token, &self.access_key, &self.validation)
            .map_err(|e| invalid_token(classify(&e)))?;
        Ok(data.claims)
    }

    /// Decodes and verifies a refresh token string.
    ///
    /// A verified refresh token only proves who it names; callers must
    /// still compare it against the stored copy before honoring it.
    pub fn verify_refresh(&self, token: &str) -> AppResult<RefreshClaims> {
        let data = decode::<RefreshClaims>(token, &self.refresh_key, &self.validation)
            .map_err(|e| invalid_token(classify(&e)))?;
        Ok(data.claims)
    }
}

/// Classify a jsonwebtoken error into a token fault.
fn classify(e: &jsonwebtoken::errors::Error) -> TokenFault {
    use jsonwebtoken::errors::ErrorKind;
    match e.kind() {
        ErrorKind::ExpiredSignature => TokenFault::Expired,
        ErrorKind::InvalidSignature => TokenFault::BadSignature,
        _ => TokenFault::Malformed,
    }
}

fn invalid_token(fault: TokenFault) -> AppError {
    AppError::invalid_token(fault.message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::encoder::JwtEncoder;
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use taskhub_core::error::ErrorKind;
    use taskhub_entity::user::{Role, User};
    use uuid::Uuid;

    fn config() -> AuthConfig {
        AuthConfig {
            access_token_secret: "test-access-secret".to_string(),
            refresh_token_secret: "test-refresh-secret".to_string(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 7,
            prefer_header_credential: false,
            lookup_timeout_ms: 2000,
            password_min_length: 8,
        }
    }

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            role: Role::User,
            refresh_token: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_access_token_roundtrip() {
        let config = config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);
        let user = sample_user();

        let (token, _) = encoder.issue_access_token(&user).unwrap();
        let claims = decoder.verify_access(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn test_refresh_token_roundtrip() {
        let config = config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);
        let user = sample_user();

        let (token, _) = encoder.issue_refresh_token(&user).unwrap();
        let claims = decoder.verify_refresh(&token).unwrap();
        assert_eq!(claims.sub, user.id);
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = config();
        let decoder = JwtDecoder::new(&config);

        // Hand-sign claims that expired two minutes ago, well past the
        // clock-skew leeway.
        let now = Utc::now().timestamp();
        let claims = RefreshClaims {
            sub: Uuid::new_v4(),
            iat: now - 300,
            exp: now - 120,
            jti: Uuid::new_v4(),
        };
        let key = EncodingKey::from_secret(config.refresh_token_secret.as_bytes());
        let token = encode(&Header::default(), &claims, &key).unwrap();

        let err = decoder.verify_refresh(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidToken);
        assert!(err.message.contains("expired"));
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        // Distinct secrets: a token of one kind must never verify as the
        // other, even though both are structurally valid JWTs.
        let config = config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);
        let user = sample_user();

        let (access, _) = encoder.issue_access_token(&user).unwrap();
        let err = decoder.verify_refresh(&access).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidToken);
    }

    #[test]
    fn test_garbage_rejected_as_malformed() {
        let decoder = JwtDecoder::new(&config());
        let err = decoder.verify_access("not-a-jwt").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidToken);
        assert!(err.message.contains("malformed"));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let config = config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);
        let user = sample_user();

        let (token, _) = encoder.issue_access_token(&user).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[2] = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
        let tampered = parts.join(".");

        let err = decoder.verify_access(&tampered).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidToken);
    }
}
