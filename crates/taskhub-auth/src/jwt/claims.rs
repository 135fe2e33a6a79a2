//! JWT claims structures for access and refresh tokens.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use taskhub_entity::user::Role;

/// Claims payload embedded in every access token.
///
/// Access tokens are stateless: everything downstream authorization needs
/// is carried in the claims, and validity is proven purely by signature
/// and expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject — the user ID.
    pub sub: Uuid,
    /// User role at the time of token issuance.
    pub role: Role,
    /// Username for convenience.
    pub username: String,
    /// Email address for convenience.
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// JWT ID. Makes every issued token unique.
    pub jti: Uuid,
}

/// Claims payload embedded in every refresh token.
///
/// Deliberately minimal: a refresh token proves nothing on its own beyond
/// the subject it names. The stored copy on the identity record is the
/// source of truth for whether it is still honored. The `jti` guarantees
/// two rotations within the same second still produce distinct tokens,
/// which the byte-for-byte stored comparison depends on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject — the user ID.
    pub sub: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// JWT ID. Makes every issued token unique.
    pub jti: Uuid,
}

/// Why a presented token failed cryptographic/structural verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFault {
    /// The token could not be parsed as a JWT at all.
    Malformed,
    /// The token parsed and verified but its expiry has passed.
    Expired,
    /// The signature does not match the expected secret.
    BadSignature,
}

impl TokenFault {
    /// Human-readable message used in the client-facing error.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Malformed => "Token is malformed",
            Self::Expired => "Token has expired",
            Self::BadSignature => "Token signature is invalid",
        }
    }
}

impl std::fmt::Display for TokenFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed"),
            Self::Expired => write!(f, "expired"),
            Self::BadSignature => write!(f, "bad-signature"),
        }
    }
}
