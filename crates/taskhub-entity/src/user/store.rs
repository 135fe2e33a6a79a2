//! Credential store port.
//!
//! The credential store is owned externally (PostgreSQL in production); the
//! auth crate only consumes this narrow contract, which keeps the session
//! flows testable against an in-memory double.

use async_trait::async_trait;
use uuid::Uuid;

use taskhub_core::result::AppResult;

use super::model::User;

/// Narrow contract over the persistent identity store.
///
/// The store is always authoritative for revocation-sensitive fields
/// (role, refresh token); cached snapshots are accelerators only.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch an identity by primary key. `Ok(None)` means the identity
    /// does not exist; infrastructure failures are errors, never `None`.
    async fn get(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Fetch an identity by username or email (case-insensitive).
    async fn find_by_login_key(&self, key: &str) -> AppResult<Option<User>>;

    /// Replace the stored refresh token, conditioned on the stored value
    /// still matching `expected_old` (compare-and-swap). Fails with a
    /// `Conflict` kind when the stored value moved on — the caller decides
    /// whether that means a lost rotation race or a login race.
    async fn update_refresh_token(
        &self,
        id: Uuid,
        expected_old: Option<&str>,
        new_token: &str,
    ) -> AppResult<()>;

    /// Unconditionally clear the stored refresh token (logout). After this,
    /// any replayed refresh token fails the stored-value comparison.
    async fn clear_refresh_token(&self, id: Uuid) -> AppResult<()>;
}
