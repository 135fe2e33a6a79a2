//! Login and logout flows.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use taskhub_cache::{CacheManager, keys};
use taskhub_core::config::auth::AuthConfig;
use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_core::traits::cache::CacheProvider;
use taskhub_entity::user::{CredentialStore, UserProfile};

use crate::jwt::{JwtEncoder, TokenPair};
use crate::password::PasswordHasher;
use crate::session::bounded_store_call;

/// Handles login and logout against the credential store.
#[derive(Debug, Clone)]
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    cache: CacheManager,
    encoder: JwtEncoder,
    hasher: PasswordHasher,
    /// Upper bound on each store call.
    lookup_timeout: Duration,
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        cache: CacheManager,
        encoder: JwtEncoder,
        hasher: PasswordHasher,
        auth: &AuthConfig,
    ) -> Self {
        Self {
            store,
            cache,
            encoder,
            hasher,
            lookup_timeout: Duration::from_millis(auth.lookup_timeout_ms),
        }
    }

    /// Authenticates a username-or-email plus password and issues a token
    /// pair, persisting the new refresh token as the single current one.
    ///
    /// Wrong login key and wrong password produce the same error so the
    /// response does not reveal which accounts exist. The persist is a
    /// compare-and-swap against the token value read with the record; a
    /// conflict means a concurrent login or rotation won the race.
    pub async fn login(&self, login_key: &str, password: &str) -> AppResult<(UserProfile, TokenPair)> {
        let user = bounded_store_call(
            self.lookup_timeout,
            "Credential lookup",
            self.store.find_by_login_key(login_key),
        )
        .await?
        .ok_or_else(|| AppError::unauthenticated("Invalid username or password"))?;

        if !self.hasher.verify_password(password, &user.password_hash)? {
            return Err(AppError::unauthenticated("Invalid username or password"));
        }

        let pair = self.encoder.issue_pair(&user)?;
        bounded_store_call(
            self.lookup_timeout,
            "Refresh token persist",
            self.store.update_refresh_token(
                user.id,
                user.refresh_token.as_deref(),
                &pair.refresh_token,
            ),
        )
        .await?;

        info!(user_id = %user.id, "User logged in");
        Ok((user.profile(), pair))
    }

    /// Clears the stored refresh token and drops the cached snapshot.
    ///
    /// After this any replayed refresh token for the user fails rotation
    /// unconditionally. The cache drop is best-effort: a cache outage must
    /// not keep a user logged in at the store level.
    pub async fn logout(&self, user_id: Uuid) -> AppResult<()> {
        bounded_store_call(
            self.lookup_timeout,
            "Refresh token revocation",
            self.store.clear_refresh_token(user_id),
        )
        .await?;

        if let Err(e) = self.cache.delete(&keys::user_by_id(user_id)).await {
            warn!(user_id = %user_id, error = %e, "Failed to drop cached identity on logout");
        }

        info!(user_id = %user_id, "User logged out");
        Ok(())
    }
}
