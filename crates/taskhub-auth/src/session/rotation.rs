//! Refresh-token rotation.
//!
//! Exchanges a presented refresh token for a fresh access/refresh pair
//! under single-active-refresh-token semantics: the stored copy on the
//! identity record is the only refresh token honored, and every successful
//! rotation moves it, permanently invalidating the presented one. There
//! is no grace window in which old and new are both honored.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use taskhub_core::config::auth::AuthConfig;
use taskhub_core::error::{AppError, ErrorKind};
use taskhub_core::result::AppResult;
use taskhub_entity::user::CredentialStore;

use crate::jwt::{JwtDecoder, JwtEncoder, TokenPair};
use crate::session::bounded_store_call;

/// Coordinates refresh-token exchange.
#[derive(Debug, Clone)]
pub struct RotationCoordinator {
    decoder: JwtDecoder,
    encoder: JwtEncoder,
    store: Arc<dyn CredentialStore>,
    /// Upper bound on each store call.
    lookup_timeout: Duration,
}

impl RotationCoordinator {
    /// Creates a new rotation coordinator.
    pub fn new(
        decoder: JwtDecoder,
        encoder: JwtEncoder,
        store: Arc<dyn CredentialStore>,
        auth: &AuthConfig,
    ) -> Self {
        Self {
            decoder,
            encoder,
            store,
            lookup_timeout: Duration::from_millis(auth.lookup_timeout_ms),
        }
    }

    /// Exchanges a presented refresh token for a new token pair.
    ///
    /// A signature-valid, unexpired token is still rejected when it is not
    /// byte-for-byte the stored current token: a replayed pre-rotation
    /// token, or any token after logout, fails here. The store write is
    /// conditioned on the stored value still matching the just-read one,
    /// so two racing rotations with the same token succeed at most once.
    /// No store mutation survives a failed rotation.
    pub async fn rotate(&self, presented: &str) -> AppResult<TokenPair> {
        let claims = self.decoder.verify_refresh(presented)?;

        let user = bounded_store_call(
            self.lookup_timeout,
            "Credential store read",
            self.store.get(claims.sub),
        )
        .await?
        .ok_or_else(|| {
            AppError::unknown_identity(format!("No identity exists for subject {}", claims.sub))
        })?;

        match user.refresh_token.as_deref() {
            Some(stored) if stored == presented => {}
            _ => {
                debug!(user_id = %user.id, "Presented refresh token is not the stored current token");
                return Err(AppError::token_reuse(
                    "Refresh token has been superseded or revoked",
                ));
            }
        }

        let pair = self.encoder.issue_pair(&user)?;

        bounded_store_call(
            self.lookup_timeout,
            "Refresh token persist",
            self.store
                .update_refresh_token(user.id, Some(presented), &pair.refresh_token),
        )
        .await
        .map_err(|e| match e.kind {
            // Lost the compare-and-swap: someone else rotated or logged
            // out between our read and our write.
            ErrorKind::Conflict => {
                AppError::token_reuse("Refresh token has been superseded or revoked")
            }
            ErrorKind::NotFound => {
                AppError::unknown_identity(format!("No identity exists for subject {}", user.id))
            }
            _ => e,
        })?;

        Ok(pair)
    }
}
