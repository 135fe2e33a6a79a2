//! Cache-aside identity resolution.
//!
//! Turns an inbound bearer credential into a verified identity snapshot.
//! The cache is consulted before the credential store; on a miss the
//! store's record is snapshotted into the cache before being returned, so
//! concurrent misses behind this one see it written. The cache is never
//! authoritative: a cache failure or timeout degrades to a direct store
//! lookup, never to an authentication failure.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use taskhub_cache::{CacheManager, keys};
use taskhub_core::config::auth::AuthConfig;
use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_core::traits::cache::CacheProvider;
use taskhub_entity::user::{CredentialStore, UserProfile};

use crate::jwt::JwtDecoder;

/// Resolves access tokens into identity snapshots.
#[derive(Debug, Clone)]
pub struct SessionResolver {
    /// Token verifier.
    decoder: JwtDecoder,
    /// Authoritative identity store.
    store: Arc<dyn CredentialStore>,
    /// Snapshot cache.
    cache: CacheManager,
    /// TTL for cached snapshots. This bounds how long a role change can
    /// lag for already-cached identities.
    snapshot_ttl: Duration,
    /// Upper bound on each cache/store call.
    lookup_timeout: Duration,
}

impl SessionResolver {
    /// Creates a new resolver.
    pub fn new(
        decoder: JwtDecoder,
        store: Arc<dyn CredentialStore>,
        cache: CacheManager,
        auth: &AuthConfig,
        snapshot_ttl_seconds: u64,
    ) -> Self {
        Self {
            decoder,
            store,
            cache,
            snapshot_ttl: Duration::from_secs(snapshot_ttl_seconds),
            lookup_timeout: Duration::from_millis(auth.lookup_timeout_ms),
        }
    }

    /// Resolves a bearer access token into an identity snapshot.
    pub async fn resolve(&self, token: &str) -> AppResult<UserProfile> {
        let claims = self.decoder.verify_access(token)?;
        let key = keys::user_by_id(claims.sub);

        if let Some(snapshot) = self.cached_snapshot(&key).await {
            return Ok(snapshot);
        }

        let user = crate::session::bounded_store_call(
            self.lookup_timeout,
            "Credential store lookup",
            self.store.get(claims.sub),
        )
        .await?;

        let user = user.ok_or_else(|| {
            AppError::unknown_identity(format!("No identity exists for subject {}", claims.sub))
        })?;
        let snapshot = user.profile();

        // Populate before handing the identity to the caller. Failures are
        // tolerated: the next request simply misses again.
        match timeout(
            self.lookup_timeout,
            self.cache.set_json(&key, &snapshot, self.snapshot_ttl),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Failed to populate identity cache"),
            Err(_) => warn!("Identity cache write timed out"),
        }

        Ok(snapshot)
    }

    /// Drops the cached snapshot for an identity, forcing the next resolve
    /// to consult the credential store. Used on logout and role changes.
    pub async fn invalidate(&self, user_id: Uuid) -> AppResult<()> {
        self.cache.delete(&keys::user_by_id(user_id)).await
    }

    /// Cache read treated strictly as an accelerator: errors and timeouts
    /// both degrade to a miss.
    async fn cached_snapshot(&self, key: &str) -> Option<UserProfile> {
        match timeout(self.lookup_timeout, self.cache.get_json::<UserProfile>(key)).await {
            Ok(Ok(hit)) => hit,
            Ok(Err(e)) => {
                debug!(error = %e, "Cache read failed; treating as miss");
                None
            }
            Err(_) => {
                warn!("Cache read timed out; treating as miss");
                None
            }
        }
    }
}
