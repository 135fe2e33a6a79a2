//! End-to-end authentication flow tests against the library crates.
//!
//! These run without PostgreSQL or Redis: the credential store is an
//! in-memory double with the same compare-and-swap semantics as the
//! database repository, and the cache is the in-process provider.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use taskhub_auth::{
    JwtDecoder, JwtEncoder, PasswordHasher, RoleGate, RotationCoordinator, SessionManager,
    SessionResolver,
};
use taskhub_cache::CacheManager;
use taskhub_cache::memory::MemoryCacheProvider;
use taskhub_core::config::auth::AuthConfig;
use taskhub_core::config::cache::MemoryCacheConfig;
use taskhub_core::error::{AppError, ErrorKind};
use taskhub_core::result::AppResult;
use taskhub_entity::user::{CredentialStore, Role, User};

#[derive(Debug, Default)]
struct MapStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MapStore {
    fn insert(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }
}

#[async_trait]
impl CredentialStore for MapStore {
    async fn get(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_login_key(&self, key: &str) -> AppResult<Option<User>> {
        let key = key.to_lowercase();
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username.to_lowercase() == key || u.email.to_lowercase() == key)
            .cloned())
    }

    async fn update_refresh_token(
        &self,
        id: Uuid,
        expected_old: Option<&str>,
        new_token: &str,
    ) -> AppResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if user.refresh_token.as_deref() != expected_old {
            return Err(AppError::conflict("Stored refresh token changed"));
        }
        user.refresh_token = Some(new_token.to_string());
        Ok(())
    }

    async fn clear_refresh_token(&self, id: Uuid) -> AppResult<()> {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.refresh_token = None;
        }
        Ok(())
    }
}

struct Harness {
    store: Arc<MapStore>,
    manager: SessionManager,
    resolver: SessionResolver,
    coordinator: RotationCoordinator,
    gate: RoleGate,
    hasher: PasswordHasher,
}

fn harness() -> Harness {
    let config = AuthConfig {
        access_token_secret: "flow-access-secret".to_string(),
        refresh_token_secret: "flow-refresh-secret".to_string(),
        access_ttl_minutes: 15,
        refresh_ttl_days: 7,
        prefer_header_credential: false,
        lookup_timeout_ms: 2000,
        password_min_length: 8,
    };
    let store = Arc::new(MapStore::default());
    let cache = CacheManager::from_provider(Arc::new(MemoryCacheProvider::new(
        &MemoryCacheConfig { max_capacity: 100 },
        60,
    )));
    let hasher = PasswordHasher::new();

    Harness {
        store: store.clone(),
        manager: SessionManager::new(
            store.clone() as Arc<dyn CredentialStore>,
            cache.clone(),
            JwtEncoder::new(&config),
            hasher.clone(),
            &config,
        ),
        resolver: SessionResolver::new(
            JwtDecoder::new(&config),
            store.clone() as Arc<dyn CredentialStore>,
            cache,
            &config,
            60,
        ),
        coordinator: RotationCoordinator::new(
            JwtDecoder::new(&config),
            JwtEncoder::new(&config),
            store as Arc<dyn CredentialStore>,
            &config,
        ),
        gate: RoleGate::new(),
        hasher,
    }
}

fn seed_user(h: &Harness, role: Role, password: &str) -> User {
    let user = User {
        id: Uuid::new_v4(),
        username: "carol".to_string(),
        email: "carol@example.com".to_string(),
        password_hash: h.hasher.hash_password(password).unwrap(),
        role,
        refresh_token: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    h.store.insert(user.clone());
    user
}

#[tokio::test]
async fn test_login_resolve_authorize_flow() {
    let h = harness();
    let user = seed_user(&h, Role::User, "Password1");

    let (profile, pair) = h.manager.login("carol", "Password1").await.unwrap();
    assert_eq!(profile.id, user.id);

    let identity = h.resolver.resolve(&pair.access_token).await.unwrap();
    assert_eq!(identity.id, user.id);

    // An operation open to plain users passes; an admin-only one rejects.
    h.gate.authorize(&identity, &[Role::User, Role::Admin]).unwrap();
    let err = h
        .gate
        .authorize(&identity, &[Role::Admin, Role::Manager])
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_full_rotation_lifecycle() {
    let h = harness();
    seed_user(&h, Role::User, "Password1");

    let (profile, pair) = h.manager.login("carol", "Password1").await.unwrap();
    let r1 = pair.refresh_token;

    // r1 rotates once; replaying it afterwards is rejected; its
    // replacement still works.
    let pair2 = h.coordinator.rotate(&r1).await.unwrap();
    let err = h.coordinator.rotate(&r1).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::TokenReuseOrRevoked);
    let pair3 = h.coordinator.rotate(&pair2.refresh_token).await.unwrap();

    // Logout revokes the latest token too.
    h.manager.logout(profile.id).await.unwrap();
    let err = h.coordinator.rotate(&pair3.refresh_token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::TokenReuseOrRevoked);
}

#[tokio::test]
async fn test_access_token_survives_logout_until_expiry() {
    // Access tokens are stateless; logout revokes the refresh token but a
    // still-unexpired access token resolves until its TTL runs out.
    let h = harness();
    seed_user(&h, Role::User, "Password1");

    let (profile, pair) = h.manager.login("carol", "Password1").await.unwrap();
    h.manager.logout(profile.id).await.unwrap();

    let identity = h.resolver.resolve(&pair.access_token).await.unwrap();
    assert_eq!(identity.id, profile.id);
}
