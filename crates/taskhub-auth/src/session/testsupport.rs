//! In-memory credential store double for session tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_entity::user::{CredentialStore, Role, User};

/// In-memory credential store with the same compare-and-swap semantics
/// as the PostgreSQL-backed repository, plus a read counter so tests can
/// assert how often the authoritative store was consulted.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
    get_calls: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    /// Number of `get` calls made so far.
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn set_role(&self, id: Uuid, role: Role) {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.role = role;
        }
    }

    /// The refresh token currently stored for the user, if the user exists.
    pub fn stored_refresh(&self, id: Uuid) -> Option<Option<String>> {
        self.users
            .lock()
            .unwrap()
            .get(&id)
            .map(|u| u.refresh_token.clone())
    }
}

/// Store double whose every call outlasts any deadline, standing in for
/// an unreachable database.
#[derive(Debug, Default)]
pub struct UnresponsiveStore;

#[async_trait]
impl CredentialStore for UnresponsiveStore {
    async fn get(&self, _id: Uuid) -> AppResult<Option<User>> {
        std::future::pending().await
    }

    async fn find_by_login_key(&self, _key: &str) -> AppResult<Option<User>> {
        std::future::pending().await
    }

    async fn update_refresh_token(
        &self,
        _id: Uuid,
        _expected_old: Option<&str>,
        _new_token: &str,
    ) -> AppResult<()> {
        std::future::pending().await
    }

    async fn clear_refresh_token(&self, _id: Uuid) -> AppResult<()> {
        std::future::pending().await
    }
}

/// Build a user record with the given role and password hash.
pub fn make_user(role: Role, password_hash: &str) -> User {
    User {
        id: Uuid::new_v4(),
        username: format!("user-{}", Uuid::new_v4().simple()),
        email: format!("{}@example.com", Uuid::new_v4().simple()),
        password_hash: password_hash.to_string(),
        role,
        refresh_token: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn get(&self, id: Uuid) -> AppResult<Option<User>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
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
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        if user.refresh_token.as_deref() != expected_old {
            return Err(AppError::conflict(
                "Stored refresh token changed since it was read",
            ));
        }
        user.refresh_token = Some(new_token.to_string());
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn clear_refresh_token(&self, id: Uuid) -> AppResult<()> {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.refresh_token = None;
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}
