//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use taskhub_auth::jwt::{JwtDecoder, JwtEncoder};
use taskhub_auth::password::{PasswordHasher, PasswordValidator};
use taskhub_auth::rbac::RoleGate;
use taskhub_auth::session::{RotationCoordinator, SessionManager, SessionResolver};
use taskhub_cache::CacheManager;
use taskhub_core::config::AppConfig;
use taskhub_database::repositories::user::UserRepository;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheaply cloneable; the heavier ones are `Arc`-wrapped.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Cache manager (Redis or in-memory).
    pub cache: CacheManager,
    /// JWT token encoder.
    pub jwt_encoder: Arc<JwtEncoder>,
    /// JWT token decoder.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Password hasher (Argon2id).
    pub password_hasher: Arc<PasswordHasher>,
    /// Password policy validator.
    pub password_validator: Arc<PasswordValidator>,
    /// Cache-aside identity resolver.
    pub session_resolver: Arc<SessionResolver>,
    /// Refresh-token rotation coordinator.
    pub rotation_coordinator: Arc<RotationCoordinator>,
    /// Login/logout flows.
    pub session_manager: Arc<SessionManager>,
    /// Role-based authorization gate.
    pub role_gate: RoleGate,
    /// User repository.
    pub user_repo: Arc<UserRepository>,
}
