//! # taskhub-auth
//!
//! Authentication and authorization for the TaskHub platform: token
//! issuance and rotation, cache-aside identity resolution, and role-based
//! access control.
//!
//! ## Modules
//!
//! - `jwt` — access/refresh token creation and verification
//! - `password` — Argon2id password hashing and policy enforcement
//! - `rbac` — role-based access control gate
//! - `session` — identity resolution, refresh rotation, login/logout

pub mod jwt;
pub mod password;
pub mod rbac;
pub mod session;

pub use jwt::{AccessClaims, JwtDecoder, JwtEncoder, RefreshClaims, TokenPair};
pub use password::{PasswordHasher, PasswordValidator};
pub use rbac::RoleGate;
pub use session::{RotationCoordinator, SessionManager, SessionResolver};
