//! # taskhub-database
//!
//! PostgreSQL connection management and the concrete `CredentialStore`
//! implementation for TaskHub identities.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::user::UserRepository;
