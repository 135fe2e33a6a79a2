//! # taskhub-entity
//!
//! Domain entities shared across the TaskHub crates: the user identity
//! record, its role enumeration, the public profile snapshot cached by the
//! session resolver, and the `CredentialStore` port implemented by the
//! database crate.

pub mod user;

pub use user::model::{CreateUser, User, UserProfile};
pub use user::role::Role;
pub use user::store::CredentialStore;
