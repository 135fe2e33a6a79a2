//! User identity entity, role enumeration, and the credential store port.

pub mod model;
pub mod role;
pub mod store;

pub use model::{CreateUser, User, UserProfile};
pub use role::Role;
pub use store::CredentialStore;
