//! Session lifecycle: identity resolution, refresh rotation, login/logout.

use std::time::Duration;

use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;

pub mod manager;
pub mod resolver;
pub mod rotation;

#[cfg(test)]
pub(crate) mod testsupport;

pub use manager::SessionManager;
pub use resolver::SessionResolver;
pub use rotation::RotationCoordinator;

/// Run a credential-store call under the configured deadline.
///
/// The store is fail-closed: blowing the deadline aborts the operation
/// with `ServiceUnavailable`, kept distinct from the credential-related
/// kinds so a store outage never reads as a bad token or a missing user.
pub(crate) async fn bounded_store_call<T>(
    limit: Duration,
    what: &str,
    call: impl std::future::Future<Output = AppResult<T>>,
) -> AppResult<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(AppError::service_unavailable(format!("{what} timed out"))),
    }
}
