//! `AuthUser` extractor — pulls the bearer credential from the request,
//! resolves it through the session resolver, and injects the identity.
//!
//! The credential may arrive as a cookie or an `Authorization: Bearer`
//! header. The fallback order is resolved once here from configuration
//! (cookie-first unless `prefer_header_credential` is set), not
//! re-implemented per route.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

use taskhub_core::error::AppError;
use taskhub_entity::user::UserProfile;

use crate::error::ApiError;
use crate::state::AppState;

/// Cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
/// Cookie carrying the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Extracted authenticated identity available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserProfile);

impl std::ops::Deref for AuthUser {
    type Target = UserProfile;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie_token = jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string());

        let header_token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(String::from);

        let token = bearer_from_sources(
            cookie_token.as_deref(),
            header_token.as_deref(),
            state.config.auth.prefer_header_credential,
        )
        .ok_or_else(|| AppError::unauthenticated("No credential presented"))?;

        let identity = state.session_resolver.resolve(&token).await?;
        Ok(AuthUser(identity))
    }
}

/// Ordered credential fallback: picks the cookie or header token according
/// to the configured precedence. Pure so the precedence is testable
/// without a request.
pub fn bearer_from_sources(
    cookie: Option<&str>,
    header: Option<&str>,
    prefer_header: bool,
) -> Option<String> {
    let (first, second) = if prefer_header {
        (header, cookie)
    } else {
        (cookie, header)
    };
    first.or(second).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_wins_by_default() {
        let token = bearer_from_sources(Some("from-cookie"), Some("from-header"), false);
        assert_eq!(token.as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_header_wins_when_configured() {
        let token = bearer_from_sources(Some("from-cookie"), Some("from-header"), true);
        assert_eq!(token.as_deref(), Some("from-header"));
    }

    #[test]
    fn test_falls_back_to_remaining_source() {
        assert_eq!(
            bearer_from_sources(None, Some("from-header"), false).as_deref(),
            Some("from-header")
        );
        assert_eq!(
            bearer_from_sources(Some("from-cookie"), None, true).as_deref(),
            Some("from-cookie")
        );
    }

    #[test]
    fn test_absence_yields_none() {
        assert_eq!(bearer_from_sources(None, None, false), None);
        assert_eq!(bearer_from_sources(None, None, true), None);
    }
}
