//! Auth handlers — register, login, logout, refresh, me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use validator::Validate;

use taskhub_auth::jwt::TokenPair;
use taskhub_core::error::AppError;
use taskhub_entity::user::{CreateUser, Role};

use crate::dto::request::{LoginRequest, RefreshRequest, RegisterRequest};
use crate::dto::response::{
    ApiResponse, LoginResponse, MessageResponse, TokenPairResponse, UserResponse,
};
use crate::error::ApiError;
use crate::extractors::auth::{ACCESS_TOKEN_COOKIE, AuthUser, REFRESH_TOKEN_COOKIE};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    state.password_validator.validate(&req.password)?;

    let password_hash = state.password_hasher.hash_password(&req.password)?;
    let user = state
        .user_repo
        .create(&CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
            role: Role::User,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UserResponse::from(&user))),
    ))
}

/// POST /api/auth/login
///
/// Issues the token pair both in the JSON body and as HttpOnly cookies,
/// so browser and API clients share one endpoint.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponse>>), ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let (profile, pair) = state
        .session_manager
        .login(&req.username, &req.password)
        .await?;

    let jar = with_token_cookies(jar, &pair);
    Ok((
        jar,
        Json(ApiResponse::ok(LoginResponse {
            tokens: TokenPairResponse::from(pair),
            user: UserResponse::from(profile),
        })),
    ))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<MessageResponse>>), ApiError> {
    state.session_manager.logout(auth.id).await?;

    let jar = jar
        .remove(Cookie::from(ACCESS_TOKEN_COOKIE))
        .remove(Cookie::from(REFRESH_TOKEN_COOKIE));

    Ok((
        jar,
        Json(ApiResponse::ok(MessageResponse {
            message: "Logged out successfully".to_string(),
        })),
    ))
}

/// POST /api/auth/refresh
///
/// The refresh token may arrive as the cookie the login flow set, or in
/// the JSON body for non-browser clients. The cookie wins when both are
/// present.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<(CookieJar, Json<ApiResponse<TokenPairResponse>>), ApiError> {
    let presented = refresh_token_from(
        jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string()),
        body.and_then(|Json(req)| req.refresh_token),
    )
    .ok_or_else(|| AppError::unauthenticated("No refresh token presented"))?;

    let pair = state.rotation_coordinator.rotate(&presented).await?;

    let jar = with_token_cookies(jar, &pair);
    Ok((jar, Json(ApiResponse::ok(TokenPairResponse::from(pair)))))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::ok(UserResponse::from(auth.0)))
}

/// Attach the token pair as HttpOnly cookies.
fn with_token_cookies(jar: CookieJar, pair: &TokenPair) -> CookieJar {
    jar.add(auth_cookie(ACCESS_TOKEN_COOKIE, pair.access_token.clone()))
        .add(auth_cookie(REFRESH_TOKEN_COOKIE, pair.refresh_token.clone()))
}

fn auth_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .build()
}

/// Cookie-first refresh-token selection, matching the web client contract.
fn refresh_token_from(cookie: Option<String>, body: Option<String>) -> Option<String> {
    cookie.or(body)
}
