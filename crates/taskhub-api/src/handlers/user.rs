//! User management handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;
use validator::Validate;

use taskhub_core::error::AppError;
use taskhub_entity::user::Role;

use crate::dto::request::{ChangePasswordRequest, UpdateRoleRequest};
use crate::dto::response::{ApiResponse, MessageResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    state
        .role_gate
        .authorize(&auth, &[Role::Admin, Role::Manager])?;

    let users = state.user_repo.find_all().await?;
    let users = users.iter().map(UserResponse::from).collect();
    Ok(Json(ApiResponse::ok(users)))
}

/// GET /api/users/{id}
///
/// Users may fetch themselves; anyone else requires manager or admin.
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    if user_id != auth.id {
        state
            .role_gate
            .authorize(&auth, &[Role::Admin, Role::Manager])?;
    }

    let user = state
        .user_repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
    Ok(Json(ApiResponse::ok(UserResponse::from(&user))))
}

/// PUT /api/users/me/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let user = state
        .user_repo
        .find_by_id(auth.id)
        .await?
        .ok_or_else(|| AppError::unknown_identity("Account no longer exists"))?;

    if !state
        .password_hasher
        .verify_password(&req.current_password, &user.password_hash)?
    {
        return Err(AppError::unauthenticated("Current password is incorrect").into());
    }

    state
        .password_validator
        .validate_not_same(&req.current_password, &req.new_password)?;
    state.password_validator.validate(&req.new_password)?;

    let new_hash = state.password_hasher.hash_password(&req.new_password)?;
    state.user_repo.update_password(auth.id, &new_hash).await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Password updated".to_string(),
    })))
}

/// PUT /api/users/{id}/role
///
/// Admin only. Drops the cached identity snapshot so the new role takes
/// effect on the next resolve instead of waiting out the TTL.
pub async fn update_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    state.role_gate.authorize(&auth, &[Role::Admin])?;

    let user = state.user_repo.update_role(user_id, req.role).await?;
    state.session_resolver.invalidate(user_id).await?;

    Ok(Json(ApiResponse::ok(UserResponse::from(&user))))
}
