//! User management routes.
//!
//! Listing and deletion are admin-only; a user can read and update their
//! own profile.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;

use emporium_core::{Email, UserId};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{UserProfile, UserUpdate};
use crate::state::AppState;

use super::ApiResponse;

/// Profile update form.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route(
            "/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<ApiResponse<Vec<UserProfile>>>> {
    let users = state.users().list_users().await?;
    let profiles = users.into_iter().map(UserProfile::from).collect();
    Ok(ApiResponse::ok("users", profiles))
}

async fn get_user(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Path(id): Path<UserId>,
) -> Result<Json<ApiResponse<UserProfile>>> {
    require_self_or_admin(&caller, id)?;
    let user = state.users().user_by_id(id).await?;
    Ok(ApiResponse::ok("user", user.into()))
}

async fn update_user(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Path(id): Path<UserId>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserProfile>>> {
    require_self_or_admin(&caller, id)?;

    let email = req
        .email
        .as_deref()
        .map(Email::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = state
        .users()
        .update_user(
            id,
            UserUpdate {
                name: req.name,
                email,
            },
        )
        .await?;

    Ok(ApiResponse::ok("user updated", user.into()))
}

async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<ApiResponse<()>>> {
    state.users().delete_user(id).await?;
    Ok(ApiResponse::message("user deleted"))
}

fn require_self_or_admin(
    caller: &crate::services::AuthenticatedUser,
    target: UserId,
) -> Result<()> {
    if caller.id == target || caller.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "cannot access another user's profile".to_owned(),
        ))
    }
}
