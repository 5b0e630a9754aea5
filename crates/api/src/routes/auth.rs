//! Authentication routes: register, login, refresh.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use emporium_core::Role;

use crate::error::Result;
use crate::services::AuthTokens;
use crate::state::AppState;

use super::ApiResponse;

/// Registration form.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Refresh form.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh result: a fresh access token.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthTokens>>> {
    let tokens = state
        .auth()
        .register(&req.name, &req.email, &req.password, req.role)
        .await?;

    Ok(ApiResponse::ok("registered", tokens))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthTokens>>> {
    let tokens = state.auth().login(&req.email, &req.password).await?;
    Ok(ApiResponse::ok("logged in", tokens))
}

async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<RefreshResponse>>> {
    let access_token = state.auth().refresh(&req.refresh_token).await?;
    Ok(ApiResponse::ok("refreshed", RefreshResponse { access_token }))
}
