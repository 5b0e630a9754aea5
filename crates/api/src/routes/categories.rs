//! Category routes. Reads are public; mutations are admin-only.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;

use emporium_core::CategoryId;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::Category;
use crate::state::AppState;

use super::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/{id}", get(get_category).delete(delete_category))
}

async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Category>>>> {
    let categories = state.catalog().list_categories().await?;
    Ok(ApiResponse::ok("categories", categories))
}

async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<Json<ApiResponse<Category>>> {
    let category = state.catalog().create_category(&req.name).await?;
    Ok(ApiResponse::ok("category created", category))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<ApiResponse<Category>>> {
    let category = state.catalog().category_by_id(id).await?;
    Ok(ApiResponse::ok("category", category))
}

async fn delete_category(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<Json<ApiResponse<()>>> {
    state.catalog().delete_category(id).await?;
    Ok(ApiResponse::message("category deleted"))
}
