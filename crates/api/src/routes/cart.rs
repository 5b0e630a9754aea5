//! Cart routes. All operate on the authenticated caller's own cart.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use serde::Deserialize;

use emporium_core::{CartItemId, ProductId};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Cart;
use crate::state::AppState;

use super::ApiResponse;

/// Add-to-cart form.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/items", post(add_item))
        .route("/items/{item_id}", delete(remove_item))
}

async fn get_cart(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ApiResponse<Cart>>> {
    let cart = state.cart().cart_for_user(user.id).await?;
    Ok(ApiResponse::ok("cart", cart))
}

async fn add_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<ApiResponse<Cart>>> {
    let cart = state
        .cart()
        .add_item(user.id, req.product_id, req.quantity)
        .await?;
    Ok(ApiResponse::ok("item added", cart))
}

async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    Path(item_id): Path<CartItemId>,
) -> Result<Json<ApiResponse<()>>> {
    state.cart().remove_item(item_id).await?;
    Ok(ApiResponse::message("item removed"))
}

async fn clear_cart(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ApiResponse<()>>> {
    state.cart().clear_cart(user.id).await?;
    Ok(ApiResponse::message("cart cleared"))
}
