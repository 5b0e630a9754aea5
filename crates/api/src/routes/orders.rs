//! Order routes.
//!
//! Placement and listing act on the caller's own account; a single order
//! can be read by its owner or an admin, and admins can list any user's
//! orders.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;

use emporium_core::{OrderId, UserId};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::Order;
use crate::services::OrderLine;
use crate::state::AppState;

use super::ApiResponse;

/// Order placement form.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderLine>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(my_orders).post(place_order))
        .route("/{id}", get(get_order))
        .route("/user/{user_id}", get(orders_for_user))
}

async fn place_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<Json<ApiResponse<Order>>> {
    let order = state.orders().place_order(user.id, req.items).await?;
    Ok(ApiResponse::ok("order placed", order))
}

async fn my_orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ApiResponse<Vec<Order>>>> {
    let orders = state.orders().orders_for_user(user.id).await?;
    Ok(ApiResponse::ok("orders", orders))
}

async fn get_order(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<ApiResponse<Order>>> {
    let order = state.orders().order_by_id(id).await?;

    if order.user_id != caller.id && !caller.is_admin() {
        return Err(AppError::Forbidden(
            "cannot access another user's order".to_owned(),
        ));
    }

    Ok(ApiResponse::ok("order", order))
}

async fn orders_for_user(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(user_id): Path<UserId>,
) -> Result<Json<ApiResponse<Vec<Order>>>> {
    let orders = state.orders().orders_for_user(user_id).await?;
    Ok(ApiResponse::ok("orders", orders))
}
