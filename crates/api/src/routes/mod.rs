//! Route handlers and router assembly.
//!
//! Handlers are thin: extract, delegate to a service, wrap the result in
//! the `{"message", "data"}` envelope. All domain rules live in the
//! services.

pub mod auth;
pub mod cart;
pub mod categories;
pub mod images;
pub mod orders;
pub mod products;
pub mod users;

use axum::{Json, Router, extract::DefaultBodyLimit, routing::get};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// The `{"message", "data"}` response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// A successful response carrying data.
    pub fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            message: message.into(),
            data: Some(data),
        })
    }
}

impl ApiResponse<()> {
    /// A successful response with a message only.
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
            data: None,
        })
    }
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/api/users", users::router())
        .nest("/api/categories", categories::router())
        .nest("/api/products", products::router())
        .nest("/api/cart", cart::router())
        .nest("/api/orders", orders::router())
        .nest("/api/images", images::router())
        .route(
            "/images/products/{product_id}/{file_name}",
            get(images::serve_image),
        )
        // Must exceed the 5 MiB image cap so oversized uploads reach validation
        .layer(DefaultBodyLimit::max(8 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
