//! Product routes: catalog reads are public, mutations admin-only.
//!
//! Image sub-routes (`/{id}/images...`) live in [`super::images`] and are
//! mounted here so everything about a product hangs off one path.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use emporium_core::{CategoryId, ProductId};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{NewProduct, Product, ProductUpdate};
use crate::state::AppState;

use super::{ApiResponse, images};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct PriceRangeQuery {
    pub min: Decimal,
    pub max: Decimal,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/active", get(active_products))
        .route("/search", get(search_products))
        .route("/price-range", get(products_in_price_range))
        .route("/brand/{brand}", get(products_by_brand))
        .route("/sku/{sku}", get(product_by_sku))
        .route("/category/{category_id}", get(products_in_category))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route(
            "/{id}/images",
            post(images::upload_image)
                .get(images::list_images)
                .delete(images::delete_all_images),
        )
        .route("/{id}/images/batch", post(images::upload_images))
        .route("/{id}/images/primary", get(images::primary_image))
        .route(
            "/{id}/images/{image_id}/primary",
            put(images::set_primary_image),
        )
}

async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = state.catalog().list_products().await?;
    Ok(ApiResponse::ok("products", products))
}

async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Json(req): Json<NewProduct>,
) -> Result<Json<ApiResponse<Product>>> {
    let product = state.catalog().create_product(req).await?;
    Ok(ApiResponse::ok("product created", product))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ApiResponse<Product>>> {
    let product = state.catalog().product_by_id(id).await?;
    Ok(ApiResponse::ok("product", product))
}

async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(req): Json<ProductUpdate>,
) -> Result<Json<ApiResponse<Product>>> {
    let product = state.catalog().update_product(id, req).await?;
    Ok(ApiResponse::ok("product updated", product))
}

async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<ApiResponse<()>>> {
    state.catalog().delete_product(id).await?;
    Ok(ApiResponse::message("product deleted"))
}

async fn active_products(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = state.catalog().active_products().await?;
    Ok(ApiResponse::ok("active products", products))
}

async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = state.catalog().search_products(&query.q).await?;
    Ok(ApiResponse::ok("search results", products))
}

async fn products_in_price_range(
    State(state): State<AppState>,
    Query(query): Query<PriceRangeQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = state
        .catalog()
        .products_in_price_range(query.min, query.max)
        .await?;
    Ok(ApiResponse::ok("products in price range", products))
}

async fn products_by_brand(
    State(state): State<AppState>,
    Path(brand): Path<String>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = state.catalog().products_by_brand(&brand).await?;
    Ok(ApiResponse::ok("products by brand", products))
}

async fn product_by_sku(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> Result<Json<ApiResponse<Product>>> {
    let product = state.catalog().product_by_sku(&sku).await?;
    Ok(ApiResponse::ok("product", product))
}

async fn products_in_category(
    State(state): State<AppState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = state.catalog().products_in_category(category_id).await?;
    Ok(ApiResponse::ok("products in category", products))
}
