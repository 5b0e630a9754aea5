//! Image routes.
//!
//! Upload, primary selection, and listing are mounted under
//! `/api/products/{id}/images` by [`super::products`]; image-id-addressed
//! operations and the public byte-serving route live here.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{delete, put},
};
use serde::Deserialize;

use emporium_core::{ImageId, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::ProductImage;
use crate::services::ImageUpload;
use crate::state::AppState;

use super::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    #[serde(default)]
    pub primary: bool,
}

#[derive(Debug, Deserialize)]
pub struct DisplayOrderRequest {
    pub display_order: i32,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{image_id}", delete(delete_image))
        .route("/{image_id}/display-order", put(update_display_order))
}

/// `POST /api/products/{id}/images?primary=true`
pub async fn upload_image(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(product_id): Path<ProductId>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ProductImage>>> {
    let mut uploads = read_uploads(&mut multipart).await?;
    let upload = uploads
        .pop()
        .ok_or_else(|| AppError::BadRequest("no file in request".to_owned()))?;

    if !uploads.is_empty() {
        return Err(AppError::BadRequest(
            "expected exactly one file; use the batch endpoint for several".to_owned(),
        ));
    }

    let image = state
        .images()
        .upload_image(product_id, upload, params.primary)
        .await?;
    Ok(ApiResponse::ok("image uploaded", image))
}

/// `POST /api/products/{id}/images/batch`
pub async fn upload_images(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(product_id): Path<ProductId>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Vec<ProductImage>>>> {
    let uploads = read_uploads(&mut multipart).await?;
    if uploads.is_empty() {
        return Err(AppError::BadRequest("no files in request".to_owned()));
    }

    let images = state.images().upload_many(product_id, uploads).await?;
    Ok(ApiResponse::ok("images uploaded", images))
}

/// `GET /api/products/{id}/images`
pub async fn list_images(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ApiResponse<Vec<ProductImage>>>> {
    let images = state.images().images_for_product(product_id).await?;
    Ok(ApiResponse::ok("images", images))
}

/// `GET /api/products/{id}/images/primary`
pub async fn primary_image(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ApiResponse<Option<ProductImage>>>> {
    let image = state.images().primary_image(product_id).await?;
    Ok(ApiResponse::ok("primary image", image))
}

/// `PUT /api/products/{id}/images/{image_id}/primary`
pub async fn set_primary_image(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path((product_id, image_id)): Path<(ProductId, ImageId)>,
) -> Result<Json<ApiResponse<ProductImage>>> {
    let image = state.images().set_primary(product_id, image_id).await?;
    Ok(ApiResponse::ok("primary image set", image))
}

/// `DELETE /api/products/{id}/images`
pub async fn delete_all_images(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ApiResponse<()>>> {
    state.images().delete_all(product_id).await?;
    Ok(ApiResponse::message("images deleted"))
}

async fn delete_image(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(image_id): Path<ImageId>,
) -> Result<Json<ApiResponse<()>>> {
    state.images().delete_image(image_id).await?;
    Ok(ApiResponse::message("image deleted"))
}

async fn update_display_order(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(image_id): Path<ImageId>,
    Json(req): Json<DisplayOrderRequest>,
) -> Result<Json<ApiResponse<ProductImage>>> {
    let image = state
        .images()
        .update_display_order(image_id, req.display_order)
        .await?;
    Ok(ApiResponse::ok("display order updated", image))
}

/// `GET /images/products/{product_id}/{file_name}` — serve stored bytes.
pub async fn serve_image(
    State(state): State<AppState>,
    Path((product_id, file_name)): Path<(ProductId, String)>,
) -> Result<Response> {
    let bytes = state
        .files()
        .load(product_id, &file_name)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("image file {file_name}")))?;

    Ok((
        [(header::CONTENT_TYPE, content_type_for(&file_name))],
        bytes,
    )
        .into_response())
}

/// Pull every file field out of a multipart request.
async fn read_uploads(multipart: &mut Multipart) -> Result<Vec<ImageUpload>> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(file_name) = field.file_name().map(ToOwned::to_owned) else {
            // Skip non-file fields
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        uploads.push(ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Ok(uploads)
}

fn content_type_for(file_name: &str) -> &'static str {
    match file_name.rsplit_once('.').map(|(_, ext)| ext) {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
