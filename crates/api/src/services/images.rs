//! Image Ledger.
//!
//! Tracks image metadata per product: at most one primary image, and a
//! dense zero-based display order assigned at upload time (next slot =
//! current image count). Bytes are delegated to the [`FileStore`]; the
//! ledger records metadata and the public URL only.

use std::sync::Arc;

use tracing::instrument;

use emporium_core::{ImageId, ProductId};

use crate::models::{NewImage, ProductImage};
use crate::store::{CatalogStore, ImageStore};

use super::files::FileStore;
use super::{Result, ServiceError};

/// Upload size cap: 5 MiB.
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Accepted file extensions (lowercased).
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// One file as received from the HTTP layer.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// File name as declared by the client.
    pub file_name: String,
    /// Content type as declared by the client.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Image ledger operations for products.
pub struct ImageService {
    images: Arc<dyn ImageStore>,
    catalog: Arc<dyn CatalogStore>,
    files: Arc<dyn FileStore>,
    base_url: String,
}

impl ImageService {
    #[must_use]
    pub fn new(
        images: Arc<dyn ImageStore>,
        catalog: Arc<dyn CatalogStore>,
        files: Arc<dyn FileStore>,
        base_url: String,
    ) -> Self {
        Self {
            images,
            catalog,
            files,
            base_url,
        }
    }

    /// Store one image. If `is_primary`, the product's current primary is
    /// demoted first. The new image takes the next display-order slot.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist and
    /// `InvalidArgument` if the payload is empty, oversized, or not an
    /// accepted image type.
    #[instrument(skip(self, upload), fields(file_name = %upload.file_name))]
    pub async fn upload_image(
        &self,
        product_id: ProductId,
        upload: ImageUpload,
        is_primary: bool,
    ) -> Result<ProductImage> {
        self.resolve_product(product_id).await?;
        validate_upload(&upload)?;

        if is_primary {
            self.demote_current_primary(product_id).await?;
        }

        let stored_name = stored_file_name(&upload.file_name);
        self.files
            .store(product_id, &stored_name, &upload.bytes)
            .await?;

        let display_order = i32::try_from(self.images.count_for_product(product_id).await?)
            .unwrap_or(i32::MAX);

        let image = self
            .images
            .insert(NewImage {
                product_id,
                url: format!(
                    "{}/images/products/{product_id}/{stored_name}",
                    self.base_url
                ),
                file_name: stored_name,
                original_file_name: upload.file_name,
                content_type: upload.content_type,
                size_bytes: upload.bytes.len() as i64,
                is_primary,
                display_order,
            })
            .await?;

        tracing::info!(image_id = %image.id, product_id = %product_id, "image uploaded");
        Ok(image)
    }

    /// Store a batch sequentially. The first file becomes primary only when
    /// the product has no primary yet; later files are never auto-primary.
    /// Files stored before a failure are kept (no rollback).
    ///
    /// # Errors
    ///
    /// Propagates the first per-file error; see [`Self::upload_image`].
    #[instrument(skip(self, uploads), fields(count = uploads.len()))]
    pub async fn upload_many(
        &self,
        product_id: ProductId,
        uploads: Vec<ImageUpload>,
    ) -> Result<Vec<ProductImage>> {
        let mut stored = Vec::with_capacity(uploads.len());

        for (index, upload) in uploads.into_iter().enumerate() {
            let is_primary =
                index == 0 && self.images.find_primary(product_id).await?.is_none();
            stored.push(self.upload_image(product_id, upload, is_primary).await?);
        }

        Ok(stored)
    }

    /// All images for a product, display order ascending.
    ///
    /// # Errors
    ///
    /// Returns `Store` errors only; an unknown product yields an empty list.
    pub async fn images_for_product(&self, product_id: ProductId) -> Result<Vec<ProductImage>> {
        Ok(self.images.list_for_product(product_id).await?)
    }

    /// The product's primary image. No primary is a valid empty result.
    ///
    /// # Errors
    ///
    /// Returns `Store` errors only.
    pub async fn primary_image(&self, product_id: ProductId) -> Result<Option<ProductImage>> {
        Ok(self.images.find_primary(product_id).await?)
    }

    /// Promote an image to primary.
    ///
    /// The current primary is demoted before the target is validated, so a
    /// failed promotion can leave the product with no primary.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown image and `InvalidArgument` if the
    /// image belongs to a different product.
    #[instrument(skip(self))]
    pub async fn set_primary(
        &self,
        product_id: ProductId,
        image_id: ImageId,
    ) -> Result<ProductImage> {
        self.demote_current_primary(product_id).await?;

        let image = self
            .images
            .get(image_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product image", image_id))?;

        if image.product_id != product_id {
            return Err(ServiceError::InvalidArgument(
                "image does not belong to the specified product".to_owned(),
            ));
        }

        self.images.set_primary_flag(image_id, true).await?;
        Ok(ProductImage {
            is_primary: true,
            ..image
        })
    }

    /// Delete one image: metadata and stored bytes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown image.
    #[instrument(skip(self))]
    pub async fn delete_image(&self, image_id: ImageId) -> Result<()> {
        let image = self
            .images
            .get(image_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product image", image_id))?;

        self.files.delete(image.product_id, &image.file_name).await?;
        self.images.delete(image_id).await?;

        tracing::info!(image_id = %image_id, "image deleted");
        Ok(())
    }

    /// Delete every image of a product: metadata and stored bytes.
    ///
    /// # Errors
    ///
    /// Returns `Store` or file-store errors.
    #[instrument(skip(self))]
    pub async fn delete_all(&self, product_id: ProductId) -> Result<()> {
        let images = self.images.list_for_product(product_id).await?;

        for image in &images {
            self.files.delete(product_id, &image.file_name).await?;
        }

        self.images.delete_for_product(product_id).await?;
        tracing::info!(product_id = %product_id, count = images.len(), "all images deleted");
        Ok(())
    }

    /// Overwrite one image's display order. Sibling images are not
    /// re-normalized; keeping the sequence dense is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown image.
    #[instrument(skip(self))]
    pub async fn update_display_order(
        &self,
        image_id: ImageId,
        display_order: i32,
    ) -> Result<ProductImage> {
        self.images
            .set_display_order(image_id, display_order)
            .await?
            .ok_or_else(|| ServiceError::not_found("product image", image_id))
    }

    async fn resolve_product(&self, product_id: ProductId) -> Result<()> {
        self.catalog
            .get_product(product_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("product", product_id))
    }

    async fn demote_current_primary(&self, product_id: ProductId) -> Result<()> {
        if let Some(current) = self.images.find_primary(product_id).await? {
            self.images.set_primary_flag(current.id, false).await?;
        }
        Ok(())
    }
}

/// Reject empty, oversized, or non-image payloads.
fn validate_upload(upload: &ImageUpload) -> Result<()> {
    if upload.bytes.is_empty() {
        return Err(ServiceError::InvalidArgument(
            "file cannot be empty".to_owned(),
        ));
    }

    if upload.bytes.len() > MAX_IMAGE_BYTES {
        return Err(ServiceError::InvalidArgument(
            "file size cannot exceed 5 MiB".to_owned(),
        ));
    }

    if !upload.content_type.starts_with("image/") {
        return Err(ServiceError::InvalidArgument(
            "file must be an image".to_owned(),
        ));
    }

    let extension = file_extension(&upload.file_name);
    if !ALLOWED_EXTENSIONS.contains(&extension.to_lowercase().as_str()) {
        return Err(ServiceError::InvalidArgument(
            "only JPG, JPEG, PNG, GIF, and WebP files are allowed".to_owned(),
        ));
    }

    Ok(())
}

fn file_extension(file_name: &str) -> &str {
    file_name.rsplit_once('.').map_or("", |(_, ext)| ext)
}

/// Stored name: uuid plus the original extension, lowercased.
fn stored_file_name(original: &str) -> String {
    let extension = file_extension(original).to_lowercase();
    if extension.is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        format!("{}.{extension}", uuid::Uuid::new_v4())
    }
}
