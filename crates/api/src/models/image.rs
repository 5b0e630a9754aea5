//! Product image metadata.
//!
//! The ledger records metadata only; bytes live in the file store. Per
//! product, at most one image has `is_primary` set and `display_order` is a
//! dense zero-based sequence assigned at upload time.

use chrono::{DateTime, Utc};
use serde::Serialize;

use emporium_core::{ImageId, ProductId};

/// Metadata for one stored product image.
#[derive(Debug, Clone, Serialize)]
pub struct ProductImage {
    pub id: ImageId,
    pub product_id: ProductId,
    /// Stored file name (uuid + original extension).
    pub file_name: String,
    /// File name as uploaded by the client.
    pub original_file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    /// Publicly resolvable URL of the stored bytes.
    pub url: String,
    pub is_primary: bool,
    pub display_order: i32,
    pub uploaded_at: DateTime<Utc>,
}

/// Metadata for an image being recorded.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub product_id: ProductId,
    pub file_name: String,
    pub original_file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub url: String,
    pub is_primary: bool,
    pub display_order: i32,
}
