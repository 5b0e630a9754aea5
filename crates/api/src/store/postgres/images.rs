//! Image metadata store backed by `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use emporium_core::{ImageId, ProductId};

use crate::models::{NewImage, ProductImage};
use crate::store::{ImageStore, StoreError};

/// `PostgreSQL` implementation of [`ImageStore`].
#[derive(Clone)]
pub struct PgImageStore {
    pool: PgPool,
}

impl PgImageStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ImageRow {
    id: i64,
    product_id: i64,
    file_name: String,
    original_file_name: String,
    content_type: String,
    size_bytes: i64,
    url: String,
    is_primary: bool,
    display_order: i32,
    uploaded_at: DateTime<Utc>,
}

impl From<ImageRow> for ProductImage {
    fn from(row: ImageRow) -> Self {
        Self {
            id: ImageId::new(row.id),
            product_id: ProductId::new(row.product_id),
            file_name: row.file_name,
            original_file_name: row.original_file_name,
            content_type: row.content_type,
            size_bytes: row.size_bytes,
            url: row.url,
            is_primary: row.is_primary,
            display_order: row.display_order,
            uploaded_at: row.uploaded_at,
        }
    }
}

const IMAGE_COLUMNS: &str = "id, product_id, file_name, original_file_name, content_type, \
     size_bytes, url, is_primary, display_order, uploaded_at";

#[async_trait]
impl ImageStore for PgImageStore {
    async fn insert(&self, new: NewImage) -> Result<ProductImage, StoreError> {
        let row = sqlx::query_as::<_, ImageRow>(&format!(
            "INSERT INTO product_images (product_id, file_name, original_file_name, content_type,
                                         size_bytes, url, is_primary, display_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(new.product_id)
        .bind(&new.file_name)
        .bind(&new.original_file_name)
        .bind(&new.content_type)
        .bind(new.size_bytes)
        .bind(&new.url)
        .bind(new.is_primary)
        .bind(new.display_order)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get(&self, id: ImageId) -> Result<Option<ProductImage>, StoreError> {
        let row = sqlx::query_as::<_, ImageRow>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM product_images WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductImage>, StoreError> {
        let rows = sqlx::query_as::<_, ImageRow>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM product_images
             WHERE product_id = $1 ORDER BY display_order ASC, id ASC"
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_primary(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductImage>, StoreError> {
        let row = sqlx::query_as::<_, ImageRow>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM product_images
             WHERE product_id = $1 AND is_primary"
        ))
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn count_for_product(&self, product_id: ProductId) -> Result<i64, StoreError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM product_images WHERE product_id = $1")
                .bind(product_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0)
    }

    async fn set_primary_flag(&self, id: ImageId, is_primary: bool) -> Result<(), StoreError> {
        sqlx::query("UPDATE product_images SET is_primary = $2 WHERE id = $1")
            .bind(id)
            .bind(is_primary)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_display_order(
        &self,
        id: ImageId,
        display_order: i32,
    ) -> Result<Option<ProductImage>, StoreError> {
        let row = sqlx::query_as::<_, ImageRow>(&format!(
            "UPDATE product_images SET display_order = $2 WHERE id = $1
             RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(id)
        .bind(display_order)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: ImageId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM product_images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_product(&self, product_id: ProductId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM product_images WHERE product_id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
