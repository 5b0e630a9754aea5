//! Catalog store backed by `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use emporium_core::{CategoryId, ProductId};

use super::conflict_on_unique;
use crate::models::{Category, NewProduct, Product, ProductUpdate};
use crate::store::{CatalogStore, StoreError};

/// `PostgreSQL` implementation of [`CatalogStore`].
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: Decimal,
    stock_quantity: i32,
    brand: Option<String>,
    model: Option<String>,
    sku: Option<String>,
    specifications: Option<String>,
    weight: Option<f64>,
    dimensions: Option<String>,
    is_active: bool,
    category_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            stock_quantity: row.stock_quantity,
            brand: row.brand,
            model: row.model,
            sku: row.sku,
            specifications: row.specifications,
            weight: row.weight,
            dimensions: row.dimensions,
            is_active: row.is_active,
            category_id: CategoryId::new(row.category_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock_quantity, brand, model, sku, \
     specifications, weight, dimensions, is_active, category_id, created_at, updated_at";

fn select_products(filter: &str) -> String {
    format!("SELECT {PRODUCT_COLUMNS} FROM products {filter}")
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn create_category(&self, name: &str) -> Result<Category, StoreError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "category name"))?;

        Ok(row.into())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        let row =
            sqlx::query_as::<_, CategoryRow>("SELECT id, name FROM categories WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Into::into))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows =
            sqlx::query_as::<_, CategoryRow>("SELECT id, name FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products (name, description, price, stock_quantity, brand, model, sku,
                                   specifications, weight, dimensions, is_active, category_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.stock_quantity)
        .bind(&new.brand)
        .bind(&new.model)
        .bind(&new.sku)
        .bind(&new.specifications)
        .bind(new.weight)
        .bind(&new.dimensions)
        .bind(new.is_active)
        .bind(new.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "product name"))?;

        Ok(row.into())
    }

    async fn product_name_exists(&self, name: &str) -> Result<bool, StoreError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM products WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists.0)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&select_products("WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn find_product_by_sku(&self, sku: &str) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&select_products("WHERE sku = $1"))
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(&select_products("ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products
             SET name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 price = COALESCE($4, price),
                 stock_quantity = COALESCE($5, stock_quantity),
                 brand = COALESCE($6, brand),
                 model = COALESCE($7, model),
                 sku = COALESCE($8, sku),
                 specifications = COALESCE($9, specifications),
                 weight = COALESCE($10, weight),
                 dimensions = COALESCE($11, dimensions),
                 is_active = COALESCE($12, is_active),
                 category_id = COALESCE($13, category_id),
                 updated_at = now()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.description)
        .bind(update.price)
        .bind(update.stock_quantity)
        .bind(update.brand)
        .bind(update.model)
        .bind(update.sku)
        .bind(update.specifications)
        .bind(update.weight)
        .bind(update.dimensions)
        .bind(update.is_active)
        .bind(update.category_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "product name"))?;

        Ok(row.map(Into::into))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn search_products(&self, name_fragment: &str) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(&select_products(
            "WHERE name ILIKE '%' || $1 || '%' ORDER BY id",
        ))
        .bind(name_fragment)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn products_in_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, StoreError> {
        let rows =
            sqlx::query_as::<_, ProductRow>(&select_products("WHERE category_id = $1 ORDER BY id"))
                .bind(category_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn products_by_brand(&self, brand: &str) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(&select_products(
            "WHERE brand ILIKE '%' || $1 || '%' ORDER BY id",
        ))
        .bind(brand)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn products_in_price_range(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(&select_products(
            "WHERE price BETWEEN $1 AND $2 ORDER BY price",
        ))
        .bind(min)
        .bind(max)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn active_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(&select_products("WHERE is_active ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
