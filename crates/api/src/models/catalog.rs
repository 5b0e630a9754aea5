//! Catalog domain types: products and categories.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use emporium_core::{CategoryId, ProductId};

/// A product category. Name is unique.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A sellable product.
///
/// `price` is the live price: the cart and order engines read it when a line
/// is created and copy it into the line, never reference it afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub sku: Option<String>,
    pub specifications: Option<String>,
    pub weight: Option<f64>,
    pub dimensions: Option<String>,
    pub is_active: bool,
    pub category_id: CategoryId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock_quantity: i32,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub sku: Option<String>,
    pub specifications: Option<String>,
    pub weight: Option<f64>,
    pub dimensions: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub category_id: CategoryId,
}

const fn default_true() -> bool {
    true
}

/// Partial product update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub sku: Option<String>,
    pub specifications: Option<String>,
    pub weight: Option<f64>,
    pub dimensions: Option<String>,
    pub is_active: Option<bool>,
    pub category_id: Option<CategoryId>,
}
