//! Seed the catalog with demo categories and products.
//!
//! Idempotent per name: a category or product that already exists is
//! skipped, so re-running the command is safe.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::info;

use emporium_api::models::NewProduct;
use emporium_api::store::postgres::{PgCatalogStore, create_pool};
use emporium_api::store::{CatalogStore, StoreError};

const CATEGORIES: &[&str] = &["Electronics", "Clothing", "Books", "Home & Garden", "Sports"];

const PRODUCTS: &[(&str, &str, &str, i32)] = &[
    ("Wireless Headphones", "Electronics", "79.99", 25),
    ("Mechanical Keyboard", "Electronics", "129.00", 12),
    ("Cotton T-Shirt", "Clothing", "14.50", 100),
    ("Hardcover Notebook", "Books", "9.99", 60),
    ("Ceramic Planter", "Home & Garden", "24.00", 30),
    ("Yoga Mat", "Sports", "35.00", 40),
];

/// Insert the demo catalog.
///
/// # Errors
///
/// Returns an error if the environment is missing the database URL or a
/// store call fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    let pool = create_pool(&database_url).await?;
    let catalog = PgCatalogStore::new(pool);

    for name in CATEGORIES {
        match catalog.create_category(name).await {
            Ok(category) => info!(id = %category.id, name, "category created"),
            Err(StoreError::Conflict(_)) => info!(name, "category exists, skipping"),
            Err(e) => return Err(e.into()),
        }
    }

    let categories = catalog.list_categories().await?;

    for (name, category_name, price, stock) in PRODUCTS {
        let Some(category) = categories.iter().find(|c| c.name == *category_name) else {
            continue;
        };

        let new = NewProduct {
            name: (*name).to_owned(),
            description: format!("{name} (demo seed)"),
            price: Decimal::from_str(price)?,
            stock_quantity: *stock,
            brand: None,
            model: None,
            sku: None,
            specifications: None,
            weight: None,
            dimensions: None,
            is_active: true,
            category_id: category.id,
        };

        match catalog.create_product(new).await {
            Ok(product) => info!(id = %product.id, name, "product created"),
            Err(StoreError::Conflict(_)) => info!(name, "product exists, skipping"),
            Err(e) => return Err(e.into()),
        }
    }

    info!("seeding complete");
    Ok(())
}
