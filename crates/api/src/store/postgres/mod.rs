//! `PostgreSQL` store implementations.
//!
//! # Tables
//!
//! - `users` - Accounts and argon2 password hashes
//! - `categories` / `products` - Catalog
//! - `carts` / `cart_items` - Mutable cart aggregates (items cascade)
//! - `orders` / `order_items` - Immutable placed orders (items cascade)
//! - `product_images` - Image metadata (bytes live in the file store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p emporium-cli -- migrate
//! ```
//!
//! All queries are runtime-checked `query_as` calls over `FromRow` row types;
//! row types convert into the domain models at the module boundary.

mod carts;
mod catalog;
mod images;
mod orders;
mod users;

pub use carts::PgCartStore;
pub use catalog::PgCatalogStore;
pub use images::PgImageStore;
pub use orders::PgOrderStore;
pub use users::PgUserStore;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::StoreError;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a sqlx error, turning unique violations into [`StoreError::Conflict`].
fn conflict_on_unique(err: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return StoreError::Conflict(format!("{what} already exists"));
    }
    StoreError::Database(err)
}

/// Convert a stored quantity to the domain's unsigned width.
fn quantity_from_row(quantity: i32) -> Result<u32, StoreError> {
    u32::try_from(quantity)
        .map_err(|_| StoreError::DataCorruption(format!("negative quantity in row: {quantity}")))
}
