//! Persistence seam.
//!
//! The engines treat persistence as a generic keyed store behind these
//! traits. Two implementations satisfy them: [`postgres`] (sqlx, the
//! production path) and [`memory`] (exercised by the test suite).
//!
//! Compound mutations are single trait calls so each implementation can give
//! them one atomicity boundary: `CartStore::append_item` writes the line and
//! the new total together, `OrderStore::create` writes the order and all of
//! its items together or not at all. There is no cross-call locking; two
//! concurrent `append_item` calls for one cart can race on the total
//! read-modify-write (the append itself is safe), which the domain accepts.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use emporium_core::{
    CartId, CartItemId, CategoryId, Email, ImageId, OrderId, ProductId, UserId,
};

use crate::models::{
    Cart, CartItem, Category, NewCartItem, NewImage, NewOrder, NewProduct, NewUser, Order,
    Product, ProductImage, ProductUpdate, User, UserUpdate,
};

/// Errors surfaced by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email or product name).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Account storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Fails with [`StoreError::Conflict`] on a duplicate email.
    async fn create(&self, new: NewUser) -> Result<User, StoreError>;

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;

    async fn list(&self) -> Result<Vec<User>, StoreError>;

    /// Apply a partial update; returns `None` if the user does not exist.
    async fn update(&self, id: UserId, update: UserUpdate) -> Result<Option<User>, StoreError>;

    /// Returns whether a row was deleted.
    async fn delete(&self, id: UserId) -> Result<bool, StoreError>;
}

/// Product and category storage.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert a category. Fails with [`StoreError::Conflict`] on a duplicate name.
    async fn create_category(&self, name: &str) -> Result<Category, StoreError>;

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, StoreError>;

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    async fn delete_category(&self, id: CategoryId) -> Result<bool, StoreError>;

    /// Insert a product. Fails with [`StoreError::Conflict`] on a duplicate name.
    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError>;

    async fn product_name_exists(&self, name: &str) -> Result<bool, StoreError>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    async fn find_product_by_sku(&self, sku: &str) -> Result<Option<Product>, StoreError>;

    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Apply a partial update and bump `updated_at`; `None` if absent.
    async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Option<Product>, StoreError>;

    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError>;

    /// Case-insensitive name substring search.
    async fn search_products(&self, name_fragment: &str) -> Result<Vec<Product>, StoreError>;

    async fn products_in_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, StoreError>;

    /// Case-insensitive brand substring search.
    async fn products_by_brand(&self, brand: &str) -> Result<Vec<Product>, StoreError>;

    async fn products_in_price_range(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> Result<Vec<Product>, StoreError>;

    async fn active_products(&self) -> Result<Vec<Product>, StoreError>;
}

/// Cart storage. Item rows cascade with their cart.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>, StoreError>;

    /// Create an empty cart (zero total) for a user.
    async fn create(&self, user_id: UserId) -> Result<Cart, StoreError>;

    async fn get(&self, id: CartId) -> Result<Option<Cart>, StoreError>;

    async fn find_item(&self, item_id: CartItemId) -> Result<Option<CartItem>, StoreError>;

    /// Insert a line and persist the recomputed total in one transaction.
    /// Returns the updated cart.
    async fn append_item(
        &self,
        cart_id: CartId,
        item: NewCartItem,
        new_total: Decimal,
    ) -> Result<Cart, StoreError>;

    /// Delete a line and persist the recomputed total in one transaction.
    async fn remove_item(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
        new_total: Decimal,
    ) -> Result<(), StoreError>;

    /// Delete all lines and zero the total; the cart row is retained.
    async fn clear(&self, cart_id: CartId) -> Result<(), StoreError>;
}

/// Order storage. Orders are written whole and never mutated afterwards
/// (status transitions excepted, which are outside the placement path).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist an order with all of its items in one transaction.
    async fn create(&self, new: NewOrder) -> Result<Order, StoreError>;

    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Most recent first. An empty list is a valid result.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;
}

/// Image metadata storage.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn insert(&self, new: NewImage) -> Result<ProductImage, StoreError>;

    async fn get(&self, id: ImageId) -> Result<Option<ProductImage>, StoreError>;

    /// Ordered by `display_order` ascending.
    async fn list_for_product(&self, product_id: ProductId)
    -> Result<Vec<ProductImage>, StoreError>;

    async fn find_primary(&self, product_id: ProductId)
    -> Result<Option<ProductImage>, StoreError>;

    async fn count_for_product(&self, product_id: ProductId) -> Result<i64, StoreError>;

    async fn set_primary_flag(&self, id: ImageId, is_primary: bool) -> Result<(), StoreError>;

    /// Overwrite the display order; siblings are not re-normalized.
    async fn set_display_order(
        &self,
        id: ImageId,
        display_order: i32,
    ) -> Result<Option<ProductImage>, StoreError>;

    /// Returns whether a row was deleted.
    async fn delete(&self, id: ImageId) -> Result<bool, StoreError>;

    async fn delete_for_product(&self, product_id: ProductId) -> Result<(), StoreError>;
}
