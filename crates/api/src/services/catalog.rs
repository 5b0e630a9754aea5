//! Catalog management: products and categories.
//!
//! Mostly pass-through to the catalog store; the rules that live here are
//! uniqueness of names, category resolution on create/update, and the
//! partial-update contract (absent fields stay untouched, `updated_at`
//! bumps on every update).

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::instrument;

use emporium_core::{CategoryId, ProductId};

use crate::models::{Category, NewProduct, Product, ProductUpdate};
use crate::store::CatalogStore;

use super::{Result, ServiceError};

/// Product and category operations.
pub struct CatalogService {
    catalog: Arc<dyn CatalogStore>,
}

impl CatalogService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// # Errors
    ///
    /// Returns `AlreadyExists` on a duplicate name.
    #[instrument(skip(self))]
    pub async fn create_category(&self, name: &str) -> Result<Category> {
        self.catalog.create_category(name).await.map_err(|e| {
            if matches!(e, crate::store::StoreError::Conflict(_)) {
                ServiceError::AlreadyExists(format!("category \"{name}\""))
            } else {
                e.into()
            }
        })
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the category does not exist.
    pub async fn category_by_id(&self, id: CategoryId) -> Result<Category> {
        self.catalog
            .get_category(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("category", id))
    }

    /// # Errors
    ///
    /// Returns `Store` errors only.
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.catalog.list_categories().await?)
    }

    /// Deleting a category that products still reference is not guarded.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category does not exist.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<()> {
        if self.catalog.delete_category(id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("category", id))
        }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// # Errors
    ///
    /// Returns `AlreadyExists` on a duplicate product name and `NotFound`
    /// if the category does not exist.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create_product(&self, new: NewProduct) -> Result<Product> {
        if self.catalog.product_name_exists(&new.name).await? {
            return Err(ServiceError::AlreadyExists(format!(
                "product \"{}\"",
                new.name
            )));
        }

        self.category_by_id(new.category_id).await?;

        let product = self.catalog.create_product(new).await?;
        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    pub async fn product_by_id(&self, id: ProductId) -> Result<Product> {
        self.catalog
            .get_product(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product", id))
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no product carries the SKU.
    pub async fn product_by_sku(&self, sku: &str) -> Result<Product> {
        self.catalog
            .find_product_by_sku(sku)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("product with sku {sku}")))
    }

    /// # Errors
    ///
    /// Returns `Store` errors only.
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.catalog.list_products().await?)
    }

    /// Apply a partial update; absent fields keep their value.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product (or a newly referenced category)
    /// does not exist.
    #[instrument(skip(self, update))]
    pub async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product> {
        if let Some(category_id) = update.category_id {
            self.category_by_id(category_id).await?;
        }

        self.catalog
            .update_product(id, update)
            .await?
            .ok_or_else(|| ServiceError::not_found("product", id))
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        if self.catalog.delete_product(id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("product", id))
        }
    }

    /// Case-insensitive name substring search.
    ///
    /// # Errors
    ///
    /// Returns `Store` errors only.
    pub async fn search_products(&self, name_fragment: &str) -> Result<Vec<Product>> {
        Ok(self.catalog.search_products(name_fragment).await?)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the category does not exist.
    pub async fn products_in_category(&self, category_id: CategoryId) -> Result<Vec<Product>> {
        self.category_by_id(category_id).await?;
        Ok(self.catalog.products_in_category(category_id).await?)
    }

    /// # Errors
    ///
    /// Returns `Store` errors only.
    pub async fn products_by_brand(&self, brand: &str) -> Result<Vec<Product>> {
        Ok(self.catalog.products_by_brand(brand).await?)
    }

    /// # Errors
    ///
    /// Returns `InvalidArgument` if `min > max`.
    pub async fn products_in_price_range(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> Result<Vec<Product>> {
        if min > max {
            return Err(ServiceError::InvalidArgument(
                "minimum price exceeds maximum price".to_owned(),
            ));
        }
        Ok(self.catalog.products_in_price_range(min, max).await?)
    }

    /// # Errors
    ///
    /// Returns `Store` errors only.
    pub async fn active_products(&self) -> Result<Vec<Product>> {
        Ok(self.catalog.active_products().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use crate::store::memory::MemoryStore;

    use super::*;

    fn new_product(name: &str, price: &str, category_id: CategoryId) -> NewProduct {
        NewProduct {
            name: name.to_owned(),
            description: "desc".to_owned(),
            price: Decimal::from_str(price).unwrap(),
            stock_quantity: 3,
            brand: Some("Acme".to_owned()),
            model: None,
            sku: Some(format!("SKU-{name}")),
            specifications: None,
            weight: None,
            dimensions: None,
            is_active: true,
            category_id,
        }
    }

    async fn fixture() -> (CatalogService, CategoryId) {
        let store = Arc::new(MemoryStore::new());
        let service = CatalogService::new(store);
        let category = service.create_category("Gadgets").await.unwrap();
        (service, category.id)
    }

    #[tokio::test]
    async fn test_duplicate_category_name_conflicts() {
        let (service, _) = fixture().await;
        let err = service.create_category("Gadgets").await.unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_duplicate_product_name_conflicts() {
        let (service, category_id) = fixture().await;

        service
            .create_product(new_product("Widget", "10.00", category_id))
            .await
            .unwrap();
        let err = service
            .create_product(new_product("Widget", "12.00", category_id))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_product_requires_existing_category() {
        let (service, _) = fixture().await;
        let err = service
            .create_product(new_product("Widget", "10.00", CategoryId::new(999)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_absent_fields() {
        let (service, category_id) = fixture().await;

        let product = service
            .create_product(new_product("Widget", "10.00", category_id))
            .await
            .unwrap();

        let updated = service
            .update_product(
                product.id,
                ProductUpdate {
                    price: Some(Decimal::from_str("12.50").unwrap()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price, Decimal::from_str("12.50").unwrap());
        assert_eq!(updated.name, "Widget");
        assert_eq!(updated.brand.as_deref(), Some("Acme"));
        assert!(updated.updated_at >= product.updated_at);
    }

    #[tokio::test]
    async fn test_lookup_by_sku() {
        let (service, category_id) = fixture().await;

        service
            .create_product(new_product("Widget", "10.00", category_id))
            .await
            .unwrap();

        let found = service.product_by_sku("SKU-Widget").await.unwrap();
        assert_eq!(found.name, "Widget");

        let err = service.product_by_sku("missing").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_price_range_validates_bounds() {
        let (service, _) = fixture().await;
        let err = service
            .products_in_price_range(
                Decimal::from_str("10.00").unwrap(),
                Decimal::from_str("5.00").unwrap(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let (service, category_id) = fixture().await;

        service
            .create_product(new_product("Blue Widget", "10.00", category_id))
            .await
            .unwrap();

        let found = service.search_products("widget").await.unwrap();
        assert_eq!(found.len(), 1);
    }
}
