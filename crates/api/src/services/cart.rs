//! Cart Engine.
//!
//! Owns the mutable cart aggregate. Every mutating operation recomputes the
//! cart total from line subtotals before it returns, so the stored total
//! never goes stale (including removals). Lines snapshot the product price
//! at append time; appending the same product twice makes two lines.

use std::sync::Arc;

use tracing::instrument;

use emporium_core::{CartItemId, ProductId, UserId};

use crate::models::{Cart, NewCartItem};
use crate::store::{CartStore, CatalogStore, UserStore};

use super::{Result, ServiceError};

/// Cart operations for a single user aggregate.
pub struct CartService {
    carts: Arc<dyn CartStore>,
    users: Arc<dyn UserStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl CartService {
    #[must_use]
    pub fn new(
        carts: Arc<dyn CartStore>,
        users: Arc<dyn UserStore>,
        catalog: Arc<dyn CatalogStore>,
    ) -> Self {
        Self {
            carts,
            users,
            catalog,
        }
    }

    /// Get the user's cart, creating an empty one on first access.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    #[instrument(skip(self))]
    pub async fn cart_for_user(&self, user_id: UserId) -> Result<Cart> {
        self.resolve_user(user_id).await?;

        match self.carts.find_by_user(user_id).await? {
            Some(cart) => Ok(cart),
            None => Ok(self.carts.create(user_id).await?),
        }
    }

    /// Append a line priced at the current product price and recompute the
    /// total. Returns the updated cart.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user or product does not exist and
    /// `InvalidArgument` if `quantity` is zero.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart> {
        if quantity == 0 {
            return Err(ServiceError::InvalidArgument(
                "quantity must be a positive integer".to_owned(),
            ));
        }

        let product = self
            .catalog
            .get_product(product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product", product_id))?;

        let cart = self.cart_for_user(user_id).await?;

        let item = NewCartItem::priced(product.id, quantity, product.price);
        let new_total = Cart::total_of(&cart.items) + item.subtotal;

        let cart = self.carts.append_item(cart.id, item, new_total).await?;
        tracing::debug!(cart_id = %cart.id, total = %cart.total_amount, "cart line appended");
        Ok(cart)
    }

    /// Delete a line and recompute the owning cart's total.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the line does not exist.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, item_id: CartItemId) -> Result<()> {
        let item = self
            .carts
            .find_item(item_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("cart item", item_id))?;

        let cart = self
            .carts
            .get(item.cart_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("cart", item.cart_id))?;

        let remaining: Vec<_> = cart
            .items
            .into_iter()
            .filter(|line| line.id != item_id)
            .collect();
        let new_total = Cart::total_of(&remaining);

        self.carts.remove_item(cart.id, item_id, new_total).await?;
        Ok(())
    }

    /// Empty the user's cart and zero its total; the cart itself is kept.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, user_id: UserId) -> Result<()> {
        let cart = self.cart_for_user(user_id).await?;
        self.carts.clear(cart.id).await?;
        Ok(())
    }

    async fn resolve_user(&self, user_id: UserId) -> Result<()> {
        self.users
            .get(user_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("user", user_id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use emporium_core::{Email, Role};

    use crate::models::{NewProduct, NewUser};
    use crate::store::memory::MemoryStore;

    use super::*;

    async fn fixture() -> (CartService, UserId, ProductId) {
        let store = Arc::new(MemoryStore::new());
        let service = CartService::new(store.clone(), store.clone(), store.clone());

        let user = UserStore::create(
            store.as_ref(),
            NewUser {
                name: "Ada".to_owned(),
                email: Email::parse("ada@example.com").unwrap(),
                role: Role::Customer,
                password_hash: "hash".to_owned(),
            },
        )
        .await
        .unwrap();

        let product = seed_product(&store, "Widget", "19.99").await;

        (service, user.id, product)
    }

    async fn seed_product(store: &Arc<MemoryStore>, name: &str, price: &str) -> ProductId {
        let category_id = store.create_category("Gadgets").await.unwrap().id;

        store
            .create_product(NewProduct {
                name: name.to_owned(),
                description: String::new(),
                price: Decimal::from_str(price).unwrap(),
                stock_quantity: 10,
                brand: None,
                model: None,
                sku: None,
                specifications: None,
                weight: None,
                dimensions: None,
                is_active: true,
                category_id,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_cart_created_lazily() {
        let (service, user_id, _) = fixture().await;

        let cart = service.cart_for_user(user_id).await.unwrap();
        assert!(cart.items.is_empty());
        assert_eq!(cart.total_amount, Decimal::ZERO);

        // Second access returns the same cart
        let again = service.cart_for_user(user_id).await.unwrap();
        assert_eq!(again.id, cart.id);
    }

    #[tokio::test]
    async fn test_cart_for_unknown_user_is_not_found() {
        let (service, _, _) = fixture().await;
        let err = service.cart_for_user(UserId::new(999)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_add_item_prices_line_and_total() {
        let (service, user_id, product_id) = fixture().await;

        let cart = service.add_item(user_id, product_id, 2).await.unwrap();

        assert_eq!(cart.items.len(), 1);
        let line = &cart.items[0];
        assert_eq!(line.quantity, 2);
        assert_eq!(line.subtotal, Decimal::from_str("39.98").unwrap());
        assert_eq!(cart.total_amount, Decimal::from_str("39.98").unwrap());
    }

    #[tokio::test]
    async fn test_add_item_appends_separate_lines() {
        let (service, user_id, product_id) = fixture().await;

        service.add_item(user_id, product_id, 1).await.unwrap();
        let cart = service.add_item(user_id, product_id, 2).await.unwrap();

        // Same product twice -> two lines, no merging
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.total_amount, Decimal::from_str("59.97").unwrap());
    }

    #[tokio::test]
    async fn test_add_item_zero_quantity_rejected() {
        let (service, user_id, product_id) = fixture().await;
        let err = service.add_item(user_id, product_id, 0).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_add_item_unknown_product_is_not_found() {
        let (service, user_id, _) = fixture().await;
        let err = service
            .add_item(user_id, ProductId::new(999), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_item_recomputes_total() {
        let (service, user_id, product_id) = fixture().await;

        service.add_item(user_id, product_id, 2).await.unwrap();
        let cart = service.add_item(user_id, product_id, 1).await.unwrap();
        let removed_id = cart.items[0].id;

        service.remove_item(removed_id).await.unwrap();

        let cart = service.cart_for_user(user_id).await.unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total_amount, Cart::total_of(&cart.items));
        assert_eq!(cart.total_amount, Decimal::from_str("19.99").unwrap());
    }

    #[tokio::test]
    async fn test_remove_unknown_item_is_not_found() {
        let (service, _, _) = fixture().await;
        let err = service.remove_item(CartItemId::new(999)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_clear_cart_keeps_cart_row() {
        let (service, user_id, product_id) = fixture().await;

        service.add_item(user_id, product_id, 3).await.unwrap();
        let before = service.cart_for_user(user_id).await.unwrap();

        service.clear_cart(user_id).await.unwrap();

        let after = service.cart_for_user(user_id).await.unwrap();
        assert_eq!(after.id, before.id);
        assert!(after.items.is_empty());
        assert_eq!(after.total_amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_existing_lines_keep_their_price_snapshot() {
        let (service, user_id, product_id) = fixture().await;

        service.add_item(user_id, product_id, 1).await.unwrap();

        // Raise the product price, then append another line
        service
            .catalog
            .update_product(
                product_id,
                crate::models::ProductUpdate {
                    price: Some(Decimal::from_str("29.99").unwrap()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let cart = service.add_item(user_id, product_id, 1).await.unwrap();

        assert_eq!(
            cart.items[0].unit_price,
            Decimal::from_str("19.99").unwrap()
        );
        assert_eq!(
            cart.items[1].unit_price,
            Decimal::from_str("29.99").unwrap()
        );
        assert_eq!(cart.total_amount, Decimal::from_str("49.98").unwrap());
    }
}
