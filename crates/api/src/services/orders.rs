//! Order Engine.
//!
//! Converts a purchase request into an immutable order. Every line copies
//! the product price at placement time into the order item; the persisted
//! order never re-derives a price from the live product. Placement is
//! all-or-nothing: a single unresolvable product aborts the whole request
//! before anything is written.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use emporium_core::{OrderId, OrderStatus, ProductId, UserId};

use crate::models::{NewOrder, NewOrderItem, Order};
use crate::store::{CatalogStore, OrderStore, UserStore};

use super::{Result, ServiceError};

/// One requested line of an order being placed.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Order placement and reads.
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    users: Arc<dyn UserStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl OrderService {
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrderStore>,
        users: Arc<dyn UserStore>,
        catalog: Arc<dyn CatalogStore>,
    ) -> Self {
        Self {
            orders,
            users,
            catalog,
        }
    }

    /// Place an order, snapshotting every line price from the current
    /// product price. An empty line list is valid and yields a zero-total
    /// order. Stock is not checked or decremented.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user or any referenced product does not
    /// exist; in that case nothing is persisted.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn place_order(&self, user_id: UserId, lines: Vec<OrderLine>) -> Result<Order> {
        self.users
            .get(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", user_id))?;

        // Resolve and price every line before touching the order store, so a
        // missing product can never leave a partial order behind.
        let mut items = Vec::with_capacity(lines.len());
        let mut total = Decimal::ZERO;

        for line in lines {
            let product = self
                .catalog
                .get_product(line.product_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("product", line.product_id))?;

            let item = NewOrderItem::snapshot(product.id, line.quantity, product.price);
            total += item.price;
            items.push(item);
        }

        let order = self
            .orders
            .create(NewOrder {
                user_id,
                status: OrderStatus::Pending,
                total_amount: total,
                ordered_at: Utc::now(),
                items,
            })
            .await?;

        tracing::info!(order_id = %order.id, total = %order.total_amount, "order placed");
        Ok(order)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    #[instrument(skip(self))]
    pub async fn order_by_id(&self, id: OrderId) -> Result<Order> {
        self.orders
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("order", id))
    }

    /// The user's orders, most recent first. An empty list is a valid
    /// result for a known user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    #[instrument(skip(self))]
    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        self.users
            .get(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", user_id))?;

        Ok(self.orders.list_for_user(user_id).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use emporium_core::{Email, Role};

    use crate::models::{NewProduct, NewUser, ProductUpdate};
    use crate::store::memory::MemoryStore;

    use super::*;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: OrderService,
        user_id: UserId,
        p1: ProductId,
        p2: ProductId,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let service = OrderService::new(store.clone(), store.clone(), store.clone());

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

        let category_id = store.create_category("Gadgets").await.unwrap().id;
        let mut products = Vec::new();
        for (name, price) in [("Widget", "10.00"), ("Gizmo", "25.00")] {
            let product = store
                .create_product(NewProduct {
                    name: name.to_owned(),
                    description: String::new(),
                    price: Decimal::from_str(price).unwrap(),
                    stock_quantity: 5,
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
                .unwrap();
            products.push(product.id);
        }

        Fixture {
            service,
            user_id: user.id,
            p1: products[0],
            p2: products[1],
            store,
        }
    }

    fn line(product_id: ProductId, quantity: u32) -> OrderLine {
        OrderLine {
            product_id,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_place_order_snapshots_prices_and_totals() {
        let f = fixture().await;

        let order = f
            .service
            .place_order(f.user_id, vec![line(f.p1, 2), line(f.p2, 1)])
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].price, Decimal::from_str("20.00").unwrap());
        assert_eq!(order.items[1].price, Decimal::from_str("25.00").unwrap());
        assert_eq!(order.total_amount, Decimal::from_str("45.00").unwrap());
    }

    #[tokio::test]
    async fn test_placed_prices_survive_product_price_change() {
        let f = fixture().await;

        let order = f
            .service
            .place_order(f.user_id, vec![line(f.p1, 2)])
            .await
            .unwrap();

        f.store
            .update_product(
                f.p1,
                ProductUpdate {
                    price: Some(Decimal::from_str("99.00").unwrap()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let reread = f.service.order_by_id(order.id).await.unwrap();
        assert_eq!(reread.items[0].price, Decimal::from_str("20.00").unwrap());
        assert_eq!(reread.total_amount, Decimal::from_str("20.00").unwrap());
    }

    #[tokio::test]
    async fn test_empty_order_has_zero_total() {
        let f = fixture().await;

        let order = f.service.place_order(f.user_id, Vec::new()).await.unwrap();

        assert!(order.items.is_empty());
        assert_eq!(order.total_amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_missing_product_aborts_whole_placement() {
        let f = fixture().await;

        let err = f
            .service
            .place_order(f.user_id, vec![line(f.p1, 1), line(ProductId::new(999), 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        // No partial order was persisted
        let orders = f.service.orders_for_user(f.user_id).await.unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let f = fixture().await;
        let err = f
            .service
            .place_order(UserId::new(999), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_orders_for_user_empty_is_ok() {
        let f = fixture().await;
        let orders = f.service.orders_for_user(f.user_id).await.unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn test_order_by_unknown_id_is_not_found() {
        let f = fixture().await;
        let err = f.service.order_by_id(OrderId::new(999)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
