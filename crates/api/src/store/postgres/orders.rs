//! Order store backed by `PostgreSQL`.
//!
//! `create` persists the order row and every item row inside one
//! transaction: a failed line leaves no partial order behind.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use emporium_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::quantity_from_row;
use crate::models::{NewOrder, Order, OrderItem};
use crate::store::{OrderStore, StoreError};

/// `PostgreSQL` implementation of [`OrderStore`].
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    status: OrderStatus,
    total_amount: Decimal,
    ordered_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    quantity: i32,
    price: Decimal,
}

impl OrderItemRow {
    fn into_item(self) -> Result<OrderItem, StoreError> {
        Ok(OrderItem {
            id: OrderItemId::new(self.id),
            order_id: OrderId::new(self.order_id),
            product_id: ProductId::new(self.product_id),
            quantity: quantity_from_row(self.quantity)?,
            price: self.price,
        })
    }
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            status: self.status,
            total_amount: self.total_amount,
            ordered_at: self.ordered_at,
            items,
        }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, new: NewOrder) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders (user_id, status, total_amount, ordered_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, status, total_amount, ordered_at",
        )
        .bind(new.user_id)
        .bind(new.status)
        .bind(new.total_amount)
        .bind(new.ordered_at)
        .fetch_one(&mut *tx)
        .await?;

        let order_id = OrderId::new(order.id);
        let mut items = Vec::with_capacity(new.items.len());

        for item in new.items {
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                StoreError::DataCorruption(format!("quantity out of range: {}", item.quantity))
            })?;

            let row = sqlx::query_as::<_, OrderItemRow>(
                "INSERT INTO order_items (order_id, product_id, quantity, price)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id, order_id, product_id, quantity, price",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(quantity)
            .bind(item.price)
            .fetch_one(&mut *tx)
            .await?;

            items.push(row.into_item()?);
        }

        tx.commit().await?;

        Ok(order.into_order(items))
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let order = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, status, total_amount, ordered_at FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, product_id, quantity, price
             FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let items = items
            .into_iter()
            .map(OrderItemRow::into_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(order.into_order(items)))
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let orders = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, status, total_amount, ordered_at
             FROM orders WHERE user_id = $1 ORDER BY ordered_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, product_id, quantity, price
             FROM order_items WHERE order_id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for row in item_rows {
            let order_id = row.order_id;
            by_order.entry(order_id).or_default().push(row.into_item()?);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = by_order.remove(&order.id).unwrap_or_default();
                order.into_order(items)
            })
            .collect())
    }
}
