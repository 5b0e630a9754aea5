//! Order aggregate: an immutable, price-snapshotted purchase.
//!
//! An order is a point-in-time copy of the prices it was placed at. After
//! creation nothing but `status` may change; line prices are frozen values,
//! not references to the live product.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use emporium_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId, line_total};

/// A placed order.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub ordered_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// One line of a placed order. `price` is the full line price
/// (unit price × quantity) frozen at placement.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Decimal,
}

/// An order ready to persist, items and total already priced.
///
/// The store writes the whole value in one transaction; there is no partial
/// order state.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub ordered_at: DateTime<Utc>,
    pub items: Vec<NewOrderItem>,
}

/// One priced line of an order being placed.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Decimal,
}

impl NewOrderItem {
    /// Snapshot a line from the current unit price.
    #[must_use]
    pub fn snapshot(product_id: ProductId, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            product_id,
            quantity,
            price: line_total(unit_price, quantity),
        }
    }
}
