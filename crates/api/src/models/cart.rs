//! Cart aggregate: a mutable bag of priced line items.
//!
//! Pricing contract: a line's `unit_price` is a snapshot of the product price
//! taken when the line is appended; existing lines are never re-priced. The
//! cart total is recomputed from line subtotals inside every engine mutation,
//! so `total_amount == sum(item.subtotal)` holds after each operation.

use rust_decimal::Decimal;
use serde::Serialize;

use emporium_core::{CartId, CartItemId, ProductId, UserId, line_total};

/// A user's shopping cart. One per user, created lazily.
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub total_amount: Decimal,
}

impl Cart {
    /// Sum the line subtotals. The engines persist this value alongside any
    /// item mutation, keeping the stored total consistent with the lines.
    #[must_use]
    pub fn total_of(items: &[CartItem]) -> Decimal {
        items.iter().map(|item| item.subtotal).sum()
    }
}

/// One line in a cart.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: u32,
    /// Product price at the moment the line was appended.
    pub unit_price: Decimal,
    /// Always `unit_price × quantity`, never stored stale.
    pub subtotal: Decimal,
}

/// A line to append to a cart, with its subtotal derived at construction.
#[derive(Debug, Clone)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

impl NewCartItem {
    /// Build a line priced at `unit_price`, computing the subtotal.
    #[must_use]
    pub fn priced(product_id: ProductId, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
            subtotal: line_total(unit_price, quantity),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn item(id: i64, unit_price: &str, quantity: u32) -> CartItem {
        let unit_price = Decimal::from_str(unit_price).unwrap();
        CartItem {
            id: CartItemId::new(id),
            cart_id: CartId::new(1),
            product_id: ProductId::new(id),
            quantity,
            unit_price,
            subtotal: line_total(unit_price, quantity),
        }
    }

    #[test]
    fn test_total_is_sum_of_subtotals() {
        let items = vec![item(1, "19.99", 2), item(2, "5.00", 3)];
        assert_eq!(Cart::total_of(&items), Decimal::from_str("54.98").unwrap());
    }

    #[test]
    fn test_total_of_empty_cart_is_zero() {
        assert_eq!(Cart::total_of(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_new_item_subtotal() {
        let line = NewCartItem::priced(
            ProductId::new(1),
            2,
            Decimal::from_str("19.99").unwrap(),
        );
        assert_eq!(line.subtotal, Decimal::from_str("39.98").unwrap());
    }
}
