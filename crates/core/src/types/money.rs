//! Decimal money arithmetic shared by the cart and order engines.
//!
//! Prices are plain [`Decimal`] values in the store's single display
//! currency. Both engines must multiply the same way so a cart line and the
//! order line snapshotted from it can never disagree by a rounding step.

use rust_decimal::Decimal;

/// Compute the total for one line item: `unit_price × quantity`.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_line_total() {
        let price = Decimal::from_str("19.99").unwrap();
        assert_eq!(line_total(price, 2), Decimal::from_str("39.98").unwrap());
    }

    #[test]
    fn test_line_total_zero_quantity() {
        let price = Decimal::from_str("10.00").unwrap();
        assert_eq!(line_total(price, 0), Decimal::from_str("0.00").unwrap());
    }

    #[test]
    fn test_line_total_exact_cents() {
        // 0.10 * 3 must be exactly 0.30, not a float approximation
        let price = Decimal::from_str("0.10").unwrap();
        assert_eq!(line_total(price, 3), Decimal::from_str("0.30").unwrap());
    }
}
