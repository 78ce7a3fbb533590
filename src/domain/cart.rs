use bigdecimal::BigDecimal;
use uuid::Uuid;

/// Upper bound on a single cart line quantity.
pub const MAX_QUANTITY: i32 = 100;

/// Sanitize a requested quantity into the [1, 100] range.
pub fn clamp_quantity(requested: i32) -> i32 {
    requested.clamp(1, MAX_QUANTITY)
}

#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
    pub stock: i32,
}

impl CartLineView {
    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
}

impl CartView {
    pub fn total(&self) -> BigDecimal {
        self.lines
            .iter()
            .fold(BigDecimal::from(0), |acc, l| acc + l.line_total())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn clamp_quantity_bounds() {
        assert_eq!(clamp_quantity(-5), 1);
        assert_eq!(clamp_quantity(0), 1);
        assert_eq!(clamp_quantity(1), 1);
        assert_eq!(clamp_quantity(42), 42);
        assert_eq!(clamp_quantity(100), 100);
        assert_eq!(clamp_quantity(150), 100);
    }

    fn line(price: &str, quantity: i32) -> CartLineView {
        CartLineView {
            product_id: Uuid::new_v4(),
            name: "item".to_string(),
            unit_price: BigDecimal::from_str(price).expect("valid decimal"),
            quantity,
            stock: 10,
        }
    }

    #[test]
    fn cart_total_sums_line_totals() {
        let cart = CartView {
            lines: vec![line("5.00", 2), line("10.00", 1)],
        };
        assert_eq!(cart.total(), BigDecimal::from_str("20.00").unwrap());
    }

    #[test]
    fn empty_cart_total_is_zero() {
        let cart = CartView::default();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), BigDecimal::from(0));
    }
}
