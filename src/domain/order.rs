use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A line item as it was at purchase time. `unit_price` is a snapshot and is
/// never affected by later catalog price changes.
#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl OrderItemView {
    pub fn subtotal(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}
