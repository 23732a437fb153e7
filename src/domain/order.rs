use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{ItemId, OrderId, OrderLineId, PrincipalId};

/// An immutable order header.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub owner_id: PrincipalId,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Payload for inserting an order header.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub owner_id: PrincipalId,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// One item/quantity/price-snapshot pairing within an order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub item_id: ItemId,
    pub quantity: u32,
    pub unit_price_at_purchase: Decimal,
}

/// Payload for inserting an order line.
#[derive(Debug, Clone)]
pub struct OrderLineCreate {
    pub order_id: OrderId,
    pub item_id: ItemId,
    pub quantity: u32,
    pub unit_price_at_purchase: Decimal,
}

/// A requested `(item, quantity)` pair as submitted by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRequest {
    pub item_id: ItemId,
    pub quantity: u32,
}

impl LineRequest {
    pub fn new(item_id: ItemId, quantity: u32) -> Self {
        Self { item_id, quantity }
    }
}

/// An order joined with its lines and the names of the items they reference.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderView {
    pub order_id: OrderId,
    pub owner_id: PrincipalId,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLineView>,
}

impl OrderView {
    /// Sum of `unit_price_at_purchase * quantity` over the lines.
    pub fn lines_total(&self) -> Decimal {
        self.lines.iter().map(OrderLineView::subtotal).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineView {
    pub item_id: ItemId,
    pub item_name: String,
    pub quantity: u32,
    pub unit_price_at_purchase: Decimal,
}

impl OrderLineView {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price_at_purchase * Decimal::from(self.quantity)
    }
}
