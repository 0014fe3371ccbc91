use cart_common::Cents;
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderLine, ProductId, TopicId};

/// Emitted once a checkout has persisted its order and the payment processor has opened a session for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub gateway_session_id: String,
}

/// Emitted exactly once per order, when settlement flips it to paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

impl OrderPaidEvent {
    pub fn new(order: Order, lines: Vec<OrderLine>) -> Self {
        Self { order, lines }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartChangeReason {
    LineAdded,
    LineRemoved,
    Cleared,
}

/// One cart line as a client renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Cents,
    pub quantity: i64,
    pub line_total: Cents,
}

impl CartLineView {
    pub fn new(product_id: ProductId, name: String, unit_price: Cents, quantity: i64) -> Self {
        Self { product_id, name, unit_price, quantity, line_total: unit_price * quantity }
    }
}

/// Broadcast to every viewer of a session whenever its cart changes. Carries enough to re-render the cart badge and
/// summary without another request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartChanged {
    pub topic: TopicId,
    pub reason: CartChangeReason,
    pub total_quantity: i64,
    pub subtotal: Cents,
    pub lines: Vec<CartLineView>,
}

impl CartChanged {
    pub fn new(topic: TopicId, reason: CartChangeReason, lines: Vec<CartLineView>) -> Self {
        let total_quantity = lines.iter().map(|l| l.quantity).sum();
        let subtotal = lines.iter().map(|l| l.line_total).sum();
        Self { topic, reason, total_quantity, subtotal, lines }
    }

    pub fn cleared(topic: TopicId) -> Self {
        Self::new(topic, CartChangeReason::Cleared, Vec::new())
    }
}
