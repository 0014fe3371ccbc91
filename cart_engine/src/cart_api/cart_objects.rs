use cart_common::Cents;
use serde::{Deserialize, Serialize};

pub use crate::events::CartLineView;
use crate::db_types::{OrderToken, Product, ProductId, TopicId};

/// The cart as a client renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartView {
    /// The topic to subscribe to for live updates of this cart.
    pub topic_id: TopicId,
    pub lines: Vec<CartLineView>,
    pub total_quantity: i64,
    pub subtotal: Cents,
    /// The last order this session checked out, if any.
    pub order_token: Option<OrderToken>,
}

impl CartView {
    pub fn new(topic_id: TopicId, snapshot: Vec<(Product, i64)>, order_token: Option<OrderToken>) -> Self {
        let lines = snapshot
            .into_iter()
            .map(|(p, qty)| CartLineView::new(p.id, p.name, p.price, qty))
            .collect::<Vec<CartLineView>>();
        let total_quantity = lines.iter().map(|l| l.quantity).sum();
        let subtotal = lines.iter().map(|l| l.line_total).sum();
        Self { topic_id, lines, total_quantity, subtotal, order_token }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToCartResult {
    pub product_id: ProductId,
    pub requested_qty: i64,
    /// Quantity of the product now in the cart, after clamping. May be less than requested.
    pub line_qty: i64,
    pub total_qty: i64,
    pub cart: CartView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveFromCartResult {
    pub product_id: ProductId,
    pub total_qty: i64,
    pub cart: CartView,
}

/// Where to send the shopper once checkout has succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRedirect {
    /// The processor's hosted payment page.
    pub redirect_url: String,
    pub gateway_session_id: String,
    pub order_token: OrderToken,
}
