use cart_engine::{
    cart_objects::{AddToCartResult, CartView, RemoveFromCartResult},
    db_types::{OrderToken, ProductId, SettlementOutcome},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCartItemRequest {
    pub product_id: ProductId,
    /// Defaults to 1.
    #[serde(default)]
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveCartItemParams {
    #[serde(default)]
    pub product_id: Option<ProductId>,
}

/// Cart summary returned after every mutation, so that the client can refresh its badge and line without a reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSummary {
    /// The product that was added or removed. Absent when nothing changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    /// Quantity of the product now in the cart. Absent on removals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_qty: Option<i64>,
    pub total_qty: i64,
    pub cart: CartView,
}

impl From<AddToCartResult> for CartSummary {
    fn from(value: AddToCartResult) -> Self {
        Self {
            product_id: Some(value.product_id),
            line_qty: Some(value.line_qty),
            total_qty: value.total_qty,
            cart: value.cart,
        }
    }
}

impl From<RemoveFromCartResult> for CartSummary {
    fn from(value: RemoveFromCartResult) -> Self {
        Self { product_id: Some(value.product_id), line_qty: None, total_qty: value.total_qty, cart: value.cart }
    }
}

impl CartSummary {
    pub fn unchanged(cart: CartView) -> Self {
        Self { product_id: None, line_qty: None, total_qty: cart.total_quantity, cart }
    }
}

/// Returned to asynchronous clients in place of a `303 See Other`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutNavigation {
    pub navigate_to: String,
    pub order_token: OrderToken,
}

/// Query string the payment processor appends when it sends the shopper back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentReturnParams {
    pub cart_token: Option<String>,
    /// The processor's checkout session id. Informational only.
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Settled,
    AlreadyPaid,
    NotFound,
    Unavailable,
}

/// What the payment success page shows. It is always served with a 200.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementPage {
    pub status: SettlementStatus,
    pub order_token: Option<OrderToken>,
    pub paid: bool,
    pub message: String,
}

impl SettlementPage {
    pub fn from_outcome(token: OrderToken, outcome: &SettlementOutcome) -> Self {
        let (status, message) = match outcome {
            SettlementOutcome::Settled(_) => (SettlementStatus::Settled, "Thank you! Your payment has been received."),
            SettlementOutcome::AlreadyPaid(_) => (SettlementStatus::AlreadyPaid, "This order has already been paid."),
            SettlementOutcome::NotFound => (SettlementStatus::NotFound, "We could not find that order."),
        };
        Self { status, order_token: Some(token), paid: outcome.is_paid(), message: message.to_string() }
    }

    pub fn not_found(token: Option<OrderToken>) -> Self {
        Self {
            status: SettlementStatus::NotFound,
            order_token: token,
            paid: false,
            message: "We could not find that order.".to_string(),
        }
    }

    pub fn unavailable(token: OrderToken) -> Self {
        Self {
            status: SettlementStatus::Unavailable,
            order_token: Some(token),
            paid: false,
            message: "We could not confirm your payment right now. Please reload this page in a moment.".to_string(),
        }
    }
}
