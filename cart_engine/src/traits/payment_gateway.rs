use cart_common::Cents;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::OrderToken;

/// A price quote for one order line: the product's current unit price times the clamped quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayLineItem {
    pub name: String,
    pub unit_amount: Cents,
    pub quantity: i64,
}

impl GatewayLineItem {
    pub fn total(&self) -> Cents {
        self.unit_amount * self.quantity
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayCheckoutRequest {
    pub line_items: Vec<GatewayLineItem>,
    pub success_url: String,
    pub cancel_url: String,
    /// The order the payment is for. Processors that support a client reference should record it.
    pub order_token: OrderToken,
}

/// A payment session opened with the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySession {
    /// The processor's hosted payment page. The shopper is sent here.
    pub redirect_url: String,
    /// The processor's own id for the session.
    pub session_handle: String,
}

/// An external payment processor that hosts the payment page.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// Whether the gateway has the credentials it needs. Checkout refuses to start when this is false.
    fn is_configured(&self) -> bool {
        true
    }

    async fn create_checkout_session(&self, request: GatewayCheckoutRequest) -> Result<GatewaySession, GatewayError>;
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("The payment gateway is not configured")]
    NotConfigured,
    /// The processor refused the request. The message is the processor's own and is shown to the shopper as is.
    #[error("{0}")]
    Rejected(String),
    #[error("The payment gateway could not be reached: {0}")]
    Unavailable(String),
}
