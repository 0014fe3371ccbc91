use cart_common::Cents;
use serde::{Deserialize, Serialize};

/// One priced entry on the hosted payment page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLineItem {
    pub name: String,
    pub unit_amount: Cents,
    pub quantity: i64,
}

impl CheckoutLineItem {
    pub fn new<S: Into<String>>(name: S, unit_amount: Cents, quantity: i64) -> Self {
        Self { name: name.into(), unit_amount, quantity }
    }

    pub fn total(&self) -> Cents {
        self.unit_amount * self.quantity
    }
}

/// Parameters for a new one-off card payment session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCheckoutSession {
    pub line_items: Vec<CheckoutLineItem>,
    pub success_url: String,
    pub cancel_url: String,
    /// Our own reference for the session. The processor echoes it back on the session object.
    pub client_reference_id: Option<String>,
}

/// The subset of the processor's checkout session object that we care about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// The hosted payment page. Only absent for sessions that have already completed or expired.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub client_reference_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}
