//! # Checkout
//!
//! A checkout attempt runs through a small state machine:
//!
//! ```text
//!   Empty ──▶ Reserving ──▶ AwaitingGateway ──▶ Committed
//!     │           │                │
//!     └───────────┴────────────────┴──────────▶ Aborted
//! ```
//!
//! Every line is re-clamped against the stock level *at checkout time*, since stock may have shrunk since the item was
//! added. Lines that clamp to zero are dropped. The order and its lines are written in one transaction, and if the
//! payment gateway then refuses to open a session, the order is deleted again. An aborted checkout therefore leaves
//! no rows behind and does not touch the session cart, so the shopper can simply retry.
//!
//! Two concurrent checkouts for the same session are not deduplicated and will produce two orders.
use std::{fmt::Display, sync::Arc};

use log::*;

use crate::{
    cart_api::{cart_objects::CheckoutRedirect, errors::CheckoutError},
    db_types::{NewOrderLine, Order, OrderToken, SessionId},
    events::{CartChanged, CartNotifier, EventProducers, OrderCreatedEvent},
    session_cart::SessionCartStore,
    stock_guard::checkout_quantity,
    traits::{Catalog, GatewayCheckoutRequest, GatewayLineItem, OrderManagement, PaymentGateway},
};

/// Placeholder the payment processor substitutes with its own session id when redirecting back.
pub const CHECKOUT_SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    Empty,
    Reserving,
    AwaitingGateway,
    Committed,
    Aborted,
}

impl Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Empty => "Empty",
            Self::Reserving => "Reserving",
            Self::AwaitingGateway => "AwaitingGateway",
            Self::Committed => "Committed",
            Self::Aborted => "Aborted",
        };
        f.write_str(s)
    }
}

/// The URLs handed to the payment processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutUrls {
    base_url: String,
}

impl CheckoutUrls {
    /// `public_url` is the externally visible root of this service, e.g. `https://shop.example.com`.
    pub fn new<S: AsRef<str>>(public_url: S) -> Self {
        Self { base_url: public_url.as_ref().trim_end_matches('/').to_string() }
    }

    pub fn success_url(&self, token: &OrderToken) -> String {
        format!("{}/checkout/success?cart_token={token}&session_id={CHECKOUT_SESSION_ID_PLACEHOLDER}", self.base_url)
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/cart", self.base_url)
    }
}

pub struct CheckoutApi<B, G> {
    db: B,
    gateway: G,
    sessions: SessionCartStore,
    notifier: Arc<dyn CartNotifier>,
    producers: EventProducers,
    urls: CheckoutUrls,
}

impl<B, G> std::fmt::Debug for CheckoutApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi ({:?})", self.urls)
    }
}

impl<B, G> CheckoutApi<B, G> {
    pub fn new(
        db: B,
        gateway: G,
        sessions: SessionCartStore,
        notifier: Arc<dyn CartNotifier>,
        producers: EventProducers,
        urls: CheckoutUrls,
    ) -> Self {
        Self { db, gateway, sessions, notifier, producers, urls }
    }

    pub fn urls(&self) -> &CheckoutUrls {
        &self.urls
    }
}

impl<B, G> CheckoutApi<B, G>
where
    B: Catalog + OrderManagement,
    G: PaymentGateway,
{
    /// Converts the session's cart into an unpaid order and opens a payment session for it.
    ///
    /// On success the session cart is cleared, the order token is remembered in the session, and the caller gets the
    /// processor's payment page to send the shopper to. On any failure nothing is persisted and the cart is untouched.
    pub async fn begin_checkout(&self, session_id: &SessionId) -> Result<CheckoutRedirect, CheckoutError> {
        let snapshot = self.sessions.snapshot(session_id, &self.db).await?;
        if snapshot.is_empty() {
            debug!("💳️ [{}] Checkout refused. The cart is empty.", CheckoutState::Empty);
            return Err(CheckoutError::EmptyCart);
        }
        if !self.gateway.is_configured() {
            warn!("💳️ Checkout refused. The payment gateway has not been configured.");
            return Err(CheckoutError::GatewayNotConfigured);
        }
        trace!("💳️ [{}] Re-validating {} cart line(s) against current stock", CheckoutState::Reserving, snapshot.len());
        let mut lines = Vec::with_capacity(snapshot.len());
        let mut line_items = Vec::with_capacity(snapshot.len());
        for (product, stored_qty) in snapshot {
            let quantity = checkout_quantity(stored_qty, product.stock_quantity);
            if quantity <= 0 {
                info!(
                    "💳️ Product {} ({}) sold out since it was added to the cart. Dropping it from the order.",
                    product.id, product.name
                );
                continue;
            }
            if quantity < stored_qty {
                debug!("💳️ Product {} reduced from {stored_qty} to {quantity} at checkout", product.id);
            }
            lines.push(NewOrderLine::new(product.id, quantity));
            line_items.push(GatewayLineItem { name: product.name, unit_amount: product.price, quantity });
        }
        if lines.is_empty() {
            info!("💳️ [{}] None of the cart lines are in stock any more", CheckoutState::Aborted);
            return Err(CheckoutError::NoValidLines);
        }
        let detail = self.db.create_order(&lines).await?;
        let order = detail.order;
        debug!(
            "💳️ [{}] Order #{} [{}] reserved with {} line(s)",
            CheckoutState::Reserving,
            order.id,
            order.token,
            lines.len()
        );

        let request = GatewayCheckoutRequest {
            line_items,
            success_url: self.urls.success_url(&order.token),
            cancel_url: self.urls.cancel_url(),
            order_token: order.token.clone(),
        };
        trace!("💳️ [{}] Requesting payment session for order #{}", CheckoutState::AwaitingGateway, order.id);
        let session = match self.gateway.create_checkout_session(request).await {
            Ok(session) => session,
            Err(e) => {
                warn!("💳️ Payment gateway refused order #{}: {e}", order.id);
                self.abort(&order).await;
                return Err(e.into());
            },
        };

        self.sessions.clear(session_id).await;
        self.sessions.remember_order_token(session_id, order.token.clone()).await;
        let topic = self.sessions.topic_for(session_id);
        self.notifier.notify(&topic, CartChanged::cleared(topic.clone()));
        info!(
            "💳️ [{}] Order #{} [{}] is awaiting payment in session {}",
            CheckoutState::Committed,
            order.id,
            order.token,
            session.session_handle
        );
        let event = OrderCreatedEvent {
            order: order.clone(),
            lines: detail.lines,
            gateway_session_id: session.session_handle.clone(),
        };
        self.producers.publish_order_created(event).await;
        Ok(CheckoutRedirect {
            redirect_url: session.redirect_url,
            gateway_session_id: session.session_handle,
            order_token: order.token,
        })
    }

    async fn abort(&self, order: &Order) {
        match self.db.delete_order(order.id).await {
            Ok(true) => debug!("💳️ [{}] Order #{} rolled back", CheckoutState::Aborted, order.id),
            Ok(false) => warn!("💳️ [{}] Order #{} was already gone when rolling back", CheckoutState::Aborted, order.id),
            Err(e) => error!(
                "💳️ [{}] Could not delete order #{} [{}] after the gateway failed. It is orphaned and unpaid. {e}",
                CheckoutState::Aborted,
                order.id,
                order.token
            ),
        }
    }
}
