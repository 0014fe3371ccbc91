//! Cart mutations and the cart view.
//!
//! The session cart is authoritative. Broadcasting the change is advisory and happens after the mutation has been
//! applied; nothing a notifier does can undo or fail a mutation.
use std::{fmt::Debug, sync::Arc};

use log::*;

use crate::{
    cart_api::{
        cart_objects::{AddToCartResult, CartView, RemoveFromCartResult},
        errors::CartApiError,
    },
    db_types::{ProductId, SessionId, TopicId},
    events::{CartChangeReason, CartChanged, CartNotifier},
    session_cart::SessionCartStore,
    traits::Catalog,
};

pub struct CartApi<B> {
    db: B,
    sessions: SessionCartStore,
    notifier: Arc<dyn CartNotifier>,
}

impl<B> Debug for CartApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CartApi")
    }
}

impl<B> CartApi<B> {
    pub fn new(db: B, sessions: SessionCartStore, notifier: Arc<dyn CartNotifier>) -> Self {
        Self { db, sessions, notifier }
    }

    pub fn sessions(&self) -> &SessionCartStore {
        &self.sessions
    }

    /// The session's broadcast topic.
    pub fn topic_for(&self, session_id: &SessionId) -> TopicId {
        self.sessions.topic_for(session_id)
    }
}

impl<B> CartApi<B>
where B: Catalog
{
    /// Adds `quantity` units (default 1) of a product to the session's cart.
    ///
    /// The quantity is clamped rather than rejected: the line never holds more than 5 units or more than is in stock.
    /// Adding a sold-out product is not an error; the line simply stays at 0.
    pub async fn add_to_cart(
        &self,
        session_id: &SessionId,
        product_id: ProductId,
        quantity: Option<i64>,
    ) -> Result<AddToCartResult, CartApiError> {
        let product = self.db.find_product(product_id).await?.ok_or(CartApiError::ProductNotFound(product_id))?;
        let requested_qty = quantity.unwrap_or(1);
        let update = self.sessions.add_line(session_id, &product, requested_qty).await;
        if update.line_qty < requested_qty {
            debug!("🛒️ Request for {requested_qty} of product {product_id} capped at {}", update.line_qty);
        }
        let cart = self.cart_view(session_id).await?;
        self.broadcast(&cart, CartChangeReason::LineAdded);
        Ok(AddToCartResult { product_id, requested_qty, line_qty: update.line_qty, total_qty: update.total_qty, cart })
    }

    /// Removes a product's line from the session's cart. Removing a line that is not there is a no-op.
    pub async fn remove_from_cart(
        &self,
        session_id: &SessionId,
        product_id: ProductId,
    ) -> Result<RemoveFromCartResult, CartApiError> {
        let total_qty = self.sessions.remove_line(session_id, product_id).await;
        let cart = self.cart_view(session_id).await?;
        self.broadcast(&cart, CartChangeReason::LineRemoved);
        Ok(RemoveFromCartResult { product_id, total_qty, cart })
    }

    /// The session's cart, priced from the live catalog. Lines for products that no longer exist are left out.
    pub async fn cart_view(&self, session_id: &SessionId) -> Result<CartView, CartApiError> {
        let snapshot = self.sessions.snapshot(session_id, &self.db).await?;
        let topic = self.sessions.topic_for(session_id);
        let order_token = self.sessions.order_token(session_id).await;
        Ok(CartView::new(topic, snapshot, order_token))
    }

    fn broadcast(&self, cart: &CartView, reason: CartChangeReason) {
        let event = CartChanged::new(cart.topic_id.clone(), reason, cart.lines.clone());
        self.notifier.notify(&cart.topic_id, event);
    }
}
