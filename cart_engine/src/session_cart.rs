//! # Session carts
//!
//! A session cart is the ephemeral, per-visitor selection of products. It is not persisted: it lives in the
//! [`SessionCartStore`] until the session has been idle for longer than the store's eviction window, and is only
//! turned into durable rows at checkout.
//!
//! Every mutation happens under a single acquisition of the store's write lock, so concurrent requests from the same
//! session serialize, and there is no window in which a line can exceed its cap. Reads never create an entry.
use std::{
    collections::{hash_map::RandomState, BTreeMap, HashMap},
    hash::BuildHasher,
    sync::Arc,
};

use chrono::{DateTime, Duration, Utc};
use log::*;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{
    db_types::{OrderToken, Product, ProductId, SessionId, TopicId},
    stock_guard::clamp_quantity,
    traits::{Catalog, CatalogError},
};

/// The state kept for a session: its cart lines and the last order it checked out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCart {
    pub lines: BTreeMap<ProductId, i64>,
    pub order_token: Option<OrderToken>,
    /// Time of the last mutation.
    pub last_active: DateTime<Utc>,
}

impl Default for SessionCart {
    fn default() -> Self {
        Self { lines: BTreeMap::new(), order_token: None, last_active: Utc::now() }
    }
}

impl SessionCart {
    pub fn total_quantity(&self) -> i64 {
        self.lines.values().sum()
    }

    pub fn quantity_of(&self, product_id: ProductId) -> i64 {
        self.lines.get(&product_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn touch(&mut self) {
        self.last_active = Utc::now();
    }
}

/// The outcome of adding to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineUpdate {
    /// Quantity of the product now in the cart. 0 if the product is sold out.
    pub line_qty: i64,
    /// Total number of units across all lines.
    pub total_qty: i64,
}

/// Per-session carts, shared by every worker.
///
/// Broadcast topics are derived from the session id with a key that is random per store, so a session's topic is
/// stable for the life of the process without being stored, and cannot be worked out from the topic alone.
#[derive(Debug, Clone, Default)]
pub struct SessionCartStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionCart>>>,
    topic_key: RandomState,
}

impl SessionCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `requested` units of `product` to the session cart, clamped against the line cap and the product's stock.
    ///
    /// The caller must have looked up `product` in the catalog; the store does not check that it exists.
    pub async fn add_line(&self, session_id: &SessionId, product: &Product, requested: i64) -> LineUpdate {
        let mut sessions = self.sessions.write().await;
        let cart = sessions.entry(session_id.clone()).or_default();
        cart.touch();
        let existing = cart.quantity_of(product.id);
        let line_qty = clamp_quantity(requested, existing, product.stock_quantity);
        if line_qty > 0 {
            cart.lines.insert(product.id, line_qty);
        } else {
            cart.lines.remove(&product.id);
        }
        let total_qty = cart.total_quantity();
        debug!(
            "🛒️ Session cart now holds {line_qty} of product {} (requested {requested}, stock {}). Total: {total_qty}",
            product.id, product.stock_quantity
        );
        LineUpdate { line_qty, total_qty }
    }

    /// Removes the line for `product_id`, if there is one. Returns the new total quantity.
    pub async fn remove_line(&self, session_id: &SessionId, product_id: ProductId) -> i64 {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(cart) => {
                cart.touch();
                if cart.lines.remove(&product_id).is_some() {
                    debug!("🛒️ Removed product {product_id} from session cart");
                }
                cart.total_quantity()
            },
            None => 0,
        }
    }

    /// The lines of the cart, paired with their current catalog entries, in product id order.
    ///
    /// Lines whose product has disappeared from the catalog are silently left out.
    pub async fn snapshot<C: Catalog>(
        &self,
        session_id: &SessionId,
        catalog: &C,
    ) -> Result<Vec<(Product, i64)>, CatalogError> {
        let lines = self.lines(session_id).await;
        if lines.is_empty() {
            return Ok(Vec::new());
        }
        let ids = lines.keys().copied().collect::<Vec<ProductId>>();
        let products = catalog.find_products(&ids).await?;
        let mut by_id = products.into_iter().map(|p| (p.id, p)).collect::<HashMap<ProductId, Product>>();
        let snapshot = lines
            .into_iter()
            .filter_map(|(id, qty)| match by_id.remove(&id) {
                Some(product) => Some((product, qty)),
                None => {
                    trace!("🛒️ Product {id} is no longer in the catalog. Leaving it out of the cart snapshot.");
                    None
                },
            })
            .collect();
        Ok(snapshot)
    }

    /// A copy of the raw cart lines.
    pub async fn lines(&self, session_id: &SessionId) -> BTreeMap<ProductId, i64> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).map(|c| c.lines.clone()).unwrap_or_default()
    }

    /// Empties the cart. The session's topic id and order token are kept.
    pub async fn clear(&self, session_id: &SessionId) {
        let mut sessions = self.sessions.write().await;
        if let Some(cart) = sessions.get_mut(session_id) {
            cart.touch();
            cart.lines.clear();
            debug!("🛒️ Session cart cleared");
        }
    }

    pub async fn total_quantity(&self, session_id: &SessionId) -> i64 {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).map(SessionCart::total_quantity).unwrap_or(0)
    }

    /// The broadcast topic of the session (16 hex characters). Always the same for a given session id.
    pub fn topic_for(&self, session_id: &SessionId) -> TopicId {
        TopicId(format!("{:016x}", self.topic_key.hash_one(session_id.as_str())))
    }

    pub async fn remember_order_token(&self, session_id: &SessionId, token: OrderToken) {
        let mut sessions = self.sessions.write().await;
        let cart = sessions.entry(session_id.clone()).or_default();
        cart.touch();
        cart.order_token = Some(token);
    }

    pub async fn order_token(&self, session_id: &SessionId) -> Option<OrderToken> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).and_then(|c| c.order_token.clone())
    }

    /// Forgets every session that has not been mutated for longer than `max_idle`. Returns how many were dropped.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, cart| cart.last_active > cutoff);
        before - sessions.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
