//! # Cart engine public API
//!
//! The API is split by concern so that clients pick only what they need:
//!
//! * [`shopping_cart_api`] adds and removes cart lines and renders the cart, broadcasting every change to the
//!   session's viewers.
//! * [`checkout_api`] turns a session cart into a durable order and opens a payment session for it.
//! * [`settlement_api`] confirms payment for an order, marking it paid and taking its units out of stock.
//!
//! Every API is created by handing it a backend that implements the traits it needs, and, where relevant, the shared
//! [`crate::SessionCartStore`] and a [`crate::events::CartNotifier`].
//!
//! ```rust,ignore
//! use cart_engine::{events::CartBroadcaster, CartApi, SessionCartStore, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/cart_store.db", 5).await?;
//! let api = CartApi::new(db, SessionCartStore::new(), Arc::new(CartBroadcaster::default()));
//! let result = api.add_to_cart(&session_id, ProductId(1), Some(2)).await?;
//! ```
pub mod cart_objects;
pub mod checkout_api;
pub mod errors;
pub mod settlement_api;
pub mod shopping_cart_api;
