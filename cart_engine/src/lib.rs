//! # Cart engine
//!
//! The core of the session cart service: an ephemeral per-session cart, the checkout transition that turns it into a
//! durable order, the payment settlement that marks the order paid and takes its units out of stock, and the fan-out
//! that keeps every open tab of a session in sync with its cart.
//!
//! The library is organised as follows:
//! 1. Data types ([`mod@db_types`]) and the pure quantity rules ([`mod@stock_guard`]).
//! 2. The in-memory [`SessionCartStore`].
//! 3. Backend contracts ([`mod@traits`]): the catalog, order persistence and the payment gateway. [`SqliteDatabase`]
//!    implements the first two.
//! 4. The public API: [`CartApi`], [`CheckoutApi`] and [`SettlementApi`]. Each is created from a backend and whatever
//!    shared state it needs.
//! 5. Events ([`mod@events`]): lifecycle hooks for the hosting application and the per-session [`CartBroadcaster`].
//!
//! [`CartBroadcaster`]: events::CartBroadcaster
mod cart_api;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod session_cart;
pub mod stock_guard;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use cart_api::{
    cart_objects,
    checkout_api::{CheckoutApi, CheckoutState, CheckoutUrls, CHECKOUT_SESSION_ID_PLACEHOLDER},
    errors::{CartApiError, CheckoutError, SettlementError},
    settlement_api::SettlementApi,
    shopping_cart_api::CartApi,
};
pub use session_cart::{LineUpdate, SessionCart, SessionCartStore};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
