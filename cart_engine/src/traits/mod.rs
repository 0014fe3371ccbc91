//! # Backend contracts
//!
//! The cart engine is agnostic about where products and orders live and about which payment processor takes the
//! money. These traits define what a backend must provide.
//!
//! * [`Catalog`] is the read-only view of the product catalog.
//! * [`OrderManagement`] persists orders and performs the settlement transaction.
//! * [`PaymentGateway`] creates hosted payment sessions with an external processor.
//!
//! [`CartBackend`] is shorthand for a backend that is both a catalog and an order store.
//!
//! [`crate::SqliteDatabase`] implements the first two. Gateways are implemented by the hosting application.
mod catalog;
mod order_management;
mod payment_gateway;

pub use catalog::{Catalog, CatalogError};
pub use order_management::{OrderManagement, OrderManagementError};
pub use payment_gateway::{GatewayCheckoutRequest, GatewayError, GatewayLineItem, GatewaySession, PaymentGateway};

/// A backend that can both price a cart and persist the resulting order. Checkout needs both.
pub trait CartBackend: Catalog + OrderManagement {}

impl<T> CartBackend for T where T: Catalog + OrderManagement {}
