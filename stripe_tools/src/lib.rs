//! A small client for the hosted-checkout API of the payment processor.
//!
//! Only the calls the cart service needs are implemented: creating a checkout session for a list of priced line
//! items, and reporting the processor's error messages verbatim so that they can be shown to the shopper.
mod api;
mod config;
mod error;
pub mod helpers;

mod data_objects;

pub use api::StripeApi;
pub use config::StripeConfig;
pub use data_objects::{CheckoutLineItem, CheckoutSession, NewCheckoutSession};
pub use error::StripeApiError;
