//! Adapters between the cart engine's backend traits and third-party services.
mod stripe;

pub use stripe::StripeGateway;
