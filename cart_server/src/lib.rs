//! # Cart server
//! The HTTP front end of the session cart engine. It is responsible for:
//! * Identifying each visitor's browsing session with a cookie.
//! * Exposing cart mutations, checkout and payment confirmation over HTTP.
//! * Streaming cart changes to every open tab of a session as server-sent events.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `GET /health`: A health check route that returns a 200 OK response.
//! * `GET /cart`: The session's cart.
//! * `POST /cart_items`: Add a product to the cart. JSON body `{"product_id": 1, "quantity": 2}`.
//! * `DELETE /cart_items?product_id=1`: Remove a product from the cart.
//! * `GET /cart/stream`: Server-sent cart change events for the session.
//! * `POST /checkout`: Turn the cart into an order and go to the payment page.
//! * `GET /checkout/success?cart_token=..`: Where the payment processor sends the shopper back to.
//! * `GET /orders/mine`: The last order placed in this session.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod event_stream;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod session_expiry_worker;

#[cfg(test)]
mod endpoint_tests;
