//! # Engine events
//!
//! Two flavours of notification leave the engine:
//!
//! * **Hooks** ([`EventHooks`]) are async callbacks registered by the hosting application for durable lifecycle events
//!   such as an order being created at checkout or settled. They run on their own tasks, fed through a bounded channel,
//!   so a slow hook never holds up a request.
//! * **Cart broadcasts** ([`CartBroadcaster`]) fan out [`CartChanged`] events to every live connection watching a
//!   session's topic. These are advisory only: they are never retried, never persisted, and a failure to deliver one
//!   never reaches the caller that mutated the cart.
mod broadcaster;
mod channel;
mod event_types;
mod hooks;

pub use broadcaster::{CartBroadcaster, CartNotifier, NullNotifier, DEFAULT_BROADCAST_BUFFER};
pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
