//! Per-session fan-out of cart changes.
//!
//! Each topic owns a `tokio::sync::broadcast` channel. Every live connection that subscribes to a topic gets its own
//! receiver; a publish is a single non-blocking `send`. Subscribers that fall behind by more than the buffer size lose
//! the oldest events, which is fine since each event carries the full cart state.
use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use log::*;
use tokio::sync::broadcast;

use crate::{db_types::TopicId, events::CartChanged};

pub const DEFAULT_BROADCAST_BUFFER: usize = 32;

/// The advisory side of a cart mutation. Implementations must swallow and log their own failures; there is nothing
/// the caller could do about them.
pub trait CartNotifier: Send + Sync {
    fn notify(&self, topic: &TopicId, event: CartChanged);
}

/// A notifier that drops everything. Useful when nobody is watching.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl CartNotifier for NullNotifier {
    fn notify(&self, topic: &TopicId, _event: CartChanged) {
        trace!("📡️ Dropping cart event for {topic}");
    }
}

#[derive(Debug, Clone)]
pub struct CartBroadcaster {
    topics: Arc<RwLock<HashMap<TopicId, broadcast::Sender<CartChanged>>>>,
    buffer_size: usize,
}

impl Default for CartBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_BUFFER)
    }
}

impl CartBroadcaster {
    pub fn new(buffer_size: usize) -> Self {
        Self { topics: Arc::new(RwLock::new(HashMap::new())), buffer_size: buffer_size.max(1) }
    }

    /// Attaches a new subscriber to `topic`. The subscription ends when the receiver is dropped.
    pub fn subscribe(&self, topic: &TopicId) -> broadcast::Receiver<CartChanged> {
        let mut topics = self.write_topics();
        let sender = topics.entry(topic.clone()).or_insert_with(|| {
            debug!("📡️ Opening broadcast channel for {topic}");
            broadcast::channel(self.buffer_size).0
        });
        sender.subscribe()
    }

    /// Sends `event` to every current subscriber of `topic` and returns how many there were.
    ///
    /// Never blocks and never fails. A topic whose subscribers have all gone away is closed.
    pub fn publish(&self, topic: &TopicId, event: CartChanged) -> usize {
        let result = match self.read_topics().get(topic) {
            Some(sender) => sender.send(event),
            None => {
                trace!("📡️ Nobody is listening on {topic}. Cart event dropped.");
                return 0;
            },
        };
        match result {
            Ok(n) => {
                trace!("📡️ Cart event for {topic} delivered to {n} subscriber(s)");
                n
            },
            Err(_) => {
                self.release(topic);
                0
            },
        }
    }

    /// Closes `topic` if nobody is subscribed to it any more. Call this when a subscriber goes away.
    pub fn release(&self, topic: &TopicId) {
        let mut topics = self.write_topics();
        if topics.get(topic).map(|s| s.receiver_count() == 0).unwrap_or(false) {
            topics.remove(topic);
            debug!("📡️ Last subscriber of {topic} has left. Channel closed.");
        }
    }

    pub fn subscriber_count(&self, topic: &TopicId) -> usize {
        self.read_topics().get(topic).map(|s| s.receiver_count()).unwrap_or(0)
    }

    pub fn topic_count(&self) -> usize {
        self.read_topics().len()
    }

    // A panic while holding the lock cannot leave the map half-updated, so a poisoned lock is still usable.
    fn read_topics(&self) -> RwLockReadGuard<'_, HashMap<TopicId, broadcast::Sender<CartChanged>>> {
        self.topics.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_topics(&self) -> RwLockWriteGuard<'_, HashMap<TopicId, broadcast::Sender<CartChanged>>> {
        self.topics.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CartNotifier for CartBroadcaster {
    fn notify(&self, topic: &TopicId, event: CartChanged) {
        self.publish(topic, event);
    }
}
