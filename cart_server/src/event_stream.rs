//! The body of a `/cart/stream` response.
//!
//! [`CartEventStream`] turns a topic subscription into server-sent event frames and gives the topic back to the
//! broadcaster when the client goes away, so that closed tabs do not leave channels behind.
use std::{
    pin::Pin,
    task::{Context, Poll},
};

use actix_web::web::{self, Bytes};
use cart_engine::{
    db_types::TopicId,
    events::{CartBroadcaster, CartChanged},
};
use futures::Stream;
use log::*;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

pub struct CartEventStream {
    // Only `None` while being dropped
    events: Option<BroadcastStream<CartChanged>>,
    topic: TopicId,
    broadcaster: web::Data<CartBroadcaster>,
}

impl CartEventStream {
    pub fn subscribe(broadcaster: web::Data<CartBroadcaster>, topic: TopicId) -> Self {
        let events = BroadcastStream::new(broadcaster.subscribe(&topic));
        Self { events: Some(events), topic, broadcaster }
    }
}

impl Stream for CartEventStream {
    type Item = Bytes;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let Some(events) = this.events.as_mut() else {
            return Poll::Ready(None);
        };
        loop {
            match Pin::new(&mut *events).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => {
                    if let Some(frame) = sse_frame(&event) {
                        return Poll::Ready(Some(frame));
                    }
                },
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(n)))) => {
                    warn!("💻️ Cart stream on {} fell behind and skipped {n} event(s)", this.topic);
                },
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl Drop for CartEventStream {
    fn drop(&mut self) {
        // The receiver must be gone before the broadcaster counts what is left
        self.events.take();
        debug!("💻️ Cart stream subscriber on {} disconnected", self.topic);
        self.broadcaster.release(&self.topic);
    }
}

fn sse_frame(event: &CartChanged) -> Option<Bytes> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Bytes::from(format!("event: cart\ndata: {json}\n\n"))),
        Err(e) => {
            error!("💻️ Could not serialize cart event for {}. {e}", event.topic);
            None
        },
    }
}
