//! Payment settlement.
//!
//! Confirmation arrives when the shopper is redirected back from the payment page, which means it can be replayed by
//! reloading the page or tampered with by editing the URL. Settlement therefore treats unknown tokens as a neutral
//! outcome and is idempotent for known ones.
use std::fmt::Debug;

use log::*;

use crate::{
    cart_api::errors::SettlementError,
    db_types::{OrderDetail, OrderToken, SettlementOutcome},
    events::{EventProducers, OrderPaidEvent},
    traits::OrderManagement,
};

pub struct SettlementApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for SettlementApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SettlementApi")
    }
}

impl<B> SettlementApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> SettlementApi<B>
where B: OrderManagement
{
    /// Marks the order paid and decrements stock for each of its lines.
    ///
    /// Calling this again for the same token is a no-op that reports [`SettlementOutcome::AlreadyPaid`]. Order paid
    /// hooks fire only on the call that actually settled the order.
    pub async fn confirm_payment(&self, token: &OrderToken) -> Result<SettlementOutcome, SettlementError> {
        let outcome = self.db.settle_order(token).await?;
        match &outcome {
            SettlementOutcome::Settled(detail) => {
                info!("✅️ Order #{} [{token}] is paid. Stock has been updated.", detail.order.id);
                let event = OrderPaidEvent::new(detail.order.clone(), detail.lines.clone());
                self.producers.publish_order_paid(event).await;
            },
            SettlementOutcome::AlreadyPaid(order) => {
                debug!("✅️ Order #{} [{token}] was already paid. Nothing to do.", order.id);
            },
            SettlementOutcome::NotFound => {
                info!("✅️ Payment confirmation for unknown order token [{token}] ignored");
            },
        }
        Ok(outcome)
    }

    /// The order carrying `token`, along with its lines.
    pub async fn order_for_token(&self, token: &OrderToken) -> Result<Option<OrderDetail>, SettlementError> {
        let order = match self.db.fetch_order_by_token(token).await? {
            Some(order) => order,
            None => return Ok(None),
        };
        let lines = self.db.fetch_order_lines(order.id).await?;
        Ok(Some(OrderDetail { order, lines }))
    }
}
