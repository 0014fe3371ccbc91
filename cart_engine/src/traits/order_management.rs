use thiserror::Error;

use crate::db_types::{NewOrderLine, Order, OrderDetail, OrderLine, OrderToken, SettlementOutcome};

/// Persistence of orders and the payment settlement transaction.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Creates a new unpaid order with a fresh token, together with its lines, in a single atomic transaction.
    /// Returns the stored order and lines.
    ///
    /// `lines` must not be empty and must not contain the same product twice.
    async fn create_order(&self, lines: &[NewOrderLine]) -> Result<OrderDetail, OrderManagementError>;

    /// Deletes an order and its lines. Returns `false` if there was no such order.
    ///
    /// Used to roll back a checkout that never obtained a payment session. Paid orders cannot be deleted.
    async fn delete_order(&self, order_id: i64) -> Result<bool, OrderManagementError>;

    async fn fetch_order_by_token(&self, token: &OrderToken) -> Result<Option<Order>, OrderManagementError>;

    async fn fetch_order_lines(&self, order_id: i64) -> Result<Vec<OrderLine>, OrderManagementError>;

    /// Marks the order paid and decrements stock for each of its lines, in a single atomic transaction.
    ///
    /// The paid flag is flipped with a compare-and-set, and stock is only touched when the flip succeeded, so calling
    /// this more than once for the same token decrements stock exactly once. Stock never drops below zero.
    async fn settle_order(&self, token: &OrderToken) -> Result<SettlementOutcome, OrderManagementError>;
}

#[derive(Debug, Clone, Error)]
pub enum OrderManagementError {
    #[error("Order database error: {0}")]
    DatabaseError(String),
    #[error("An order must have at least one line")]
    EmptyOrder,
    #[error("Product {0} appears more than once in the order")]
    DuplicateLine(i64),
    #[error("Order quantities must be positive (got {0})")]
    InvalidQuantity(i64),
    #[error("Order #{0} has been paid and can no longer be changed")]
    OrderIsPaid(i64),
}

impl From<sqlx::Error> for OrderManagementError {
    fn from(e: sqlx::Error) -> Self {
        OrderManagementError::DatabaseError(e.to_string())
    }
}
