//! Data types shared by the cart engine, its backends and its clients.
use std::{fmt::Display, str::FromStr};

use cart_common::Cents;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

//--------------------------------------       ProductId       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for ProductId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ProductId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

//--------------------------------------       SessionId       ---------------------------------------------------------
/// The opaque key of a visitor's browsing session. Issued by the HTTP layer; the engine never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl<S: Into<String>> From<S> for SessionId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------        TopicId        ---------------------------------------------------------
/// Routing key for cart change notifications. One per session, stable for the session's lifetime.
///
/// A topic id is not a credential. Knowing it only lets you watch cart totals change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(pub String);

impl<S: Into<String>> From<S> for TopicId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for TopicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cart_{}", self.0)
    }
}

impl TopicId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------       OrderToken      ---------------------------------------------------------
/// The externally shareable handle of an order. It is embedded in the payment success URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderToken(pub String);

impl<S: Into<String>> From<S> for OrderToken {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for OrderToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------        Product        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Cents,
    pub stock_quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Cents,
    pub stock_quantity: i64,
}

impl NewProduct {
    pub fn new<S: Into<String>>(name: S, price: Cents, stock_quantity: i64) -> Self {
        let name = name.into();
        Self { description: format!("{name} (no description)"), name, price, stock_quantity }
    }
}

//--------------------------------------         Order         ---------------------------------------------------------
/// A durable, token-addressable order. Once `paid` is set, neither the order nor its lines change again.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub token: OrderToken,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       OrderLine       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub product_id: ProductId,
    pub quantity: i64,
}

/// A line to be written as part of a new order. Quantities must already have been clamped against stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl NewOrderLine {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        Self { product_id, quantity }
    }
}

/// An order along with its lines, as shown on the "my order" page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

impl OrderDetail {
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

//--------------------------------------   SettlementOutcome   ---------------------------------------------------------
/// The result of confirming payment for an order token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "order", rename_all = "snake_case")]
pub enum SettlementOutcome {
    /// The order was unpaid. It is now paid, and stock has been decremented for each of these lines.
    Settled(OrderDetail),
    /// The order had already been settled. Nothing was changed.
    AlreadyPaid(Order),
    /// No order carries this token.
    NotFound,
}

impl SettlementOutcome {
    pub fn order(&self) -> Option<&Order> {
        match self {
            Self::Settled(detail) => Some(&detail.order),
            Self::AlreadyPaid(o) => Some(o),
            Self::NotFound => None,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.order().map(|o| o.paid).unwrap_or(false)
    }
}
