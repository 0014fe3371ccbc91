//! Quantity caps for cart lines.
//!
//! The same arithmetic is applied when an item is added to a cart and again at checkout, because stock may have
//! shrunk in the meantime. A line may never hold more than [`MAX_QUANTITY_PER_LINE`] units, nor more than is
//! currently in stock.

/// Fixed ceiling on the quantity of a single product in one cart.
pub const MAX_QUANTITY_PER_LINE: i64 = 5;

/// The most of a product a single line may hold right now.
pub fn line_cap(stock_quantity: i64) -> i64 {
    MAX_QUANTITY_PER_LINE.min(stock_quantity).max(0)
}

/// Returns the new quantity of a line after adding `requested` units to the `existing` quantity.
///
/// `requested` is treated as at least 1. The result is `min(existing + requested, min(5, stock))`, and is 0 when the
/// product is sold out.
pub fn clamp_quantity(requested: i64, existing: i64, stock_quantity: i64) -> i64 {
    let requested = requested.max(1);
    existing.max(0).saturating_add(requested).min(line_cap(stock_quantity))
}

/// Re-validates a stored cart quantity against current stock at checkout time. A result of 0 means the line must be
/// dropped from the order.
pub fn checkout_quantity(stored: i64, stock_quantity: i64) -> i64 {
    clamp_quantity(stored, 0, stock_quantity)
}

/// Stock left after selling `quantity` units. Never negative.
pub fn decrement_stock(stock_quantity: i64, quantity: i64) -> i64 {
    stock_quantity.saturating_sub(quantity).max(0)
}
