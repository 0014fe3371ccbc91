use log::*;
use sqlx::SqliteConnection;

use crate::db_types::{NewOrderLine, Order, OrderLine, OrderToken};

/// Inserts a new, unpaid order. This is not atomic on its own; run it inside a transaction together with
/// [`insert_order_line`].
pub async fn insert_order(token: &OrderToken, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let order: Order = sqlx::query_as("INSERT INTO orders (token) VALUES ($1) RETURNING *;")
        .bind(token)
        .fetch_one(conn)
        .await?;
    trace!("🗃️ Order #{} [{}] inserted", order.id, order.token);
    Ok(order)
}

pub async fn insert_order_line(
    order_id: i64,
    line: &NewOrderLine,
    conn: &mut SqliteConnection,
) -> Result<OrderLine, sqlx::Error> {
    let line = sqlx::query_as(
        r#"
            INSERT INTO order_lines (order_id, product_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(line.product_id)
    .bind(line.quantity)
    .fetch_one(conn)
    .await?;
    Ok(line)
}

pub async fn fetch_order_by_token(
    token: &OrderToken,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE token = $1").bind(token).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_lines(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderLine>, sqlx::Error> {
    let lines = sqlx::query_as("SELECT * FROM order_lines WHERE order_id = $1 ORDER BY product_id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(lines)
}

/// Deletes an unpaid order and its lines. Paid orders are left alone. Returns the number of orders deleted.
pub async fn delete_unpaid_order(order_id: i64, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    sqlx::query("DELETE FROM order_lines WHERE order_id = $1 AND order_id IN (SELECT id FROM orders WHERE paid = 0)")
        .bind(order_id)
        .execute(&mut *conn)
        .await?;
    let result = sqlx::query("DELETE FROM orders WHERE id = $1 AND paid = 0").bind(order_id).execute(conn).await?;
    Ok(result.rows_affected())
}

/// Flips the paid flag of the order carrying `token`, but only if it is currently unpaid.
///
/// Returns the updated order if this call did the flip, and `None` if the order was already paid or does not exist.
/// This is the compare-and-set that makes settlement idempotent.
pub async fn mark_paid_if_unpaid(
    token: &OrderToken,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders
            SET paid = 1, updated_at = CURRENT_TIMESTAMP
            WHERE token = $1 AND paid = 0
            RETURNING *;
        "#,
    )
    .bind(token)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}
