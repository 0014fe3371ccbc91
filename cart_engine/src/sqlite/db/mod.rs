//! # SQLite Database methods
//!
//! "Low-level" SQLite interactions, written as plain functions that accept a `&mut SqliteConnection`. Callers obtain
//! a connection from the pool, or open a transaction and pass `&mut *tx`, without the functions needing to know which.
use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod orders;
pub mod products;

/// Opens a pool on `url`, creating the database file if necessary. Foreign keys are enforced so that deleting an
/// order cascades to its lines.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true).foreign_keys(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
