//! SQLite backend for the cart engine.
//!
//! Migrations live in `migrations/` and are embedded in the binary; run them with [`SqliteDatabase::migrate`].
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
