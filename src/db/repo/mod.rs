//! Repository layer for database operations.
//!
//! This is the order store and reference catalog the derivation core reads
//! from. Methods are organized across submodules by domain:
//! - `orders.rs` - order store operations (append + single status update)
//! - `catalog.rs` - users, instruments, and market data

mod catalog;
mod orders;

use sqlx::sqlite::SqlitePool;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }
}
