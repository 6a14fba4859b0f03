//! Database module for SQLite operations.
//!
//! This module provides:
//! - Database initialization and migrations
//! - SQLite pragma configuration
//! - Repository layer: the order store and reference catalog

pub mod migrations;
pub mod repo;

pub use migrations::{apply_seed, init_db};
pub use repo::Repository;
