//! Application services composing the engine, repository, and lifecycle rules.

pub mod orders;
pub mod portfolio;

pub use orders::{CreateOrder, OrderService};
pub use portfolio::{PortfolioService, PortfolioSummary};
