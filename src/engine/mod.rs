//! Order-to-ledger derivation core.
//!
//! Every balance and holding is a pure function of the filled-order
//! history: nothing here keeps state between calls, and concurrent
//! derivations for different users are fully independent.

pub mod ledger;
pub mod positions;
pub mod pricing;
pub mod validation;
pub mod valuation;

pub use ledger::Ledger;
pub use positions::{calculate_positions, Position};
pub use pricing::{resolve_size_from_amount, PricingResolver};
pub use validation::{OrderValidator, RejectReason, Verdict};
pub use valuation::{portfolio_daily_return, position_metrics, PositionMetrics, PositionReport};
