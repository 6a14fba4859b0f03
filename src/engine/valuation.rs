//! Per-position and portfolio-level valuation metrics.
//!
//! Monetary values stay in Decimal; return percentages are f64 on purpose:
//! a zero previous close or zero average cost divides to an infinite
//! return, which is propagated as-is rather than guarded (only the
//! portfolio-level weighting guards a zero total).

use crate::domain::{Decimal, InstrumentId, Quote};
use crate::engine::positions::Position;

/// Valuation of a single held position against its latest quote.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionMetrics {
    pub current_value: Decimal,
    pub daily_return_pct: f64,
    pub total_return_pct: f64,
}

/// One line of the portfolio report.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionReport {
    pub instrument_id: InstrumentId,
    pub ticker: String,
    pub name: String,
    pub quantity: i64,
    pub current_value: Decimal,
    pub daily_return_pct: f64,
    pub total_return_pct: f64,
    pub avg_cost: Decimal,
}

/// Value a position at its latest quote.
pub fn position_metrics(position: &Position, quote: &Quote) -> PositionMetrics {
    let current_value = quote.close * Decimal::from(position.quantity);

    let close = quote.close.to_f64();
    let previous_close = quote.previous_close.to_f64();
    let avg_cost = position.avg_cost.to_f64();

    let daily_return_pct = (close - previous_close) / previous_close * 100.0;
    let total_return_pct = (close - avg_cost) / avg_cost * 100.0;

    PositionMetrics {
        current_value,
        daily_return_pct,
        total_return_pct,
    }
}

/// Value-weighted average of the per-position daily returns.
///
/// An empty or worthless portfolio returns 0 rather than dividing by zero.
pub fn portfolio_daily_return(positions: &[PositionReport], total_value: Decimal) -> f64 {
    if total_value.is_zero() {
        return 0.0;
    }

    let total = total_value.to_f64();
    positions
        .iter()
        .map(|position| (position.current_value.to_f64() / total) * position.daily_return_pct)
        .sum()
}
