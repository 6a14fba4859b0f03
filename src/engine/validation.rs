//! Affordability check for prospective orders.
//!
//! The verdict is advisory: a rejected verdict still produces a persisted
//! order with status REJECTED, so every attempted order is recorded.

use crate::domain::{Decimal, InstrumentId, Side, UserId};
use crate::engine::ledger::Ledger;
use crate::error::AppError;
use std::fmt;

/// Why an order failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    InsufficientCash,
    InsufficientShares,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::InsufficientCash => write!(f, "Insufficient cash"),
            RejectReason::InsufficientShares => write!(f, "Insufficient shares"),
        }
    }
}

/// Outcome of validating a prospective order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Approved)
    }
}

/// Pure decision given the already-derived balances.
///
/// CASH_IN is always coverable; CASH_OUT and BUY are bounded by available
/// cash; SELL is bounded by available shares.
fn decide(side: Side, size: i64, price: Decimal, cash: Decimal, shares: i64) -> Verdict {
    match side {
        Side::CashIn => Verdict::Approved,
        Side::CashOut | Side::Buy => {
            let notional = price * Decimal::from(size);
            if notional > cash {
                Verdict::Rejected(RejectReason::InsufficientCash)
            } else {
                Verdict::Approved
            }
        }
        Side::Sell => {
            if size > shares {
                Verdict::Rejected(RejectReason::InsufficientShares)
            } else {
                Verdict::Approved
            }
        }
    }
}

/// Validator backed by the derived ledger.
#[derive(Clone)]
pub struct OrderValidator {
    ledger: Ledger,
}

impl OrderValidator {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// Validate a prospective order against the user's derived balances.
    ///
    /// Only the balance relevant to the side is fetched; CASH_IN needs
    /// neither.
    pub async fn validate(
        &self,
        user_id: UserId,
        instrument_id: InstrumentId,
        side: Side,
        size: i64,
        price: Decimal,
    ) -> Result<Verdict, AppError> {
        let verdict = match side {
            Side::CashIn => Verdict::Approved,
            Side::CashOut | Side::Buy => {
                let cash = self.ledger.available_cash(user_id).await?;
                decide(side, size, price, cash, 0)
            }
            Side::Sell => {
                let shares = self.ledger.available_shares(user_id, instrument_id).await?;
                decide(side, size, price, Decimal::zero(), shares)
            }
        };
        Ok(verdict)
    }
}
