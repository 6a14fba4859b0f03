//! Derived cash and share balances.
//!
//! Balances are never stored: each call re-folds the user's FILLED orders,
//! so the order log stays the single source of truth and the balance cannot
//! drift. Both folds commute under addition, so fetch order is irrelevant.

use crate::db::Repository;
use crate::domain::{Decimal, FilledOrder, InstrumentId, Order, Side, UserId};
use crate::error::AppError;
use std::sync::Arc;
use tracing::debug;

/// Cash contribution of a single filled order.
///
/// Orders on the currency instrument move cash directly (CASH_IN credits,
/// CASH_OUT debits); orders on securities move it inversely (SELL credits,
/// BUY debits).
fn cash_delta(filled: &FilledOrder) -> Decimal {
    let value = filled.order.notional();
    if filled.is_currency() {
        match filled.order.side {
            Side::CashIn => value,
            Side::CashOut => -value,
            _ => Decimal::zero(),
        }
    } else {
        match filled.order.side {
            Side::Sell => value,
            Side::Buy => -value,
            _ => Decimal::zero(),
        }
    }
}

/// Fold filled orders into available cash, clamped at zero.
///
/// The clamp is a deliberate floor: even if a data anomaly makes debits
/// exceed credits, the derived balance never goes negative.
pub fn cash_balance(filled_orders: &[FilledOrder]) -> Decimal {
    let mut cash = Decimal::zero();
    for filled in filled_orders {
        cash = cash + cash_delta(filled);
    }
    if cash.is_negative() {
        Decimal::zero()
    } else {
        cash
    }
}

/// Fold filled orders on one instrument into a sellable unit count,
/// clamped at zero.
///
/// This answers "how many units could be sold right now" and is
/// independent of the position replay's chronological close-out rule.
pub fn share_balance(filled_orders: &[Order]) -> i64 {
    let mut shares = 0i64;
    for order in filled_orders {
        match order.side {
            Side::Buy => shares += order.size,
            Side::Sell => shares -= order.size,
            _ => {}
        }
    }
    shares.max(0)
}

/// Repository-backed ledger: fetches a user's filled orders and runs the
/// pure folds above.
#[derive(Clone)]
pub struct Ledger {
    repo: Arc<Repository>,
}

impl Ledger {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Available cash for a user, derived from their filled order history.
    pub async fn available_cash(&self, user_id: UserId) -> Result<Decimal, AppError> {
        let filled = self.repo.filled_orders_for_user(user_id).await?;
        let cash = cash_balance(&filled);
        debug!(%user_id, orders = filled.len(), cash = %cash, "Derived available cash");
        Ok(cash)
    }

    /// Sellable units of one instrument for a user.
    pub async fn available_shares(
        &self,
        user_id: UserId,
        instrument_id: InstrumentId,
    ) -> Result<i64, AppError> {
        let filled = self
            .repo
            .filled_orders_for_user_instrument(user_id, instrument_id)
            .await?;
        let shares = share_balance(&filled);
        debug!(%user_id, %instrument_id, orders = filled.len(), shares, "Derived available shares");
        Ok(shares)
    }
}
