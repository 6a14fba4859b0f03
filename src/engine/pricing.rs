//! Execution price and amount-based size resolution.

use crate::db::Repository;
use crate::domain::{Decimal, InstrumentId, OrderKind, Side};
use crate::error::AppError;
use std::sync::Arc;

/// Resolves the execution price for a prospective order.
#[derive(Clone)]
pub struct PricingResolver {
    repo: Arc<Repository>,
}

impl PricingResolver {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Decide the execution price.
    ///
    /// Cash movements are always priced at 1 (they are already in the
    /// ledger's monetary unit; the quote source is never consulted).
    /// MARKET orders take the latest close; LIMIT orders take the supplied
    /// price, which must be positive.
    pub async fn resolve_price(
        &self,
        side: Side,
        kind: OrderKind,
        instrument_id: InstrumentId,
        supplied_price: Option<Decimal>,
    ) -> Result<Decimal, AppError> {
        if side.is_cash() {
            return Ok(Decimal::one());
        }

        match kind {
            OrderKind::Market => {
                let quote = self.repo.latest_quote(instrument_id).await?.ok_or_else(|| {
                    AppError::QuoteUnavailable(format!(
                        "no market data available for instrument {}",
                        instrument_id
                    ))
                })?;
                Ok(quote.close)
            }
            OrderKind::Limit => match supplied_price {
                Some(price) if price.is_positive() => Ok(price),
                _ => Err(AppError::InvalidInput(
                    "price is required for LIMIT orders".to_string(),
                )),
            },
        }
    }
}

/// Turn a monetary amount into a whole unit count at the given price.
///
/// The size is floored, so the resolved order never spends more than the
/// requested amount. A floored size of zero (including any negative
/// amount) is rejected.
pub fn resolve_size_from_amount(amount: Decimal, price: Decimal) -> Result<i64, AppError> {
    if !price.is_positive() {
        return Err(AppError::InvalidInput(
            "cannot resolve size without a positive price".to_string(),
        ));
    }

    let size = (amount / price).floor_to_i64().ok_or_else(|| {
        AppError::InvalidInput("amount out of range".to_string())
    })?;

    if size <= 0 {
        return Err(AppError::InvalidInput(
            "amount too small to buy any units".to_string(),
        ));
    }
    Ok(size)
}
