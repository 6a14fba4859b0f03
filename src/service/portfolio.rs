//! Portfolio assembly: positions, valuations, and the account summary.

use crate::db::Repository;
use crate::domain::{Decimal, InstrumentId, UserId};
use crate::engine::{
    calculate_positions, portfolio_daily_return, position_metrics, Ledger, PositionReport,
};
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Full account snapshot: cash, valued positions, and portfolio totals.
#[derive(Debug, Clone)]
pub struct PortfolioSummary {
    pub user_id: UserId,
    pub available_cash: Decimal,
    pub total_value: Decimal,
    pub daily_return_pct: f64,
    pub positions: Vec<PositionReport>,
}

pub struct PortfolioService {
    repo: Arc<Repository>,
    ledger: Ledger,
}

impl PortfolioService {
    pub fn new(repo: Arc<Repository>) -> Self {
        let ledger = Ledger::new(repo.clone());
        Self { repo, ledger }
    }

    /// Build the account snapshot for a user.
    ///
    /// Order history and the cash balance are fetched concurrently, the
    /// position replay runs over the history, then each held instrument
    /// is valued at its latest quote. A position whose instrument or
    /// quote is missing is left out of the report rather than failing
    /// the whole snapshot. Total value is seeded from cash so an
    /// all-cash account still reports a meaningful total.
    pub async fn get_portfolio(&self, user_id: UserId) -> Result<PortfolioSummary, AppError> {
        self.repo
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let (filled, available_cash) = futures::try_join!(
            async {
                self.repo
                    .filled_orders_for_user(user_id)
                    .await
                    .map_err(AppError::from)
            },
            self.ledger.available_cash(user_id),
        )?;

        let positions = calculate_positions(&filled);
        let held: Vec<InstrumentId> = positions.keys().copied().collect();

        let quotes: HashMap<InstrumentId, _> = self
            .repo
            .latest_quotes_batch(&held)
            .await?
            .into_iter()
            .map(|quote| (quote.instrument_id, quote))
            .collect();

        let mut reports = Vec::with_capacity(positions.len());
        let mut total_value = available_cash;
        for (instrument_id, position) in &positions {
            let Some(quote) = quotes.get(instrument_id) else {
                warn!(%user_id, %instrument_id, "No quote for held instrument, skipping");
                continue;
            };
            let Some(instrument) = self.repo.find_instrument(*instrument_id).await? else {
                warn!(%user_id, %instrument_id, "Held instrument missing from catalog, skipping");
                continue;
            };

            let metrics = position_metrics(position, quote);
            total_value = total_value + metrics.current_value;
            reports.push(PositionReport {
                instrument_id: *instrument_id,
                ticker: instrument.ticker,
                name: instrument.name,
                quantity: position.quantity,
                current_value: metrics.current_value,
                daily_return_pct: metrics.daily_return_pct,
                total_return_pct: metrics.total_return_pct,
                avg_cost: position.avg_cost,
            });
        }

        let daily_return_pct = portfolio_daily_return(&reports, total_value);

        debug!(
            %user_id,
            cash = %available_cash,
            total = %total_value,
            positions = reports.len(),
            "Assembled portfolio"
        );

        Ok(PortfolioSummary {
            user_id,
            available_cash,
            total_value,
            daily_return_pct,
            positions: reports,
        })
    }
}
