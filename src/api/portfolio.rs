use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use super::AppState;
use crate::domain::{Decimal, InstrumentId, UserId};
use crate::error::AppError;
use crate::service::PortfolioSummary;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDto {
    pub user_id: UserId,
    pub available_cash: Decimal,
    pub total_value: Decimal,
    pub daily_return_pct: f64,
    pub positions: Vec<PositionDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDto {
    pub instrument_id: InstrumentId,
    pub ticker: String,
    pub name: String,
    pub quantity: i64,
    pub current_value: Decimal,
    pub daily_return_pct: f64,
    pub total_return_pct: f64,
    pub avg_cost: Decimal,
}

impl From<PortfolioSummary> for PortfolioDto {
    fn from(summary: PortfolioSummary) -> Self {
        Self {
            user_id: summary.user_id,
            available_cash: summary.available_cash,
            total_value: summary.total_value,
            daily_return_pct: summary.daily_return_pct,
            positions: summary
                .positions
                .into_iter()
                .map(|p| PositionDto {
                    instrument_id: p.instrument_id,
                    ticker: p.ticker,
                    name: p.name,
                    quantity: p.quantity,
                    current_value: p.current_value,
                    daily_return_pct: p.daily_return_pct,
                    total_return_pct: p.total_return_pct,
                    avg_cost: p.avg_cost,
                })
                .collect(),
        }
    }
}

pub async fn get_portfolio(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<PortfolioDto>, AppError> {
    let summary = state.portfolio.get_portfolio(UserId::new(user_id)).await?;
    Ok(Json(summary.into()))
}
