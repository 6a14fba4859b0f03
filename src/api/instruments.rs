use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::domain::{Instrument, InstrumentId};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentDto {
    pub id: InstrumentId,
    pub ticker: String,
    pub name: String,
    pub category: String,
}

impl From<Instrument> for InstrumentDto {
    fn from(instrument: Instrument) -> Self {
        Self {
            id: instrument.id,
            ticker: instrument.ticker,
            name: instrument.name,
            category: instrument.category,
        }
    }
}

pub async fn get_instruments(
    State(state): State<AppState>,
) -> Result<Json<Vec<InstrumentDto>>, AppError> {
    let instruments = state.repo.list_instruments().await?;
    Ok(Json(instruments.into_iter().map(Into::into).collect()))
}

/// Substring search over ticker and name. A missing or empty `q`
/// matches everything.
pub async fn search_instruments(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<InstrumentDto>>, AppError> {
    let query = params.q.unwrap_or_default();
    let instruments = state.repo.search_instruments(&query).await?;
    Ok(Json(instruments.into_iter().map(Into::into).collect()))
}
