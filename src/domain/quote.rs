//! Latest market quote for an instrument.

use crate::domain::{Decimal, InstrumentId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Latest close / previous close for an instrument, as served by the
/// market quote source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub instrument_id: InstrumentId,
    pub close: Decimal,
    pub previous_close: Decimal,
    pub as_of: NaiveDate,
}
