//! Instrument and user catalog types.

use crate::domain::{InstrumentId, UserId};
use serde::{Deserialize, Serialize};

/// Category tag marking the designated cash instrument. Every other
/// category is a tradable security.
pub const CURRENCY_CATEGORY: &str = "MONEDA";

/// A tradable instrument (or the special currency instrument).
/// Immutable after creation; owned by the reference catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: InstrumentId,
    pub ticker: String,
    pub name: String,
    pub category: String,
}

impl Instrument {
    /// True for the designated cash instrument.
    pub fn is_currency(&self) -> bool {
        self.category == CURRENCY_CATEGORY
    }
}

/// An account holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub account_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_currency() {
        let ars = Instrument {
            id: InstrumentId::new(66),
            ticker: "ARS".to_string(),
            name: "PESOS".to_string(),
            category: CURRENCY_CATEGORY.to_string(),
        };
        assert!(ars.is_currency());

        let stock = Instrument {
            id: InstrumentId::new(1),
            ticker: "DYCA".to_string(),
            name: "Dycasa S.A.".to_string(),
            category: "ACCIONES".to_string(),
        };
        assert!(!stock.is_currency());
    }
}
