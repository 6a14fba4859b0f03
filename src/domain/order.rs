//! Order type and its side/kind/status enums.

use crate::domain::{Decimal, InstrumentId, OrderId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Order side.
///
/// BUY/SELL trade a security; CASH_IN/CASH_OUT move cash through the
/// designated currency instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Buy,
    Sell,
    CashIn,
    CashOut,
}

impl Side {
    /// True for the cash-movement sides (CASH_IN / CASH_OUT).
    pub fn is_cash(&self) -> bool {
        matches!(self, Side::CashIn | Side::CashOut)
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
            Side::CashIn => "CASH_IN",
            Side::CashOut => "CASH_OUT",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order field value: {0}")]
pub struct ParseOrderFieldError(pub String);

impl FromStr for Side {
    type Err = ParseOrderFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            "CASH_IN" => Ok(Side::CashIn),
            "CASH_OUT" => Ok(Side::CashOut),
            other => Err(ParseOrderFieldError(other.to_string())),
        }
    }
}

/// Order kind: MARKET executes at the latest quote, LIMIT at a caller price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    Market,
    Limit,
}

impl std::fmt::Display for OrderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderKind::Market => "MARKET",
            OrderKind::Limit => "LIMIT",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for OrderKind {
    type Err = ParseOrderFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MARKET" => Ok(OrderKind::Market),
            "LIMIT" => Ok(OrderKind::Limit),
            other => Err(ParseOrderFieldError(other.to_string())),
        }
    }
}

/// Order status. NEW is the only non-terminal state; the single allowed
/// transition after creation is NEW -> CANCELLED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    Filled,
    Rejected,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::New => "NEW",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for OrderStatus {
    type Err = ParseOrderFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(OrderStatus::New),
            "FILLED" => Ok(OrderStatus::Filled),
            "REJECTED" => Ok(OrderStatus::Rejected),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(ParseOrderFieldError(other.to_string())),
        }
    }
}

/// A persisted order. Immutable once FILLED, REJECTED, or CANCELLED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub instrument_id: InstrumentId,
    pub side: Side,
    pub kind: OrderKind,
    /// Unit count, always positive at persistence time.
    pub size: i64,
    /// Price per unit in the ledger's monetary unit.
    pub price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Monetary value of the order: size x price.
    pub fn notional(&self) -> Decimal {
        self.price * Decimal::from(self.size)
    }
}

/// Order fields chosen at creation; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub instrument_id: InstrumentId,
    pub side: Side,
    pub kind: OrderKind,
    pub size: i64,
    pub price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A FILLED order with its instrument's category attached, as fetched for
/// ledger and position derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilledOrder {
    pub order: Order,
    pub instrument_category: String,
}

impl FilledOrder {
    /// True when the order is on the designated currency instrument.
    pub fn is_currency(&self) -> bool {
        self.instrument_category == crate::domain::instrument::CURRENCY_CATEGORY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_wire_format() {
        assert_eq!(serde_json::to_string(&Side::CashIn).unwrap(), "\"CASH_IN\"");
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"BUY\"");
        assert_eq!("CASH_OUT".parse::<Side>().unwrap(), Side::CashOut);
        assert!("HOLD".parse::<Side>().is_err());
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            OrderStatus::New,
            OrderStatus::Filled,
            OrderStatus::Rejected,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_kind_roundtrip() {
        assert_eq!("MARKET".parse::<OrderKind>().unwrap(), OrderKind::Market);
        assert_eq!(OrderKind::Limit.to_string(), "LIMIT");
    }

    #[test]
    fn test_is_cash() {
        assert!(Side::CashIn.is_cash());
        assert!(Side::CashOut.is_cash());
        assert!(!Side::Buy.is_cash());
        assert!(!Side::Sell.is_cash());
    }

    #[test]
    fn test_notional() {
        let order = Order {
            id: OrderId::new(1),
            user_id: UserId::new(1),
            instrument_id: InstrumentId::new(1),
            side: Side::Buy,
            kind: OrderKind::Market,
            size: 100,
            price: Decimal::from_str_canonical("150").unwrap(),
            status: OrderStatus::Filled,
            created_at: Utc::now(),
        };
        assert_eq!(order.notional(), Decimal::from(15000));
    }
}
