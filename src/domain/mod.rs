//! Domain types for the trading back-office.
//!
//! This module provides:
//! - Exact monetary arithmetic via the Decimal wrapper
//! - Identifier newtypes: UserId, InstrumentId, OrderId
//! - Order, Instrument, User, and Quote entities
//! - The order side/kind/status enums with their wire format

pub mod decimal;
pub mod instrument;
pub mod order;
pub mod primitives;
pub mod quote;

pub use decimal::Decimal;
pub use instrument::{Instrument, User, CURRENCY_CATEGORY};
pub use order::{FilledOrder, NewOrder, Order, OrderKind, OrderStatus, Side};
pub use primitives::{InstrumentId, OrderId, UserId};
pub use quote::Quote;
