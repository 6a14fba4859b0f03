pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod service;

pub use config::Config;
pub use db::{apply_seed, init_db, Repository};
pub use domain::{
    Decimal, Instrument, InstrumentId, Order, OrderId, OrderKind, OrderStatus, Quote, Side, User,
    UserId,
};
pub use error::AppError;
