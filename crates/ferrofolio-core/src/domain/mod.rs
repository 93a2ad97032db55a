//! # Domain Models
//!
//! Typed inputs of the valuation engine.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated ticker (`WEGE3.SA`, `VT`, `BRL=X`) |
//! | [`HoldingConfig`] | One configured position with its target allocation |
//! | [`FixedIncome`] | The fixed-value cash position |
//! | [`Category`] | Domestic / foreign / cash classification |
//! | [`MarketSnapshot`] | Prices and exchange rate from one fetch |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Constructors validate their invariants and return [`crate::ValidationError`]
//! on violation. Plain struct literals stay possible for configuration tables;
//! the engine re-validates holdings before using them.

mod holding;
mod snapshot;
mod symbol;
mod timestamp;

pub use holding::{Category, FixedIncome, HoldingConfig};
pub use snapshot::{MarketSnapshot, FALLBACK_EXCHANGE_RATE};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
