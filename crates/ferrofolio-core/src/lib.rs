//! # Ferrofolio Core
//!
//! Portfolio valuation and rebalancing for the Ferrofolio dashboard.
//!
//! ## Overview
//!
//! - **Valuation engine**: holdings plus a market snapshot become per-asset
//!   records and portfolio totals
//! - **Rebalancing advisor**: ranks the positions furthest below target once a
//!   new contribution is added
//! - **Allocation breakdown** by category for charts
//! - **Portfolio configuration** from code or YAML
//! - **Market data** collaborator with a snapshot cache and fallback rate
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`allocation`] | Value and weight per category |
//! | [`config`] | Holdings table and collaborator settings |
//! | [`domain`] | Symbols, holdings, snapshots, timestamps |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Core error types |
//! | [`market`] | Quote sources, HTTP seam, snapshot cache |
//! | [`rebalancing`] | Contribution-driven rebalancing suggestions |
//! | [`valuation`] | Valuation records and totals |
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrofolio_core::{
//!     compute_valuation, suggest_rebalancing, FixedIncome, HoldingConfig, MarketSnapshot,
//!     RebalanceOptions, Symbol,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let symbol = Symbol::parse("WEGE3.SA")?;
//! let holdings = vec![HoldingConfig::new(symbol.clone(), 10.0, 0.5, 10.0, true)?];
//! let snapshot = MarketSnapshot::new(5.0)?.with_price(symbol, 12.0)?;
//! let fixed_income = FixedIncome::new(100.0, 0.5)?;
//!
//! let valuation = compute_valuation(&holdings, &snapshot, &fixed_income)?;
//! assert_eq!(valuation.totals.total_value, 220.0);
//!
//! let suggestions = suggest_rebalancing(&valuation, 1000.0, &RebalanceOptions::default())?;
//! assert_eq!(suggestions[0].symbol, "Fixed Income");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Only caller contract violations are errors. Missing prices are skipped,
//! zero denominators resolve to 0 and market data failures are absorbed by
//! the [`market`] collaborator:
//!
//! ```rust
//! use ferrofolio_core::{CoreError, ValidationError};
//!
//! fn describe(error: &CoreError) -> &'static str {
//!     match error {
//!         CoreError::InvalidInput(ValidationError::NegativeValue { .. }) => "negative amount",
//!         CoreError::InvalidInput(_) => "invalid input",
//!         _ => "configuration problem",
//!     }
//! }
//! ```

pub mod allocation;
pub mod config;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod market;
pub mod rebalancing;
pub mod valuation;

// Allocation breakdown
pub use allocation::{allocation_by_category, CategoryAllocation};

// Configuration
pub use config::PortfolioConfig;

// Domain models
pub use domain::{
    Category, FixedIncome, HoldingConfig, MarketSnapshot, Symbol, UtcDateTime,
    FALLBACK_EXCHANGE_RATE,
};

// Envelope types
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};

// Error types
pub use error::{CoreError, ValidationError};

// Market data
pub use market::{
    CacheMode, HttpClient, HttpError, HttpRequest, HttpResponse, MarketDataService,
    QuoteSource, ReqwestHttpClient, SnapshotCache, SnapshotOutcome, SourceError,
    SourceErrorKind, StaticQuoteSource, YahooChartSource,
};

// Engines
pub use rebalancing::{
    suggest_rebalancing, validate_contribution, RebalanceOptions, RebalancingSuggestion,
};
pub use valuation::{compute_valuation, PortfolioTotals, Valuation, ValuationRecord};
