//! Portfolio configuration.
//!
//! The holdings table and the settings of its collaborators. Built in code via
//! [`PortfolioConfig::builtin`] or loaded from a YAML file:
//!
//! ```yaml
//! fallback_exchange_rate: 5.80
//! fixed_income:
//!   amount: 1000.0
//!   target_allocation: 0.25
//! holdings:
//!   - symbol: WEGE3.SA        # domestic, inferred from the ".SA" suffix
//!     quantity: 25
//!     target_allocation: 0.075
//!     average_cost: 40.67
//!   - symbol: VT
//!     quantity: 5
//!     target_allocation: 0.17
//!     average_cost: 126.96
//!     domestic: false
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{validate_non_negative, validate_positive};
use crate::{
    CoreError, FixedIncome, HoldingConfig, RebalanceOptions, Symbol, ValidationError,
    FALLBACK_EXCHANGE_RATE,
};

pub const DEFAULT_FX_SYMBOL: &str = "BRL=X";
pub const DEFAULT_DOMESTIC_SUFFIX: &str = ".SA";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_CONTRIBUTION: f64 = 1000.0;

/// Allocations may exceed 1 only by float noise before a warning is logged.
const ALLOCATION_SUM_TOLERANCE: f64 = 1e-9;

/// Immutable holdings table plus market data and advisor settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioConfig {
    pub reporting_currency: String,
    pub fx_symbol: Symbol,
    pub fallback_exchange_rate: f64,
    pub cache_ttl_secs: u64,
    pub default_contribution: f64,
    pub domestic_suffix: String,
    pub rebalance: RebalanceOptions,
    pub fixed_income: FixedIncome,
    pub holdings: Vec<HoldingConfig>,
}

impl PortfolioConfig {
    /// The default portfolio: Brazilian equities, global ETFs, gold, bitcoin
    /// and a fixed-income reserve.
    pub fn builtin() -> Self {
        let table: [(&'static str, f64, f64, f64); 10] = [
            ("WEGE3.SA", 25.0, 0.075, 40.67),
            ("PRIO3.SA", 10.0, 0.05, 37.32),
            ("ITSA4.SA", 100.0, 0.05, 10.64),
            ("TAEE3.SA", 100.0, 0.05, 11.23),
            ("CMIG4.SA", 100.0, 0.05, 10.60),
            ("VIVT3.SA", 33.0, 0.025, 31.28),
            ("VGT", 1.0007, 0.17, 665.54),
            ("VT", 5.0, 0.17, 126.96),
            ("IAU", 2.9999, 0.06, 62.85),
            ("BTC-USD", 0.0, 0.05, 0.00),
        ];

        let holdings = table
            .iter()
            .map(|&(raw, quantity, target_allocation, average_cost)| {
                let symbol = Symbol::from_static(raw);
                let is_domestic = symbol.has_suffix(DEFAULT_DOMESTIC_SUFFIX);
                HoldingConfig {
                    symbol,
                    quantity,
                    target_allocation,
                    average_cost,
                    is_domestic,
                }
            })
            .collect();

        Self {
            holdings,
            ..Self::empty()
        }
    }

    fn empty() -> Self {
        Self {
            reporting_currency: String::from("BRL"),
            fx_symbol: Symbol::from_static(DEFAULT_FX_SYMBOL),
            fallback_exchange_rate: FALLBACK_EXCHANGE_RATE,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            default_contribution: DEFAULT_CONTRIBUTION,
            domestic_suffix: String::from(DEFAULT_DOMESTIC_SUFFIX),
            rebalance: RebalanceOptions::default(),
            fixed_income: FixedIncome {
                label: String::from("Fixed Income"),
                amount: 1000.0,
                target_allocation: 0.25,
            },
            holdings: Vec::new(),
        }
    }

    /// Read and validate a YAML portfolio file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading portfolio config");
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, CoreError> {
        let raw: RawPortfolioConfig = serde_yaml::from_str(contents)?;
        let config = raw.resolve()?;
        config.validate()?;
        config.warn_if_overallocated();
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        validate_currency(&self.reporting_currency)?;
        validate_positive("fallback_exchange_rate", self.fallback_exchange_rate)?;
        validate_non_negative("default_contribution", self.default_contribution)?;
        self.rebalance.validate()?;
        self.fixed_income.validate()?;

        let mut seen = HashSet::with_capacity(self.holdings.len());
        for holding in &self.holdings {
            holding.validate()?;
            if !seen.insert(&holding.symbol) {
                return Err(ValidationError::DuplicateHolding {
                    symbol: holding.symbol.to_string(),
                }
                .into());
            }
        }

        if self.holdings.iter().any(|h| h.symbol == self.fx_symbol) {
            return Err(CoreError::Config(format!(
                "fx symbol '{}' cannot also be a holding",
                self.fx_symbol
            )));
        }

        Ok(())
    }

    /// Sum of every target allocation, fixed income included.
    pub fn target_allocation_sum(&self) -> f64 {
        self.holdings
            .iter()
            .map(|holding| holding.target_allocation)
            .sum::<f64>()
            + self.fixed_income.target_allocation
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.holdings.iter().map(|holding| &holding.symbol)
    }

    fn warn_if_overallocated(&self) {
        let sum = self.target_allocation_sum();
        if sum > 1.0 + ALLOCATION_SUM_TOLERANCE {
            warn!(
                target_allocation_sum = sum,
                "target allocations add up to more than 100%"
            );
        }
    }
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_currency(value: &str) -> Result<(), ValidationError> {
    if value.len() == 3 && value.chars().all(|ch| ch.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCurrency {
            value: value.to_owned(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPortfolioConfig {
    #[serde(default = "default_currency")]
    reporting_currency: String,
    #[serde(default = "default_fx_symbol")]
    fx_symbol: String,
    #[serde(default = "default_fallback_rate")]
    fallback_exchange_rate: f64,
    #[serde(default = "default_cache_ttl")]
    cache_ttl_secs: u64,
    #[serde(default = "default_contribution")]
    default_contribution: f64,
    #[serde(default = "default_domestic_suffix")]
    domestic_suffix: String,
    #[serde(default)]
    rebalance: RebalanceOptions,
    fixed_income: FixedIncome,
    #[serde(default)]
    holdings: Vec<RawHolding>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHolding {
    symbol: String,
    quantity: f64,
    target_allocation: f64,
    average_cost: f64,
    #[serde(default)]
    domestic: Option<bool>,
}

impl RawPortfolioConfig {
    fn resolve(self) -> Result<PortfolioConfig, CoreError> {
        let fx_symbol = Symbol::parse(&self.fx_symbol)?;
        let domestic_suffix = self.domestic_suffix;

        let holdings = self
            .holdings
            .into_iter()
            .map(|raw| {
                let symbol = Symbol::parse(&raw.symbol)?;
                let is_domestic = raw
                    .domestic
                    .unwrap_or_else(|| symbol.has_suffix(&domestic_suffix));
                Ok(HoldingConfig {
                    symbol,
                    quantity: raw.quantity,
                    target_allocation: raw.target_allocation,
                    average_cost: raw.average_cost,
                    is_domestic,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(PortfolioConfig {
            reporting_currency: self.reporting_currency,
            fx_symbol,
            fallback_exchange_rate: self.fallback_exchange_rate,
            cache_ttl_secs: self.cache_ttl_secs,
            default_contribution: self.default_contribution,
            domestic_suffix,
            rebalance: self.rebalance,
            fixed_income: self.fixed_income,
            holdings,
        })
    }
}

fn default_currency() -> String {
    String::from("BRL")
}

fn default_fx_symbol() -> String {
    String::from(DEFAULT_FX_SYMBOL)
}

fn default_fallback_rate() -> f64 {
    FALLBACK_EXCHANGE_RATE
}

fn default_cache_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_contribution() -> f64 {
    DEFAULT_CONTRIBUTION
}

fn default_domestic_suffix() -> String {
    String::from(DEFAULT_DOMESTIC_SUFFIX)
}
