use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{validate_non_negative, validate_positive};
use crate::{Symbol, UtcDateTime, ValidationError};

/// Exchange rate substituted when the live rate cannot be fetched.
pub const FALLBACK_EXCHANGE_RATE: f64 = 5.80;

/// Prices and exchange rate captured by one market data fetch.
///
/// Construction validates the rate and every price, so the valuation engine
/// can treat any snapshot it receives as well formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    prices: BTreeMap<Symbol, f64>,
    exchange_rate: f64,
    exchange_rate_is_fallback: bool,
    as_of: UtcDateTime,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

impl MarketSnapshot {
    pub fn new(exchange_rate: f64) -> Result<Self, ValidationError> {
        validate_positive("exchange_rate", exchange_rate)?;
        Ok(Self {
            prices: BTreeMap::new(),
            exchange_rate,
            exchange_rate_is_fallback: false,
            as_of: UtcDateTime::now(),
            warnings: Vec::new(),
        })
    }

    /// Degraded snapshot: no prices and the given fallback rate.
    pub fn unavailable(fallback_rate: f64) -> Result<Self, ValidationError> {
        let mut snapshot = Self::new(fallback_rate)?;
        snapshot.exchange_rate_is_fallback = true;
        Ok(snapshot)
    }

    pub fn with_price(mut self, symbol: Symbol, price: f64) -> Result<Self, ValidationError> {
        self.insert_price(symbol, price)?;
        Ok(self)
    }

    pub fn with_prices<I>(mut self, prices: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (Symbol, f64)>,
    {
        for (symbol, price) in prices {
            self.insert_price(symbol, price)?;
        }
        Ok(self)
    }

    pub fn with_as_of(mut self, as_of: UtcDateTime) -> Self {
        self.as_of = as_of;
        self
    }

    pub fn insert_price(&mut self, symbol: Symbol, price: f64) -> Result<(), ValidationError> {
        validate_non_negative("price", price)?;
        self.prices.insert(symbol, price);
        Ok(())
    }

    /// Replace the rate with a live quote and clear the fallback flag.
    pub fn set_exchange_rate(&mut self, exchange_rate: f64) -> Result<(), ValidationError> {
        validate_positive("exchange_rate", exchange_rate)?;
        self.exchange_rate = exchange_rate;
        self.exchange_rate_is_fallback = false;
        Ok(())
    }

    pub fn mark_fallback_rate(&mut self, fallback_rate: f64) -> Result<(), ValidationError> {
        validate_positive("exchange_rate", fallback_rate)?;
        self.exchange_rate = fallback_rate;
        self.exchange_rate_is_fallback = true;
        Ok(())
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn price(&self, symbol: &Symbol) -> Option<f64> {
        self.prices.get(symbol).copied()
    }

    pub fn prices(&self) -> &BTreeMap<Symbol, f64> {
        &self.prices
    }

    pub const fn exchange_rate(&self) -> f64 {
        self.exchange_rate
    }

    pub const fn exchange_rate_is_fallback(&self) -> bool {
        self.exchange_rate_is_fallback
    }

    pub const fn as_of(&self) -> UtcDateTime {
        self.as_of
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn is_degraded(&self) -> bool {
        self.prices.is_empty() && self.exchange_rate_is_fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    #[test]
    fn rejects_non_positive_exchange_rate() {
        let err = MarketSnapshot::new(0.0).expect_err("must fail");
        assert_eq!(
            err,
            ValidationError::NonPositiveValue {
                field: "exchange_rate"
            }
        );
        assert!(MarketSnapshot::new(f64::NAN).is_err());
    }

    #[test]
    fn rejects_negative_price() {
        let err = MarketSnapshot::new(5.0)
            .expect("valid")
            .with_price(symbol("VT"), -1.0)
            .expect_err("must fail");
        assert_eq!(err, ValidationError::NegativeValue { field: "price" });
    }

    #[test]
    fn unavailable_snapshot_is_degraded() {
        let snapshot = MarketSnapshot::unavailable(FALLBACK_EXCHANGE_RATE).expect("valid");
        assert!(snapshot.is_degraded());
        assert!(snapshot.prices().is_empty());
        assert_eq!(snapshot.exchange_rate(), 5.80);
    }

    #[test]
    fn price_lookup_uses_normalized_symbol() {
        let snapshot = MarketSnapshot::new(5.0)
            .expect("valid")
            .with_price(symbol("wege3.sa"), 40.0)
            .expect("valid");
        assert_eq!(snapshot.price(&symbol("WEGE3.SA")), Some(40.0));
        assert_eq!(snapshot.price(&symbol("VT")), None);
    }
}
