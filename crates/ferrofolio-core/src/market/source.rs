use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use super::SourceError;
use crate::Symbol;

/// Provider of the latest known price for a single symbol.
pub trait QuoteSource: Send + Sync {
    /// Stable identifier used in logs and warnings.
    fn name(&self) -> &'static str;

    fn last_price<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<f64, SourceError>> + Send + 'a>>;
}

/// Serves prices from a fixed table. Unknown symbols are unavailable.
#[derive(Debug, Clone, Default)]
pub struct StaticQuoteSource {
    prices: BTreeMap<Symbol, f64>,
}

impl StaticQuoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, symbol: Symbol, price: f64) -> Self {
        self.prices.insert(symbol, price);
        self
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl FromIterator<(Symbol, f64)> for StaticQuoteSource {
    fn from_iter<T: IntoIterator<Item = (Symbol, f64)>>(iter: T) -> Self {
        Self {
            prices: iter.into_iter().collect(),
        }
    }
}

impl QuoteSource for StaticQuoteSource {
    fn name(&self) -> &'static str {
        "static"
    }

    fn last_price<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<f64, SourceError>> + Send + 'a>> {
        let result = self
            .prices
            .get(symbol)
            .copied()
            .ok_or_else(|| SourceError::unavailable(format!("no static price for '{symbol}'")));
        Box::pin(async move { result })
    }
}
