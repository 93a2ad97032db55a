use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::{CacheMode, QuoteSource, SnapshotCache, SourceError};
use crate::{MarketSnapshot, PortfolioConfig, Symbol, UtcDateTime, ValidationError};

/// A snapshot plus whether it was served from the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotOutcome {
    pub snapshot: MarketSnapshot,
    pub cache_hit: bool,
}

/// Fetches prices for a fixed symbol list and the exchange rate.
///
/// [`MarketDataService::snapshot`] never fails: symbols that cannot be priced
/// are left out and an unavailable exchange rate is replaced by the fallback.
#[derive(Clone)]
pub struct MarketDataService {
    source: Arc<dyn QuoteSource>,
    cache: SnapshotCache,
    symbols: Vec<Symbol>,
    fx_symbol: Symbol,
    degraded: MarketSnapshot,
}

impl MarketDataService {
    pub fn new(
        source: Arc<dyn QuoteSource>,
        cache: SnapshotCache,
        symbols: Vec<Symbol>,
        fx_symbol: Symbol,
        fallback_exchange_rate: f64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            source,
            cache,
            symbols,
            fx_symbol,
            degraded: MarketSnapshot::unavailable(fallback_exchange_rate)?,
        })
    }

    /// Service over every holding of `config`, caching for `config.cache_ttl_secs`.
    pub fn from_config(
        config: &PortfolioConfig,
        source: Arc<dyn QuoteSource>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            source,
            SnapshotCache::from_secs(config.cache_ttl_secs),
            config.symbols().cloned().collect(),
            config.fx_symbol.clone(),
            config.fallback_exchange_rate,
        )
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Snapshot for every configured symbol, honoring `mode`.
    pub async fn snapshot(&self, mode: CacheMode) -> SnapshotOutcome {
        if mode.reads() {
            if let Some(snapshot) = self.cache.get().await {
                debug!("serving market snapshot from cache");
                return SnapshotOutcome {
                    snapshot,
                    cache_hit: true,
                };
            }
        }

        let snapshot = self.fetch().await;
        if mode.writes() {
            self.cache.put(snapshot.clone()).await;
        }

        SnapshotOutcome {
            snapshot,
            cache_hit: false,
        }
    }

    /// Latest prices for arbitrary symbols, in request order. Bypasses the cache.
    pub async fn quotes(&self, symbols: &[Symbol]) -> Vec<(Symbol, Result<f64, SourceError>)> {
        let mut results = self.fetch_all(symbols.to_vec()).await;
        results.sort_by_key(|(index, _, _)| *index);
        results
            .into_iter()
            .map(|(_, symbol, result)| (symbol, result))
            .collect()
    }

    async fn fetch(&self) -> MarketSnapshot {
        let mut snapshot = self.degraded.clone().with_as_of(UtcDateTime::now());

        let mut requested = self.symbols.clone();
        requested.push(self.fx_symbol.clone());
        let mut results = self.fetch_all(requested).await;
        results.sort_by_key(|(index, _, _)| *index);

        for (_, symbol, result) in results {
            if symbol == self.fx_symbol {
                self.apply_exchange_rate(&mut snapshot, result);
                continue;
            }

            let outcome = result.and_then(|price| {
                snapshot
                    .insert_price(symbol.clone(), price)
                    .map_err(|e| SourceError::internal(e.to_string()))
            });
            if let Err(error) = outcome {
                warn!(%symbol, source = self.source.name(), %error, "price unavailable, omitting symbol");
                snapshot.push_warning(format!("price for '{symbol}' unavailable: {error}"));
            }
        }

        info!(
            priced = snapshot.prices().len(),
            requested = self.symbols.len(),
            exchange_rate = snapshot.exchange_rate(),
            fallback_rate = snapshot.exchange_rate_is_fallback(),
            "market snapshot fetched"
        );

        snapshot
    }

    fn apply_exchange_rate(&self, snapshot: &mut MarketSnapshot, result: Result<f64, SourceError>) {
        let outcome = result.and_then(|rate| {
            snapshot
                .set_exchange_rate(rate)
                .map_err(|e| SourceError::internal(e.to_string()))
        });
        if let Err(error) = outcome {
            warn!(
                fx_symbol = %self.fx_symbol,
                fallback = snapshot.exchange_rate(),
                %error,
                "exchange rate unavailable, using fallback"
            );
            snapshot.push_warning(format!(
                "exchange rate '{}' unavailable, using fallback {:.2}",
                self.fx_symbol,
                snapshot.exchange_rate()
            ));
        }
    }

    async fn fetch_all(
        &self,
        symbols: Vec<Symbol>,
    ) -> Vec<(usize, Symbol, Result<f64, SourceError>)> {
        let mut tasks = JoinSet::new();
        for (index, symbol) in symbols.into_iter().enumerate() {
            let source = Arc::clone(&self.source);
            tasks.spawn(async move {
                let result = source.last_price(&symbol).await;
                (index, symbol, result)
            });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(error) => warn!(%error, "quote task failed"),
            }
        }
        results
    }
}

impl std::fmt::Debug for MarketDataService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDataService")
            .field("source", &self.source.name())
            .field("symbols", &self.symbols)
            .field("fx_symbol", &self.fx_symbol)
            .finish_non_exhaustive()
    }
}
