mod holdings;
mod quote;
mod rebalance;
mod valuation;

use std::sync::Arc;
use std::time::Instant;

use ferrofolio_core::{
    compute_valuation, CacheMode, Envelope, EnvelopeError, MarketDataService, PortfolioConfig,
    QuoteSource, ReqwestHttpClient, SnapshotOutcome, StaticQuoteSource, Valuation,
    YahooChartSource,
};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::Metadata;
use crate::output::Table;

pub struct CommandResult {
    pub data: Value,
    pub table: Option<Table>,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub cache_hit: bool,
    pub source: Option<&'static str>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            table: None,
            warnings: Vec::new(),
            errors: Vec::new(),
            cache_hit: false,
            source: None,
        }
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.table = Some(table);
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_cache_hit(mut self, cache_hit: bool) -> Self {
        self.cache_hit = cache_hit;
        self
    }

    pub fn with_source(mut self, source: &'static str) -> Self {
        self.source = Some(source);
        self
    }
}

/// Everything a command needs: the portfolio and a way to price it.
pub struct Context {
    pub config: PortfolioConfig,
    pub market: MarketDataService,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let config = match &cli.config {
            Some(path) => PortfolioConfig::load(path)?,
            None => PortfolioConfig::builtin(),
        };

        let source: Arc<dyn QuoteSource> = if cli.offline {
            Arc::new(StaticQuoteSource::new())
        } else {
            Arc::new(
                YahooChartSource::new(Arc::new(ReqwestHttpClient::new()))
                    .with_timeout_ms(cli.timeout_ms),
            )
        };
        debug!(
            source = source.name(),
            holdings = config.holdings.len(),
            "command context ready"
        );

        let market = MarketDataService::from_config(&config, source)?;
        Ok(Self { config, market })
    }

    /// Fetch a snapshot and value the configured portfolio against it.
    pub async fn valuation(&self) -> Result<(Valuation, SnapshotOutcome), CliError> {
        let outcome = self.market.snapshot(CacheMode::Use).await;
        let valuation = compute_valuation(
            &self.config.holdings,
            &outcome.snapshot,
            &self.config.fixed_income,
        )?;
        Ok((valuation, outcome))
    }
}

pub async fn run(cli: &Cli) -> Result<(Envelope<Value>, Option<Table>), CliError> {
    let started = Instant::now();
    let context = Context::from_cli(cli)?;

    let command_result = match &cli.command {
        Command::Holdings => holdings::run(&context)?,
        Command::Quote(args) => quote::run(args, &context).await?,
        Command::Valuation => valuation::run(&context).await?,
        Command::Rebalance(args) => rebalance::run(args, &context).await?,
    };

    let CommandResult {
        data,
        table,
        mut warnings,
        errors,
        cache_hit,
        source,
    } = command_result;

    if cli.offline && !matches!(&cli.command, Command::Holdings) {
        warnings.insert(
            0,
            String::from("offline mode: no prices fetched, fallback exchange rate in use"),
        );
    }

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut metadata = Metadata::new(source, latency_ms, cache_hit);
    for warning in warnings {
        metadata.push_warning(warning);
    }

    let meta = metadata.into_envelope_meta()?;
    let envelope = Envelope::with_errors(meta, data, errors)?;
    Ok((envelope, table))
}
