use std::sync::Arc;

use ferrofolio_core::{
    MarketDataService, PortfolioConfig, QuoteSource, ReqwestHttpClient, StaticQuoteSource,
    YahooChartSource,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Shared by every handler through `State<Arc<AppState>>`.
pub struct AppState {
    pub portfolio: PortfolioConfig,
    pub market: MarketDataService,
}

impl AppState {
    pub fn new(portfolio: PortfolioConfig, market: MarketDataService) -> Self {
        Self { portfolio, market }
    }
}

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let portfolio = match &config.portfolio_path {
        Some(path) => {
            tracing::info!("Portfolio file in use: {}", path.display());
            PortfolioConfig::load(path)?
        }
        None => PortfolioConfig::builtin(),
    };

    let source: Arc<dyn QuoteSource> = if config.offline {
        tracing::warn!("offline mode: prices will not be fetched");
        Arc::new(StaticQuoteSource::new())
    } else {
        Arc::new(
            YahooChartSource::new(Arc::new(ReqwestHttpClient::new()))
                .with_timeout_ms(config.quote_timeout_ms),
        )
    };

    let market = MarketDataService::from_config(&portfolio, source)?;
    tracing::info!(
        holdings = portfolio.holdings.len(),
        source = market.source_name(),
        cache_ttl_secs = portfolio.cache_ttl_secs,
        "dashboard state ready"
    );
    Ok(Arc::new(AppState::new(portfolio, market)))
}
