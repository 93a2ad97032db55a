use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::http_client::DEFAULT_TIMEOUT_MS;
use super::{HttpClient, HttpRequest, QuoteSource, SourceError};
use crate::Symbol;

pub const YAHOO_CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Last price from the Yahoo Finance chart endpoint.
///
/// Prefers `meta.regularMarketPrice`; when that is missing or not positive
/// the last non-null close of the day's bar series is used instead.
#[derive(Clone)]
pub struct YahooChartSource {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

impl YahooChartSource {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: String::from(YAHOO_CHART_BASE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn endpoint(&self, symbol: &Symbol) -> String {
        format!(
            "{}/{}?range=1d&interval=1d",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(symbol.as_str())
        )
    }

    async fn fetch(&self, symbol: &Symbol) -> Result<f64, SourceError> {
        let request = HttpRequest::get(self.endpoint(symbol))
            .with_header("accept", "application/json")
            .with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|e| {
            SourceError::unavailable(format!("yahoo transport error: {}", e.message()))
        })?;

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "yahoo returned status {} for '{symbol}'",
                response.status
            )));
        }

        let price = parse_chart_price(&response.body)?;
        debug!(%symbol, price, "yahoo chart price");
        Ok(price)
    }
}

impl std::fmt::Debug for YahooChartSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooChartSource")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

impl QuoteSource for YahooChartSource {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn last_price<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<f64, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch(symbol))
    }
}

pub(crate) fn parse_chart_price(body: &str) -> Result<f64, SourceError> {
    let chart_response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = chart_response.chart.error.filter(|e| !e.is_null()) {
        return Err(SourceError::unavailable(format!(
            "yahoo chart API error: {error}"
        )));
    }

    let result = chart_response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::unavailable("no chart data in response"))?;

    if let Some(price) = result
        .meta
        .regular_market_price
        .filter(|p| p.is_finite() && *p > 0.0)
    {
        return Ok(price);
    }

    result
        .indicators
        .and_then(|indicators| indicators.quote.into_iter().next())
        .and_then(|quote| {
            quote
                .close
                .into_iter()
                .rev()
                .flatten()
                .find(|close| close.is_finite() && *close >= 0.0)
        })
        .ok_or_else(|| SourceError::unavailable("chart has no usable price"))
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: YahooChartMeta,
    #[serde(default)]
    indicators: Option<YahooChartIndicators>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooChartMeta {
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}
