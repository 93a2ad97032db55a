//! Everything one dashboard page shows, computed from a fresh or cached snapshot.

use ferrofolio_core::{
    allocation_by_category, compute_valuation, suggest_rebalancing, validate_contribution,
    CacheMode, CategoryAllocation, Envelope, EnvelopeMeta, PortfolioTotals,
    RebalancingSuggestion, UtcDateTime, ValidationError, ValuationRecord,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{error::ApiResult, AppState};

#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    #[serde(flatten)]
    pub record: ValuationRecord,
    pub current_weight: f64,
}

impl RecordView {
    /// Progress towards the target weight, clamped to `[0, 1]`.
    pub fn target_progress(&self) -> f64 {
        if self.record.target_allocation <= 0.0 {
            return 0.0;
        }
        (self.current_weight / self.record.target_allocation).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub reporting_currency: String,
    pub as_of: UtcDateTime,
    pub exchange_rate: f64,
    pub exchange_rate_is_fallback: bool,
    pub fixed_income_label: String,
    pub fixed_income_amount: f64,
    pub records: Vec<RecordView>,
    pub totals: PortfolioTotals,
    pub allocation: Vec<CategoryAllocation>,
    pub contribution: f64,
    pub suggestions: Vec<RebalancingSuggestion>,
    #[serde(skip)]
    pub warnings: Vec<String>,
    #[serde(skip)]
    pub cache_hit: bool,
}

impl Dashboard {
    pub fn is_balanced(&self) -> bool {
        self.suggestions.is_empty()
    }

    /// Records priced by the market, cash excluded.
    pub fn market_records(&self) -> impl Iterator<Item = &RecordView> {
        self.records
            .iter()
            .filter(|view| view.record.category != ferrofolio_core::Category::Cash)
    }

    pub fn into_envelope(
        self,
        latency_ms: u64,
        source: &str,
    ) -> Result<Envelope<Dashboard>, ValidationError> {
        let mut meta = EnvelopeMeta::new(Uuid::new_v4().to_string(), latency_ms, self.cache_hit)?
            .with_source(source);
        for warning in &self.warnings {
            meta.push_warning(warning.clone());
        }
        Ok(Envelope::success(meta, self))
    }
}

/// Value the portfolio and rank suggestions for `contribution`.
///
/// The contribution defaults to the configured one and is validated before any
/// market data is requested.
pub async fn build_dashboard(
    state: &AppState,
    contribution: Option<f64>,
    mode: CacheMode,
) -> ApiResult<Dashboard> {
    let portfolio = &state.portfolio;
    let contribution = contribution.unwrap_or(portfolio.default_contribution);
    validate_contribution(contribution)?;

    let outcome = state.market.snapshot(mode).await;
    let snapshot = outcome.snapshot;
    let valuation = compute_valuation(&portfolio.holdings, &snapshot, &portfolio.fixed_income)?;
    let suggestions = suggest_rebalancing(&valuation, contribution, &portfolio.rebalance)?;
    let allocation = allocation_by_category(&valuation);

    let records = valuation
        .records
        .iter()
        .map(|record| RecordView {
            record: record.clone(),
            current_weight: valuation.current_weight(record),
        })
        .collect();

    Ok(Dashboard {
        reporting_currency: portfolio.reporting_currency.clone(),
        as_of: snapshot.as_of(),
        exchange_rate: snapshot.exchange_rate(),
        exchange_rate_is_fallback: snapshot.exchange_rate_is_fallback(),
        fixed_income_label: portfolio.fixed_income.label.clone(),
        fixed_income_amount: portfolio.fixed_income.amount,
        records,
        totals: valuation.totals,
        allocation,
        contribution,
        suggestions,
        warnings: snapshot.warnings().to_vec(),
        cache_hit: outcome.cache_hit,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ferrofolio_core::{MarketDataService, PortfolioConfig, StaticQuoteSource, Symbol};

    use super::*;
    use crate::error::ApiError;

    const PORTFOLIO: &str = r#"
reporting_currency: BRL
fallback_exchange_rate: 5.0
fixed_income:
  amount: 100.0
  target_allocation: 0.5
holdings:
  - symbol: WEGE3.SA
    quantity: 10
    target_allocation: 0.5
    average_cost: 10.0
"#;

    fn state(source: StaticQuoteSource) -> AppState {
        let portfolio = PortfolioConfig::from_yaml_str(PORTFOLIO).expect("portfolio");
        let market =
            MarketDataService::from_config(&portfolio, Arc::new(source)).expect("service");
        AppState::new(portfolio, market)
    }

    fn priced() -> StaticQuoteSource {
        StaticQuoteSource::new()
            .with_price(Symbol::parse("WEGE3.SA").expect("symbol"), 12.0)
            .with_price(Symbol::parse("BRL=X").expect("symbol"), 5.0)
    }

    #[tokio::test]
    async fn builds_records_totals_and_suggestions() {
        let state = state(priced());

        let dashboard = build_dashboard(&state, Some(1000.0), CacheMode::Use)
            .await
            .expect("dashboard");

        assert_eq!(dashboard.totals.total_value, 220.0);
        assert_eq!(dashboard.records.len(), 2);
        assert_eq!(dashboard.suggestions[0].symbol, "Fixed Income");
        assert!(!dashboard.exchange_rate_is_fallback);
        assert!(dashboard.warnings.is_empty());
    }

    #[tokio::test]
    async fn negative_contribution_is_rejected() {
        let state = state(priced());

        let error = build_dashboard(&state, Some(-5.0), CacheMode::Use)
            .await
            .expect_err("must fail");

        assert!(matches!(error, ApiError::Core(ref e) if e.is_invalid_input()));
    }

    #[tokio::test]
    async fn offline_source_yields_cash_only_dashboard() {
        let state = state(StaticQuoteSource::new());

        let dashboard = build_dashboard(&state, None, CacheMode::Use)
            .await
            .expect("dashboard");

        assert_eq!(dashboard.records.len(), 1);
        assert_eq!(dashboard.market_records().count(), 0);
        assert!(dashboard.exchange_rate_is_fallback);
        assert_eq!(dashboard.contribution, 1000.0);
        assert!(!dashboard.warnings.is_empty());
    }

    #[test]
    fn target_progress_is_clamped() {
        let view = RecordView {
            record: ValuationRecord {
                symbol: String::from("VT"),
                category: ferrofolio_core::Category::Foreign,
                total_value: 10.0,
                cost_basis: 10.0,
                profit: 0.0,
                return_pct: 0.0,
                target_allocation: 0.1,
            },
            current_weight: 0.4,
        };

        assert_eq!(view.target_progress(), 1.0);
    }
}
