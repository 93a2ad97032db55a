//! Behavior-driven tests for end-to-end user journeys
//!
//! These tests verify WHAT a user can accomplish with the ferrofolio core,
//! from a portfolio file through pricing to suggestions and a JSON envelope.

use std::io::Write;
use std::sync::Arc;

use ferrofolio_core::{
    allocation_by_category, compute_valuation, suggest_rebalancing, CacheMode, Category,
    Envelope, EnvelopeError, EnvelopeMeta, MarketDataService, PortfolioConfig,
    StaticQuoteSource, Symbol,
};
use tempfile::NamedTempFile;

const PORTFOLIO: &str = r#"
reporting_currency: BRL
fallback_exchange_rate: 5.80
default_contribution: 500.0
rebalance:
  max_suggestions: 2
fixed_income:
  label: Treasury Selic
  amount: 1000.0
  target_allocation: 0.25
holdings:
  - symbol: WEGE3.SA
    quantity: 25
    target_allocation: 0.25
    average_cost: 40.0
  - symbol: VT
    quantity: 2
    target_allocation: 0.25
    average_cost: 100.0
  - symbol: IAU
    quantity: 3
    target_allocation: 0.25
    average_cost: 50.0
"#;

fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

fn portfolio_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(PORTFOLIO.as_bytes()).expect("write portfolio");
    file
}

fn market_source() -> StaticQuoteSource {
    StaticQuoteSource::new()
        .with_price(symbol("WEGE3.SA"), 44.0)
        .with_price(symbol("VT"), 110.0)
        .with_price(symbol("IAU"), 45.0)
        .with_price(symbol("BRL=X"), 5.0)
}

// =============================================================================
// User Journey: Portfolio Review
// =============================================================================

#[tokio::test]
async fn user_can_value_portfolio_from_file_and_see_category_breakdown() {
    // Given: A portfolio file and a market with every price available
    let file = portfolio_file();
    let config = PortfolioConfig::load(file.path()).expect("portfolio loads");
    let service = MarketDataService::from_config(&config, Arc::new(market_source()))
        .expect("service");

    // When: They fetch prices and value the portfolio
    let outcome = service.snapshot(CacheMode::Use).await;
    let valuation = compute_valuation(&config.holdings, &outcome.snapshot, &config.fixed_income)
        .expect("valuation");

    // Then: Every holding plus cash is valued in the reporting currency
    assert_eq!(valuation.records.len(), 4);
    let vt = valuation.find("VT").expect("VT valued");
    assert_eq!(vt.category, Category::Foreign);
    assert_eq!(vt.total_value, 2.0 * 110.0 * 5.0);
    assert_eq!(vt.cost_basis, 2.0 * 100.0 * 5.0);

    let cash = valuation.find("Treasury Selic").expect("cash row");
    assert_eq!(cash.category, Category::Cash);
    assert_eq!(cash.total_value, 1000.0);

    // And: Categories add up to the whole portfolio
    let breakdown = allocation_by_category(&valuation);
    let categories: Vec<Category> = breakdown.iter().map(|slice| slice.category).collect();
    assert_eq!(
        categories,
        vec![Category::Domestic, Category::Foreign, Category::Cash]
    );
    let weight_sum: f64 = breakdown.iter().map(|slice| slice.weight).sum();
    assert!((weight_sum - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn user_can_plan_contribution_with_configured_defaults() {
    // Given: A portfolio whose file caps suggestions at two
    let file = portfolio_file();
    let config = PortfolioConfig::load(file.path()).expect("portfolio loads");
    let service = MarketDataService::from_config(&config, Arc::new(market_source()))
        .expect("service");
    let outcome = service.snapshot(CacheMode::Use).await;
    let valuation = compute_valuation(&config.holdings, &outcome.snapshot, &config.fixed_income)
        .expect("valuation");

    // When: They ask where to put the configured default contribution
    let suggestions =
        suggest_rebalancing(&valuation, config.default_contribution, &config.rebalance)
            .expect("suggestions");

    // Then: At most two positions are suggested, largest shortfall first
    // total = 1100 + 1100 + 675 + 1000 = 3875, projected 4375, target 1093.75 each
    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].symbol, "IAU");
    assert!((suggestions[0].shortfall - (1093.75 - 675.0)).abs() < 1e-9);
    assert_eq!(suggestions[1].symbol, "Treasury Selic");
    assert_eq!(suggestions[1].priority, 2);
}

#[tokio::test]
async fn user_receives_machine_readable_envelope_with_snapshot_warnings() {
    // Given: A market where one holding cannot be priced
    let config = PortfolioConfig::from_yaml_str(PORTFOLIO).expect("portfolio");
    let source = StaticQuoteSource::new()
        .with_price(symbol("WEGE3.SA"), 44.0)
        .with_price(symbol("BRL=X"), 5.0);
    let service = MarketDataService::from_config(&config, Arc::new(source)).expect("service");

    // When: The valuation is wrapped for output
    let outcome = service.snapshot(CacheMode::Use).await;
    let valuation = compute_valuation(&config.holdings, &outcome.snapshot, &config.fixed_income)
        .expect("valuation");
    let mut meta = EnvelopeMeta::new("journey-request-0001", 7, outcome.cache_hit)
        .expect("meta")
        .with_source(service.source_name());
    for warning in outcome.snapshot.warnings() {
        meta.push_warning(warning.clone());
    }
    let mut envelope = Envelope::success(meta, &valuation);
    let error = EnvelopeError::new("source.unavailable", "no quote")
        .expect("valid error")
        .with_symbol("VT");
    envelope.push_error(error).expect("valid error");
    let json = serde_json::to_value(&envelope).expect("serializable");

    // Then: Unpriced holdings are absent from data and explained in meta
    assert_eq!(json["data"]["records"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["meta"]["warnings"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["meta"]["source"], "static");
    assert_eq!(json["errors"][0]["symbol"], "VT");
}
