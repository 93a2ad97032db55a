//! Behavior-driven tests for portfolio configuration
//!
//! These tests verify HOW the built-in table and YAML files are turned into a
//! validated `PortfolioConfig`, and HOW bad files are reported.

use std::io::Write;

use ferrofolio_core::{CoreError, PortfolioConfig, Symbol, ValidationError};
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

// =============================================================================
// Configuration: Built-in Table
// =============================================================================

#[test]
fn when_builtin_table_is_used_system_targets_sum_to_one() {
    // Given: The built-in portfolio
    let config = PortfolioConfig::builtin();

    // When: Target allocations are summed, fixed income included
    let sum = config.target_allocation_sum();

    // Then: The portfolio is fully allocated
    assert!((sum - 1.0).abs() < 1e-9, "sum was {sum}");
}

#[test]
fn when_builtin_table_is_used_system_applies_documented_defaults() {
    let config = PortfolioConfig::builtin();

    assert_eq!(config.reporting_currency, "BRL");
    assert_eq!(config.fx_symbol.as_str(), "BRL=X");
    assert_eq!(config.fallback_exchange_rate, 5.80);
    assert_eq!(config.cache_ttl_secs, 300);
    assert_eq!(config.default_contribution, 1000.0);
    assert_eq!(config.rebalance.min_threshold, 1.0);
    assert_eq!(config.rebalance.max_suggestions, 3);
    assert_eq!(config.fixed_income.amount, 1000.0);
    assert_eq!(config.fixed_income.target_allocation, 0.25);

    let vgt = config
        .holdings
        .iter()
        .find(|h| h.symbol.as_str() == "VGT")
        .expect("VGT configured");
    assert!(!vgt.is_domestic);
    assert_eq!(vgt.quantity, 1.0007);
}

// =============================================================================
// Configuration: YAML Files
// =============================================================================

#[test]
fn when_yaml_file_is_loaded_system_infers_domestic_from_suffix() {
    // Given: A file that omits the domestic flag
    let file = write_config(
        r#"
reporting_currency: BRL
fixed_income:
  label: Tesouro Selic
  amount: 2500.0
  target_allocation: 0.3
holdings:
  - symbol: wege3.sa
    quantity: 25
    target_allocation: 0.4
    average_cost: 40.67
  - symbol: VT
    quantity: 5
    target_allocation: 0.3
    average_cost: 126.96
"#,
    );

    // When: The file is loaded
    let config = PortfolioConfig::load(file.path()).expect("valid config");

    // Then: Symbols are normalized and domestic status is inferred
    assert_eq!(config.holdings.len(), 2);
    assert_eq!(config.holdings[0].symbol, Symbol::parse("WEGE3.SA").expect("valid"));
    assert!(config.holdings[0].is_domestic);
    assert!(!config.holdings[1].is_domestic);
    assert_eq!(config.fixed_income.label, "Tesouro Selic");
    assert_eq!(config.cache_ttl_secs, 300);
}

#[test]
fn when_holding_is_duplicated_system_rejects_config() {
    // Given: The same symbol twice
    let file = write_config(
        r#"
fixed_income: { amount: 0, target_allocation: 0 }
holdings:
  - { symbol: VT, quantity: 1, target_allocation: 0.1, average_cost: 1 }
  - { symbol: vt, quantity: 2, target_allocation: 0.1, average_cost: 1 }
"#,
    );

    // When: The file is loaded
    let error = PortfolioConfig::load(file.path()).expect_err("duplicate must fail");

    // Then: The duplicate is named
    assert!(matches!(
        error,
        CoreError::InvalidInput(ValidationError::DuplicateHolding { ref symbol }) if symbol == "VT"
    ));
}

#[test]
fn when_fallback_rate_is_not_positive_system_rejects_config() {
    let error = PortfolioConfig::from_yaml_str(
        "fallback_exchange_rate: 0\nfixed_income: { amount: 0, target_allocation: 0 }\n",
    )
    .expect_err("zero fallback must fail");

    assert!(error.is_invalid_input());
    assert!(error.to_string().contains("fallback_exchange_rate"));
}

#[test]
fn when_max_suggestions_is_zero_system_rejects_config() {
    let error = PortfolioConfig::from_yaml_str(
        "rebalance: { max_suggestions: 0 }\nfixed_income: { amount: 0, target_allocation: 0 }\n",
    )
    .expect_err("zero max_suggestions must fail");

    assert!(matches!(
        error,
        CoreError::InvalidInput(ValidationError::ZeroMaxSuggestions)
    ));
}

#[test]
fn when_allocations_exceed_one_system_still_loads_config() {
    // Given: Targets that add up to 1.5
    let config = PortfolioConfig::from_yaml_str(
        r#"
fixed_income: { amount: 0, target_allocation: 0.5 }
holdings:
  - { symbol: VT, quantity: 1, target_allocation: 1.0, average_cost: 1 }
"#,
    )
    .expect("over-allocation only warns");

    // Then: The sum is exposed for callers to inspect
    assert!((config.target_allocation_sum() - 1.5).abs() < 1e-9);
}

#[test]
fn when_file_is_missing_system_reports_path() {
    let error = PortfolioConfig::load("/definitely/not/here.yaml").expect_err("must fail");

    assert!(matches!(error, CoreError::ConfigRead { .. }));
    assert!(error.to_string().contains("/definitely/not/here.yaml"));
}

#[test]
fn when_yaml_has_unknown_field_system_reports_parse_error() {
    let error = PortfolioConfig::from_yaml_str(
        "fixed_income: { amount: 0, target_allocation: 0 }\nholdngs: []\n",
    )
    .expect_err("typo must fail");

    assert!(matches!(error, CoreError::ConfigParse(_)));
}

#[test]
fn when_fx_symbol_is_also_a_holding_system_rejects_config() {
    let error = PortfolioConfig::from_yaml_str(
        r#"
fx_symbol: VT
fixed_income: { amount: 0, target_allocation: 0 }
holdings:
  - { symbol: VT, quantity: 1, target_allocation: 0.1, average_cost: 1 }
"#,
    )
    .expect_err("clash must fail");

    assert!(matches!(error, CoreError::Config(_)));
}
