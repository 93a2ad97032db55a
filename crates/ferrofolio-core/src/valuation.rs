//! Valuation engine.
//!
//! Turns the holdings table and one [`MarketSnapshot`] into per-asset
//! valuation records and portfolio totals. Pure computation: no I/O and no
//! shared state, so it can be called from any number of tasks at once.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Category, CoreError, FixedIncome, HoldingConfig, MarketSnapshot};

/// One row of the valuation table, expressed in the reporting currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationRecord {
    pub symbol: String,
    pub category: Category,
    pub total_value: f64,
    pub cost_basis: f64,
    pub profit: f64,
    pub return_pct: f64,
    pub target_allocation: f64,
}

impl ValuationRecord {
    fn priced(holding: &HoldingConfig, price: f64, exchange_rate: f64) -> Self {
        let factor = holding.conversion_factor(exchange_rate);
        let total_value = price * holding.quantity * factor;
        let cost_basis = holding.average_cost * holding.quantity * factor;
        let profit = total_value - cost_basis;

        Self {
            symbol: holding.symbol.as_str().to_owned(),
            category: holding.category(),
            total_value,
            cost_basis,
            profit,
            return_pct: percentage(profit, cost_basis),
            target_allocation: holding.target_allocation,
        }
    }

    fn cash(fixed_income: &FixedIncome) -> Self {
        Self {
            symbol: fixed_income.label.clone(),
            category: Category::Cash,
            total_value: fixed_income.amount,
            cost_basis: fixed_income.amount,
            profit: 0.0,
            return_pct: 0.0,
            target_allocation: fixed_income.target_allocation,
        }
    }

    pub fn is_profitable(&self) -> bool {
        self.profit >= 0.0
    }
}

/// Aggregates over every record, cash included.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub total_value: f64,
    pub total_cost: f64,
    pub total_profit: f64,
    pub total_return_pct: f64,
}

/// Output of [`compute_valuation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub records: Vec<ValuationRecord>,
    pub totals: PortfolioTotals,
}

impl Valuation {
    /// Share of the portfolio held in `record`; 0 for an empty portfolio.
    pub fn current_weight(&self, record: &ValuationRecord) -> f64 {
        ratio(record.total_value, self.totals.total_value)
    }

    pub fn find(&self, symbol: &str) -> Option<&ValuationRecord> {
        self.records.iter().find(|record| record.symbol == symbol)
    }

    /// Records backed by market prices, i.e. everything except cash.
    pub fn market_records(&self) -> impl Iterator<Item = &ValuationRecord> {
        self.records
            .iter()
            .filter(|record| record.category != Category::Cash)
    }
}

/// Value every priced holding and append the fixed-income position.
///
/// Holdings without a price in `snapshot` are skipped: they produce no record
/// and add nothing to the totals. Only malformed holdings are errors.
pub fn compute_valuation(
    holdings: &[HoldingConfig],
    snapshot: &MarketSnapshot,
    fixed_income: &FixedIncome,
) -> Result<Valuation, CoreError> {
    fixed_income.validate()?;

    let mut records = Vec::with_capacity(holdings.len() + 1);
    let mut total_value = 0.0;
    let mut total_cost = 0.0;

    for holding in holdings {
        holding.validate()?;

        let Some(price) = snapshot.price(&holding.symbol) else {
            debug!(symbol = %holding.symbol, "no price in snapshot, skipping holding");
            continue;
        };

        let record = ValuationRecord::priced(holding, price, snapshot.exchange_rate());
        total_value += record.total_value;
        total_cost += record.cost_basis;
        records.push(record);
    }

    records.push(ValuationRecord::cash(fixed_income));
    total_value += fixed_income.amount;
    total_cost += fixed_income.amount;

    let total_profit = total_value - total_cost;
    let totals = PortfolioTotals {
        total_value,
        total_cost,
        total_profit,
        total_return_pct: percentage(total_profit, total_cost),
    };

    debug!(
        records = records.len(),
        total_value = totals.total_value,
        total_return_pct = totals.total_return_pct,
        "valuation computed"
    );

    Ok(Valuation { records, totals })
}

/// `part / whole * 100`, defined as 0 when `whole` is not positive.
pub(crate) fn percentage(part: f64, whole: f64) -> f64 {
    ratio(part, whole) * 100.0
}

pub(crate) fn ratio(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Symbol;

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    fn holding(raw: &str, quantity: f64, average_cost: f64, is_domestic: bool) -> HoldingConfig {
        HoldingConfig::new(symbol(raw), quantity, 0.1, average_cost, is_domestic)
            .expect("valid holding")
    }

    #[test]
    fn foreign_holding_is_converted_with_exchange_rate() {
        let snapshot = MarketSnapshot::new(5.0)
            .and_then(|s| s.with_price(symbol("VT"), 100.0))
            .expect("valid snapshot");
        let fixed = FixedIncome::new(0.0, 0.0).expect("valid");

        let valuation =
            compute_valuation(&[holding("VT", 2.0, 80.0, false)], &snapshot, &fixed).expect("ok");

        let record = valuation.find("VT").expect("record present");
        assert_eq!(record.category, Category::Foreign);
        assert_eq!(record.total_value, 1000.0);
        assert_eq!(record.cost_basis, 800.0);
        assert_eq!(record.profit, 200.0);
        assert_eq!(record.return_pct, 25.0);
    }

    #[test]
    fn zero_cost_basis_yields_zero_return() {
        let snapshot = MarketSnapshot::new(5.0)
            .and_then(|s| s.with_price(symbol("BTC-USD"), 60_000.0))
            .expect("valid snapshot");
        let fixed = FixedIncome::new(0.0, 0.0).expect("valid");

        let valuation =
            compute_valuation(&[holding("BTC-USD", 0.0, 0.0, false)], &snapshot, &fixed)
                .expect("ok");

        let record = valuation.find("BTC-USD").expect("record present");
        assert_eq!(record.total_value, 0.0);
        assert_eq!(record.return_pct, 0.0);
        assert!(!record.return_pct.is_nan());
    }

    #[test]
    fn empty_portfolio_has_zero_totals() {
        let snapshot = MarketSnapshot::new(5.0).expect("valid");
        let fixed = FixedIncome::new(0.0, 0.25).expect("valid");

        let valuation = compute_valuation(&[], &snapshot, &fixed).expect("ok");

        assert_eq!(valuation.records.len(), 1);
        assert_eq!(valuation.totals, PortfolioTotals::default());
        assert_eq!(valuation.current_weight(&valuation.records[0]), 0.0);
    }

    #[test]
    fn malformed_holding_is_invalid_input() {
        let snapshot = MarketSnapshot::new(5.0).expect("valid");
        let fixed = FixedIncome::new(0.0, 0.0).expect("valid");
        let bad = HoldingConfig {
            symbol: symbol("VT"),
            quantity: -5.0,
            target_allocation: 0.1,
            average_cost: 1.0,
            is_domestic: false,
        };

        let error = compute_valuation(&[bad], &snapshot, &fixed).expect_err("must fail");
        assert!(error.is_invalid_input());
    }

    #[test]
    fn market_records_exclude_cash() {
        let snapshot = MarketSnapshot::new(5.0)
            .and_then(|s| s.with_price(symbol("VT"), 10.0))
            .expect("valid snapshot");
        let fixed = FixedIncome::new(100.0, 0.5).expect("valid");

        let valuation =
            compute_valuation(&[holding("VT", 1.0, 10.0, false)], &snapshot, &fixed).expect("ok");

        let symbols: Vec<_> = valuation.market_records().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["VT"]);
    }
}
