//! Rebalancing advisor.
//!
//! Ranks the positions that sit furthest below their target value once a new
//! contribution is added to the portfolio. Only buys are suggested.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::validate_non_negative;
use crate::{Category, CoreError, Valuation, ValidationError};

/// Tuning knobs for [`suggest_rebalancing`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebalanceOptions {
    /// Shortfalls at or below this amount are ignored.
    pub min_threshold: f64,
    pub max_suggestions: usize,
}

impl Default for RebalanceOptions {
    fn default() -> Self {
        Self {
            min_threshold: 1.0,
            max_suggestions: 3,
        }
    }
}

impl RebalanceOptions {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.min_threshold.is_finite() {
            return Err(ValidationError::NonFiniteValue {
                field: "min_threshold",
            });
        }
        if self.max_suggestions == 0 {
            return Err(ValidationError::ZeroMaxSuggestions);
        }
        Ok(())
    }
}

/// One position to top up, with the amount to allocate to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalancingSuggestion {
    pub symbol: String,
    pub category: Category,
    pub current_value: f64,
    pub target_value: f64,
    pub shortfall: f64,
    pub priority: usize,
}

/// A contribution must be a finite, non-negative amount.
pub fn validate_contribution(contribution: f64) -> Result<(), ValidationError> {
    validate_non_negative("contribution", contribution)
}

/// Rank underweight positions given a prospective `contribution`.
///
/// Every record takes part, the cash position included. An empty result means
/// the portfolio is balanced within `options.min_threshold`.
pub fn suggest_rebalancing(
    valuation: &Valuation,
    contribution: f64,
    options: &RebalanceOptions,
) -> Result<Vec<RebalancingSuggestion>, CoreError> {
    validate_contribution(contribution)?;
    options.validate()?;

    let projected_total = valuation.totals.total_value + contribution;

    let mut candidates: Vec<RebalancingSuggestion> = valuation
        .records
        .iter()
        .filter_map(|record| {
            let target_value = projected_total * record.target_allocation;
            let shortfall = target_value - record.total_value;
            (shortfall > options.min_threshold).then(|| RebalancingSuggestion {
                symbol: record.symbol.clone(),
                category: record.category,
                current_value: record.total_value,
                target_value,
                shortfall,
                priority: 0,
            })
        })
        .collect();

    // `sort_by` is stable, so equal shortfalls keep record order.
    candidates.sort_by(|left, right| right.shortfall.total_cmp(&left.shortfall));
    candidates.truncate(options.max_suggestions);
    for (index, suggestion) in candidates.iter_mut().enumerate() {
        suggestion.priority = index + 1;
    }

    debug!(
        projected_total,
        suggestions = candidates.len(),
        "rebalancing suggestions computed"
    );

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PortfolioTotals, ValuationRecord};

    fn record(symbol: &str, total_value: f64, target_allocation: f64) -> ValuationRecord {
        ValuationRecord {
            symbol: symbol.to_owned(),
            category: Category::Domestic,
            total_value,
            cost_basis: total_value,
            profit: 0.0,
            return_pct: 0.0,
            target_allocation,
        }
    }

    fn valuation(records: Vec<ValuationRecord>) -> Valuation {
        let total_value = records.iter().map(|r| r.total_value).sum();
        Valuation {
            records,
            totals: PortfolioTotals {
                total_value,
                total_cost: total_value,
                total_profit: 0.0,
                total_return_pct: 0.0,
            },
        }
    }

    #[test]
    fn ties_keep_input_order() {
        let valuation = valuation(vec![record("A", 0.0, 0.25), record("B", 0.0, 0.25)]);

        let suggestions =
            suggest_rebalancing(&valuation, 400.0, &RebalanceOptions::default()).expect("ok");

        let symbols: Vec<_> = suggestions.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["A", "B"]);
        assert_eq!(suggestions[0].priority, 1);
        assert_eq!(suggestions[1].priority, 2);
    }

    #[test]
    fn shortfall_equal_to_threshold_is_filtered() {
        let valuation = valuation(vec![record("A", 99.0, 1.0)]);

        let suggestions =
            suggest_rebalancing(&valuation, 1.0, &RebalanceOptions::default()).expect("ok");

        assert!(suggestions.is_empty());
    }

    #[test]
    fn rejects_non_finite_contribution() {
        let valuation = valuation(vec![record("A", 10.0, 1.0)]);

        let error = suggest_rebalancing(&valuation, f64::INFINITY, &RebalanceOptions::default())
            .expect_err("must fail");

        assert!(error.is_invalid_input());
    }

    #[test]
    fn rejects_zero_max_suggestions() {
        let valuation = valuation(vec![record("A", 10.0, 1.0)]);
        let options = RebalanceOptions {
            max_suggestions: 0,
            ..RebalanceOptions::default()
        };

        let error = suggest_rebalancing(&valuation, 0.0, &options).expect_err("must fail");

        assert!(matches!(
            error,
            CoreError::InvalidInput(ValidationError::ZeroMaxSuggestions)
        ));
    }
}
