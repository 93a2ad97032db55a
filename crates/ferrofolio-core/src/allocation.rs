use serde::{Deserialize, Serialize};

use crate::valuation::ratio;
use crate::{Category, Valuation};

/// Value held in one category and its share of the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAllocation {
    pub category: Category,
    pub value: f64,
    pub weight: f64,
}

/// Group valuation records by category, in order of first appearance.
pub fn allocation_by_category(valuation: &Valuation) -> Vec<CategoryAllocation> {
    let mut groups: Vec<CategoryAllocation> = Vec::with_capacity(3);

    for record in &valuation.records {
        match groups
            .iter_mut()
            .find(|group| group.category == record.category)
        {
            Some(group) => group.value += record.total_value,
            None => groups.push(CategoryAllocation {
                category: record.category,
                value: record.total_value,
                weight: 0.0,
            }),
        }
    }

    let total = valuation.totals.total_value;
    for group in &mut groups {
        group.weight = ratio(group.value, total);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compute_valuation, FixedIncome, HoldingConfig, MarketSnapshot, Symbol};

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    #[test]
    fn groups_records_in_first_appearance_order() {
        let holdings = vec![
            HoldingConfig::new(symbol("VT"), 1.0, 0.3, 10.0, false).expect("valid"),
            HoldingConfig::new(symbol("WEGE3.SA"), 10.0, 0.3, 10.0, true).expect("valid"),
            HoldingConfig::new(symbol("IAU"), 1.0, 0.2, 10.0, false).expect("valid"),
        ];
        let snapshot = MarketSnapshot::new(5.0)
            .and_then(|s| {
                s.with_prices([
                    (symbol("VT"), 10.0),
                    (symbol("WEGE3.SA"), 10.0),
                    (symbol("IAU"), 10.0),
                ])
            })
            .expect("valid snapshot");
        let fixed = FixedIncome::new(100.0, 0.2).expect("valid");

        let valuation = compute_valuation(&holdings, &snapshot, &fixed).expect("ok");
        let groups = allocation_by_category(&valuation);

        let categories: Vec<_> = groups.iter().map(|g| g.category).collect();
        assert_eq!(
            categories,
            vec![Category::Foreign, Category::Domestic, Category::Cash]
        );
        assert_eq!(groups[0].value, 100.0);
        assert_eq!(groups[1].value, 100.0);
        assert_eq!(groups[2].value, 100.0);
        let weight_sum: f64 = groups.iter().map(|g| g.weight).sum();
        assert!((weight_sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_portfolio_has_zero_weights() {
        let snapshot = MarketSnapshot::new(5.0).expect("valid");
        let fixed = FixedIncome::new(0.0, 0.0).expect("valid");

        let valuation = compute_valuation(&[], &snapshot, &fixed).expect("ok");
        let groups = allocation_by_category(&valuation);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].weight, 0.0);
    }
}
