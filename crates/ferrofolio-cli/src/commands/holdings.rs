use ferrofolio_core::{FixedIncome, HoldingConfig, RebalanceOptions};
use serde::Serialize;

use crate::error::CliError;
use crate::output::{money, percent, Table};

use super::{CommandResult, Context};

#[derive(Debug, Serialize)]
struct HoldingsResponseData<'a> {
    reporting_currency: &'a str,
    fx_symbol: &'a str,
    fallback_exchange_rate: f64,
    default_contribution: f64,
    rebalance: RebalanceOptions,
    holdings: &'a [HoldingConfig],
    fixed_income: &'a FixedIncome,
    target_allocation_sum: f64,
}

pub fn run(context: &Context) -> Result<CommandResult, CliError> {
    let config = &context.config;
    let target_allocation_sum = config.target_allocation_sum();

    let data = serde_json::to_value(HoldingsResponseData {
        reporting_currency: &config.reporting_currency,
        fx_symbol: config.fx_symbol.as_str(),
        fallback_exchange_rate: config.fallback_exchange_rate,
        default_contribution: config.default_contribution,
        rebalance: config.rebalance,
        holdings: &config.holdings,
        fixed_income: &config.fixed_income,
        target_allocation_sum,
    })?;

    let mut table = Table::new(["symbol", "category", "quantity", "avg cost", "target"]);
    for holding in &config.holdings {
        table.push_row([
            holding.symbol.to_string(),
            holding.category().label().to_owned(),
            format!("{:.4}", holding.quantity),
            money(holding.average_cost),
            percent(holding.target_allocation * 100.0),
        ]);
    }
    table.push_row([
        config.fixed_income.label.clone(),
        String::from("Cash"),
        String::from("-"),
        money(config.fixed_income.amount),
        percent(config.fixed_income.target_allocation * 100.0),
    ]);
    table.push_footer(format!(
        "\ntarget allocation sum: {}",
        percent(target_allocation_sum * 100.0)
    ));

    let mut result = CommandResult::ok(data).with_table(table);
    if target_allocation_sum > 1.0 + 1e-9 {
        result = result.with_warning(format!(
            "target allocations add up to {}",
            percent(target_allocation_sum * 100.0)
        ));
    }
    Ok(result)
}
