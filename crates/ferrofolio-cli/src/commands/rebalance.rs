use ferrofolio_core::{
    suggest_rebalancing, validate_contribution, RebalanceOptions, RebalancingSuggestion,
};
use serde::Serialize;

use crate::cli::RebalanceArgs;
use crate::error::CliError;
use crate::output::{money, Table};

use super::{CommandResult, Context};

#[derive(Debug, Serialize)]
struct RebalanceResponseData {
    contribution: f64,
    projected_total: f64,
    options: RebalanceOptions,
    balanced: bool,
    suggestions: Vec<RebalancingSuggestion>,
}

pub async fn run(args: &RebalanceArgs, context: &Context) -> Result<CommandResult, CliError> {
    let contribution = args
        .contribution
        .unwrap_or(context.config.default_contribution);
    let options = resolve_options(args, context.config.rebalance);
    validate_contribution(contribution)?;
    options.validate()?;

    let (valuation, outcome) = context.valuation().await?;
    let suggestions = suggest_rebalancing(&valuation, contribution, &options)?;
    let projected_total = valuation.totals.total_value + contribution;

    let mut table = Table::new(["#", "asset", "current", "target", "allocate"]);
    for suggestion in &suggestions {
        table.push_row([
            suggestion.priority.to_string(),
            suggestion.symbol.clone(),
            money(suggestion.current_value),
            money(suggestion.target_value),
            money(suggestion.shortfall),
        ]);
    }
    if suggestions.is_empty() {
        table.push_footer("\nportfolio balanced: no position is below target");
    } else {
        table.push_footer(format!(
            "\ncontribution {}  projected total {}",
            money(contribution),
            money(projected_total)
        ));
    }

    let data = serde_json::to_value(RebalanceResponseData {
        contribution,
        projected_total,
        options,
        balanced: suggestions.is_empty(),
        suggestions,
    })?;

    Ok(CommandResult::ok(data)
        .with_table(table)
        .with_warnings(outcome.snapshot.warnings().iter().cloned())
        .with_cache_hit(outcome.cache_hit)
        .with_source(context.market.source_name()))
}

fn resolve_options(args: &RebalanceArgs, configured: RebalanceOptions) -> RebalanceOptions {
    RebalanceOptions {
        min_threshold: args.min_threshold.unwrap_or(configured.min_threshold),
        max_suggestions: args.max_suggestions.unwrap_or(configured.max_suggestions),
    }
}
