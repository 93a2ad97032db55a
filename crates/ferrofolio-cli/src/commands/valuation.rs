use ferrofolio_core::{
    allocation_by_category, CategoryAllocation, PortfolioTotals, UtcDateTime, ValuationRecord,
};
use serde::Serialize;

use crate::error::CliError;
use crate::output::{money, percent, Table};

use super::{CommandResult, Context};

#[derive(Debug, Serialize)]
struct RecordView<'a> {
    #[serde(flatten)]
    record: &'a ValuationRecord,
    current_weight: f64,
}

#[derive(Debug, Serialize)]
struct ValuationResponseData<'a> {
    reporting_currency: &'a str,
    as_of: UtcDateTime,
    exchange_rate: f64,
    exchange_rate_is_fallback: bool,
    records: Vec<RecordView<'a>>,
    totals: PortfolioTotals,
    allocation: Vec<CategoryAllocation>,
}

pub async fn run(context: &Context) -> Result<CommandResult, CliError> {
    let (valuation, outcome) = context.valuation().await?;
    let snapshot = &outcome.snapshot;

    let records: Vec<RecordView<'_>> = valuation
        .records
        .iter()
        .map(|record| RecordView {
            record,
            current_weight: valuation.current_weight(record),
        })
        .collect();

    let mut table = Table::new([
        "asset", "category", "value", "cost", "profit", "return", "weight", "target",
    ]);
    for view in &records {
        let record = view.record;
        table.push_row([
            record.symbol.clone(),
            record.category.label().to_owned(),
            money(record.total_value),
            money(record.cost_basis),
            money(record.profit),
            percent(record.return_pct),
            percent(view.current_weight * 100.0),
            percent(record.target_allocation * 100.0),
        ]);
    }
    let totals = valuation.totals;
    table.push_footer(format!(
        "\ntotal {} {}  profit {} ({})  rate {:.4}{}",
        context.config.reporting_currency,
        money(totals.total_value),
        money(totals.total_profit),
        percent(totals.total_return_pct),
        snapshot.exchange_rate(),
        if snapshot.exchange_rate_is_fallback() {
            " (fallback)"
        } else {
            ""
        }
    ));

    let data = serde_json::to_value(ValuationResponseData {
        reporting_currency: &context.config.reporting_currency,
        as_of: snapshot.as_of(),
        exchange_rate: snapshot.exchange_rate(),
        exchange_rate_is_fallback: snapshot.exchange_rate_is_fallback(),
        records,
        totals,
        allocation: allocation_by_category(&valuation),
    })?;

    Ok(CommandResult::ok(data)
        .with_table(table)
        .with_warnings(snapshot.warnings().iter().cloned())
        .with_cache_hit(outcome.cache_hit)
        .with_source(context.market.source_name()))
}
