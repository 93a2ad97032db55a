use serde::Serialize;

use ferrofolio_core::{EnvelopeError, Symbol};

use crate::cli::QuoteArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{CommandResult, Context};

#[derive(Debug, Serialize)]
struct QuoteEntry {
    symbol: Symbol,
    price: f64,
}

#[derive(Debug, Serialize)]
struct QuoteResponseData {
    quotes: Vec<QuoteEntry>,
}

pub async fn run(args: &QuoteArgs, context: &Context) -> Result<CommandResult, CliError> {
    let symbols = args
        .symbols
        .iter()
        .map(|raw| Symbol::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let mut quotes = Vec::with_capacity(symbols.len());
    let mut errors = Vec::new();
    let mut table = Table::new(["symbol", "price"]);

    for (symbol, result) in context.market.quotes(&symbols).await {
        match result {
            Ok(price) => {
                table.push_row([symbol.to_string(), format!("{price:.4}")]);
                quotes.push(QuoteEntry { symbol, price });
            }
            Err(error) => {
                table.push_row([symbol.to_string(), String::from("n/a")]);
                let envelope_error = EnvelopeError::new(error.code(), error.message())?
                    .with_symbol(symbol.as_str());
                errors.push(envelope_error);
            }
        }
    }

    let data = serde_json::to_value(QuoteResponseData { quotes })?;
    Ok(CommandResult::ok(data)
        .with_table(table)
        .with_errors(errors)
        .with_source(context.market.source_name()))
}
