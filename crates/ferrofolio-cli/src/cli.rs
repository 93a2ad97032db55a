//! CLI argument definitions for Ferrofolio.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `holdings` | Show the configured holdings table |
//! | `quote` | Fetch latest prices for symbols |
//! | `valuation` | Value the portfolio at current prices |
//! | `rebalance` | Suggest where to put a new contribution |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--config` | built-in table | YAML portfolio file |
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as errors |
//! | `--offline` | `false` | Skip the network; value cash only |
//! | `--timeout-ms` | `3000` | Per-request timeout in ms |
//!
//! # Examples
//!
//! ```bash
//! ferrofolio valuation --format table
//! ferrofolio rebalance --contribution 2500 --pretty
//! ferrofolio --config portfolio.yaml quote VT BRL=X
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Ferrofolio - portfolio valuation and rebalancing from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "ferrofolio",
    author,
    version,
    about = "Portfolio valuation and rebalancing",
    long_about = "Ferrofolio values a fixed list of holdings at live market prices, converts \
foreign assets with the current exchange rate and suggests where to allocate a new \
contribution.\n\
\n\
Use 'ferrofolio <command> --help' for command-specific help."
)]
pub struct Cli {
    /// YAML portfolio file. Uses the built-in table when omitted.
    #[arg(long, global = true, env = "FERROFOLIO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Do not contact the market data provider.
    ///
    /// Prices are unavailable and the fallback exchange rate is used.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    /// Request timeout budget in milliseconds.
    #[arg(long, global = true, default_value_t = 3000)]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for terminal display.
    Table,
    /// Single JSON envelope.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show configured holdings and target allocations.
    Holdings,
    /// Fetch the latest price for one or more symbols.
    Quote(QuoteArgs),
    /// Value every holding at current prices.
    Valuation,
    /// Rank the most underweight positions for a new contribution.
    Rebalance(RebalanceArgs),
}

#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Symbols to quote, e.g. `WEGE3.SA VT BRL=X`.
    #[arg(required = true)]
    pub symbols: Vec<String>,
}

#[derive(Debug, Args)]
pub struct RebalanceArgs {
    /// Amount about to be invested. Defaults to the configured contribution.
    #[arg(long, allow_negative_numbers = true)]
    pub contribution: Option<f64>,

    /// Ignore shortfalls at or below this amount.
    #[arg(long)]
    pub min_threshold: Option<f64>,

    /// Maximum number of suggestions to return.
    #[arg(long)]
    pub max_suggestions: Option<usize>,
}
