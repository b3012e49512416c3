//! CLI argument definitions for tickrange.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fetch` | Fetch daily history for a ticker list and print range statistics |
//! | `sources` | List providers and their default request policy |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--config` | none | TOML settings file |
//! | `-v` | warn | Repeat for info, then debug logging |
//!
//! # Examples
//!
//! ```bash
//! # 52-week range for three symbols via Marketstack
//! tickrange fetch "AAPL, MSFT, GOOG"
//!
//! # Alpha Vantage free tier, keep going with rate-limited rows
//! tickrange fetch "IBM,AAPL,MSFT,NVDA,TSLA,AMZN" --source alphavantage --rate-limit-mode reject-remaining
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tickrange_core::{OutputSize, ProviderId, RateLimitMode, ValidationError};

/// Range statistics for stock tickers.
#[derive(Debug, Parser)]
#[command(
    name = "tickrange",
    author,
    version,
    about = "Current price versus 52-week range for a list of stock tickers"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// TOML file with provider credentials and rate settings.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity on stderr (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table with a status line.
    Table,
    /// Single JSON object.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch and summarize a comma-separated list of tickers.
    Fetch(FetchArgs),
    /// List supported providers.
    Sources,
}

#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// Comma-separated ticker symbols, e.g. "AAPL, MSFT, GOOG".
    pub symbols: String,

    /// Data provider: marketstack, yahoo or alphavantage.
    #[arg(long, value_name = "SOURCE", value_parser = parse_source)]
    pub source: Option<ProviderId>,

    /// Requests allowed per window; overrides the provider default.
    #[arg(long)]
    pub rate_budget: Option<u32>,

    /// What happens to the remaining symbols once the budget is spent:
    /// fail-fast or reject-remaining.
    #[arg(long, value_name = "MODE", value_parser = parse_rate_limit_mode)]
    pub rate_limit_mode: Option<RateLimitMode>,

    /// Rate-limit window length in milliseconds.
    #[arg(long)]
    pub window_ms: Option<u64>,

    /// Minimum delay between consecutive requests in milliseconds.
    #[arg(long)]
    pub spacing_ms: Option<u64>,

    /// Per-request timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Marketstack proxy prefix; pass an empty string to call directly.
    #[arg(long)]
    pub proxy_url: Option<String>,

    /// Alpha Vantage series size: compact (latest 100 sessions) or full.
    #[arg(long, value_name = "SIZE", value_parser = parse_output_size)]
    pub output_size: Option<OutputSize>,
}

fn parse_source(value: &str) -> Result<ProviderId, ValidationError> {
    value.parse()
}

fn parse_rate_limit_mode(value: &str) -> Result<RateLimitMode, ValidationError> {
    value.parse()
}

fn parse_output_size(value: &str) -> Result<OutputSize, ValidationError> {
    value.parse()
}
