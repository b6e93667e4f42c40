//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for session and comparison results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every turn of every transcript
    Full,
    /// Outcome, final proposals and closing remarks
    Summary,
    /// JSON output
    Json,
}

impl From<OutputFormat> for boardroom_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => Self::Full,
            OutputFormat::Summary => Self::Summary,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// CLI arguments for boardroom
#[derive(Parser, Debug)]
#[command(name = "boardroom")]
#[command(author, version, about = "Boardroom - analyst panels deliberate until they agree on a number")]
#[command(long_about = r#"
Boardroom runs a panel of analyst agents and a manager through a structured
deliberation until every voting analyst proposes the same allocation, or a
turn budget runs out.

A session has three phases:
1. Opening: each analyst presents once, in a fixed order
2. Debate: rule-based turn-taking with the manager arbitrating
3. Final poll: voters submit structured proposals until they agree

`compare` runs two independent houses and lets a judging panel decide which
one did better.

Configuration files are loaded from (in priority order):
1. BOARDROOM_* environment variables
2. --config <path>     Explicit config file
3. ./boardroom.toml    Project-level config
4. ~/.config/boardroom/config.toml   Global config

Example:
  boardroom deliberate --symbol AAPL --budget 100000 --start-year 2020
  boardroom compare --symbol AAPL --symbol MSFT --start-year 2020 --end-year 2023
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format [default: from config, else summary]
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators and live turns
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one investment house until it agrees or runs out of turns
    Deliberate(DeliberateArgs),
    /// Run two houses, then a judging panel that picks the better one
    Compare(CompareArgs),
}

/// What is being decided
#[derive(Args, Debug, Clone)]
pub struct MarketArgs {
    /// Stock symbol to analyze (repeatable)
    #[arg(short, long = "symbol", value_name = "SYMBOL", required = true)]
    pub symbols: Vec<String>,

    /// Budget available to each house
    #[arg(short, long, default_value_t = 100_000.0)]
    pub budget: f64,

    /// Houses decide with data up to this year
    #[arg(long, value_name = "YEAR")]
    pub start_year: i32,

    /// Reference price quoted in the task, as SYMBOL=PRICE (repeatable)
    #[arg(long = "price", value_name = "SYMBOL=PRICE", value_parser = parse_price)]
    pub prices: Vec<(String, f64)>,

    /// Override the configured turn budget
    #[arg(long, value_name = "TURNS")]
    pub turn_budget: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct DeliberateArgs {
    #[command(flatten)]
    pub market: MarketArgs,

    /// Session id, also the file name under the storage directory
    #[arg(long, default_value = "house-1")]
    pub session_id: String,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub market: MarketArgs,

    /// Judges evaluate with data up to this year
    #[arg(long, value_name = "YEAR")]
    pub end_year: i32,

    /// Judge on deterministic digests instead of asking for summaries
    #[arg(long)]
    pub no_summary: bool,
}

fn parse_price(value: &str) -> Result<(String, f64), String> {
    let (symbol, price) = value
        .split_once('=')
        .ok_or_else(|| format!("expected SYMBOL=PRICE, got '{value}'"))?;
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(format!("missing symbol in '{value}'"));
    }
    let price: f64 = price
        .trim()
        .parse()
        .map_err(|_| format!("invalid price in '{value}'"))?;
    Ok((symbol.to_uppercase(), price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_deliberate() {
        let cli = Cli::try_parse_from([
            "boardroom",
            "-vv",
            "deliberate",
            "--symbol",
            "AAPL",
            "--start-year",
            "2020",
            "--price",
            "aapl=75.5",
            "-o",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, Some(OutputFormat::Json));
        let Some(Command::Deliberate(args)) = cli.command else {
            panic!("expected deliberate");
        };
        assert_eq!(args.market.symbols, vec!["AAPL"]);
        assert_eq!(args.market.budget, 100_000.0);
        assert_eq!(args.market.prices, vec![("AAPL".to_string(), 75.5)]);
        assert_eq!(args.session_id, "house-1");
    }

    #[test]
    fn test_parse_compare_requires_end_year() {
        assert!(
            Cli::try_parse_from([
                "boardroom",
                "compare",
                "--symbol",
                "AAPL",
                "--start-year",
                "2020"
            ])
            .is_err()
        );

        let cli = Cli::try_parse_from([
            "boardroom",
            "compare",
            "-s",
            "AAPL",
            "-s",
            "MSFT",
            "--start-year",
            "2020",
            "--end-year",
            "2023",
            "--no-summary",
        ])
        .unwrap();
        let Some(Command::Compare(args)) = cli.command else {
            panic!("expected compare");
        };
        assert_eq!(args.market.symbols, vec!["AAPL", "MSFT"]);
        assert_eq!(args.end_year, 2023);
        assert!(args.no_summary);
    }

    #[test]
    fn test_show_config_without_command() {
        let cli = Cli::try_parse_from(["boardroom", "--show-config"]).unwrap();
        assert!(cli.show_config);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_price_errors() {
        assert!(parse_price("AAPL").is_err());
        assert!(parse_price("=10").is_err());
        assert!(parse_price("AAPL=abc").is_err());
    }
}
