// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HARVEST CLI - Offline tooling for sale and distribution deployments
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "harvest")]
#[command(about = "Harvest - token sale & profit distribution tooling", long_about = None)]
#[command(version)]
struct Cli {
    /// Log engine decisions at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a deployment config (TOML)
    Validate {
        /// Config file (reads HARVEST_CONFIG if omitted)
        #[arg(env = "HARVEST_CONFIG")]
        config: PathBuf,
    },

    /// Convert a payment into tokens at the configured rates
    Quote {
        /// Config file (reads HARVEST_CONFIG if omitted)
        #[arg(env = "HARVEST_CONFIG")]
        config: PathBuf,

        /// Base-currency amount (atomic units)
        #[arg(long, conflicts_with = "secondary", required_unless_present = "secondary")]
        base: Option<String>,

        /// Secondary-unit amount (atomic units)
        #[arg(long)]
        secondary: Option<String>,
    },

    /// Replay a JSON scenario against an in-memory host
    Simulate {
        /// Scenario file
        scenario: PathBuf,

        /// Print every response as a JSON line instead of a summary
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Validate { config } => commands::validate::handle(&config),
        Commands::Quote {
            config,
            base,
            secondary,
        } => commands::quote::handle(&config, base.as_deref(), secondary.as_deref()),
        Commands::Simulate { scenario, json } => commands::simulate::handle(&scenario, json),
    };

    // Handlers return errors without printing them
    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

/// Parse an atomic amount, allowing `_` separators.
fn parse_amount(raw: &str) -> Result<u128, String> {
    raw.replace('_', "")
        .parse::<u128>()
        .map_err(|e| format!("Invalid amount '{}': {}", raw, e))
}

// ─────────────────────────────────────────────────────────────────
// UNIT TESTS
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_validate() {
        let cli = Cli::try_parse_from(["harvest", "validate", "harvest.toml"]).unwrap();
        match cli.command {
            Commands::Validate { config } => assert_eq!(config, PathBuf::from("harvest.toml")),
            _ => panic!("Expected Validate"),
        }
    }

    #[test]
    fn test_cli_quote_base() {
        let cli =
            Cli::try_parse_from(["harvest", "quote", "harvest.toml", "--base", "1_000"]).unwrap();
        match cli.command {
            Commands::Quote {
                base, secondary, ..
            } => {
                assert_eq!(base.as_deref(), Some("1_000"));
                assert!(secondary.is_none());
            }
            _ => panic!("Expected Quote"),
        }
    }

    #[test]
    fn test_cli_quote_needs_exactly_one_currency() {
        assert!(Cli::try_parse_from(["harvest", "quote", "harvest.toml"]).is_err());
        assert!(Cli::try_parse_from([
            "harvest",
            "quote",
            "harvest.toml",
            "--base",
            "1",
            "--secondary",
            "1"
        ])
        .is_err());
    }

    #[test]
    fn test_cli_simulate_flags() {
        let cli =
            Cli::try_parse_from(["harvest", "-v", "simulate", "run.json", "--json"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Simulate { scenario, json } => {
                assert_eq!(scenario, PathBuf::from("run.json"));
                assert!(json);
            }
            _ => panic!("Expected Simulate"),
        }
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1_000_000").unwrap(), 1_000_000);
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("abc").is_err());
    }
}
