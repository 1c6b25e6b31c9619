// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Reporter CLI - App Store Connect sales and financial reports from the
//! command line.
//!
//! # Examples
//!
//! ```bash
//! # Obtain an access token
//! REPORTER_USER_ID=me@example.com REPORTER_PASSWORD=secret reporter token
//!
//! # List vendors
//! reporter vendors
//!
//! # Monthly sales summary
//! reporter sales --vendor 80012345 --date 2024-01
//!
//! # Financial report for the US region as JSON
//! reporter --format json --pretty finance --vendor 80012345 --region US --year 2024 --period 4
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use reporter_core::ReporterError;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{listing, report, token};

// ============================================================================
// CLI Definition
// ============================================================================

/// Reporter CLI - App Store Connect reports.
#[derive(Parser)]
#[command(name = "reporter")]
#[command(about = "App Store Connect Reporter client")]
#[command(long_about = r#"
Downloads sales and financial reports from the App Store Connect Reporter
service.

Credentials come from --access-token, or --user-id and --password, or the
environment (REPORTER_ACCESS_TOKEN, or REPORTER_USER_ID and REPORTER_PASSWORD).

Examples:
  reporter token                                    # Print the access token
  reporter vendors                                  # Vendor numbers
  reporter sales --vendor 80012345 --date 2024-01   # Monthly sales
  reporter --format json regions                    # Financial regions
"#)]
#[command(version)]
#[command(author = "Reporter Contributors")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to the user config directory).
    #[arg(long, short = 'c', env = "REPORTER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Account number, for users with access to several accounts.
    #[arg(long, short, global = true)]
    pub account: Option<String>,

    /// Access token; skips the token exchange.
    #[arg(long, global = true)]
    pub access_token: Option<String>,

    /// Account user id (email address).
    #[arg(long, global = true)]
    pub user_id: Option<String>,

    /// Account password.
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Print the access token, obtaining one if needed.
    Token,

    /// List vendor numbers.
    #[command(visible_alias = "v")]
    Vendors,

    /// List financial report types for a vendor.
    Reports(listing::ReportsArgs),

    /// List vendors with their financial regions.
    Regions,

    /// Download a sales report.
    #[command(visible_alias = "s")]
    Sales(report::SalesArgs),

    /// Download a financial report.
    Finance(report::FinanceArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Tab-separated reports, one identifier per line for listings.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Credentials or token rejected.
    AuthError = 2,
    /// Missing or invalid arguments.
    InvalidRequest = 3,
    /// Answer could not be decoded or parsed.
    ParseError = 4,
    /// Network or service failure.
    TransportError = 5,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ReporterError>() {
            Some(ReporterError::Authentication { .. }) => Self::AuthError,
            Some(ReporterError::InvalidRequest(_)) => Self::InvalidRequest,
            Some(ReporterError::MalformedResponse(_) | ReporterError::SchemaMismatch { .. }) => {
                Self::ParseError
            }
            Some(ReporterError::Transport(_)) => Self::TransportError,
            None => Self::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("reporter=debug,info")
    } else {
        EnvFilter::new("reporter=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Token => token::run(&cli).await,
        Commands::Vendors => listing::run_vendors(&cli).await,
        Commands::Reports(args) => listing::run_reports(args, &cli).await,
        Commands::Regions => listing::run_regions(&cli).await,
        Commands::Sales(args) => report::run_sales(args, &cli).await,
        Commands::Finance(args) => report::run_finance(args, &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}
