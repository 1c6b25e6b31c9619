//! Listing commands - vendors, report types, and regions.

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::{connect, emit};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the reports command.
#[derive(Args)]
pub struct ReportsArgs {
    /// Vendor number.
    #[arg(long)]
    pub vendor: String,
}

/// Runs the vendors command.
pub async fn run_vendors(cli: &Cli) -> Result<()> {
    let vendors = connect(cli)?.list_vendors().await?;
    info!(count = vendors.len(), "Listed vendors");

    let output = match cli.format {
        OutputFormat::Text => TextFormatter::new().format_list(&vendors),
        OutputFormat::Json => JsonFormatter::new(cli.pretty).format_list(&vendors)?,
    };
    emit(&output);
    Ok(())
}

/// Runs the reports command.
pub async fn run_reports(args: &ReportsArgs, cli: &Cli) -> Result<()> {
    let reports = connect(cli)?.list_reports(&args.vendor).await?;

    let output = match cli.format {
        OutputFormat::Text => TextFormatter::new().format_list(&reports),
        OutputFormat::Json => {
            JsonFormatter::new(cli.pretty).format_reports(&args.vendor, &reports)?
        }
    };
    emit(&output);
    Ok(())
}

/// Runs the regions command.
pub async fn run_regions(cli: &Cli) -> Result<()> {
    let vendors = connect(cli)?.vendors_and_regions().await?;

    let output = match cli.format {
        OutputFormat::Text => TextFormatter::new().format_regions(&vendors),
        OutputFormat::Json => JsonFormatter::new(cli.pretty).format_regions(&vendors)?,
    };
    emit(&output);
    Ok(())
}
