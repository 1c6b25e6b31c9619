//! Report commands - download sales and financial reports.

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, Utc};
use clap::Args;
use reporter_client::{RowPolicy, TabularParser};
use reporter_core::{DateParams, Frequency, Report};
use tracing::info;

use super::{connect, emit};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the sales command.
#[derive(Args)]
pub struct SalesArgs {
    /// Vendor number.
    #[arg(long)]
    pub vendor: String,

    /// Report type.
    #[arg(long, default_value = "Sales")]
    pub report: String,

    /// Report date: YYYYMMDD (daily), YYYYMM (monthly), or YYYY (yearly).
    /// Dashes are allowed. Defaults to yesterday.
    #[arg(long)]
    pub date: Option<String>,

    /// Frequency, when it cannot be inferred from the date (weekly).
    #[arg(long)]
    pub frequency: Option<Frequency>,

    /// Report subtype.
    #[arg(long, default_value = "Summary")]
    pub subtype: String,

    /// Report version.
    #[arg(long = "report-version", default_value = "1_0")]
    pub report_version: String,

    /// Drop rows with the wrong field count instead of failing.
    #[arg(long)]
    pub lenient: bool,
}

/// Arguments for the finance command.
#[derive(Args)]
pub struct FinanceArgs {
    /// Vendor number.
    #[arg(long)]
    pub vendor: String,

    /// Region code, such as US or ZZ.
    #[arg(long)]
    pub region: String,

    /// Report type.
    #[arg(long, default_value = "Financial")]
    pub report: String,

    /// Fiscal year.
    #[arg(long)]
    pub year: String,

    /// Fiscal period (1-12).
    #[arg(long)]
    pub period: String,

    /// Drop rows with the wrong field count instead of failing.
    #[arg(long)]
    pub lenient: bool,
}

/// Runs the sales command.
pub async fn run_sales(args: &SalesArgs, cli: &Cli) -> Result<()> {
    let date = match args.date {
        Some(ref date) => date.clone(),
        None => yesterday()?,
    };
    let params = match args.frequency {
        Some(frequency) => DateParams::sales_with(frequency, &date)?,
        None => DateParams::sales(&date)?,
    }
    .with_subtype(args.subtype.clone())
    .with_version(args.report_version.clone());

    let reporter = connect(cli)?;
    let report = reporter
        .fetch_report_with(&args.vendor, &args.report, params, &parser(args.lenient))
        .await?;
    print_report(&report, cli)
}

/// Runs the finance command.
pub async fn run_finance(args: &FinanceArgs, cli: &Cli) -> Result<()> {
    let params = DateParams::financial(&args.region, &args.year, &args.period);

    let reporter = connect(cli)?;
    let report = reporter
        .fetch_report_with(&args.vendor, &args.report, params, &parser(args.lenient))
        .await?;
    print_report(&report, cli)
}

fn parser(lenient: bool) -> TabularParser {
    let policy = if lenient {
        RowPolicy::SkipMalformed
    } else {
        RowPolicy::Strict
    };
    TabularParser::new().with_policy(policy)
}

fn yesterday() -> Result<String> {
    let date = Utc::now()
        .date_naive()
        .checked_sub_days(Days::new(1))
        .context("date out of range")?;
    Ok(date_key(date))
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

fn print_report(report: &Report, cli: &Cli) -> Result<()> {
    info!(
        rows = report.len(),
        skipped = report.skipped_rows().len(),
        "Report downloaded"
    );

    let output = match cli.format {
        OutputFormat::Text => TextFormatter::new().format_report(report),
        OutputFormat::Json => JsonFormatter::new(cli.pretty).format_report(report)?,
    };
    emit(&output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_key() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(date_key(date), "20240105");
    }

    #[test]
    fn test_yesterday_is_daily() {
        let key = yesterday().unwrap();
        assert!(matches!(
            DateParams::sales(&key).unwrap(),
            DateParams::Sales {
                frequency: Frequency::Daily,
                ..
            }
        ));
    }
}
