//! Plain text output formatting.
//!
//! Reports print as TSV and listings as one entry per line, so the output
//! can be piped into other tools.

use reporter_core::{AccessToken, Report, VendorRegions};

/// Text formatter.
#[derive(Debug, Default)]
pub struct TextFormatter;

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new() -> Self {
        Self
    }

    /// Formats an access token, with its expiry when known.
    pub fn format_token(&self, token: &AccessToken) -> String {
        match token.expires_on {
            Some(date) => format!("{}\texpires {}", token.as_str(), date.format("%Y-%m-%d")),
            None => token.as_str().to_string(),
        }
    }

    /// Formats an identifier list, one per line.
    pub fn format_list(&self, items: &[String]) -> String {
        items.join("\n")
    }

    /// Formats vendors as `vendor<TAB>region<TAB>report,report` lines.
    pub fn format_regions(&self, vendors: &[VendorRegions]) -> String {
        vendors
            .iter()
            .flat_map(|vendor| {
                vendor.regions.iter().map(move |region| {
                    format!(
                        "{}\t{}\t{}",
                        vendor.vendor_id,
                        region.code,
                        region.reports.join(",")
                    )
                })
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formats a report as TSV.
    pub fn format_report(&self, report: &Report) -> String {
        report.to_tsv()
    }
}
