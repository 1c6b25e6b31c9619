//! JSON output formatting.

use anyhow::Result;
use chrono::NaiveDate;
use reporter_core::{AccessToken, Report, VendorRegions};
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// Access token output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenOutput<'a> {
    pub access_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<NaiveDate>,
}

/// Report listing output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportsOutput<'a> {
    pub vendor: &'a str,
    pub reports: &'a [String],
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats an access token.
    pub fn format_token(&self, token: &AccessToken) -> Result<String> {
        self.format(&TokenOutput {
            access_token: token.as_str(),
            expires_on: token.expires_on,
        })
    }

    /// Formats an identifier list.
    pub fn format_list(&self, items: &[String]) -> Result<String> {
        self.format(items)
    }

    /// Formats the report types of one vendor.
    pub fn format_reports(&self, vendor: &str, reports: &[String]) -> Result<String> {
        self.format(&ReportsOutput { vendor, reports })
    }

    /// Formats vendors with their regions.
    pub fn format_regions(&self, vendors: &[VendorRegions]) -> Result<String> {
        self.format(vendors)
    }

    /// Formats a report.
    pub fn format_report(&self, report: &Report) -> Result<String> {
        self.format(report)
    }
}
