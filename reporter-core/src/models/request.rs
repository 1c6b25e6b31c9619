//! Request descriptor types.
//!
//! A [`RequestDescriptor`] names one service operation together with its
//! validated parameters. It is built fresh for every call and never shared.
//!
//! - [`Service`] - Which service endpoint handles the operation
//! - [`OperationKind`] - The operation itself
//! - [`DateParams`] - Date and period selection for report downloads
//! - [`RequestParams`] - Unvalidated caller input

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ReporterError;

/// Properties file the service expects at the start of every command.
const PROPERTIES_PREFIX: &str = "p=Reporter.properties";

/// Characters that would break the comma-separated command syntax.
const RESERVED_CHARS: &[char] = &[',', '[', ']'];

// ============================================================================
// Service
// ============================================================================

/// Service endpoint family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    /// Sales and trends reports.
    Sales,
    /// Financial reports.
    Finance,
}

impl Service {
    /// Path segment of the endpoint (`<base>/<segment>/v1`).
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Finance => "finance",
        }
    }

    /// Prefix of the command in `queryInput`.
    pub fn command_prefix(&self) -> &'static str {
        match self {
            Self::Sales => "Sales",
            Self::Finance => "Finance",
        }
    }
}

// ============================================================================
// Operation Kind
// ============================================================================

/// Operations the client can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Look up the account's current access token.
    ViewToken,
    /// Ask the service to generate a new access token.
    GenerateToken,
    /// Confirm a pending token generation.
    ConfirmToken,
    /// List vendor numbers.
    VendorList,
    /// List vendors with their regions and financial report types.
    VendorsAndRegions,
    /// List the reports available for one vendor.
    ReportList,
    /// Download one report.
    ReportFetch,
}

impl OperationKind {
    /// Returns true for the credential exchange operations.
    pub fn is_token_exchange(&self) -> bool {
        matches!(self, Self::ViewToken | Self::GenerateToken | Self::ConfirmToken)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ViewToken => "view-token",
            Self::GenerateToken => "generate-token",
            Self::ConfirmToken => "confirm-token",
            Self::VendorList => "vendor-list",
            Self::VendorsAndRegions => "vendors-and-regions",
            Self::ReportList => "report-list",
            Self::ReportFetch => "report-fetch",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Date Parameters
// ============================================================================

/// Reporting frequency of a sales report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    /// One day, date key `YYYYMMDD`.
    Daily,
    /// One week, date key `YYYYMMDD` of the week's last day.
    Weekly,
    /// One month, date key `YYYYMM`.
    Monthly,
    /// One year, date key `YYYY`.
    Yearly,
}

impl Frequency {
    /// Returns the name the service expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Yearly => "Yearly",
        }
    }

    /// Infers the frequency from the length of a normalized date key.
    fn from_date_key(key: &str) -> Option<Self> {
        match key.len() {
            8 => Some(Self::Daily),
            6 => Some(Self::Monthly),
            4 => Some(Self::Yearly),
            _ => None,
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = ReporterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(ReporterError::invalid_request(format!(
                "unknown frequency '{other}'"
            ))),
        }
    }
}

/// Date or period selection for a report download.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateParams {
    /// Sales report selection.
    Sales {
        /// Reporting frequency.
        frequency: Frequency,
        /// Normalized date key (digits only).
        date: String,
        /// Report subtype, such as `Summary` or `Detailed`.
        #[serde(default)]
        subtype: Option<String>,
        /// Report version, such as `1_0`.
        #[serde(default)]
        version: Option<String>,
    },
    /// Financial report selection.
    Financial {
        /// Region code, such as `US` or `ZZ`.
        region_code: String,
        /// Fiscal year.
        fiscal_year: String,
        /// Fiscal period (1-12).
        fiscal_period: String,
    },
}

impl DateParams {
    /// Sales selection with the frequency inferred from the date key.
    ///
    /// Dashes are removed, then `YYYYMMDD` is daily, `YYYYMM` monthly and
    /// `YYYY` yearly. Weekly reports need [`DateParams::sales_with`].
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::InvalidRequest` if the key has another shape.
    pub fn sales(date: &str) -> Result<Self, ReporterError> {
        let key = normalize_date_key(date)?;
        let frequency = Frequency::from_date_key(&key).ok_or_else(|| {
            ReporterError::invalid_request(format!(
                "cannot infer a frequency from date '{date}'"
            ))
        })?;

        Ok(Self::Sales {
            frequency,
            date: key,
            subtype: None,
            version: None,
        })
    }

    /// Sales selection with an explicit frequency.
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::InvalidRequest` if the date key is not numeric.
    pub fn sales_with(frequency: Frequency, date: &str) -> Result<Self, ReporterError> {
        Ok(Self::Sales {
            frequency,
            date: normalize_date_key(date)?,
            subtype: None,
            version: None,
        })
    }

    /// Financial selection.
    pub fn financial(
        region_code: impl Into<String>,
        fiscal_year: impl Into<String>,
        fiscal_period: impl Into<String>,
    ) -> Self {
        Self::Financial {
            region_code: region_code.into(),
            fiscal_year: fiscal_year.into(),
            fiscal_period: fiscal_period.into(),
        }
    }

    /// Sets the sales report subtype. No effect on financial selections.
    pub fn with_subtype(mut self, value: impl Into<String>) -> Self {
        if let Self::Sales { subtype, .. } = &mut self {
            *subtype = Some(value.into());
        }
        self
    }

    /// Sets the sales report version. No effect on financial selections.
    pub fn with_version(mut self, value: impl Into<String>) -> Self {
        if let Self::Sales { version, .. } = &mut self {
            *version = Some(value.into());
        }
        self
    }

    /// Service that serves reports for this selection.
    pub fn service(&self) -> Service {
        match self {
            Self::Sales { .. } => Service::Sales,
            Self::Financial { .. } => Service::Finance,
        }
    }

    fn validate(&self) -> Result<(), ReporterError> {
        match self {
            Self::Sales {
                date,
                subtype,
                version,
                ..
            } => {
                require("date", date)?;
                check_reserved("subtype", subtype.as_deref().unwrap_or_default())?;
                check_reserved("version", version.as_deref().unwrap_or_default())
            }
            Self::Financial {
                region_code,
                fiscal_year,
                fiscal_period,
            } => {
                require("region code", region_code)?;
                require("fiscal year", fiscal_year)?;
                require("fiscal period", fiscal_period)
            }
        }
    }
}

fn normalize_date_key(date: &str) -> Result<String, ReporterError> {
    let key: String = date.trim().chars().filter(|c| *c != '-').collect();
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_digit()) {
        return Err(ReporterError::invalid_request(format!(
            "date '{date}' is not a numeric date key"
        )));
    }
    Ok(key)
}

// ============================================================================
// Request Parameters
// ============================================================================

/// Caller-supplied parameters, validated by [`RequestDescriptor::build`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    /// Target vendor number.
    pub vendor_id: Option<String>,
    /// Report name (report type), such as `Sales` or `Financial`.
    pub report_name: Option<String>,
    /// Date or period selection.
    pub date: Option<DateParams>,
    /// Pending token request id, for [`OperationKind::ConfirmToken`].
    pub request_id: Option<String>,
}

impl RequestParams {
    /// Creates empty parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the vendor number.
    pub fn vendor(mut self, vendor_id: impl Into<String>) -> Self {
        self.vendor_id = Some(vendor_id.into());
        self
    }

    /// Sets the report name.
    pub fn report(mut self, report_name: impl Into<String>) -> Self {
        self.report_name = Some(report_name.into());
        self
    }

    /// Sets the date selection.
    pub fn date(mut self, date: DateParams) -> Self {
        self.date = Some(date);
        self
    }

    /// Sets the pending token request id.
    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

// ============================================================================
// Request Descriptor
// ============================================================================

/// A validated, immutable description of one service call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestDescriptor {
    operation: OperationKind,
    service: Service,
    vendor_id: Option<String>,
    report_name: Option<String>,
    date: Option<DateParams>,
    request_id: Option<String>,
}

impl RequestDescriptor {
    /// Validates `params` for `operation` and builds a descriptor.
    ///
    /// Pure: no side effects, identical inputs give identical descriptors.
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::InvalidRequest` when a parameter required by
    /// the operation is missing or empty, or contains a character reserved by
    /// the command syntax.
    pub fn build(operation: OperationKind, params: RequestParams) -> Result<Self, ReporterError> {
        let RequestParams {
            vendor_id,
            report_name,
            date,
            request_id,
        } = params;

        if let Some(ref v) = vendor_id {
            check_reserved("vendor id", v)?;
        }
        if let Some(ref r) = report_name {
            check_reserved("report name", r)?;
        }

        let service = match operation {
            OperationKind::ViewToken | OperationKind::GenerateToken | OperationKind::VendorList => {
                Service::Sales
            }
            OperationKind::ConfirmToken => {
                require("request id", request_id.as_deref().unwrap_or_default())?;
                Service::Sales
            }
            OperationKind::VendorsAndRegions => Service::Finance,
            OperationKind::ReportList => {
                require("vendor id", vendor_id.as_deref().unwrap_or_default())?;
                Service::Finance
            }
            OperationKind::ReportFetch => {
                require("vendor id", vendor_id.as_deref().unwrap_or_default())?;
                require("report name", report_name.as_deref().unwrap_or_default())?;
                let date = date.as_ref().ok_or_else(|| {
                    ReporterError::invalid_request("report-fetch requires a date")
                })?;
                date.validate()?;
                date.service()
            }
        };

        Ok(Self {
            operation,
            service,
            vendor_id,
            report_name,
            date,
            request_id,
        })
    }

    /// The operation.
    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    /// The service endpoint family.
    pub fn service(&self) -> Service {
        self.service
    }

    /// The vendor number, if any.
    pub fn vendor_id(&self) -> Option<&str> {
        self.vendor_id.as_deref()
    }

    /// The report name, if any.
    pub fn report_name(&self) -> Option<&str> {
        self.report_name.as_deref()
    }

    /// The date selection, if any.
    pub fn date(&self) -> Option<&DateParams> {
        self.date.as_ref()
    }

    /// The pending token request id, if any.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// The command after the service prefix, such as `getVendors`.
    pub fn command(&self) -> String {
        match self.operation {
            OperationKind::ViewToken => "viewToken".to_string(),
            OperationKind::GenerateToken | OperationKind::ConfirmToken => {
                "generateToken".to_string()
            }
            OperationKind::VendorList => "getVendors".to_string(),
            OperationKind::VendorsAndRegions | OperationKind::ReportList => {
                "getVendorsAndRegions".to_string()
            }
            OperationKind::ReportFetch => self.report_command(),
        }
    }

    fn report_command(&self) -> String {
        let vendor = self.vendor_id.as_deref().unwrap_or_default();
        let report = self.report_name.as_deref().unwrap_or_default();
        match &self.date {
            Some(DateParams::Sales {
                frequency,
                date,
                subtype,
                version,
            }) => format!(
                "getReport, {vendor},{report},{},{},{date},{}",
                subtype.as_deref().unwrap_or_default(),
                frequency.as_str(),
                version.as_deref().unwrap_or_default(),
            ),
            Some(DateParams::Financial {
                region_code,
                fiscal_year,
                fiscal_period,
            }) => format!(
                "getReport {vendor}, {region_code}, {report}, {fiscal_year}, {fiscal_period}"
            ),
            None => "getReport".to_string(),
        }
    }

    /// The full `queryInput` value.
    ///
    /// `[p=Reporter.properties, a=<account>, Sales.getVendors]`, with the
    /// account segment present only when an account number is configured.
    pub fn query_input(&self, account: Option<&str>) -> String {
        let account = account
            .filter(|a| !a.is_empty())
            .map(|a| format!("a={a}, "))
            .unwrap_or_default();
        format!(
            "[{PROPERTIES_PREFIX}, {account}{}.{}]",
            self.service.command_prefix(),
            self.command()
        )
    }
}

fn require(name: &str, value: &str) -> Result<(), ReporterError> {
    if value.trim().is_empty() {
        return Err(ReporterError::invalid_request(format!("{name} is required")));
    }
    check_reserved(name, value)
}

fn check_reserved(name: &str, value: &str) -> Result<(), ReporterError> {
    if value.contains(RESERVED_CHARS) {
        return Err(ReporterError::invalid_request(format!(
            "{name} '{value}' contains a reserved character"
        )));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sales_date_inference() {
        let p = DateParams::sales("2024-01").unwrap();
        assert!(matches!(
            p,
            DateParams::Sales { frequency: Frequency::Monthly, ref date, .. } if date == "202401"
        ));
        assert!(matches!(
            DateParams::sales("20240115").unwrap(),
            DateParams::Sales { frequency: Frequency::Daily, .. }
        ));
        assert!(matches!(
            DateParams::sales("2024").unwrap(),
            DateParams::Sales { frequency: Frequency::Yearly, .. }
        ));
        assert!(DateParams::sales("24-1").is_err());
        assert!(DateParams::sales("Jan 2024").is_err());
    }

    #[test]
    fn test_fetch_requires_all_parameters() {
        let date = DateParams::sales("2024-01").unwrap();

        let missing_vendor = RequestParams::new().report("Sales").date(date.clone());
        assert!(matches!(
            RequestDescriptor::build(OperationKind::ReportFetch, missing_vendor),
            Err(ReporterError::InvalidRequest(_))
        ));

        let missing_report = RequestParams::new().vendor("V1").date(date.clone());
        assert!(RequestDescriptor::build(OperationKind::ReportFetch, missing_report).is_err());

        let missing_date = RequestParams::new().vendor("V1").report("Sales");
        assert!(RequestDescriptor::build(OperationKind::ReportFetch, missing_date).is_err());

        let blank_vendor = RequestParams::new().vendor("  ").report("Sales").date(date);
        assert!(RequestDescriptor::build(OperationKind::ReportFetch, blank_vendor).is_err());
    }

    #[test]
    fn test_report_list_requires_vendor() {
        assert!(RequestDescriptor::build(OperationKind::ReportList, RequestParams::new()).is_err());
        assert!(
            RequestDescriptor::build(OperationKind::ReportList, RequestParams::new().vendor("V"))
                .is_ok()
        );
    }

    #[test]
    fn test_confirm_requires_request_id() {
        assert!(
            RequestDescriptor::build(OperationKind::ConfirmToken, RequestParams::new()).is_err()
        );
    }

    #[test]
    fn test_reserved_characters_rejected() {
        let params = RequestParams::new().vendor("V1,V2");
        assert!(RequestDescriptor::build(OperationKind::ReportList, params).is_err());
    }

    #[test]
    fn test_build_is_deterministic() {
        let params = || {
            RequestParams::new()
                .vendor("85000000")
                .report("Sales")
                .date(DateParams::sales("2024-01-15").unwrap().with_subtype("Summary"))
        };
        let a = RequestDescriptor::build(OperationKind::ReportFetch, params()).unwrap();
        let b = RequestDescriptor::build(OperationKind::ReportFetch, params()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.query_input(None), b.query_input(None));
    }

    #[test]
    fn test_sales_report_command() {
        let params = RequestParams::new()
            .vendor("85000000")
            .report("Sales")
            .date(
                DateParams::sales("2024-01-15")
                    .unwrap()
                    .with_subtype("Summary")
                    .with_version("1_0"),
            );
        let desc = RequestDescriptor::build(OperationKind::ReportFetch, params).unwrap();

        assert_eq!(desc.service(), Service::Sales);
        assert_eq!(
            desc.query_input(None),
            "[p=Reporter.properties, Sales.getReport, 85000000,Sales,Summary,Daily,20240115,1_0]"
        );
    }

    #[test]
    fn test_financial_report_command() {
        let params = RequestParams::new()
            .vendor("80012345")
            .report("Financial")
            .date(DateParams::financial("US", "2024", "3"));
        let desc = RequestDescriptor::build(OperationKind::ReportFetch, params).unwrap();

        assert_eq!(desc.service(), Service::Finance);
        assert_eq!(
            desc.query_input(None),
            "[p=Reporter.properties, Finance.getReport 80012345, US, Financial, 2024, 3]"
        );
    }

    #[test]
    fn test_query_input_with_account() {
        let desc =
            RequestDescriptor::build(OperationKind::VendorList, RequestParams::new()).unwrap();
        assert_eq!(
            desc.query_input(Some("654321")),
            "[p=Reporter.properties, a=654321, Sales.getVendors]"
        );
        assert_eq!(
            desc.query_input(Some("")),
            "[p=Reporter.properties, Sales.getVendors]"
        );
    }
}
