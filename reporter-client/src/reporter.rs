//! Reporter facade.
//!
//! One session per set of credentials. Every call resolves the access token
//! if none is cached, then builds, sends and decodes its request. A data call
//! rejected with 401 or 403 drops the cached token if it is still the one
//! that call sent. The failed call is not retried; the next one resolves
//! again.

use reporter_core::{
    AccessToken, Credentials, DateParams, OperationKind, Report, ReporterError,
    RequestDescriptor, RequestParams, TransportError, VendorRegions,
};
use reporter_fetch::{HttpResponse, HttpTransport, Transport, decode};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument};

use crate::config::ReporterConfig;
use crate::listing::{parse_vendor_list, parse_vendors_and_regions};
use crate::parser::TabularParser;
use crate::request::{Auth, RequestBuilder};
use crate::token::TokenExchange;
use crate::xml;

/// Whether the session currently holds a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No token cached; the next call resolves one.
    Unauthenticated,
    /// A token is cached.
    Authenticated,
}

/// Client for the Reporter service.
pub struct Reporter {
    credentials: Credentials,
    builder: RequestBuilder,
    transport: Arc<dyn Transport>,
    token: Mutex<Option<AccessToken>>,
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("credentials", &self.credentials)
            .field("builder", &self.builder)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Reporter {
    /// Creates a session over an arbitrary transport.
    ///
    /// Access token credentials start authenticated.
    pub fn new(
        credentials: Credentials,
        config: &ReporterConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let token = credentials.token().map(AccessToken::new);
        Self {
            credentials,
            builder: RequestBuilder::new(config),
            transport,
            token: Mutex::new(token),
        }
    }

    /// Creates a session over HTTP using the configured timeout and allowlist.
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::Transport` if the HTTP client cannot be built.
    pub fn with_http(
        credentials: Credentials,
        config: &ReporterConfig,
    ) -> Result<Self, ReporterError> {
        let mut transport = HttpTransport::with_timeout(config.timeout())?;
        if let Some(ref domains) = config.allowed_domains {
            transport = transport.with_allowed_domains(domains.clone());
        }
        Ok(Self::new(credentials, config, Arc::new(transport)))
    }

    /// Returns the session state.
    pub fn state(&self) -> SessionState {
        if self.lock_token().is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    /// Returns the cached token without resolving.
    pub fn cached_token(&self) -> Option<AccessToken> {
        self.lock_token().clone()
    }

    /// Returns the access token, resolving it if needed.
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::Authentication` if the exchange is rejected or
    /// the session has no way to obtain a token.
    pub async fn access_token(&self) -> Result<AccessToken, ReporterError> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        let Credentials::UserPassword { user_id, password } = &self.credentials else {
            return Err(ReporterError::authentication(
                None,
                "access token was rejected and no user id and password are available",
            ));
        };

        let token = TokenExchange::new(self.transport.as_ref(), &self.builder)
            .resolve(user_id, password)
            .await?;
        *self.lock_token() = Some(token.clone());
        debug!("Session authenticated");
        Ok(token)
    }

    /// Lists the vendor numbers the account can read.
    ///
    /// # Errors
    ///
    /// Returns any `ReporterError` raised while authenticating, sending, or
    /// parsing.
    #[instrument(skip(self))]
    pub async fn list_vendors(&self) -> Result<Vec<String>, ReporterError> {
        let descriptor = self
            .builder
            .build(OperationKind::VendorList, RequestParams::new())?;
        let text = self.call(&descriptor).await?;
        parse_vendor_list(&text)
    }

    /// Lists every vendor with its financial regions and report types.
    ///
    /// # Errors
    ///
    /// Returns any `ReporterError` raised while authenticating, sending, or
    /// parsing.
    #[instrument(skip(self))]
    pub async fn vendors_and_regions(&self) -> Result<Vec<VendorRegions>, ReporterError> {
        let descriptor = self
            .builder
            .build(OperationKind::VendorsAndRegions, RequestParams::new())?;
        let text = self.call(&descriptor).await?;
        parse_vendors_and_regions(&text)
    }

    /// Lists the report types available for a vendor.
    ///
    /// An unknown vendor yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::InvalidRequest` for an empty vendor id, or any
    /// error raised while authenticating, sending, or parsing.
    #[instrument(skip(self))]
    pub async fn list_reports(&self, vendor_id: &str) -> Result<Vec<String>, ReporterError> {
        let descriptor = self.builder.build(
            OperationKind::ReportList,
            RequestParams::new().vendor(vendor_id),
        )?;
        let text = self.call(&descriptor).await?;
        let reports = parse_vendors_and_regions(&text)?
            .into_iter()
            .find(|v| v.vendor_id == vendor_id)
            .map(|v| v.report_names())
            .unwrap_or_default();
        debug!(count = reports.len(), "Listed reports");
        Ok(reports)
    }

    /// Downloads and parses a report.
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::InvalidRequest` before any network call when a
    /// parameter is missing, otherwise any error raised while
    /// authenticating, sending, decoding, or parsing.
    pub async fn fetch_report(
        &self,
        vendor_id: &str,
        report_name: &str,
        date: DateParams,
    ) -> Result<Report, ReporterError> {
        self.fetch_report_with(vendor_id, report_name, date, &TabularParser::new())
            .await
    }

    /// Downloads a report and parses it with a custom parser.
    ///
    /// # Errors
    ///
    /// See [`Reporter::fetch_report`].
    #[instrument(skip(self, parser))]
    pub async fn fetch_report_with(
        &self,
        vendor_id: &str,
        report_name: &str,
        date: DateParams,
        parser: &TabularParser,
    ) -> Result<Report, ReporterError> {
        let descriptor = self.builder.build(
            OperationKind::ReportFetch,
            RequestParams::new()
                .vendor(vendor_id)
                .report(report_name)
                .date(date),
        )?;
        let text = self.call(&descriptor).await?;
        parser.parse(&text)
    }

    async fn call(&self, descriptor: &RequestDescriptor) -> Result<String, ReporterError> {
        let token = self.access_token().await?;
        let request = self
            .builder
            .encode(descriptor, Auth::Token(token.as_str()))?;

        let response = self.transport.send(request).await?;
        debug!(
            operation = %descriptor.operation(),
            status = response.status,
            bytes = response.body.len(),
            "Service answered"
        );
        self.check_status(&response, &token)?;
        decode(&response)
    }

    fn check_status(
        &self,
        response: &HttpResponse,
        sent: &AccessToken,
    ) -> Result<(), ReporterError> {
        if response.is_success() {
            return Ok(());
        }

        let text = response.text_lossy();
        let service_error = xml::parse_service_error(&text);

        if matches!(response.status, 401 | 403) {
            if self.credentials.can_resolve() {
                let mut cached = self.lock_token();
                if cached.as_ref().is_some_and(|t| t.as_str() == sent.as_str()) {
                    *cached = None;
                    debug!(status = response.status, "Token rejected, cache cleared");
                }
            }
            let message = service_error
                .map(|e| e.message)
                .unwrap_or_else(|| "access token rejected".to_string());
            return Err(ReporterError::authentication(Some(response.status), message));
        }

        let (code, message) = match service_error {
            Some(e) => (e.code, e.message),
            None => (None, text.trim().to_string()),
        };
        Err(TransportError::Status {
            status: response.status,
            code,
            message,
        }
        .into())
    }

    fn lock_token(&self) -> MutexGuard<'_, Option<AccessToken>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reporter_fetch::ScriptedTransport;

    fn reporter(credentials: Credentials) -> (Reporter, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new());
        let reporter = Reporter::new(credentials, &ReporterConfig::default(), transport.clone());
        (reporter, transport)
    }

    #[tokio::test]
    async fn test_preset_token_makes_no_exchange() {
        let (reporter, transport) = reporter(Credentials::access_token("T"));
        assert_eq!(reporter.state(), SessionState::Authenticated);
        assert_eq!(reporter.access_token().await.unwrap().as_str(), "T");
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_list_vendors() {
        let (reporter, transport) = reporter(Credentials::access_token("T"));
        transport.push_response(HttpResponse::ok(
            "<Vendors><Vendor>80012345</Vendor><Vendor>80067891</Vendor></Vendors>",
        ));
        assert_eq!(
            reporter.list_vendors().await.unwrap(),
            vec!["80012345", "80067891"]
        );
    }

    #[tokio::test]
    async fn test_list_reports_for_unknown_vendor_is_empty() {
        let (reporter, transport) = reporter(Credentials::access_token("T"));
        transport.push_response(HttpResponse::ok(
            "<VendorsAndRegions><Vendor><Number>1</Number><Region><Code>US</Code><Reports><Report>Financial</Report></Reports></Region></Vendor></VendorsAndRegions>",
        ));
        assert!(reporter.list_reports("2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_request_sends_nothing() {
        let (reporter, transport) = reporter(Credentials::user_password("u", "p"));
        let err = reporter
            .fetch_report("", "Sales", DateParams::sales("2024-01").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ReporterError::InvalidRequest(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_supplied_token_is_kept() {
        let (reporter, transport) = reporter(Credentials::access_token("T"));
        transport.push_response(HttpResponse::new(401, ""));

        let err = reporter.list_vendors().await.unwrap_err();
        assert!(err.is_authentication());
        assert_eq!(reporter.state(), SessionState::Authenticated);
    }

    #[test]
    fn test_rejection_keeps_newer_cached_token() {
        let (reporter, _) = reporter(Credentials::user_password("u", "p"));
        *reporter.lock_token() = Some(AccessToken::new("T2"));
        let rejected = HttpResponse::new(401, "");

        let err = reporter
            .check_status(&rejected, &AccessToken::new("T1"))
            .unwrap_err();
        assert!(err.is_authentication());
        assert_eq!(reporter.cached_token().unwrap().as_str(), "T2");

        assert!(reporter.check_status(&rejected, &AccessToken::new("T2")).is_err());
        assert_eq!(reporter.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_service_error_maps_to_status() {
        let (reporter, transport) = reporter(Credentials::access_token("T"));
        transport.push_response(HttpResponse::new(
            400,
            "<Error><Code>101</Code><Message>Invalid command.</Message></Error>",
        ));

        let err = reporter.list_vendors().await.unwrap_err();
        assert!(matches!(
            err,
            ReporterError::Transport(TransportError::Status { status: 400, ref code, ref message })
                if code.as_deref() == Some("101") && message == "Invalid command."
        ));
    }
}
