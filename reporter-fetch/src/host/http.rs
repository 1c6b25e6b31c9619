//! HTTP transport with tracing and domain allowlist.
//!
//! This module provides the production [`Transport`] built on `reqwest`:
//! - Request/response tracing
//! - Domain allowlist for security
//! - Mapping of `reqwest` failures onto [`TransportError`]

use async_trait::async_trait;
use reporter_core::TransportError;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::transport::{HttpRequest, HttpResponse, Method, Transport};

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for the Reporter client.
const USER_AGENT: &str = concat!("reporter/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Transport
// ============================================================================

/// `reqwest`-backed transport with an optional domain allowlist.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: Client,
    timeout: Duration,
    allowed_domains: Option<Vec<String>>,
}

impl HttpTransport {
    /// Creates a transport with default settings.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Request` if the TLS backend cannot be
    /// initialized.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a transport with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Request` if the TLS backend cannot be
    /// initialized.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner: client,
            timeout,
            allowed_domains: None,
        })
    }

    /// Restricts requests to the given domains and their subdomains.
    pub fn with_allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = Some(domains);
        self
    }

    /// Checks if a URL's domain is allowed.
    fn is_domain_allowed(&self, url: &str) -> Result<(), TransportError> {
        let parsed = Url::parse(url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        let Some(ref allowed) = self.allowed_domains else {
            return Ok(()); // No restrictions
        };

        let host = parsed
            .host_str()
            .ok_or_else(|| TransportError::InvalidUrl("No host in URL".to_string()))?;

        let allowed = allowed
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")));

        if allowed {
            Ok(())
        } else {
            Err(TransportError::DomainNotAllowed(host.to_string()))
        }
    }

    fn map_error(&self, err: &reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.is_domain_allowed(&request.url)?;

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self.inner.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        debug!("Sending request");
        let response = builder.send().await.map_err(|e| self.map_error(&e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(|e| self.map_error(&e))?;

        debug!(status, bytes = body.len(), "Response received");
        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_allowlist() {
        let transport = HttpTransport::new()
            .unwrap()
            .with_allowed_domains(vec!["apple.com".to_string()]);

        // Subdomain matching
        assert!(
            transport
                .is_domain_allowed("https://reportingitc-reporter.apple.com/reportservice/sales/v1")
                .is_ok()
        );

        // Not allowed
        assert!(matches!(
            transport.is_domain_allowed("https://evil.com/steal"),
            Err(TransportError::DomainNotAllowed(_))
        ));
    }

    #[test]
    fn test_no_domain_restrictions() {
        let transport = HttpTransport::new().unwrap();
        assert!(transport.is_domain_allowed("https://any.domain.com").is_ok());
    }

    #[test]
    fn test_invalid_url() {
        let transport = HttpTransport::new().unwrap();
        assert!(matches!(
            transport.is_domain_allowed("not-a-valid-url"),
            Err(TransportError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_disallowed_domain_is_rejected_before_sending() {
        let transport = HttpTransport::new()
            .unwrap()
            .with_allowed_domains(vec!["apple.com".to_string()]);

        let request = HttpRequest::post_form("https://example.org/x", [("a", "b")]);
        let result = transport.send(request).await;
        assert!(matches!(result, Err(TransportError::DomainNotAllowed(_))));
    }
}
