//! Error taxonomy for the Reporter client.
//!
//! Every stage of the pipeline fails with a [`ReporterError`]. Transport
//! adapters fail with the narrower [`TransportError`], which is carried
//! through unchanged as [`ReporterError::Transport`].

use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Reporter Error
// ============================================================================

/// Error type for every Reporter operation.
#[derive(Debug, Error)]
pub enum ReporterError {
    /// The service rejected the credentials or the access token.
    ///
    /// Never retried. A facade that sees this on a data call drops its cached
    /// token so the next call resolves a fresh one.
    #[error("Authentication failed: {message}")]
    Authentication {
        /// HTTP status of the rejecting response, if there was one.
        status: Option<u16>,
        /// Message reported by the service, or a local description.
        message: String,
    },

    /// The request could not be completed by the transport.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The caller supplied missing or invalid parameters.
    ///
    /// Raised before any network call is made.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The payload was neither a recognized archive nor plausible text.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The tabular text is structurally inconsistent.
    #[error(
        "Schema mismatch at row {row} (line {line}): expected {expected} fields, found {found}"
    )]
    SchemaMismatch {
        /// Zero-based index of the offending data row (0 for the header).
        row: usize,
        /// One-based line number in the decoded text.
        line: usize,
        /// Number of fields the header defines.
        expected: usize,
        /// Number of fields actually present.
        found: usize,
    },
}

impl ReporterError {
    /// Creates an authentication error.
    pub fn authentication(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Authentication {
            status,
            message: message.into(),
        }
    }

    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Creates a malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Returns true if this error invalidates the cached access token.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}

// ============================================================================
// Transport Error
// ============================================================================

/// Error raised by a transport adapter.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request timed out.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The connection could not be established.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The request failed for another reason.
    #[error("Request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Service error code, if the body carried one.
        code: Option<String>,
        /// Service error message or the raw body.
        message: String,
    },

    /// The target host is not in the allowlist.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// The URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Result alias used across the workspace.
pub type ReporterResult<T> = Result<T, ReporterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_message_names_row() {
        let err = ReporterError::SchemaMismatch {
            row: 1,
            line: 3,
            expected: 2,
            found: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("row 1"));
        assert!(msg.contains("expected 2"));
    }

    #[test]
    fn test_transport_error_passes_through() {
        let err: ReporterError = TransportError::Connect("refused".to_string()).into();
        assert!(matches!(err, ReporterError::Transport(TransportError::Connect(_))));
        assert!(!err.is_authentication());
    }

    #[test]
    fn test_is_authentication() {
        assert!(ReporterError::authentication(Some(401), "nope").is_authentication());
        assert!(!ReporterError::invalid_request("x").is_authentication());
    }
}
