//! Request encoding.
//!
//! Turns a [`RequestDescriptor`] into the form-encoded POST the service
//! expects. The form carries a single `jsonRequest` field:
//!
//! ```text
//! {"version":"2.2","mode":"Robot.XML","userid":"..","password":"..",
//!  "queryInput":"[p=Reporter.properties, Sales.getVendors]"}
//! ```
//!
//! Data calls replace `userid`/`password` with `accesstoken`. The token
//! confirmation step adds `isExistingToken` and `requestId` form fields.

use reporter_core::{OperationKind, ReporterError, RequestDescriptor, RequestParams, Service};
use reporter_fetch::HttpRequest;
use serde::Serialize;

use crate::config::{ReporterConfig, ResponseMode};

/// Form field carrying the JSON request.
pub const JSON_REQUEST_FIELD: &str = "jsonRequest";

// ============================================================================
// Auth
// ============================================================================

/// Authentication attached to an outbound request.
#[derive(Clone, Copy)]
pub enum Auth<'a> {
    /// Account user id and password, used by the token exchange.
    Password {
        /// User id.
        user_id: &'a str,
        /// Password.
        password: &'a str,
    },
    /// Access token, used by data calls.
    Token(&'a str),
}

impl std::fmt::Debug for Auth<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Password { user_id, .. } => write!(f, "Password({user_id})"),
            Self::Token(_) => f.write_str("Token(<redacted>)"),
        }
    }
}

#[derive(Serialize)]
struct JsonRequest<'a> {
    version: &'a str,
    mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    userid: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    accesstoken: Option<&'a str>,
    #[serde(rename = "queryInput")]
    query_input: String,
}

// ============================================================================
// Builder
// ============================================================================

/// Builds descriptors and encodes them against a configured endpoint.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    version: String,
    mode: ResponseMode,
    account: Option<String>,
}

impl RequestBuilder {
    /// Creates a builder from configuration.
    pub fn new(config: &ReporterConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            version: config.version.clone(),
            mode: config.mode,
            account: config.account().map(str::to_string),
        }
    }

    /// Validates parameters for an operation.
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::InvalidRequest` as described on
    /// [`RequestDescriptor::build`].
    pub fn build(
        &self,
        operation: OperationKind,
        params: RequestParams,
    ) -> Result<RequestDescriptor, ReporterError> {
        RequestDescriptor::build(operation, params)
    }

    /// Returns the answer format requested by this builder.
    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    /// Returns the endpoint URL for a service.
    pub fn endpoint(&self, service: Service) -> String {
        format!("{}/{}/v1", self.base_url, service.path_segment())
    }

    /// Encodes a descriptor into an HTTP request.
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::InvalidRequest` if the authentication kind does
    /// not match the operation: token exchange steps need a password, data
    /// calls need a token.
    pub fn encode(
        &self,
        descriptor: &RequestDescriptor,
        auth: Auth<'_>,
    ) -> Result<HttpRequest, ReporterError> {
        let operation = descriptor.operation();
        let (userid, password, accesstoken) = match (operation.is_token_exchange(), auth) {
            (true, Auth::Password { user_id, password }) => (Some(user_id), Some(password), None),
            (false, Auth::Token(token)) => (None, None, Some(token)),
            (true, Auth::Token(_)) => {
                return Err(ReporterError::invalid_request(format!(
                    "{operation} requires a user id and password"
                )));
            }
            (false, Auth::Password { .. }) => {
                return Err(ReporterError::invalid_request(format!(
                    "{operation} requires an access token"
                )));
            }
        };

        let json = JsonRequest {
            version: &self.version,
            mode: self.mode.as_str(),
            userid,
            password,
            accesstoken,
            query_input: descriptor.query_input(self.account.as_deref()),
        };
        let json = serde_json::to_string(&json).map_err(|e| {
            ReporterError::invalid_request(format!("failed to encode request: {e}"))
        })?;

        let mut fields: Vec<(&str, &str)> = vec![(JSON_REQUEST_FIELD, json.as_str())];
        if operation == OperationKind::ConfirmToken {
            fields.push(("isExistingToken", "Y"));
            if let Some(id) = descriptor.request_id() {
                fields.push(("requestId", id));
            }
        }

        Ok(HttpRequest::post_form(
            self.endpoint(descriptor.service()),
            fields,
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
