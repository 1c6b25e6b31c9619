//! Access token exchange.
//!
//! Trades a user id and password for an access token:
//!
//! 1. **viewToken** - returns the current token if one exists and has not expired
//! 2. **generateToken** - asks for a new token; the answer carries a
//!    `service_request_id` header
//! 3. **generateToken** again with `isExistingToken=Y` and that `requestId`,
//!    confirming that any previous token may be replaced
//!
//! The final step may answer with a bare token instead of XML. The view step
//! only yields a token from an XML `<AccessToken>`; in Normal response mode it
//! answers with readable text, which never counts as a token.

use chrono::{NaiveDate, Utc};
use reporter_core::{AccessToken, OperationKind, ReporterError, RequestParams};
use reporter_fetch::{HttpResponse, Transport, decode};
use tracing::{debug, instrument};

use crate::request::{Auth, RequestBuilder};
use crate::xml::{self, ACCESS_TOKEN_RE, EXPIRATION_DATE_RE, MESSAGE_RE};

/// Response header naming the pending token request.
pub const SERVICE_REQUEST_ID_HEADER: &str = "service_request_id";

/// Format of `<ExpirationDate>`.
const EXPIRATION_DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Token Answer
// ============================================================================

/// What a token endpoint answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenAnswer {
    /// A token, with its expiry when reported.
    Token(AccessToken),
    /// No token; the service's message, if any.
    NoToken(Option<String>),
}

/// Parses the body of a token answer.
///
/// # Errors
///
/// Returns `ReporterError::Authentication` for a service `<Error>` document
/// and `ReporterError::MalformedResponse` for an unreadable expiry date.
pub fn parse_token_answer(text: &str) -> Result<TokenAnswer, ReporterError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(TokenAnswer::NoToken(None));
    }

    if !xml::looks_like_xml(text) {
        return Ok(TokenAnswer::Token(AccessToken::new(text)));
    }

    if let Some(err) = xml::parse_service_error(text) {
        return Err(ReporterError::authentication(None, err.message));
    }

    let Some(value) = xml::first(&ACCESS_TOKEN_RE, text) else {
        return Ok(TokenAnswer::NoToken(xml::first(&MESSAGE_RE, text)));
    };

    let mut token = AccessToken::new(value);
    if let Some(raw) = xml::first(&EXPIRATION_DATE_RE, text) {
        let date = NaiveDate::parse_from_str(&raw, EXPIRATION_DATE_FORMAT).map_err(|e| {
            ReporterError::malformed(format!("invalid token expiration date '{raw}': {e}"))
        })?;
        token = token.with_expiry(date);
    }
    Ok(TokenAnswer::Token(token))
}

/// Parses the body of a `viewToken` answer.
///
/// Text that is not XML is the service's message, not a token.
///
/// # Errors
///
/// See [`parse_token_answer`].
pub fn parse_view_answer(text: &str) -> Result<TokenAnswer, ReporterError> {
    let text = text.trim();
    if !text.is_empty() && !xml::looks_like_xml(text) {
        return Ok(TokenAnswer::NoToken(Some(text.to_string())));
    }
    parse_token_answer(text)
}

// ============================================================================
// Exchange
// ============================================================================

/// Runs the token exchange over a transport.
pub struct TokenExchange<'a> {
    transport: &'a dyn Transport,
    builder: &'a RequestBuilder,
}

impl<'a> TokenExchange<'a> {
    /// Creates an exchange.
    pub fn new(transport: &'a dyn Transport, builder: &'a RequestBuilder) -> Self {
        Self { transport, builder }
    }

    /// Resolves a token, judging expiry against today's UTC date.
    ///
    /// # Errors
    ///
    /// See [`TokenExchange::resolve_at`].
    pub async fn resolve(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<AccessToken, ReporterError> {
        self.resolve_at(user_id, password, Utc::now().date_naive())
            .await
    }

    /// Resolves a token, judging expiry against `today`.
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::Authentication` if any step answers with a
    /// non-success status or an error document, or no token is issued.
    /// Transport failures propagate unchanged.
    #[instrument(skip(self, user_id, password))]
    pub async fn resolve_at(
        &self,
        user_id: &str,
        password: &str,
        today: NaiveDate,
    ) -> Result<AccessToken, ReporterError> {
        let auth = Auth::Password { user_id, password };

        let viewed = self.step(OperationKind::ViewToken, RequestParams::new(), auth).await?;
        if let TokenAnswer::Token(token) = parse_view_answer(&body_text(&viewed)?)? {
            if token.is_expired_at(today) {
                debug!(expires_on = ?token.expires_on, "Existing token expired");
            } else {
                debug!("Using existing token");
                return Ok(token);
            }
        }

        let generated = self
            .step(OperationKind::GenerateToken, RequestParams::new(), auth)
            .await?;
        let Some(request_id) = generated.header(SERVICE_REQUEST_ID_HEADER) else {
            return match parse_token_answer(&body_text(&generated)?)? {
                TokenAnswer::Token(token) => Ok(token),
                TokenAnswer::NoToken(message) => Err(ReporterError::authentication(
                    Some(generated.status),
                    message.unwrap_or_else(|| {
                        format!("token request answered without {SERVICE_REQUEST_ID_HEADER}")
                    }),
                )),
            };
        };
        debug!(request_id, "Confirming token request");

        let confirmed = self
            .step(
                OperationKind::ConfirmToken,
                RequestParams::new().request_id(request_id),
                auth,
            )
            .await?;
        match parse_token_answer(&body_text(&confirmed)?)? {
            TokenAnswer::Token(token) => {
                debug!("Generated new token");
                Ok(token)
            }
            TokenAnswer::NoToken(message) => Err(ReporterError::authentication(
                Some(confirmed.status),
                message.unwrap_or_else(|| "no access token issued".to_string()),
            )),
        }
    }

    async fn step(
        &self,
        operation: OperationKind,
        params: RequestParams,
        auth: Auth<'_>,
    ) -> Result<HttpResponse, ReporterError> {
        let descriptor = self.builder.build(operation, params)?;
        let request = self.builder.encode(&descriptor, auth)?;
        let response = self.transport.send(request).await?;
        debug!(%operation, status = response.status, "Token step answered");

        if !response.is_success() {
            let text = response.text_lossy();
            let message = xml::parse_service_error(&text)
                .map(|e| e.message)
                .unwrap_or_else(|| format!("{operation} rejected with HTTP {}", response.status));
            return Err(ReporterError::authentication(Some(response.status), message));
        }
        Ok(response)
    }
}

/// Decodes a token answer, treating an empty body as no answer.
fn body_text(response: &HttpResponse) -> Result<String, ReporterError> {
    if response.body.is_empty() {
        return Ok(String::new());
    }
    decode(response)
}
