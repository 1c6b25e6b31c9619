//! Credential and access token types.
//!
//! - [`Credentials`] - What the caller supplies at construction time
//! - [`AccessToken`] - A resolved token, optionally with its expiry date

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Credentials
// ============================================================================

/// Credentials used to authenticate against the Reporter service.
///
/// Exactly one form is held. A session built from a user id and password
/// keeps both fields after a token has been resolved so that it can resolve
/// again when the token is rejected.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Account user id (an email address) and password.
    UserPassword {
        /// User id.
        user_id: String,
        /// Password. Never printed by `Debug`.
        password: String,
    },
    /// A previously obtained access token.
    AccessToken {
        /// Opaque token string.
        token: String,
    },
}

impl Credentials {
    /// Creates user id / password credentials.
    pub fn user_password(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self::UserPassword {
            user_id: user_id.into(),
            password: password.into(),
        }
    }

    /// Creates access token credentials.
    pub fn access_token(token: impl Into<String>) -> Self {
        Self::AccessToken {
            token: token.into(),
        }
    }

    /// Returns the supplied token, if these are token credentials.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::AccessToken { token } => Some(token),
            Self::UserPassword { .. } => None,
        }
    }

    /// Returns true if these credentials can be exchanged for a new token.
    pub fn can_resolve(&self) -> bool {
        matches!(self, Self::UserPassword { .. })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserPassword { user_id, .. } => f
                .debug_struct("UserPassword")
                .field("user_id", user_id)
                .field("password", &"<redacted>")
                .finish(),
            Self::AccessToken { .. } => f
                .debug_struct("AccessToken")
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

// ============================================================================
// Access Token
// ============================================================================

/// An access token issued by the service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Opaque token string sent as `accesstoken`.
    pub value: String,
    /// Expiration date reported by the service, when known.
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
}

impl AccessToken {
    /// Creates a token without a known expiry.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_on: None,
        }
    }

    /// Sets the expiration date.
    pub fn with_expiry(mut self, expires_on: NaiveDate) -> Self {
        self.expires_on = Some(expires_on);
        self
    }

    /// Returns true if the token expired before `today`.
    ///
    /// A token without a known expiry is never considered expired.
    pub fn is_expired_at(&self, today: NaiveDate) -> bool {
        self.expires_on.is_some_and(|d| d < today)
    }

    /// Returns the token string.
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}
