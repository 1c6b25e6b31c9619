//! Client configuration.
//!
//! Configuration is a JSON file with every field optional. A missing file
//! yields the defaults. Credentials never live in the file; they come from
//! the caller or from the environment.

use reporter_core::Credentials;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

// ============================================================================
// Constants
// ============================================================================

/// Production service root.
pub const DEFAULT_BASE_URL: &str = "https://reportingitc-reporter.apple.com/reportservice";

/// Protocol version sent with every request.
pub const DEFAULT_VERSION: &str = "2.2";

/// Environment variable holding an access token.
pub const ACCESS_TOKEN_ENV: &str = "REPORTER_ACCESS_TOKEN";

/// Environment variable holding the account user id.
pub const USER_ID_ENV: &str = "REPORTER_USER_ID";

/// Environment variable holding the account password.
pub const PASSWORD_ENV: &str = "REPORTER_PASSWORD";

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON for this schema.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is present but unusable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// ============================================================================
// Response Mode
// ============================================================================

/// Answer format requested from the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseMode {
    /// Machine-readable XML answers.
    #[default]
    #[serde(rename = "Robot.XML")]
    RobotXml,
    /// Human-readable text answers.
    #[serde(rename = "Normal")]
    Normal,
}

impl ResponseMode {
    /// Returns the value sent as `mode`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RobotXml => "Robot.XML",
            Self::Normal => "Normal",
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Reporter client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// Service root; `/sales/v1` and `/finance/v1` are appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Protocol version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Answer format.
    #[serde(default)]
    pub mode: ResponseMode,
    /// Account number for users with access to several accounts.
    #[serde(default)]
    pub account: Option<String>,
    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Restrict outbound requests to these domains.
    #[serde(default)]
    pub allowed_domains: Option<Vec<String>>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            version: default_version(),
            mode: ResponseMode::default(),
            account: None,
            timeout_secs: default_timeout_secs(),
            allowed_domains: None,
        }
    }
}

impl ReporterConfig {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("reporter")
            .join("config.json")
    }

    /// Loads configuration from the default path.
    ///
    /// # Errors
    ///
    /// See [`ReporterConfig::load_from`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads configuration from a specific path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read, parsed,
    /// or validated.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to a specific path, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Checks that the values are usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for an unparsable or non-HTTP base URL,
    /// an empty version, or a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url '{}': {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.version.trim().is_empty() {
            return Err(ConfigError::Invalid("version must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Sets the account number.
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Sets the service root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Returns the HTTP timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the account number if one is set and non-blank.
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref().filter(|a| !a.trim().is_empty())
    }
}

// ============================================================================
// Environment Credentials
// ============================================================================

/// Reads credentials from the process environment.
///
/// An access token wins over a user id and password.
pub fn credentials_from_env() -> Option<Credentials> {
    credentials_from_lookup(|key| std::env::var(key).ok())
}

/// Reads credentials through an arbitrary variable lookup.
pub fn credentials_from_lookup<F>(lookup: F) -> Option<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = non_empty(ACCESS_TOKEN_ENV) {
        debug!(source = "env", "Using access token credentials");
        return Some(Credentials::access_token(token));
    }

    match (non_empty(USER_ID_ENV), non_empty(PASSWORD_ENV)) {
        (Some(user_id), Some(password)) => {
            debug!(source = "env", "Using user id credentials");
            Some(Credentials::user_password(user_id, password))
        }
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = ReporterConfig::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, ReporterConfig::default());
        assert_eq!(config.mode.as_str(), "Robot.XML");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"account": "654321", "mode": "Normal"}"#).unwrap();

        let config = ReporterConfig::load_from(&path).unwrap();
        assert_eq!(config.account(), Some("654321"));
        assert_eq!(config.mode, ResponseMode::Normal);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.version, DEFAULT_VERSION);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = ReporterConfig::default().with_account("1");
        config.save_to(&path).unwrap();
        assert_eq!(ReporterConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        std::fs::write(&path, r#"{"base_url": "ftp://example.com"}"#).unwrap();
        assert!(matches!(
            ReporterConfig::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));

        std::fs::write(&path, r#"{"timeout_secs": 0}"#).unwrap();
        assert!(matches!(
            ReporterConfig::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            ReporterConfig::load_from(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_blank_account_is_ignored() {
        let config = ReporterConfig::default().with_account("  ");
        assert_eq!(config.account(), None);
    }

    #[test]
    fn test_env_token_wins() {
        let vars = env(&[
            (ACCESS_TOKEN_ENV, "T"),
            (USER_ID_ENV, "u"),
            (PASSWORD_ENV, "p"),
        ]);
        let creds = credentials_from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(creds.token(), Some("T"));
    }

    #[test]
    fn test_env_user_password() {
        let vars = env(&[(USER_ID_ENV, "u"), (PASSWORD_ENV, "p")]);
        let creds = credentials_from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(creds, Credentials::user_password("u", "p"));
    }

    #[test]
    fn test_env_incomplete_is_none() {
        let vars = env(&[(USER_ID_ENV, "u"), (ACCESS_TOKEN_ENV, "")]);
        assert!(credentials_from_lookup(|k| vars.get(k).cloned()).is_none());
    }
}
