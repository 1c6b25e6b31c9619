//! CLI command implementations.

pub mod listing;
pub mod report;
pub mod token;

use anyhow::{Context, Result, bail};
use reporter_client::{Reporter, ReporterConfig, credentials_from_env};
use reporter_core::Credentials;
use tracing::debug;

use crate::Cli;

/// Loads configuration, applying command-line overrides.
pub fn load_config(cli: &Cli) -> Result<ReporterConfig> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(ReporterConfig::default_path);
    let mut config = ReporterConfig::load_from(&path)
        .with_context(|| format!("failed to load {}", path.display()))?;

    if let Some(ref account) = cli.account {
        config = config.with_account(account.clone());
    }
    Ok(config)
}

/// Picks credentials from flags, then the environment.
pub fn resolve_credentials(cli: &Cli) -> Result<Credentials> {
    if let Some(ref token) = cli.access_token {
        return Ok(Credentials::access_token(token.clone()));
    }

    match (&cli.user_id, &cli.password) {
        (Some(user_id), Some(password)) => {
            return Ok(Credentials::user_password(user_id.clone(), password.clone()));
        }
        (Some(_), None) => bail!("--user-id needs --password"),
        (None, Some(_)) => bail!("--password needs --user-id"),
        (None, None) => {}
    }

    credentials_from_env().context(
        "no credentials: pass --access-token or --user-id/--password, \
         or set REPORTER_ACCESS_TOKEN or REPORTER_USER_ID/REPORTER_PASSWORD",
    )
}

/// Builds an HTTP-backed reporter for a command.
pub fn connect(cli: &Cli) -> Result<Reporter> {
    let config = load_config(cli)?;
    let credentials = resolve_credentials(cli)?;
    debug!(base_url = %config.base_url, mode = config.mode.as_str(), "Connecting");
    Ok(Reporter::with_http(credentials, &config)?)
}

/// Prints command output unless it is empty.
pub fn emit(output: &str) {
    if !output.is_empty() {
        println!("{}", output.trim_end_matches('\n'));
    }
}
