//! Token command - print the access token.

use anyhow::Result;
use tracing::info;

use super::{connect, emit};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the token command.
pub async fn run(cli: &Cli) -> Result<()> {
    let reporter = connect(cli)?;
    let token = reporter.access_token().await?;
    info!(expires_on = ?token.expires_on, "Access token ready");

    let output = match cli.format {
        OutputFormat::Text => TextFormatter::new().format_token(&token),
        OutputFormat::Json => JsonFormatter::new(cli.pretty).format_token(&token)?,
    };
    emit(&output);
    Ok(())
}
