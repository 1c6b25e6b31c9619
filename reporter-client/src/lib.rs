// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Reporter Client
//!
//! Client for the App Store Connect Reporter service.
//!
//! ## Pipeline
//!
//! Every call runs the same steps in order:
//!
//! 1. **Build** - validate parameters into a [`RequestDescriptor`](reporter_core::RequestDescriptor)
//! 2. **Authenticate** - reuse the cached token or run the [`token`] exchange
//! 3. **Send** - encode with [`RequestBuilder`] and hand it to a
//!    [`Transport`](reporter_fetch::Transport)
//! 4. **Decode** - unpack zip/gzip payloads into text
//! 5. **Parse** - [`listing`] answers or [`parser`] for reports
//!
//! ## Usage
//!
//! ```ignore
//! use reporter_client::{Reporter, ReporterConfig};
//! use reporter_core::{Credentials, DateParams};
//!
//! let config = ReporterConfig::load()?;
//! let reporter = Reporter::with_http(Credentials::user_password("me@example.com", "secret"), &config)?;
//!
//! for vendor in reporter.list_vendors().await? {
//!     let report = reporter
//!         .fetch_report(&vendor, "Sales", DateParams::sales("2024-01")?)
//!         .await?;
//!     println!("{}", report.to_tsv());
//! }
//! ```

pub mod config;
pub mod listing;
pub mod parser;
pub mod reporter;
pub mod request;
pub mod token;
pub mod xml;

pub use config::{ConfigError, ReporterConfig, ResponseMode, credentials_from_env};
pub use parser::{RowPolicy, TabularParser, parse};
pub use reporter::{Reporter, SessionState};
pub use request::{Auth, RequestBuilder};
pub use token::{TokenAnswer, TokenExchange};
