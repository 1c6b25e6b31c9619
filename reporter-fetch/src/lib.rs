// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Reporter Fetch
//!
//! Transport adapters and response decoding for the Reporter client.
//!
//! ## Transport
//!
//! The [`transport`] module defines the boundary the client talks through:
//!
//! - [`Transport`] - Trait performing one HTTP exchange
//! - [`HttpRequest`] / [`HttpResponse`] - Owned request and raw response
//!
//! The [`host`] module provides implementations:
//!
//! - [`host::http`] - `reqwest` client with tracing and domain allowlist
//! - [`host::scripted`] - In-memory replay for tests and offline use
//!
//! ## Decoding
//!
//! [`decode::decode`] turns a raw response into tabular text, unpacking a
//! single-entry zip archive or gzip stream when the payload is compressed.
//!
//! ## Example
//!
//! ```ignore
//! use reporter_fetch::{decode, HttpRequest, HttpTransport, Transport};
//!
//! let transport = HttpTransport::new()?;
//! let response = transport
//!     .send(HttpRequest::post_form(url, [("jsonRequest", body.as_str())]))
//!     .await?;
//! let text = decode(&response)?;
//! ```

pub mod decode;
pub mod host;
pub mod transport;

// Re-export key types at crate root
pub use decode::{decode, decode_bytes, sniff_framing, Framing};
pub use host::{HttpTransport, ScriptedTransport};
pub use transport::{HttpRequest, HttpResponse, Method, Transport};
