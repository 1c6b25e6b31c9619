//! Transport implementations.
//!
//! - [`http`] - `reqwest` transport with tracing and domain allowlist
//! - [`scripted`] - In-memory transport replaying queued responses

pub mod http;
pub mod scripted;

// Re-export key types
pub use http::HttpTransport;
pub use scripted::ScriptedTransport;
