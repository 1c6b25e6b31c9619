// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Reporter Core
//!
//! Core types, models, and errors for the Reporter client.
//!
//! This crate provides the foundational types shared by the transport,
//! client, and CLI crates:
//!
//! - Domain models (credentials, request descriptors, reports, vendors)
//! - The error taxonomy
//!
//! ## Key Types
//!
//! ### Authentication
//! - [`Credentials`] - User id and password, or an access token
//! - [`AccessToken`] - A resolved token with its expiry
//!
//! ### Requests
//! - [`RequestDescriptor`] - A validated service call
//! - [`OperationKind`] - Which operation is requested
//! - [`DateParams`] - Sales or financial period selection
//!
//! ### Reports
//! - [`Report`] - Columns plus rows of typed values
//! - [`Value`] - A coerced cell (text, integer, float, date)
//! - [`VendorRegions`] - Vendor with its financial regions
//!
//! ### Errors
//! - [`ReporterError`] - Every pipeline failure
//! - [`TransportError`] - Failures raised by a transport adapter

pub mod error;
pub mod models;

// Re-export error types
pub use error::{ReporterError, ReporterResult, TransportError};

// Re-export all model types
pub use models::{
    // Authentication
    AccessToken,
    Credentials,
    // Requests
    DateParams,
    Frequency,
    OperationKind,
    RequestDescriptor,
    RequestParams,
    Service,
    // Reports
    ColumnType,
    Report,
    Row,
    Value,
    // Listings
    Region,
    VendorRegions,
};
