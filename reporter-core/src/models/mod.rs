//! Domain models for the Reporter client.
//!
//! ## Submodules
//!
//! - [`credentials`] - Credentials and resolved access tokens
//! - [`request`] - Request descriptors and date selections
//! - [`report`] - Parsed reports, rows, and typed values
//! - [`vendor`] - Vendor and region listings

mod credentials;
mod report;
mod request;
mod vendor;

pub use credentials::{AccessToken, Credentials};
pub use report::{ColumnType, Report, Row, Value};
pub use request::{
    DateParams, Frequency, OperationKind, RequestDescriptor, RequestParams, Service,
};
pub use vendor::{Region, VendorRegions};
