//! QR scanning and location reconciliation.
//!
//! - [`payload`]: what a scanned code points at
//! - [`device`]: coarse device classification from the user agent
//! - [`geolocation`]: positions reported by the scanning device
//! - [`geocoding`]: reverse-geocoding providers
//! - [`service`]: the scan flow tying it together

pub mod device;
pub mod geocoding;
pub mod geolocation;
pub mod payload;
pub mod service;

pub use service::{ScanError, ScanOutcome, ScanRequest, ScanService};
