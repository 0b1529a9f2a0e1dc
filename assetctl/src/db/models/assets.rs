//! Store models for assets.

use crate::types::{AssetId, AssetStatus, CategoryId, QrCodeId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Last known position of an asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoLocation {
    #[schema(example = 34.052235)]
    pub latitude: f64,
    #[schema(example = -118.243683)]
    pub longitude: f64,
    /// Human-readable label, e.g. "Los Angeles, California"
    pub address: String,
}

/// How the last scan of an asset was made
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScanDetails {
    pub device: String,
    pub browser: String,
    pub os: String,
    /// Where the update came from, e.g. "QR Code Scan" or "GPS Update"
    pub source: String,
}

/// Request for creating a new asset
#[derive(Debug, Clone)]
pub struct AssetCreateDBRequest {
    pub name: String,
    pub description: String,
    /// Code to attach; when `None` the repository allocates a free one
    pub qr_code_id: Option<QrCodeId>,
    pub status: AssetStatus,
    pub category_id: Option<CategoryId>,
    pub assigned_location: String,
    pub custodian_id: Option<UserId>,
    pub location: Option<GeoLocation>,
    pub is_bookable: bool,
    pub registered_at: DateTime<Utc>,
}

/// Request for updating an asset. `Some(None)` clears an optional reference.
#[derive(Debug, Clone, Default)]
pub struct AssetUpdateDBRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<AssetStatus>,
    pub category_id: Option<Option<CategoryId>>,
    pub assigned_location: Option<String>,
    pub custodian_id: Option<Option<UserId>>,
    pub is_bookable: Option<bool>,
}

/// Result of a successful scan or GPS refresh
#[derive(Debug, Clone)]
pub struct ScanUpdateDBRequest {
    pub location: GeoLocation,
    pub scanned_at: DateTime<Utc>,
    pub details: ScanDetails,
}

/// Stored asset
#[derive(Debug, Clone, PartialEq)]
pub struct AssetDBResponse {
    pub id: AssetId,
    pub name: String,
    pub description: String,
    pub qr_code_id: QrCodeId,
    pub status: AssetStatus,
    pub category_id: Option<CategoryId>,
    pub assigned_location: String,
    pub custodian_id: Option<UserId>,
    pub location: GeoLocation,
    pub last_scan: DateTime<Utc>,
    pub scan_details: Option<ScanDetails>,
    pub is_bookable: bool,
}
