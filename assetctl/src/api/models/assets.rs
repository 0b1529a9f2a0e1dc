//! API request/response models for assets.

use super::bookings::BookingResponse;
use super::categories::CategoryResponse;
use super::pagination::Pagination;
use super::users::UserResponse;
use crate::db::handlers::assets::{AssetFilter, AssetSortKey, SortDirection};
use crate::db::models::assets::{AssetDBResponse, AssetUpdateDBRequest, GeoLocation, ScanDetails};
use crate::scan::geolocation::GeolocationReport;
use crate::types::{AssetId, AssetStatus, BookingId, CategoryId, QrCodeId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing assets
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListAssetsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    pub status: Option<AssetStatus>,
    pub category_id: Option<CategoryId>,
    /// Assigned location name, exact match
    pub location: Option<String>,
    pub custodian_id: Option<UserId>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub bookable: Option<bool>,
    /// Case-insensitive substring match on id, name and description
    pub search: Option<String>,
    /// Sort column (default: registration order)
    pub sort: Option<AssetSortKey>,
    pub direction: Option<SortDirection>,
}

impl ListAssetsQuery {
    /// Store filter for the whole matching set; pagination is applied afterwards
    pub fn filter(&self) -> AssetFilter {
        AssetFilter {
            status: self.status,
            category_id: self.category_id.clone(),
            assigned_location: self.location.clone(),
            custodian_id: self.custodian_id.clone(),
            bookable: self.bookable,
            search: self.search.clone(),
            sort: self.sort.unwrap_or_default(),
            direction: self.direction.unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// Request body for registering an asset
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssetCreate {
    #[schema(example = "MacBook Pro 16\"")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// QR code to attach. A free code is allocated when omitted.
    #[schema(example = "QR-1A2B3C")]
    pub qr_code_id: Option<QrCodeId>,
    /// Defaults to `available`
    pub status: Option<AssetStatus>,
    pub category_id: Option<CategoryId>,
    #[schema(example = "Main Office")]
    pub assigned_location: String,
    pub custodian_id: Option<UserId>,
    /// Defaults to true
    pub is_bookable: Option<bool>,
    /// Initial position; defaults to the assigned location at 0,0
    pub location: Option<GeoLocation>,
}

/// Request body for updating an asset. Only provided fields are updated; `null` clears the
/// category or custodian.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AssetUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<AssetStatus>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub category_id: Option<Option<CategoryId>>,
    pub assigned_location: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub custodian_id: Option<Option<UserId>>,
    pub is_bookable: Option<bool>,
}

impl From<AssetUpdate> for AssetUpdateDBRequest {
    fn from(api: AssetUpdate) -> Self {
        Self {
            name: api.name,
            description: api.description,
            status: api.status,
            category_id: api.category_id,
            assigned_location: api.assigned_location,
            custodian_id: api.custodian_id,
            is_bookable: api.is_bookable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AssetResponse {
    #[schema(example = "ASSET-001")]
    pub id: AssetId,
    pub name: String,
    pub description: String,
    pub qr_code_id: QrCodeId,
    pub status: AssetStatus,
    pub category_id: Option<CategoryId>,
    pub assigned_location: String,
    pub custodian_id: Option<UserId>,
    /// Last known position
    pub location: GeoLocation,
    pub last_scan: DateTime<Utc>,
    /// Device that made the last scan, if the asset was ever scanned
    pub scan_details: Option<ScanDetails>,
    pub is_bookable: bool,
}

impl From<AssetDBResponse> for AssetResponse {
    fn from(db: AssetDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            description: db.description,
            qr_code_id: db.qr_code_id,
            status: db.status,
            category_id: db.category_id,
            assigned_location: db.assigned_location,
            custodian_id: db.custodian_id,
            location: db.location,
            last_scan: db.last_scan,
            scan_details: db.scan_details,
            is_bookable: db.is_bookable,
        }
    }
}

/// An asset with its category, custodian and bookings resolved
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssetDetailResponse {
    #[serde(flatten)]
    pub asset: AssetResponse,
    pub category: Option<CategoryResponse>,
    pub custodian: Option<UserResponse>,
    /// Bookings that include this asset
    pub bookings: Vec<BookingResponse>,
    /// Link printed on the asset's label, when a public URL is configured
    pub scan_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustodyAssign {
    #[schema(example = "USER-002")]
    pub user_id: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingAssetAdd {
    #[schema(example = "BOOK-001")]
    pub booking_id: BookingId,
}

/// Request body for refreshing an asset's location from the device position
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationRefresh {
    /// What the device's geolocation produced; omit if the device has none
    pub location: Option<GeolocationReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_distinguishes_null_from_missing() {
        let update: AssetUpdate = serde_json::from_str(r#"{"category_id": null}"#).unwrap();
        assert_eq!(update.category_id, Some(None));
        assert_eq!(update.custodian_id, None);

        let update: AssetUpdate = serde_json::from_str(r#"{"custodian_id": "USER-001"}"#).unwrap();
        assert_eq!(update.custodian_id, Some(Some("USER-001".to_string())));
    }
}
