//! API request/response models for bookings.

use super::assets::AssetResponse;
use super::pagination::Pagination;
use crate::db::handlers::bookings::BookingView;
use crate::db::models::bookings::{BookingDBResponse, BookingUpdateDBRequest};
use crate::types::{AssetId, BookingId, BookingStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListBookingsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    pub status: Option<BookingStatus>,
    /// Only bookings that include this asset
    pub asset_id: Option<AssetId>,
    /// Bookings page tab, evaluated at request time
    pub view: Option<BookingView>,
}

/// Request body for creating a booking. Dates are RFC 3339 timestamps or `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingCreate {
    #[schema(example = "Client Presentation")]
    pub purpose: String,
    #[schema(example = json!(["ASSET-001", "ASSET-003"]))]
    pub asset_ids: Vec<AssetId>,
    #[schema(example = "Alice Johnson")]
    pub booked_by: String,
    #[schema(example = "2024-07-01")]
    pub start_date: String,
    #[schema(example = "2024-07-03")]
    pub end_date: String,
    pub notes: Option<String>,
}

/// Only provided fields are updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BookingUpdate {
    pub purpose: Option<String>,
    pub booked_by: Option<String>,
    pub status: Option<BookingStatus>,
    pub notes: Option<String>,
}

impl From<BookingUpdate> for BookingUpdateDBRequest {
    fn from(api: BookingUpdate) -> Self {
        Self {
            purpose: api.purpose,
            booked_by: api.booked_by,
            status: api.status,
            notes: api.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingResponse {
    #[schema(example = "BOOK-001")]
    pub id: BookingId,
    pub purpose: String,
    pub asset_ids: Vec<AssetId>,
    pub booked_by: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub notes: Option<String>,
}

impl From<BookingDBResponse> for BookingResponse {
    fn from(db: BookingDBResponse) -> Self {
        Self {
            id: db.id,
            purpose: db.purpose,
            asset_ids: db.asset_ids,
            booked_by: db.booked_by,
            start_date: db.start_date,
            end_date: db.end_date,
            status: db.status,
            notes: db.notes,
        }
    }
}

/// A booking with its assets resolved
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingDetailResponse {
    #[serde(flatten)]
    pub booking: BookingResponse,
    pub assets: Vec<AssetResponse>,
}
