//! Store models for bookings.

use crate::types::{AssetId, BookingId, BookingStatus};
use chrono::{DateTime, Utc};

/// Request for creating a new booking. Dates are already parsed by the caller.
#[derive(Debug, Clone)]
pub struct BookingCreateDBRequest {
    pub purpose: String,
    pub asset_ids: Vec<AssetId>,
    pub booked_by: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub notes: Option<String>,
}

/// Request for updating a booking. Dates are not editable once a booking exists.
#[derive(Debug, Clone, Default)]
pub struct BookingUpdateDBRequest {
    pub purpose: Option<String>,
    pub booked_by: Option<String>,
    pub status: Option<BookingStatus>,
    pub notes: Option<String>,
}

/// Stored booking
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDBResponse {
    pub id: BookingId,
    pub purpose: String,
    pub asset_ids: Vec<AssetId>,
    pub booked_by: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub notes: Option<String>,
}
