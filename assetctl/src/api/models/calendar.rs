//! API models for the bookings calendar.

use crate::calendar::{DateError, DateSpan, Month, Schedulable, SkippedBooking, TrackAssignment, TrackLayout};
use crate::types::{BookingId, BookingStatus};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct CalendarQuery {
    /// Month to show, `YYYY-MM` (default: the current month)
    #[param(value_type = Option<String>, example = "2024-07")]
    #[schema(value_type = Option<String>)]
    pub month: Option<Month>,
    /// Tracks shown per day before the rest is summarized (default from configuration)
    #[param(minimum = 1, maximum = 10)]
    pub max_tracks: Option<usize>,
}

/// A booking supplied by the caller, dates not yet validated
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RawBooking {
    pub id: BookingId,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub booked_by: String,
    pub status: BookingStatus,
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    #[schema(example = "2024-07-01")]
    pub start_date: String,
    #[schema(example = "2024-07-03")]
    pub end_date: String,
}

impl Schedulable for RawBooking {
    fn booking_id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> BookingStatus {
        self.status
    }

    fn span(&self) -> Result<DateSpan, DateError> {
        DateSpan::parse(&self.start_date, &self.end_date)
    }

    fn purpose(&self) -> &str {
        &self.purpose
    }

    fn booked_by(&self) -> &str {
        &self.booked_by
    }
}

/// Request body for a stateless track layout
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LayoutRequest {
    #[schema(value_type = String, example = "2024-07")]
    pub month: Month,
    pub bookings: Vec<RawBooking>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LayoutResponse {
    #[schema(value_type = String, example = "2024-07")]
    pub month: Month,
    /// Number of tracks the month needs
    pub track_count: usize,
    /// Placed bookings, in placement order
    pub assignments: Vec<TrackAssignment>,
    /// Bookings left out because their dates are unusable
    pub skipped: Vec<SkippedBooking>,
}

impl LayoutResponse {
    pub fn new(month: Month, layout: TrackLayout) -> Self {
        Self {
            month,
            track_count: layout.track_count,
            assignments: layout.assignments,
            skipped: layout.skipped,
        }
    }
}
