//! Booking calendar: track layout and the month grid built on it.
//!
//! - [`dates`]: parsing and UTC day/month arithmetic
//! - [`layout`]: assigns each booking in a month a track so overlapping bookings never share one
//! - [`month`]: the six-week, Monday-first grid with per-day slots and "+K more" counts

pub mod dates;
pub mod layout;
pub mod month;

pub use dates::{DateError, DateSpan, Month, parse_booking_date};
pub use layout::{Schedulable, SkippedBooking, TrackAssignment, TrackLayout, assign_tracks};
pub use month::{BookingBar, DayCell, MonthView};

/// Tracks shown per day cell unless configured otherwise
pub const DEFAULT_MAX_TRACKS: usize = 3;

/// Upper bound on tracks shown per day cell
pub const MAX_TRACKS_LIMIT: usize = 10;
