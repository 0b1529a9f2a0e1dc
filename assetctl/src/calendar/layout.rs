//! Track assignment for the booking calendar.
//!
//! Bookings that overlap the visible month are laid out in horizontal tracks so that two
//! bookings sharing a day never share a track. Bookings are taken in start order and each one
//! goes to the lowest track that is free by its start; a track frees up at the end of the last
//! day of the booking occupying it.

use crate::calendar::dates::{DateError, DateSpan, Month, end_of_day};
use crate::db::models::bookings::BookingDBResponse;
use crate::types::BookingStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Anything the calendar can place: a stored booking, or one supplied by a caller with dates
/// that still need parsing.
pub trait Schedulable {
    fn booking_id(&self) -> &str;
    fn status(&self) -> BookingStatus;
    fn span(&self) -> Result<DateSpan, DateError>;
    fn purpose(&self) -> &str;
    fn booked_by(&self) -> &str;
}

impl Schedulable for BookingDBResponse {
    fn booking_id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> BookingStatus {
        self.status
    }

    fn span(&self) -> Result<DateSpan, DateError> {
        DateSpan::new(self.start_date, self.end_date)
    }

    fn purpose(&self) -> &str {
        &self.purpose
    }

    fn booked_by(&self) -> &str {
        &self.booked_by
    }
}

/// A booking's track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TrackAssignment {
    pub booking_id: String,
    pub track: usize,
}

/// A booking left out of the layout because its dates are unusable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SkippedBooking {
    pub booking_id: String,
    pub reason: String,
}

/// Result of laying out one month
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackLayout {
    /// Assignments in placement order (by start date, ties in input order)
    pub assignments: Vec<TrackAssignment>,
    /// Number of tracks the month needs
    pub track_count: usize,
    pub skipped: Vec<SkippedBooking>,
}

impl TrackLayout {
    pub fn track_of(&self, booking_id: &str) -> Option<usize> {
        self.assignments
            .iter()
            .find(|a| a.booking_id == booking_id)
            .map(|a| a.track)
    }
}

/// Lay out the eligible bookings overlapping `month`.
///
/// Bookings that are not Upcoming or Active are ignored. Bookings with unparseable dates or an
/// end before their start are reported in [`TrackLayout::skipped`] and do not affect the rest.
pub fn assign_tracks<T: Schedulable>(items: &[T], month: Month) -> TrackLayout {
    let visible = month.span();
    let mut skipped = Vec::new();

    let mut placed: Vec<(&T, DateSpan)> = Vec::new();
    for item in items.iter().filter(|i| i.status().is_calendar_eligible()) {
        match item.span() {
            Ok(span) if span.overlaps(&visible) => placed.push((item, span)),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(booking_id = item.booking_id(), error = %e, "Skipping booking with unusable dates");
                skipped.push(SkippedBooking {
                    booking_id: item.booking_id().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
    // sort_by_key is stable: equal starts keep input order
    placed.sort_by_key(|(_, span)| span.start);

    let mut free_at: Vec<DateTime<Utc>> = Vec::new();
    let mut assignments = Vec::with_capacity(placed.len());
    for (item, span) in placed {
        let track = match free_at.iter().position(|free| span.start >= *free) {
            Some(track) => track,
            None => {
                free_at.push(span.end);
                free_at.len() - 1
            }
        };
        free_at[track] = end_of_day(span.end);
        assignments.push(TrackAssignment {
            booking_id: item.booking_id().to_string(),
            track,
        });
    }

    TrackLayout {
        assignments,
        track_count: free_at.len(),
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    struct Raw {
        id: &'static str,
        status: BookingStatus,
        start: &'static str,
        end: &'static str,
    }

    impl Schedulable for Raw {
        fn booking_id(&self) -> &str {
            self.id
        }
        fn status(&self) -> BookingStatus {
            self.status
        }
        fn span(&self) -> Result<DateSpan, DateError> {
            DateSpan::parse(self.start, self.end)
        }
        fn purpose(&self) -> &str {
            "test"
        }
        fn booked_by(&self) -> &str {
            "tester"
        }
    }

    fn raw(id: &'static str, start: &'static str, end: &'static str) -> Raw {
        Raw {
            id,
            status: BookingStatus::Active,
            start,
            end,
        }
    }

    fn march() -> Month {
        "2024-03".parse().unwrap()
    }

    #[test]
    fn test_overlapping_bookings_get_separate_tracks() {
        let bookings = [
            raw("A", "2024-03-01", "2024-03-03"),
            raw("B", "2024-03-02", "2024-03-04"),
            raw("C", "2024-03-04", "2024-03-05"),
        ];
        let layout = assign_tracks(&bookings, march());

        assert_eq!(layout.track_of("A"), Some(0));
        assert_eq!(layout.track_of("B"), Some(1));
        assert_eq!(layout.track_of("C"), Some(0));
        assert_eq!(layout.track_count, 2);
        assert!(layout.skipped.is_empty());
    }

    #[test]
    fn test_track_frees_only_after_last_day() {
        // B starts on the day A ends, so they share that day
        let bookings = [
            raw("A", "2024-03-01T09:00:00Z", "2024-03-03T12:00:00Z"),
            raw("B", "2024-03-03T15:00:00Z", "2024-03-04T12:00:00Z"),
        ];
        let layout = assign_tracks(&bookings, march());
        assert_eq!(layout.track_of("B"), Some(1));
    }

    #[test]
    fn test_other_month_consumes_no_track() {
        let bookings = [
            raw("feb", "2024-02-10", "2024-02-12"),
            raw("A", "2024-03-10", "2024-03-12"),
        ];
        let layout = assign_tracks(&bookings, march());

        assert_eq!(layout.track_of("feb"), None);
        assert_eq!(layout.track_of("A"), Some(0));
        assert_eq!(layout.track_count, 1);
    }

    #[test]
    fn test_spanning_bookings_are_included() {
        let bookings = [raw("long", "2024-02-20", "2024-04-02"), raw("edge", "2024-03-31T23:00:00Z", "2024-04-01")];
        let layout = assign_tracks(&bookings, march());
        assert_eq!(layout.track_of("long"), Some(0));
        assert_eq!(layout.track_of("edge"), Some(1));
    }

    #[test]
    fn test_ineligible_bookings_are_ignored() {
        let mut done = raw("done", "2024-03-01", "2024-03-05");
        done.status = BookingStatus::Completed;
        let mut cancelled = raw("cancelled", "2024-03-01", "2024-03-05");
        cancelled.status = BookingStatus::Cancelled;
        let mut upcoming = raw("upcoming", "2024-03-01", "2024-03-05");
        upcoming.status = BookingStatus::Upcoming;

        let layout = assign_tracks(&[done, cancelled, upcoming], march());
        assert_eq!(layout.assignments.len(), 1);
        assert_eq!(layout.track_of("upcoming"), Some(0));
        assert!(layout.skipped.is_empty());
    }

    #[test_log::test]
    fn test_malformed_booking_is_skipped() {
        let bookings = [
            raw("bad", "not a date", "2024-03-05"),
            raw("inverted", "2024-03-09", "2024-03-08"),
            raw("good", "2024-03-01", "2024-03-05"),
        ];
        let layout = assign_tracks(&bookings, march());

        assert_eq!(layout.track_of("good"), Some(0));
        let skipped: Vec<_> = layout.skipped.iter().map(|s| s.booking_id.as_str()).collect();
        assert_eq!(skipped, vec!["bad", "inverted"]);
    }

    #[test]
    fn test_equal_starts_keep_input_order() {
        let bookings = [
            raw("first", "2024-03-05", "2024-03-06"),
            raw("second", "2024-03-05", "2024-03-06"),
            raw("third", "2024-03-05", "2024-03-06"),
        ];
        let layout = assign_tracks(&bookings, march());
        let order: Vec<_> = layout.assignments.iter().map(|a| (a.booking_id.as_str(), a.track)).collect();
        assert_eq!(order, vec![("first", 0), ("second", 1), ("third", 2)]);
    }

    #[test]
    fn test_sequential_bookings_reuse_lowest_track() {
        let bookings = [
            raw("A", "2024-03-01", "2024-03-02"),
            raw("B", "2024-03-01", "2024-03-10"),
            raw("C", "2024-03-04", "2024-03-05"),
            raw("D", "2024-03-07", "2024-03-08"),
        ];
        let layout = assign_tracks(&bookings, march());
        assert_eq!(layout.track_of("C"), Some(0));
        assert_eq!(layout.track_of("D"), Some(0));
        assert_eq!(layout.track_count, 2);
    }

    #[test]
    fn test_stored_bookings_are_schedulable() {
        let booking = BookingDBResponse {
            id: "BOOK-001".to_string(),
            purpose: "Photoshoot".to_string(),
            asset_ids: vec!["ASSET-003".to_string()],
            booked_by: "Marketing Team".to_string(),
            start_date: Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 3, 4, 17, 0, 0).unwrap(),
            status: BookingStatus::Upcoming,
            notes: None,
        };
        let layout = assign_tracks(&[booking], march());
        assert_eq!(layout.track_of("BOOK-001"), Some(0));
    }

    struct Generated {
        id: String,
        span: DateSpan,
    }

    impl Schedulable for Generated {
        fn booking_id(&self) -> &str {
            &self.id
        }
        fn status(&self) -> BookingStatus {
            BookingStatus::Upcoming
        }
        fn span(&self) -> Result<DateSpan, DateError> {
            Ok(self.span)
        }
        fn purpose(&self) -> &str {
            ""
        }
        fn booked_by(&self) -> &str {
            ""
        }
    }

    proptest! {
        #[test]
        fn overlapping_bookings_never_share_a_track(
            raw_spans in prop::collection::vec((0i64..40 * 24, 0i64..10 * 24), 1..40)
        ) {
            let base = Utc.with_ymd_and_hms(2024, 2, 25, 0, 0, 0).unwrap();
            let bookings: Vec<Generated> = raw_spans
                .iter()
                .enumerate()
                .map(|(i, (start, len))| {
                    let start = base + chrono::TimeDelta::hours(*start);
                    Generated {
                        id: format!("B{i}"),
                        span: DateSpan { start, end: start + chrono::TimeDelta::hours(*len) },
                    }
                })
                .collect();

            let layout = assign_tracks(&bookings, march());
            let visible = march().span();

            for a in &bookings {
                prop_assert_eq!(layout.track_of(&a.id).is_some(), a.span.overlaps(&visible));
            }
            for (i, a) in bookings.iter().enumerate() {
                for b in &bookings[i + 1..] {
                    let (Some(ta), Some(tb)) = (layout.track_of(&a.id), layout.track_of(&b.id)) else {
                        continue;
                    };
                    let share_a_day = a.span.first_day() <= b.span.last_day() && b.span.first_day() <= a.span.last_day();
                    if share_a_day {
                        prop_assert_ne!(ta, tb);
                    }
                }
            }
            prop_assert!(layout.assignments.iter().all(|a| a.track < layout.track_count));
        }
    }
}
