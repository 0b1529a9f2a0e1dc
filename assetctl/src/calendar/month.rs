//! Month grid for the booking calendar.

use crate::calendar::dates::{DateSpan, Month};
use crate::calendar::layout::{Schedulable, SkippedBooking, TrackLayout, assign_tracks};
use crate::types::BookingStatus;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

/// Weeks shown per month, regardless of how many the month spans
pub const GRID_WEEKS: usize = 6;

/// A booking drawn in one day cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BookingBar {
    pub booking_id: String,
    pub purpose: String,
    pub status: BookingStatus,
    pub booked_by: String,
    pub track: usize,
    /// The booking starts on this day
    pub is_start: bool,
    /// The booking ends on this day
    pub is_end: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DayCell {
    pub date: NaiveDate,
    /// Day belongs to the previous or next month
    pub outside_month: bool,
    pub is_today: bool,
    /// One entry per visible track; `None` leaves the lane empty
    pub slots: Vec<Option<BookingBar>>,
    /// Bookings on this day that did not get a visible track ("+K more")
    pub hidden_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthView {
    #[schema(value_type = String, example = "2024-03")]
    pub month: Month,
    /// Months to navigate to from this view
    #[schema(value_type = String, example = "2024-02")]
    pub previous_month: Month,
    #[schema(value_type = String, example = "2024-04")]
    pub next_month: Month,
    pub max_tracks: usize,
    pub track_count: usize,
    /// Monday-first weeks, seven cells each
    pub weeks: Vec<Vec<DayCell>>,
    pub skipped: Vec<SkippedBooking>,
}

impl MonthView {
    /// Build the six-week grid for `month`, showing at most `max_tracks` lanes per day.
    pub fn build<T: Schedulable>(items: &[T], month: Month, max_tracks: usize, today: NaiveDate) -> Self {
        let layout = assign_tracks(items, month);

        // Items on the grid: eligible and with usable dates. Adjacent-month days can show
        // bookings that never got a track.
        let visible: Vec<(&T, DateSpan)> = items
            .iter()
            .filter(|i| i.status().is_calendar_eligible())
            .filter_map(|i| i.span().ok().map(|span| (i, span)))
            .collect();

        let start = month.grid_start();
        let weeks = (0..GRID_WEEKS)
            .map(|week| {
                (0..7)
                    .map(|weekday| {
                        let offset = (week * 7 + weekday) as u64;
                        let date = start.checked_add_days(Days::new(offset)).unwrap_or(start);
                        day_cell(date, month, today, max_tracks, &visible, &layout)
                    })
                    .collect()
            })
            .collect();

        MonthView {
            month,
            previous_month: month.previous(),
            next_month: month.next(),
            max_tracks,
            track_count: layout.track_count,
            weeks,
            skipped: layout.skipped,
        }
    }

    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flatten()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayCell> {
        self.days().find(|d| d.date == date)
    }
}

fn day_cell<T: Schedulable>(
    date: NaiveDate,
    month: Month,
    today: NaiveDate,
    max_tracks: usize,
    visible: &[(&T, DateSpan)],
    layout: &TrackLayout,
) -> DayCell {
    let mut slots: Vec<Option<BookingBar>> = vec![None; max_tracks];
    let mut hidden_count = 0;

    for (item, span) in visible.iter().filter(|(_, span)| span.covers_day(date)) {
        match layout.track_of(item.booking_id()) {
            Some(track) if track < max_tracks => {
                slots[track] = Some(BookingBar {
                    booking_id: item.booking_id().to_string(),
                    purpose: item.purpose().to_string(),
                    status: item.status(),
                    booked_by: item.booked_by().to_string(),
                    track,
                    is_start: date == span.first_day(),
                    is_end: date == span.last_day(),
                });
            }
            _ => hidden_count += 1,
        }
    }

    DayCell {
        date,
        outside_month: !month.contains(date),
        is_today: date == today,
        slots,
        hidden_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::bookings::BookingDBResponse;
    use chrono::{TimeZone, Utc};

    fn booking(id: &str, start: (u32, u32), end: (u32, u32), status: BookingStatus) -> BookingDBResponse {
        BookingDBResponse {
            id: id.to_string(),
            purpose: format!("{id} purpose"),
            asset_ids: vec!["ASSET-001".to_string()],
            booked_by: "Alice Johnson".to_string(),
            start_date: Utc.with_ymd_and_hms(2024, start.0, start.1, 9, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, end.0, end.1, 17, 0, 0).unwrap(),
            status,
            notes: None,
        }
    }

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn march() -> Month {
        "2024-03".parse().unwrap()
    }

    #[test]
    fn test_grid_shape() {
        let view = MonthView::build::<BookingDBResponse>(&[], march(), 3, day(3, 15));

        assert_eq!(view.weeks.len(), 6);
        assert_eq!(view.previous_month.to_string(), "2024-02");
        assert_eq!(view.next_month.to_string(), "2024-04");
        assert!(view.weeks.iter().all(|w| w.len() == 7));
        // 2024-03-01 is a Friday, so the grid opens on Monday 2024-02-26
        assert_eq!(view.weeks[0][0].date, day(2, 26));
        assert!(view.weeks[0][0].outside_month);
        assert_eq!(view.weeks[5][6].date, day(4, 7));
        assert_eq!(view.days().filter(|d| d.is_today).count(), 1);
        assert!(view.days().all(|d| d.slots.len() == 3 && d.hidden_count == 0));
    }

    #[test]
    fn test_bars_mark_start_and_end() {
        let bookings = [booking("A", (3, 4), (3, 6), BookingStatus::Active)];
        let view = MonthView::build(&bookings, march(), 3, day(3, 1));

        let first = view.day(day(3, 4)).unwrap().slots[0].clone().unwrap();
        assert!(first.is_start && !first.is_end);
        let middle = view.day(day(3, 5)).unwrap().slots[0].clone().unwrap();
        assert!(!middle.is_start && !middle.is_end);
        let last = view.day(day(3, 6)).unwrap().slots[0].clone().unwrap();
        assert!(!last.is_start && last.is_end);
        assert!(view.day(day(3, 7)).unwrap().slots[0].is_none());
    }

    #[test]
    fn test_excess_tracks_are_summarized() {
        let bookings = [
            booking("A", (3, 10), (3, 12), BookingStatus::Active),
            booking("B", (3, 10), (3, 12), BookingStatus::Active),
            booking("C", (3, 11), (3, 12), BookingStatus::Upcoming),
            booking("D", (3, 11), (3, 13), BookingStatus::Upcoming),
            booking("E", (3, 11), (3, 11), BookingStatus::Cancelled),
        ];
        let view = MonthView::build(&bookings, march(), 3, day(3, 1));
        assert_eq!(view.track_count, 4);

        let cell = view.day(day(3, 11)).unwrap();
        let shown: Vec<_> = cell.slots.iter().flatten().map(|b| b.booking_id.as_str()).collect();
        assert_eq!(shown, vec!["A", "B", "C"]);
        assert_eq!(cell.hidden_count, 1);

        let cell = view.day(day(3, 13)).unwrap();
        assert_eq!(cell.hidden_count, 1);
        assert!(cell.slots.iter().all(Option::is_none));
    }

    #[test]
    fn test_adjacent_month_bookings_are_hidden_on_outside_days() {
        // Lies entirely in April but shows on the trailing outside days of the March grid
        let bookings = [booking("april", (4, 2), (4, 3), BookingStatus::Upcoming)];
        let view = MonthView::build(&bookings, march(), 3, day(3, 1));

        let cell = view.day(day(4, 2)).unwrap();
        assert!(cell.outside_month);
        assert_eq!(cell.hidden_count, 1);
        assert_eq!(view.track_count, 0);
    }

    #[test]
    fn test_max_tracks_is_respected() {
        let bookings = [
            booking("A", (3, 10), (3, 12), BookingStatus::Active),
            booking("B", (3, 10), (3, 12), BookingStatus::Active),
        ];
        let view = MonthView::build(&bookings, march(), 1, day(3, 1));

        let cell = view.day(day(3, 10)).unwrap();
        assert_eq!(cell.slots.len(), 1);
        assert_eq!(cell.hidden_count, 1);
    }
}
