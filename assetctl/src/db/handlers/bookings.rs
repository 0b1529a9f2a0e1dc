//! Store repository for bookings.

use crate::db::{
    Tables,
    errors::{DbError, Result},
    handlers::{paginate, repository::Repository, required_text},
    models::bookings::{BookingCreateDBRequest, BookingDBResponse, BookingUpdateDBRequest},
};
use crate::types::{AssetId, BookingId, BookingStatus, Entity, generate_id};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::instrument;
use utoipa::ToSchema;

/// Grouping of bookings relative to the current time, as the bookings page tabs show them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingView {
    /// Starts in the future and is still scheduled
    Upcoming,
    /// Running right now
    Active,
    /// Over, completed or cancelled
    History,
}

impl BookingView {
    pub fn contains(self, booking: &BookingDBResponse, now: DateTime<Utc>) -> bool {
        match self {
            BookingView::Upcoming => booking.start_date > now && booking.status.is_calendar_eligible(),
            BookingView::Active => {
                booking.start_date <= now && booking.end_date >= now && booking.status == BookingStatus::Active
            }
            BookingView::History => {
                booking.end_date < now || matches!(booking.status, BookingStatus::Completed | BookingStatus::Cancelled)
            }
        }
    }
}

/// Status a new booking starts in, given its dates
pub fn initial_status(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> BookingStatus {
    if start > now {
        BookingStatus::Upcoming
    } else if end >= now {
        BookingStatus::Active
    } else {
        BookingStatus::Completed
    }
}

/// Filter for listing bookings
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub skip: usize,
    pub limit: Option<usize>,
    pub status: Option<BookingStatus>,
    /// Only bookings that include this asset
    pub asset_id: Option<AssetId>,
    /// Only bookings in this view, evaluated at the given time
    pub view: Option<(BookingView, DateTime<Utc>)>,
}

impl BookingFilter {
    pub fn new(skip: usize, limit: usize) -> Self {
        Self {
            skip,
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn with_view(mut self, view: BookingView, now: DateTime<Utc>) -> Self {
        self.view = Some((view, now));
        self
    }
}

pub struct Bookings<'c> {
    db: &'c mut Tables,
}

impl<'c> Bookings<'c> {
    pub fn new(db: &'c mut Tables) -> Self {
        Self { db }
    }

    fn ensure_bookable(&self, asset_id: &AssetId) -> Result<()> {
        let asset = self.db.assets.iter().find(|a| &a.id == asset_id).ok_or_else(|| {
            DbError::foreign_key(
                "bookings",
                "bookings_asset_ids_fkey",
                format!("Asset {asset_id} does not exist"),
            )
        })?;
        if !asset.is_bookable {
            return Err(DbError::check(
                "bookings",
                "bookings_asset_bookable_check",
                format!("{} is not bookable", asset.name),
            ));
        }
        Ok(())
    }

    /// Add an asset to an upcoming or active booking
    #[instrument(skip(self), fields(booking_id = %id, asset_id = %asset_id), err)]
    pub async fn add_asset(&mut self, id: &BookingId, asset_id: &AssetId) -> Result<BookingDBResponse> {
        self.ensure_bookable(asset_id)?;

        let booking = self.db.bookings.iter_mut().find(|b| &b.id == id).ok_or(DbError::NotFound)?;
        if !booking.status.is_calendar_eligible() {
            return Err(DbError::check(
                "bookings",
                "bookings_status_check",
                format!("Booking {id} is {} and can no longer change", booking.status),
            ));
        }
        if booking.asset_ids.contains(asset_id) {
            return Err(DbError::UniqueViolation {
                constraint: "bookings_asset_ids_key",
                table: "bookings",
                message: format!("Asset {asset_id} is already part of this booking"),
                conflicting_value: Some(asset_id.clone()),
            });
        }
        booking.asset_ids.push(asset_id.clone());
        Ok(booking.clone())
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Bookings<'c> {
    type CreateRequest = BookingCreateDBRequest;
    type UpdateRequest = BookingUpdateDBRequest;
    type Response = BookingDBResponse;
    type Id = BookingId;
    type Filter = BookingFilter;

    #[instrument(skip(self, request), fields(purpose = %request.purpose, assets = request.asset_ids.len()), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let purpose = required_text(&request.purpose, "bookings", "bookings_purpose_check", "Purpose")?;
        let booked_by = required_text(&request.booked_by, "bookings", "bookings_booked_by_check", "Custodian name")?;
        if request.asset_ids.is_empty() {
            return Err(DbError::check(
                "bookings",
                "bookings_asset_ids_check",
                "At least one asset must be selected",
            ));
        }
        if request.end_date < request.start_date {
            return Err(DbError::check(
                "bookings",
                "bookings_date_range_check",
                "End date cannot be earlier than start date",
            ));
        }

        let mut asset_ids: Vec<AssetId> = Vec::with_capacity(request.asset_ids.len());
        for asset_id in &request.asset_ids {
            self.ensure_bookable(asset_id)?;
            if !asset_ids.contains(asset_id) {
                asset_ids.push(asset_id.clone());
            }
        }

        let booking = BookingDBResponse {
            id: generate_id(Entity::Booking, 7),
            purpose,
            asset_ids,
            booked_by,
            start_date: request.start_date,
            end_date: request.end_date,
            status: request.status,
            notes: request.notes.clone().filter(|n| !n.trim().is_empty()),
        };
        self.db.bookings.push(booking.clone());
        Ok(booking)
    }

    #[instrument(skip(self), fields(booking_id = %id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        Ok(self.db.bookings.iter().find(|b| b.id == id).cloned())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        Ok(self
            .db
            .bookings
            .iter()
            .filter(|b| ids.contains(&b.id))
            .map(|b| (b.id.clone(), b.clone()))
            .collect())
    }

    #[instrument(skip(self, filter), fields(skip = filter.skip, limit = ?filter.limit, view = ?filter.view.map(|(v, _)| v)), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let rows = self
            .db
            .bookings
            .iter()
            .filter(|b| filter.status.is_none_or(|s| b.status == s))
            .filter(|b| filter.asset_id.as_ref().is_none_or(|a| b.asset_ids.contains(a)))
            .filter(|b| filter.view.is_none_or(|(view, now)| view.contains(b, now)))
            .cloned()
            .collect();
        Ok(paginate(rows, filter.skip, filter.limit))
    }

    #[instrument(skip(self), fields(booking_id = %id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let before = self.db.bookings.len();
        self.db.bookings.retain(|b| b.id != id);
        Ok(self.db.bookings.len() < before)
    }

    #[instrument(skip(self, request), fields(booking_id = %id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let purpose = request
            .purpose
            .as_deref()
            .map(|p| required_text(p, "bookings", "bookings_purpose_check", "Purpose"))
            .transpose()?;
        let booked_by = request
            .booked_by
            .as_deref()
            .map(|b| required_text(b, "bookings", "bookings_booked_by_check", "Custodian name"))
            .transpose()?;

        let booking = self.db.bookings.iter_mut().find(|b| b.id == id).ok_or(DbError::NotFound)?;
        if let Some(purpose) = purpose {
            booking.purpose = purpose;
        }
        if let Some(booked_by) = booked_by {
            booking.booked_by = booked_by;
        }
        if let Some(status) = request.status {
            booking.status = status;
        }
        if let Some(notes) = &request.notes {
            booking.notes = Some(notes.clone()).filter(|n| !n.trim().is_empty());
        }
        Ok(booking.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed::demo_tables;
    use chrono::{Duration, TimeZone};

    fn request(asset_ids: &[&str], start: DateTime<Utc>, end: DateTime<Utc>) -> BookingCreateDBRequest {
        BookingCreateDBRequest {
            purpose: "Trade show".to_string(),
            asset_ids: asset_ids.iter().map(|s| s.to_string()).collect(),
            booked_by: "Events Team".to_string(),
            start_date: start,
            end_date: end,
            status: BookingStatus::Upcoming,
            notes: Some(" ".to_string()),
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_create_booking() {
        let now = Utc::now();
        let mut tables = demo_tables(now);
        let booking = Bookings::new(&mut tables)
            .create(&request(&["ASSET-002", "ASSET-002"], now, now + Duration::days(1)))
            .await
            .unwrap();

        assert!(booking.id.starts_with("BOOK-"));
        assert_eq!(booking.asset_ids, vec!["ASSET-002".to_string()]);
        assert_eq!(booking.notes, None);
    }

    #[test_log::test(tokio::test)]
    async fn test_create_booking_validation() {
        let now = Utc::now();
        let mut tables = demo_tables(now);
        let mut repo = Bookings::new(&mut tables);

        let inverted = request(&["ASSET-002"], now, now - Duration::days(1));
        assert!(matches!(repo.create(&inverted).await, Err(DbError::CheckViolation { .. })));

        let empty = request(&[], now, now);
        assert!(matches!(repo.create(&empty).await, Err(DbError::CheckViolation { .. })));

        // The projector is not bookable
        let unbookable = request(&["ASSET-004"], now, now);
        assert!(matches!(repo.create(&unbookable).await, Err(DbError::CheckViolation { .. })));

        let missing = request(&["ASSET-404"], now, now);
        assert!(matches!(
            repo.create(&missing).await,
            Err(DbError::ForeignKeyViolation { .. })
        ));

        let mut unnamed = request(&["ASSET-002"], now, now);
        unnamed.booked_by = String::new();
        assert!(matches!(repo.create(&unnamed).await, Err(DbError::CheckViolation { .. })));
    }

    #[test_log::test(tokio::test)]
    async fn test_same_day_booking_is_allowed() {
        let now = Utc::now();
        let mut tables = demo_tables(now);
        let booking = Bookings::new(&mut tables)
            .create(&request(&["ASSET-005"], now, now))
            .await
            .unwrap();
        assert_eq!(booking.start_date, booking.end_date);
    }

    #[test_log::test(tokio::test)]
    async fn test_add_asset_conflicts_when_present() {
        let mut tables = demo_tables(Utc::now());
        let mut repo = Bookings::new(&mut tables);

        let result = repo.add_asset(&"BOOK-001".to_string(), &"ASSET-003".to_string()).await;
        assert!(matches!(result, Err(DbError::UniqueViolation { .. })));

        let booking = repo
            .add_asset(&"BOOK-001".to_string(), &"ASSET-002".to_string())
            .await
            .unwrap();
        assert_eq!(booking.asset_ids, vec!["ASSET-003".to_string(), "ASSET-002".to_string()]);

        // Completed bookings are closed
        let result = repo.add_asset(&"BOOK-003".to_string(), &"ASSET-005".to_string()).await;
        assert!(matches!(result, Err(DbError::CheckViolation { .. })));
    }

    #[test_log::test(tokio::test)]
    async fn test_views_partition_demo_bookings() {
        let now = Utc::now();
        let mut tables = demo_tables(now);
        let mut repo = Bookings::new(&mut tables);

        let ids = |bookings: Vec<BookingDBResponse>| bookings.into_iter().map(|b| b.id).collect::<Vec<_>>();

        let upcoming = repo
            .list(&BookingFilter::default().with_view(BookingView::Upcoming, now))
            .await
            .unwrap();
        assert_eq!(ids(upcoming), vec!["BOOK-001"]);

        let active = repo
            .list(&BookingFilter::default().with_view(BookingView::Active, now))
            .await
            .unwrap();
        assert_eq!(ids(active), vec!["BOOK-002"]);

        let history = repo
            .list(&BookingFilter::default().with_view(BookingView::History, now))
            .await
            .unwrap();
        assert_eq!(ids(history), vec!["BOOK-003", "BOOK-004", "BOOK-005"]);
    }

    #[test]
    fn test_initial_status() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let day = Duration::days(1);
        assert_eq!(initial_status(now + day, now + day * 2, now), BookingStatus::Upcoming);
        assert_eq!(initial_status(now - day, now + day, now), BookingStatus::Active);
        assert_eq!(initial_status(now - day * 2, now - day, now), BookingStatus::Completed);
    }
}
