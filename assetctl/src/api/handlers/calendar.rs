use crate::AppState;
use crate::api::models::calendar::{CalendarQuery, LayoutRequest, LayoutResponse};
use crate::calendar::{MAX_TRACKS_LIMIT, Month, MonthView, assign_tracks};
use crate::db::handlers::{Bookings, Repository, bookings::BookingFilter};
use crate::errors::{Error, Result};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;

#[utoipa::path(
    get,
    path = "/calendar",
    tag = "calendar",
    summary = "Month view",
    description = "Six-week grid for a month with upcoming and active bookings laid out in tracks.",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Month grid", body = MonthView),
        (status = 400, description = "Invalid month or track count"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_month_view(State(state): State<AppState>, Query(query): Query<CalendarQuery>) -> Result<Json<MonthView>> {
    let now = Utc::now();
    let month = query.month.unwrap_or_else(|| Month::containing(now));
    let max_tracks = query.max_tracks.unwrap_or(state.config.calendar.max_tracks);
    if !(1..=MAX_TRACKS_LIMIT).contains(&max_tracks) {
        return Err(Error::BadRequest {
            message: format!("max_tracks must be between 1 and {MAX_TRACKS_LIMIT}"),
        });
    }

    let mut tx = state.store.begin().await;
    let bookings = Bookings::new(&mut tx).list(&BookingFilter::default()).await?;
    drop(tx);

    Ok(Json(MonthView::build(&bookings, month, max_tracks, now.date_naive())))
}

#[utoipa::path(
    post,
    path = "/calendar/layout",
    tag = "calendar",
    summary = "Lay out bookings",
    description = "Assigns tracks to caller-supplied bookings for one month without touching stored data. \
                   Bookings with unusable dates are reported as skipped.",
    request_body = LayoutRequest,
    responses(
        (status = 200, description = "Track layout", body = LayoutResponse),
    )
)]
#[tracing::instrument(skip_all, fields(month = %request.month, bookings = request.bookings.len()))]
pub async fn layout_bookings(Json(request): Json<LayoutRequest>) -> Json<LayoutResponse> {
    let layout = assign_tracks(&request.bookings, request.month);
    Json(LayoutResponse::new(request.month, layout))
}
