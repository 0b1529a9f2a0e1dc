use crate::AppState;
use crate::api::models::assets::AssetResponse;
use crate::api::models::bookings::{BookingCreate, BookingDetailResponse, BookingResponse, BookingUpdate, ListBookingsQuery};
use crate::api::models::pagination::PaginatedResponse;
use crate::calendar::parse_booking_date;
use crate::db::handlers::bookings::{BookingFilter, initial_status};
use crate::db::handlers::{Assets, Bookings, Repository};
use crate::db::models::bookings::BookingCreateDBRequest;
use crate::errors::{Error, Result};
use crate::types::BookingId;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;

fn not_found(id: BookingId) -> Error {
    Error::NotFound {
        resource: "Booking".to_string(),
        id,
    }
}

#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    summary = "List bookings",
    description = "Optionally narrowed to one of the upcoming, active or history views, evaluated at request time.",
    params(ListBookingsQuery),
    responses(
        (status = 200, description = "Page of bookings", body = PaginatedResponse<BookingResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<PaginatedResponse<BookingResponse>>> {
    let mut filter = BookingFilter {
        status: query.status,
        asset_id: query.asset_id.clone(),
        ..Default::default()
    };
    if let Some(view) = query.view {
        filter = filter.with_view(view, Utc::now());
    }

    let mut tx = state.store.begin().await;
    let bookings = Bookings::new(&mut tx).list(&filter).await?;
    Ok(Json(query.pagination.page(bookings.into_iter().map(BookingResponse::from).collect())))
}

#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    summary = "Create booking",
    description = "Status starts as upcoming, active or completed depending on where the dates fall relative to now.",
    request_body = BookingCreate,
    responses(
        (status = 201, description = "Booking created", body = BookingResponse),
        (status = 400, description = "Invalid dates, no assets, or an asset that is not bookable"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_booking(
    State(state): State<AppState>,
    Json(create): Json<BookingCreate>,
) -> Result<(StatusCode, Json<BookingResponse>)> {
    let parse = |value: &str| {
        parse_booking_date(value).map_err(|e| Error::BadRequest { message: e.to_string() })
    };
    let start_date = parse(&create.start_date)?;
    let end_date = parse(&create.end_date)?;

    let request = BookingCreateDBRequest {
        purpose: create.purpose,
        asset_ids: create.asset_ids,
        booked_by: create.booked_by,
        start_date,
        end_date,
        status: initial_status(start_date, end_date, Utc::now()),
        notes: create.notes,
    };

    let mut tx = state.store.begin().await;
    let booking = Bookings::new(&mut tx).create(&request).await?;
    tx.commit();
    Ok((StatusCode::CREATED, Json(BookingResponse::from(booking))))
}

#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    summary = "Get booking",
    params(("id" = String, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking with its assets", body = BookingDetailResponse),
        (status = 404, description = "Booking not found"),
    )
)]
#[tracing::instrument(skip_all, fields(booking_id = %id))]
pub async fn get_booking(State(state): State<AppState>, Path(id): Path<BookingId>) -> Result<Json<BookingDetailResponse>> {
    let mut tx = state.store.begin().await;
    let booking = Bookings::new(&mut tx).get_by_id(id.clone()).await?.ok_or_else(|| not_found(id))?;

    let mut found = Assets::new(&mut tx).get_bulk(booking.asset_ids.clone()).await?;
    // Keep the booking's order; assets deleted since are left out
    let assets = booking
        .asset_ids
        .iter()
        .filter_map(|asset_id| found.remove(asset_id))
        .map(AssetResponse::from)
        .collect();

    Ok(Json(BookingDetailResponse {
        booking: booking.into(),
        assets,
    }))
}

#[utoipa::path(
    patch,
    path = "/bookings/{id}",
    tag = "bookings",
    summary = "Update booking",
    params(("id" = String, Path, description = "Booking ID")),
    request_body = BookingUpdate,
    responses(
        (status = 200, description = "Booking updated", body = BookingResponse),
        (status = 400, description = "Blank purpose or custodian"),
        (status = 404, description = "Booking not found"),
    )
)]
#[tracing::instrument(skip_all, fields(booking_id = %id))]
pub async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<BookingId>,
    Json(update): Json<BookingUpdate>,
) -> Result<Json<BookingResponse>> {
    let mut tx = state.store.begin().await;
    let booking = Bookings::new(&mut tx).update(id, &update.into()).await?;
    tx.commit();
    Ok(Json(BookingResponse::from(booking)))
}

#[utoipa::path(
    delete,
    path = "/bookings/{id}",
    tag = "bookings",
    summary = "Delete booking",
    params(("id" = String, Path, description = "Booking ID")),
    responses(
        (status = 204, description = "Booking deleted"),
        (status = 404, description = "Booking not found"),
    )
)]
#[tracing::instrument(skip_all, fields(booking_id = %id))]
pub async fn delete_booking(State(state): State<AppState>, Path(id): Path<BookingId>) -> Result<StatusCode> {
    let mut tx = state.store.begin().await;
    if Bookings::new(&mut tx).delete(id.clone()).await? {
        tx.commit();
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::bookings::{BookingDetailResponse, BookingResponse};
    use crate::api::models::pagination::PaginatedResponse;
    use crate::test_utils::create_test_app;
    use crate::types::BookingStatus;
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn ids(page: &PaginatedResponse<BookingResponse>) -> Vec<&str> {
        page.data.iter().map(|b| b.id.as_str()).collect()
    }

    #[test_log::test(tokio::test)]
    async fn test_list_booking_views() {
        let app = create_test_app().await;

        let page: PaginatedResponse<BookingResponse> = app.get("/admin/api/v1/bookings?view=upcoming").await.json();
        assert_eq!(ids(&page), vec!["BOOK-001"]);

        let page: PaginatedResponse<BookingResponse> = app.get("/admin/api/v1/bookings?view=active").await.json();
        assert_eq!(ids(&page), vec!["BOOK-002"]);

        let page: PaginatedResponse<BookingResponse> = app.get("/admin/api/v1/bookings?view=history").await.json();
        assert_eq!(ids(&page), vec!["BOOK-003", "BOOK-004", "BOOK-005"]);

        let page: PaginatedResponse<BookingResponse> = app.get("/admin/api/v1/bookings?asset_id=ASSET-002").await.json();
        assert_eq!(ids(&page), vec!["BOOK-003", "BOOK-005"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_create_booking_derives_status() {
        let app = create_test_app().await;
        let start = (Utc::now() + Duration::days(10)).date_naive();
        let end = start + Duration::days(2);

        let response = app
            .post("/admin/api/v1/bookings")
            .json(&json!({
                "purpose": "Client Presentation",
                "asset_ids": ["ASSET-002", "ASSET-005", "ASSET-002"],
                "booked_by": "Bob Williams",
                "start_date": start.to_string(),
                "end_date": end.to_string(),
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let booking: BookingResponse = response.json();
        assert_eq!(booking.status, BookingStatus::Upcoming);
        assert_eq!(booking.asset_ids, vec!["ASSET-002", "ASSET-005"]);
        assert_eq!(booking.start_date.date_naive(), start);

        let response = app
            .post("/admin/api/v1/bookings")
            .json(&json!({
                "purpose": "Offsite",
                "asset_ids": ["ASSET-005"],
                "booked_by": "Diana Prince",
                "start_date": (Utc::now() - Duration::days(1)).to_rfc3339(),
                "end_date": (Utc::now() + Duration::days(1)).to_rfc3339(),
            }))
            .await;
        let booking: BookingResponse = response.json();
        assert_eq!(booking.status, BookingStatus::Active);
    }

    #[test_log::test(tokio::test)]
    async fn test_create_booking_validation() {
        let app = create_test_app().await;
        let base = json!({
            "purpose": "Trade show",
            "asset_ids": ["ASSET-005"],
            "booked_by": "Events Team",
            "start_date": "2030-03-10",
            "end_date": "2030-03-12",
        });

        let with = |key: &str, value: serde_json::Value| {
            let mut body = base.clone();
            body[key] = value;
            body
        };

        for body in [
            with("start_date", json!("next tuesday")),
            with("end_date", json!("2030-03-01")),
            with("asset_ids", json!([])),
            with("asset_ids", json!(["ASSET-004"])),
            with("purpose", json!("  ")),
        ] {
            app.post("/admin/api/v1/bookings")
                .json(&body)
                .await
                .assert_status(StatusCode::BAD_REQUEST);
        }

        app.post("/admin/api/v1/bookings")
            .json(&base)
            .await
            .assert_status(StatusCode::CREATED);
    }

    #[test_log::test(tokio::test)]
    async fn test_booking_detail_and_lifecycle() {
        let app = create_test_app().await;

        let detail: BookingDetailResponse = app.get("/admin/api/v1/bookings/BOOK-003").await.json();
        let assets: Vec<_> = detail.assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(assets, vec!["ASSET-004", "ASSET-002"]);

        let booking: BookingResponse = app
            .patch("/admin/api/v1/bookings/BOOK-001")
            .json(&json!({ "status": "cancelled", "notes": "Postponed" }))
            .await
            .json();
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert_eq!(booking.notes.as_deref(), Some("Postponed"));

        app.delete("/admin/api/v1/bookings/BOOK-001")
            .await
            .assert_status(StatusCode::NO_CONTENT);
        app.get("/admin/api/v1/bookings/BOOK-001")
            .await
            .assert_status(StatusCode::NOT_FOUND);
        app.delete("/admin/api/v1/bookings/BOOK-001")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
