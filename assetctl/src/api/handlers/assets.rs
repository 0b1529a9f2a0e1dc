use crate::AppState;
use crate::api::handlers::scan::run_attempt;
use crate::api::models::assets::{
    AssetCreate, AssetDetailResponse, AssetResponse, AssetUpdate, BookingAssetAdd, CustodyAssign, ListAssetsQuery,
    LocationRefresh,
};
use crate::api::models::bookings::BookingResponse;
use crate::api::models::categories::CategoryResponse;
use crate::api::models::pagination::PaginatedResponse;
use crate::api::models::scan::ScanResponse;
use crate::api::models::users::UserResponse;
use crate::db::handlers::{Assets, Bookings, Categories, Repository, Users, bookings::BookingFilter};
use crate::db::models::assets::AssetCreateDBRequest;
use crate::errors::{Error, Result};
use crate::scan::payload::scan_url;
use crate::types::{AssetId, AssetStatus};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::USER_AGENT},
};
use chrono::Utc;

fn not_found(id: AssetId) -> Error {
    Error::NotFound {
        resource: "Asset".to_string(),
        id,
    }
}

#[utoipa::path(
    get,
    path = "/assets",
    tag = "assets",
    summary = "List assets",
    description = "Filter, search and sort the asset registry. Pagination applies after filtering.",
    params(ListAssetsQuery),
    responses(
        (status = 200, description = "Page of assets", body = PaginatedResponse<AssetResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_assets(
    State(state): State<AppState>,
    Query(query): Query<ListAssetsQuery>,
) -> Result<Json<PaginatedResponse<AssetResponse>>> {
    let mut tx = state.store.begin().await;
    let assets = Assets::new(&mut tx).list(&query.filter()).await?;
    Ok(Json(query.pagination.page(assets.into_iter().map(AssetResponse::from).collect())))
}

#[utoipa::path(
    post,
    path = "/assets",
    tag = "assets",
    summary = "Register asset",
    description = "Registers an asset and attaches a QR code. A free code is allocated when none is given.",
    request_body = AssetCreate,
    responses(
        (status = 201, description = "Asset registered", body = AssetResponse),
        (status = 400, description = "Missing name, or unknown category, custodian or QR code"),
        (status = 409, description = "QR code already attached to another asset"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_asset(
    State(state): State<AppState>,
    Json(create): Json<AssetCreate>,
) -> Result<(StatusCode, Json<AssetResponse>)> {
    let request = AssetCreateDBRequest {
        name: create.name,
        description: create.description,
        qr_code_id: create.qr_code_id,
        status: create.status.unwrap_or(AssetStatus::Available),
        category_id: create.category_id,
        assigned_location: create.assigned_location,
        custodian_id: create.custodian_id,
        location: create.location,
        is_bookable: create.is_bookable.unwrap_or(true),
        registered_at: Utc::now(),
    };

    let mut tx = state.store.begin().await;
    let asset = Assets::new(&mut tx).create(&request).await?;
    tx.commit();
    Ok((StatusCode::CREATED, Json(AssetResponse::from(asset))))
}

#[utoipa::path(
    get,
    path = "/assets/{id}",
    tag = "assets",
    summary = "Get asset",
    description = "The asset with its category, custodian and bookings resolved.",
    params(("id" = String, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset details", body = AssetDetailResponse),
        (status = 404, description = "Asset not found"),
    )
)]
#[tracing::instrument(skip_all, fields(asset_id = %id))]
pub async fn get_asset(State(state): State<AppState>, Path(id): Path<AssetId>) -> Result<Json<AssetDetailResponse>> {
    let mut tx = state.store.begin().await;
    let asset = Assets::new(&mut tx).get_by_id(id.clone()).await?.ok_or_else(|| not_found(id.clone()))?;

    let category = match &asset.category_id {
        Some(category_id) => {
            let count = Assets::new(&mut tx)
                .count_by_category()
                .await?
                .get(&asset.category_id)
                .copied()
                .unwrap_or(0);
            Categories::new(&mut tx)
                .get_by_id(category_id.clone())
                .await?
                .map(|c| CategoryResponse::new(c, count))
        }
        None => None,
    };

    let custodian = match &asset.custodian_id {
        Some(user_id) => Users::new(&mut tx).get_by_id(user_id.clone()).await?.map(UserResponse::from),
        None => None,
    };

    let filter = BookingFilter {
        asset_id: Some(id),
        ..Default::default()
    };
    let bookings = Bookings::new(&mut tx)
        .list(&filter)
        .await?
        .into_iter()
        .map(BookingResponse::from)
        .collect();

    let scan_url = state
        .config
        .public_url
        .as_ref()
        .and_then(|base| scan_url(base, &asset.qr_code_id).ok())
        .map(|url| url.to_string());

    Ok(Json(AssetDetailResponse {
        asset: asset.into(),
        category,
        custodian,
        bookings,
        scan_url,
    }))
}

#[utoipa::path(
    patch,
    path = "/assets/{id}",
    tag = "assets",
    summary = "Update asset",
    params(("id" = String, Path, description = "Asset ID")),
    request_body = AssetUpdate,
    responses(
        (status = 200, description = "Asset updated", body = AssetResponse),
        (status = 400, description = "Invalid name, or unknown category or custodian"),
        (status = 404, description = "Asset not found"),
    )
)]
#[tracing::instrument(skip_all, fields(asset_id = %id))]
pub async fn update_asset(
    State(state): State<AppState>,
    Path(id): Path<AssetId>,
    Json(update): Json<AssetUpdate>,
) -> Result<Json<AssetResponse>> {
    let mut tx = state.store.begin().await;
    let asset = Assets::new(&mut tx).update(id, &update.into()).await?;
    tx.commit();
    Ok(Json(AssetResponse::from(asset)))
}

#[utoipa::path(
    delete,
    path = "/assets/{id}",
    tag = "assets",
    summary = "Delete asset",
    description = "Deletes the asset and frees its QR code. Refused while the asset is part of an upcoming or active booking.",
    params(("id" = String, Path, description = "Asset ID")),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 400, description = "Asset is part of a live booking"),
        (status = 404, description = "Asset not found"),
    )
)]
#[tracing::instrument(skip_all, fields(asset_id = %id))]
pub async fn delete_asset(State(state): State<AppState>, Path(id): Path<AssetId>) -> Result<StatusCode> {
    let mut tx = state.store.begin().await;
    if Assets::new(&mut tx).delete(id.clone()).await? {
        tx.commit();
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

#[utoipa::path(
    post,
    path = "/assets/{id}/custody",
    tag = "assets",
    summary = "Assign custody",
    description = "Hands the asset to a user. The asset is checked out until custody is released.",
    params(("id" = String, Path, description = "Asset ID")),
    request_body = CustodyAssign,
    responses(
        (status = 200, description = "Custody assigned", body = AssetResponse),
        (status = 400, description = "Unknown user"),
        (status = 404, description = "Asset not found"),
    )
)]
#[tracing::instrument(skip_all, fields(asset_id = %id))]
pub async fn assign_custody(
    State(state): State<AppState>,
    Path(id): Path<AssetId>,
    Json(body): Json<CustodyAssign>,
) -> Result<Json<AssetResponse>> {
    let mut tx = state.store.begin().await;
    let asset = Assets::new(&mut tx).assign_custody(&id, &body.user_id).await?;
    tx.commit();
    Ok(Json(AssetResponse::from(asset)))
}

#[utoipa::path(
    delete,
    path = "/assets/{id}/custody",
    tag = "assets",
    summary = "Release custody",
    params(("id" = String, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Custody released", body = AssetResponse),
        (status = 404, description = "Asset not found"),
    )
)]
#[tracing::instrument(skip_all, fields(asset_id = %id))]
pub async fn release_custody(State(state): State<AppState>, Path(id): Path<AssetId>) -> Result<Json<AssetResponse>> {
    let mut tx = state.store.begin().await;
    let asset = Assets::new(&mut tx).release_custody(&id).await?;
    tx.commit();
    Ok(Json(AssetResponse::from(asset)))
}

#[utoipa::path(
    post,
    path = "/assets/{id}/bookings",
    tag = "assets",
    summary = "Add asset to booking",
    description = "Adds a bookable asset to an upcoming or active booking.",
    params(("id" = String, Path, description = "Asset ID")),
    request_body = BookingAssetAdd,
    responses(
        (status = 200, description = "Asset added", body = BookingResponse),
        (status = 400, description = "Asset not bookable, or booking no longer open"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Asset already part of the booking"),
    )
)]
#[tracing::instrument(skip_all, fields(asset_id = %id))]
pub async fn add_asset_to_booking(
    State(state): State<AppState>,
    Path(id): Path<AssetId>,
    Json(body): Json<BookingAssetAdd>,
) -> Result<Json<BookingResponse>> {
    let mut tx = state.store.begin().await;
    let booking = Bookings::new(&mut tx).add_asset(&body.booking_id, &id).await?;
    tx.commit();
    Ok(Json(BookingResponse::from(booking)))
}

#[utoipa::path(
    post,
    path = "/assets/{id}/location",
    tag = "assets",
    summary = "Refresh asset location",
    description = "Updates the asset's position from the device, as a GPS update.",
    params(("id" = String, Path, description = "Asset ID")),
    request_body = LocationRefresh,
    responses(
        (status = 200, description = "Outcome of the refresh", body = ScanResponse),
        (status = 403, description = "Location permission denied"),
        (status = 404, description = "Asset not found"),
        (status = 422, description = "Position unavailable or unsupported"),
        (status = 502, description = "Reverse geocoding failed"),
        (status = 504, description = "Timed out getting a position or an address"),
    )
)]
#[tracing::instrument(skip_all, fields(asset_id = %id))]
pub async fn refresh_asset_location(
    State(state): State<AppState>,
    Path(id): Path<AssetId>,
    headers: HeaderMap,
    Json(body): Json<LocationRefresh>,
) -> Result<Json<ScanResponse>> {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let scan = state.scan.clone();

    let outcome = run_attempt(move |cancel| async move {
        scan.refresh_location(&id, body.location, user_agent.as_deref(), cancel).await
    })
    .await?;
    Ok(Json(ScanResponse::from(outcome)))
}
