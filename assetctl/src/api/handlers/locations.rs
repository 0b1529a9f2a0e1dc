use crate::AppState;
use crate::api::models::assets::AssetResponse;
use crate::api::models::locations::{
    ListLocationsQuery, LocationCreate, LocationDetailResponse, LocationResponse, LocationUpdate,
};
use crate::api::models::pagination::PaginatedResponse;
use crate::db::handlers::{Assets, Locations, Repository, assets::AssetFilter, locations::LocationFilter};
use crate::errors::{Error, Result};
use crate::types::LocationId;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/locations",
    tag = "locations",
    summary = "List locations",
    description = "Newest first, each with the number of assets assigned there.",
    params(ListLocationsQuery),
    responses(
        (status = 200, description = "Page of locations", body = PaginatedResponse<LocationResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_locations(
    State(state): State<AppState>,
    Query(query): Query<ListLocationsQuery>,
) -> Result<Json<PaginatedResponse<LocationResponse>>> {
    let mut tx = state.store.begin().await;
    let mut filter = LocationFilter::default();
    if let Some(search) = query.search {
        filter = filter.with_search(search);
    }

    let locations = Locations::new(&mut tx).list(&filter).await?;
    let counts = Assets::new(&mut tx).count_by_assigned_location().await?;

    let rows = locations
        .into_iter()
        .map(|l| {
            let count = counts.get(&l.name).copied().unwrap_or(0);
            LocationResponse::new(l, count)
        })
        .collect();
    Ok(Json(query.pagination.page(rows)))
}

#[utoipa::path(
    post,
    path = "/locations",
    tag = "locations",
    summary = "Create location",
    request_body = LocationCreate,
    responses(
        (status = 201, description = "Location created", body = LocationResponse),
        (status = 400, description = "Name missing"),
        (status = 409, description = "A location with this name already exists"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_location(
    State(state): State<AppState>,
    Json(create): Json<LocationCreate>,
) -> Result<(StatusCode, Json<LocationResponse>)> {
    let mut tx = state.store.begin().await;
    let location = Locations::new(&mut tx).create(&create.into()).await?;
    let count = Assets::new(&mut tx)
        .count_by_assigned_location()
        .await?
        .get(&location.name)
        .copied()
        .unwrap_or(0);
    tx.commit();
    Ok((StatusCode::CREATED, Json(LocationResponse::new(location, count))))
}

#[utoipa::path(
    get,
    path = "/locations/{id}",
    tag = "locations",
    summary = "Get location",
    description = "The location with the assets assigned to it.",
    params(("id" = String, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location details", body = LocationDetailResponse),
        (status = 404, description = "Location not found"),
    )
)]
#[tracing::instrument(skip_all, fields(location_id = %id))]
pub async fn get_location(State(state): State<AppState>, Path(id): Path<LocationId>) -> Result<Json<LocationDetailResponse>> {
    let mut tx = state.store.begin().await;
    let location = Locations::new(&mut tx).get_by_id(id.clone()).await?.ok_or(Error::NotFound {
        resource: "Location".to_string(),
        id,
    })?;

    let filter = AssetFilter {
        assigned_location: Some(location.name.clone()),
        ..Default::default()
    };
    let assets: Vec<AssetResponse> = Assets::new(&mut tx)
        .list(&filter)
        .await?
        .into_iter()
        .map(AssetResponse::from)
        .collect();

    Ok(Json(LocationDetailResponse {
        location: LocationResponse::new(location, assets.len()),
        assets,
    }))
}

#[utoipa::path(
    patch,
    path = "/locations/{id}",
    tag = "locations",
    summary = "Update location",
    description = "Renaming a location moves its assets to the new name.",
    params(("id" = String, Path, description = "Location ID")),
    request_body = LocationUpdate,
    responses(
        (status = 200, description = "Location updated", body = LocationResponse),
        (status = 404, description = "Location not found"),
        (status = 409, description = "Another location has this name"),
    )
)]
#[tracing::instrument(skip_all, fields(location_id = %id))]
pub async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<LocationId>,
    Json(update): Json<LocationUpdate>,
) -> Result<Json<LocationResponse>> {
    let mut tx = state.store.begin().await;
    let location = Locations::new(&mut tx).update(id, &update.into()).await?;
    let count = Assets::new(&mut tx)
        .count_by_assigned_location()
        .await?
        .get(&location.name)
        .copied()
        .unwrap_or(0);
    tx.commit();
    Ok(Json(LocationResponse::new(location, count)))
}

#[utoipa::path(
    delete,
    path = "/locations/{id}",
    tag = "locations",
    summary = "Delete location",
    description = "Assets keep their assigned location text.",
    params(("id" = String, Path, description = "Location ID")),
    responses(
        (status = 204, description = "Location deleted"),
        (status = 404, description = "Location not found"),
    )
)]
#[tracing::instrument(skip_all, fields(location_id = %id))]
pub async fn delete_location(State(state): State<AppState>, Path(id): Path<LocationId>) -> Result<StatusCode> {
    let mut tx = state.store.begin().await;
    if Locations::new(&mut tx).delete(id.clone()).await? {
        tx.commit();
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Location".to_string(),
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::assets::AssetResponse;
    use crate::api::models::locations::{LocationDetailResponse, LocationResponse};
    use crate::api::models::pagination::PaginatedResponse;
    use crate::test_utils::create_test_app;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test_log::test(tokio::test)]
    async fn test_location_detail_lists_assets() {
        let app = create_test_app().await;

        let response = app.get("/admin/api/v1/locations/LOC-001").await;
        response.assert_status_ok();
        let detail: LocationDetailResponse = response.json();
        assert_eq!(detail.location.asset_count, 1);
        assert_eq!(detail.assets[0].id, "ASSET-001");
    }

    #[test_log::test(tokio::test)]
    async fn test_duplicate_location_name_conflicts() {
        let app = create_test_app().await;

        let response = app
            .post("/admin/api/v1/locations")
            .json(&json!({ "name": "Storage Room B, New York Office" }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let body: serde_json::Value = response.json();
        assert_eq!(body["resource"], "location");
    }

    #[test_log::test(tokio::test)]
    async fn test_rename_moves_assets() {
        let app = create_test_app().await;

        let response = app
            .patch("/admin/api/v1/locations/LOC-002")
            .json(&json!({ "name": "Storage Room C, New York Office" }))
            .await;
        response.assert_status_ok();
        let location: LocationResponse = response.json();
        assert_eq!(location.asset_count, 1);

        let asset: AssetResponse = app.get("/admin/api/v1/assets/ASSET-002").await.json();
        assert_eq!(asset.assigned_location, "Storage Room C, New York Office");
    }

    #[test_log::test(tokio::test)]
    async fn test_new_locations_come_first() {
        let app = create_test_app().await;

        let response = app
            .post("/admin/api/v1/locations")
            .json(&json!({ "name": "Warehouse 7", "address": "  " }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: LocationResponse = response.json();
        assert_eq!(created.address, None);

        let page: PaginatedResponse<LocationResponse> = app.get("/admin/api/v1/locations?limit=2").await.json();
        assert_eq!(page.total_count, 6);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].name, "Warehouse 7");
    }
}
