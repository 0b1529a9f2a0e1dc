use crate::AppState;
use crate::api::models::categories::{CategoryCreate, CategoryResponse, CategoryUpdate, ListCategoriesQuery};
use crate::api::models::pagination::PaginatedResponse;
use crate::db::handlers::{Assets, Categories, Repository, categories::CategoryFilter};
use crate::errors::{Error, Result};
use crate::types::CategoryId;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    summary = "List categories",
    description = "Newest first, each with the number of assets in it.",
    params(ListCategoriesQuery),
    responses(
        (status = 200, description = "Page of categories", body = PaginatedResponse<CategoryResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<Json<PaginatedResponse<CategoryResponse>>> {
    let mut tx = state.store.begin().await;
    let mut filter = CategoryFilter::default();
    if let Some(search) = query.search {
        filter = filter.with_search(search);
    }

    let categories = Categories::new(&mut tx).list(&filter).await?;
    let counts = Assets::new(&mut tx).count_by_category().await?;

    let rows = categories
        .into_iter()
        .map(|c| {
            let count = counts.get(&Some(c.id.clone())).copied().unwrap_or(0);
            CategoryResponse::new(c, count)
        })
        .collect();
    Ok(Json(query.pagination.page(rows)))
}

#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    summary = "Create category",
    request_body = CategoryCreate,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Name missing or color not a hex color"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(create): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<CategoryResponse>)> {
    let mut tx = state.store.begin().await;
    let category = Categories::new(&mut tx).create(&create.into()).await?;
    tx.commit();
    Ok((StatusCode::CREATED, Json(CategoryResponse::new(category, 0))))
}

#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "categories",
    summary = "Get category",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category details", body = CategoryResponse),
        (status = 404, description = "Category not found"),
    )
)]
#[tracing::instrument(skip_all, fields(category_id = %id))]
pub async fn get_category(State(state): State<AppState>, Path(id): Path<CategoryId>) -> Result<Json<CategoryResponse>> {
    let mut tx = state.store.begin().await;
    let category = Categories::new(&mut tx).get_by_id(id.clone()).await?.ok_or_else(|| Error::NotFound {
        resource: "Category".to_string(),
        id: id.clone(),
    })?;
    let count = Assets::new(&mut tx)
        .count_by_category()
        .await?
        .get(&Some(id))
        .copied()
        .unwrap_or(0);
    Ok(Json(CategoryResponse::new(category, count)))
}

#[utoipa::path(
    patch,
    path = "/categories/{id}",
    tag = "categories",
    summary = "Update category",
    params(("id" = String, Path, description = "Category ID")),
    request_body = CategoryUpdate,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Invalid name or color"),
        (status = 404, description = "Category not found"),
    )
)]
#[tracing::instrument(skip_all, fields(category_id = %id))]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(update): Json<CategoryUpdate>,
) -> Result<Json<CategoryResponse>> {
    let mut tx = state.store.begin().await;
    let category = Categories::new(&mut tx).update(id.clone(), &update.into()).await?;
    let count = Assets::new(&mut tx)
        .count_by_category()
        .await?
        .get(&Some(id))
        .copied()
        .unwrap_or(0);
    tx.commit();
    Ok(Json(CategoryResponse::new(category, count)))
}

#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "categories",
    summary = "Delete category",
    description = "Assets in the category become uncategorized.",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found"),
    )
)]
#[tracing::instrument(skip_all, fields(category_id = %id))]
pub async fn delete_category(State(state): State<AppState>, Path(id): Path<CategoryId>) -> Result<StatusCode> {
    let mut tx = state.store.begin().await;
    if Categories::new(&mut tx).delete(id.clone()).await? {
        tx.commit();
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Category".to_string(),
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::assets::AssetResponse;
    use crate::api::models::categories::CategoryResponse;
    use crate::api::models::pagination::PaginatedResponse;
    use crate::test_utils::create_test_app;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test_log::test(tokio::test)]
    async fn test_list_categories_with_counts() {
        let app = create_test_app().await;

        let page: PaginatedResponse<CategoryResponse> = app.get("/admin/api/v1/categories").await.json();
        assert_eq!(page.total_count, 4);

        let count_of = |id: &str| page.data.iter().find(|c| c.id == id).map(|c| c.asset_count);
        assert_eq!(count_of("CAT-001"), Some(2));
        assert_eq!(count_of("CAT-002"), Some(0));
        assert_eq!(count_of("CAT-004"), Some(2));
    }

    #[test_log::test(tokio::test)]
    async fn test_create_category_defaults() {
        let app = create_test_app().await;

        let response = app
            .post("/admin/api/v1/categories")
            .json(&json!({ "name": "  Tools  " }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let category: CategoryResponse = response.json();
        assert_eq!(category.name, "Tools");
        assert_eq!(category.color, "#6b7280");
        assert_eq!(category.asset_count, 0);

        // New categories are listed first
        let page: PaginatedResponse<CategoryResponse> = app.get("/admin/api/v1/categories").await.json();
        assert_eq!(page.data[0].id, category.id);
    }

    #[test_log::test(tokio::test)]
    async fn test_create_category_rejects_bad_input() {
        let app = create_test_app().await;

        app.post("/admin/api/v1/categories")
            .json(&json!({ "name": "" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        app.post("/admin/api/v1/categories")
            .json(&json!({ "name": "Tools", "color": "blue" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[test_log::test(tokio::test)]
    async fn test_delete_category_detaches_assets() {
        let app = create_test_app().await;

        app.delete("/admin/api/v1/categories/CAT-003")
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let asset: AssetResponse = app.get("/admin/api/v1/assets/ASSET-005").await.json();
        assert_eq!(asset.category_id, None);

        app.delete("/admin/api/v1/categories/CAT-003")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
