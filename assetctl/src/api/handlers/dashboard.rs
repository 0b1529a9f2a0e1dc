use crate::AppState;
use crate::api::models::assets::AssetResponse;
use crate::api::models::dashboard::{CategoryCount, DashboardResponse, StatusCount};
use crate::db::handlers::assets::{AssetFilter, AssetSortKey, SortDirection};
use crate::db::handlers::{Assets, Categories, Repository, categories::CategoryFilter};
use crate::db::models::categories::DEFAULT_CATEGORY_COLOR;
use crate::errors::Result;
use crate::types::AssetStatus;
use axum::{Json, extract::State};

/// Assets shown in each of the scan-recency lists
const RECENT_SCAN_COUNT: usize = 3;

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    summary = "Dashboard summary",
    description = "Asset totals by status and category, plus the most and least recently scanned assets.",
    responses(
        (status = 200, description = "Summary", body = DashboardResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>> {
    let mut tx = state.store.begin().await;

    let mut assets = Assets::new(&mut tx);
    let all = assets.list(&AssetFilter::default()).await?;
    let by_last_scan = |direction| AssetFilter {
        limit: Some(RECENT_SCAN_COUNT),
        sort: AssetSortKey::LastScan,
        direction,
        ..Default::default()
    };
    let recently_scanned = assets.list(&by_last_scan(SortDirection::Desc)).await?;
    let least_recently_scanned = assets.list(&by_last_scan(SortDirection::Asc)).await?;
    let mut per_category = assets.count_by_category().await?;

    let by_status = AssetStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            label: status.to_string(),
            count: all.iter().filter(|a| a.status == status).count(),
        })
        .filter(|s| s.count > 0)
        .collect();

    let mut by_category: Vec<CategoryCount> = Categories::new(&mut tx)
        .list(&CategoryFilter::default())
        .await?
        .into_iter()
        .filter_map(|category| {
            let count = per_category.remove(&Some(category.id.clone()))?;
            Some(CategoryCount {
                category_id: Some(category.id),
                name: category.name,
                color: category.color,
                count,
            })
        })
        .collect();
    if let Some(count) = per_category.remove(&None) {
        by_category.push(CategoryCount {
            category_id: None,
            name: "Uncategorized".to_string(),
            color: DEFAULT_CATEGORY_COLOR.to_string(),
            count,
        });
    }

    Ok(Json(DashboardResponse {
        total_assets: all.len(),
        by_status,
        by_category,
        recently_scanned: recently_scanned.into_iter().map(AssetResponse::from).collect(),
        least_recently_scanned: least_recently_scanned.into_iter().map(AssetResponse::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::models::dashboard::DashboardResponse;
    use crate::test_utils::create_test_app;
    use crate::types::AssetStatus;
    use serde_json::json;

    fn ids(assets: &[crate::api::models::assets::AssetResponse]) -> Vec<&str> {
        assets.iter().map(|a| a.id.as_str()).collect()
    }

    #[test_log::test(tokio::test)]
    async fn test_dashboard_summary() {
        let app = create_test_app().await;

        let dashboard: DashboardResponse = app.get("/admin/api/v1/dashboard").await.json();
        assert_eq!(dashboard.total_assets, 5);

        let available = dashboard
            .by_status
            .iter()
            .find(|s| s.status == AssetStatus::Available)
            .expect("available assets counted");
        assert_eq!(available.count, 2);
        assert_eq!(dashboard.by_status.iter().map(|s| s.count).sum::<usize>(), 5);

        let categories: Vec<_> = dashboard.by_category.iter().map(|c| (c.name.as_str(), c.count)).collect();
        assert_eq!(categories, vec![("Electronics", 2), ("Vehicles", 1), ("Equipment", 2)]);

        assert_eq!(ids(&dashboard.recently_scanned), vec!["ASSET-001", "ASSET-005", "ASSET-004"]);
        assert_eq!(ids(&dashboard.least_recently_scanned), vec!["ASSET-002", "ASSET-003", "ASSET-004"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_dashboard_counts_uncategorized_and_hides_empty_statuses() {
        let app = create_test_app().await;

        app.patch("/admin/api/v1/assets/ASSET-004")
            .json(&json!({ "category_id": null, "status": "available" }))
            .await
            .assert_status_ok();

        let dashboard: DashboardResponse = app.get("/admin/api/v1/dashboard").await.json();
        assert!(dashboard.by_status.iter().all(|s| s.status != AssetStatus::InRepair));

        let uncategorized = dashboard.by_category.last().expect("categories");
        assert_eq!(uncategorized.category_id, None);
        assert_eq!(uncategorized.name, "Uncategorized");
        assert_eq!(uncategorized.count, 1);
    }
}
