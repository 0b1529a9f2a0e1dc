//! API models for the dashboard summary.

use super::assets::AssetResponse;
use crate::types::{AssetStatus, CategoryId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusCount {
    pub status: AssetStatus,
    /// Display label, e.g. "Checked Out"
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryCount {
    /// `None` for uncategorized assets
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub color: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub total_assets: usize,
    /// Only statuses with at least one asset
    pub by_status: Vec<StatusCount>,
    /// Only categories with at least one asset
    pub by_category: Vec<CategoryCount>,
    /// Most recently scanned first
    pub recently_scanned: Vec<AssetResponse>,
    /// Least recently scanned first
    pub least_recently_scanned: Vec<AssetResponse>,
}
