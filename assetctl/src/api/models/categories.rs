//! API request/response models for asset categories.

use super::pagination::Pagination;
use crate::db::models::categories::CategoryDBResponse;
use crate::types::CategoryId;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListCategoriesQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Case-insensitive substring match on name or description
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryCreate {
    #[schema(example = "Electronics")]
    pub name: String,
    pub description: Option<String>,
    /// Hex color, `#6b7280` when omitted
    #[schema(example = "#3b82f6")]
    pub color: Option<String>,
}

/// Only provided fields are updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    #[schema(example = "CAT-001")]
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    /// Number of assets in this category
    pub asset_count: usize,
}

impl CategoryResponse {
    pub fn new(db: CategoryDBResponse, asset_count: usize) -> Self {
        Self {
            id: db.id,
            name: db.name,
            description: db.description,
            color: db.color,
            asset_count,
        }
    }
}
