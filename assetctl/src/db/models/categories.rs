//! Store models for asset categories.

use crate::api::models::categories::{CategoryCreate, CategoryUpdate};
use crate::types::CategoryId;

/// Color given to categories created without one
pub const DEFAULT_CATEGORY_COLOR: &str = "#6b7280";

/// Request for creating a new category
#[derive(Debug, Clone)]
pub struct CategoryCreateDBRequest {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
}

impl From<CategoryCreate> for CategoryCreateDBRequest {
    fn from(api: CategoryCreate) -> Self {
        Self {
            name: api.name,
            description: api.description,
            color: api.color.unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
        }
    }
}

/// Request for updating a category
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdateDBRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl From<CategoryUpdate> for CategoryUpdateDBRequest {
    fn from(api: CategoryUpdate) -> Self {
        Self {
            name: api.name,
            description: api.description,
            color: api.color,
        }
    }
}

/// Stored category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDBResponse {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
}
