//! API request/response models for locations.

use super::assets::AssetResponse;
use super::pagination::Pagination;
use crate::db::models::locations::LocationDBResponse;
use crate::types::LocationId;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListLocationsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Case-insensitive substring match on name, address or description
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationCreate {
    /// Must be unique; assets refer to locations by name
    #[schema(example = "Main Office")]
    pub name: String,
    #[schema(example = "123 Main St, Anytown, USA")]
    pub address: Option<String>,
    pub description: Option<String>,
}

/// Only provided fields are updated. Renaming a location moves its assets along.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LocationUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationResponse {
    #[schema(example = "LOC-001")]
    pub id: LocationId,
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
    /// Number of assets assigned here
    pub asset_count: usize,
}

impl LocationResponse {
    pub fn new(db: LocationDBResponse, asset_count: usize) -> Self {
        Self {
            id: db.id,
            name: db.name,
            address: db.address,
            description: db.description,
            asset_count,
        }
    }
}

/// A location with the assets assigned to it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationDetailResponse {
    #[serde(flatten)]
    pub location: LocationResponse,
    pub assets: Vec<AssetResponse>,
}
