//! Store models for locations.

use crate::api::models::locations::{LocationCreate, LocationUpdate};
use crate::types::LocationId;

/// Request for creating a new location
#[derive(Debug, Clone)]
pub struct LocationCreateDBRequest {
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
}

impl From<LocationCreate> for LocationCreateDBRequest {
    fn from(api: LocationCreate) -> Self {
        Self {
            name: api.name,
            address: api.address,
            description: api.description,
        }
    }
}

/// Request for updating a location
#[derive(Debug, Clone, Default)]
pub struct LocationUpdateDBRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
}

impl From<LocationUpdate> for LocationUpdateDBRequest {
    fn from(api: LocationUpdate) -> Self {
        Self {
            name: api.name,
            address: api.address,
            description: api.description,
        }
    }
}

/// Stored location. Assets refer to a location by its name.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationDBResponse {
    pub id: LocationId,
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
}
