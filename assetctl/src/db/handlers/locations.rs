//! Store repository for named locations.

use crate::db::{
    Tables,
    errors::{DbError, Result},
    handlers::{paginate, repository::Repository, required_text},
    models::locations::{LocationCreateDBRequest, LocationDBResponse, LocationUpdateDBRequest},
};
use crate::types::{Entity, LocationId, generate_id};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing locations
#[derive(Debug, Clone, Default)]
pub struct LocationFilter {
    pub skip: usize,
    pub limit: Option<usize>,
    /// Case-insensitive substring search on name and address
    pub search: Option<String>,
}

impl LocationFilter {
    pub fn new(skip: usize, limit: usize) -> Self {
        Self {
            skip,
            limit: Some(limit),
            search: None,
        }
    }

    pub fn with_search(mut self, search: String) -> Self {
        self.search = Some(search);
        self
    }
}

pub struct Locations<'c> {
    db: &'c mut Tables,
}

impl<'c> Locations<'c> {
    pub fn new(db: &'c mut Tables) -> Self {
        Self { db }
    }

    fn ensure_unique_name(&self, name: &str, except: Option<&str>) -> Result<()> {
        if self
            .db
            .locations
            .iter()
            .any(|l| l.name == name && Some(l.id.as_str()) != except)
        {
            return Err(DbError::UniqueViolation {
                constraint: "locations_name_key",
                table: "locations",
                message: format!("A location named '{name}' already exists"),
                conflicting_value: Some(name.to_string()),
            });
        }
        Ok(())
    }
}

fn optional_text(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[async_trait::async_trait]
impl<'c> Repository for Locations<'c> {
    type CreateRequest = LocationCreateDBRequest;
    type UpdateRequest = LocationUpdateDBRequest;
    type Response = LocationDBResponse;
    type Id = LocationId;
    type Filter = LocationFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let name = required_text(&request.name, "locations", "locations_name_check", "Location name")?;
        self.ensure_unique_name(&name, None)?;

        let location = LocationDBResponse {
            id: generate_id(Entity::Location, 7),
            name,
            address: optional_text(&request.address),
            description: optional_text(&request.description),
        };
        self.db.locations.insert(0, location.clone());
        Ok(location)
    }

    #[instrument(skip(self), fields(location_id = %id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        Ok(self.db.locations.iter().find(|l| l.id == id).cloned())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        Ok(self
            .db
            .locations
            .iter()
            .filter(|l| ids.contains(&l.id))
            .map(|l| (l.id.clone(), l.clone()))
            .collect())
    }

    #[instrument(skip(self, filter), fields(skip = filter.skip, limit = ?filter.limit), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let needle = filter.search.as_ref().map(|s| s.to_lowercase());
        let rows = self
            .db
            .locations
            .iter()
            .filter(|l| {
                needle.as_ref().is_none_or(|n| {
                    l.name.to_lowercase().contains(n) || l.address.as_ref().is_some_and(|a| a.to_lowercase().contains(n))
                })
            })
            .cloned()
            .collect();
        Ok(paginate(rows, filter.skip, filter.limit))
    }

    #[instrument(skip(self), fields(location_id = %id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let before = self.db.locations.len();
        self.db.locations.retain(|l| l.id != id);
        Ok(self.db.locations.len() < before)
    }

    /// Update a location. Renaming carries its assets along to the new name.
    #[instrument(skip(self, request), fields(location_id = %id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let name = request
            .name
            .as_deref()
            .map(|name| required_text(name, "locations", "locations_name_check", "Location name"))
            .transpose()?;
        if let Some(name) = &name {
            self.ensure_unique_name(name, Some(&id))?;
        }

        let location = self.db.locations.iter_mut().find(|l| l.id == id).ok_or(DbError::NotFound)?;
        let previous_name = location.name.clone();
        if let Some(name) = name {
            location.name = name;
        }
        if request.address.is_some() {
            location.address = optional_text(&request.address);
        }
        if request.description.is_some() {
            location.description = optional_text(&request.description);
        }
        let location = location.clone();

        if location.name != previous_name {
            for asset in self.db.assets.iter_mut().filter(|a| a.assigned_location == previous_name) {
                asset.assigned_location = location.name.clone();
            }
        }
        Ok(location)
    }
}
