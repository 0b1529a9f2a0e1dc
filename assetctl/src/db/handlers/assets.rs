//! Store repository for assets.

use crate::db::{
    Tables,
    errors::{DbError, Result},
    handlers::{paginate, qr_codes::QrCodes, repository::Repository, required_text},
    models::assets::{AssetCreateDBRequest, AssetDBResponse, AssetUpdateDBRequest, GeoLocation, ScanUpdateDBRequest},
};
use crate::types::{AssetId, AssetStatus, CategoryId, Entity, QrCodeId, UserId, generate_id};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::instrument;
use utoipa::ToSchema;

/// Column an asset listing is sorted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetSortKey {
    /// Registration order
    #[default]
    Registered,
    Name,
    Status,
    Custodian,
    LastScan,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Filter for listing assets
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    pub skip: usize,
    pub limit: Option<usize>,
    pub status: Option<AssetStatus>,
    pub category_id: Option<CategoryId>,
    /// Exact match on the assigned location name
    pub assigned_location: Option<String>,
    pub custodian_id: Option<UserId>,
    pub bookable: Option<bool>,
    /// Case-insensitive substring search on id, name and description
    pub search: Option<String>,
    pub sort: AssetSortKey,
    pub direction: SortDirection,
}

impl AssetFilter {
    pub fn new(skip: usize, limit: usize) -> Self {
        Self {
            skip,
            limit: Some(limit),
            ..Default::default()
        }
    }

    fn matches(&self, asset: &AssetDBResponse, needle: Option<&str>) -> bool {
        self.status.is_none_or(|s| asset.status == s)
            && self.category_id.as_ref().is_none_or(|c| asset.category_id.as_ref() == Some(c))
            && self.assigned_location.as_ref().is_none_or(|l| &asset.assigned_location == l)
            && self.custodian_id.as_ref().is_none_or(|u| asset.custodian_id.as_ref() == Some(u))
            && self.bookable.is_none_or(|b| asset.is_bookable == b)
            && needle.is_none_or(|n| {
                asset.id.to_lowercase().contains(n)
                    || asset.name.to_lowercase().contains(n)
                    || asset.description.to_lowercase().contains(n)
            })
    }
}

pub struct Assets<'c> {
    db: &'c mut Tables,
}

impl<'c> Assets<'c> {
    pub fn new(db: &'c mut Tables) -> Self {
        Self { db }
    }

    fn ensure_category(&self, id: &Option<CategoryId>) -> Result<()> {
        match id {
            Some(id) if !self.db.categories.iter().any(|c| &c.id == id) => Err(DbError::foreign_key(
                "assets",
                "assets_category_id_fkey",
                format!("Category {id} does not exist"),
            )),
            _ => Ok(()),
        }
    }

    fn ensure_custodian(&self, id: &Option<UserId>) -> Result<()> {
        match id {
            Some(id) if !self.db.users.iter().any(|u| &u.id == id) => Err(DbError::foreign_key(
                "assets",
                "assets_custodian_id_fkey",
                format!("User {id} does not exist"),
            )),
            _ => Ok(()),
        }
    }

    fn asset_mut(&mut self, id: &str) -> Result<&mut AssetDBResponse> {
        self.db.assets.iter_mut().find(|a| a.id == id).ok_or(DbError::NotFound)
    }

    fn custodian_name(&self, asset: &AssetDBResponse) -> String {
        asset
            .custodian_id
            .as_ref()
            .and_then(|id| self.db.users.iter().find(|u| &u.id == id))
            .map(|u| u.name.to_lowercase())
            .unwrap_or_default()
    }

    /// The asset a QR code is attached to, if any
    #[instrument(skip(self), fields(code_id = %code_id), err)]
    pub async fn get_by_qr_code(&mut self, code_id: &QrCodeId) -> Result<Option<AssetDBResponse>> {
        Ok(self.db.assets.iter().find(|a| &a.qr_code_id == code_id).cloned())
    }

    /// Store the outcome of a successful scan or GPS refresh
    #[instrument(skip(self, update), fields(asset_id = %id, source = %update.details.source), err)]
    pub async fn record_scan(&mut self, id: &AssetId, update: &ScanUpdateDBRequest) -> Result<AssetDBResponse> {
        let asset = self.asset_mut(id)?;
        asset.location = update.location.clone();
        asset.last_scan = update.scanned_at;
        asset.scan_details = Some(update.details.clone());
        Ok(asset.clone())
    }

    /// Hand an asset to a user; it is checked out until released
    #[instrument(skip(self), fields(asset_id = %id, user_id = %user_id), err)]
    pub async fn assign_custody(&mut self, id: &AssetId, user_id: &UserId) -> Result<AssetDBResponse> {
        self.ensure_custodian(&Some(user_id.clone()))?;
        let asset = self.asset_mut(id)?;
        asset.custodian_id = Some(user_id.clone());
        asset.status = AssetStatus::CheckedOut;
        Ok(asset.clone())
    }

    #[instrument(skip(self), fields(asset_id = %id), err)]
    pub async fn release_custody(&mut self, id: &AssetId) -> Result<AssetDBResponse> {
        let asset = self.asset_mut(id)?;
        asset.custodian_id = None;
        if asset.status == AssetStatus::CheckedOut {
            asset.status = AssetStatus::Available;
        }
        Ok(asset.clone())
    }

    /// Number of assets per category; uncategorized assets are counted under `None`
    #[instrument(skip(self), err)]
    pub async fn count_by_category(&mut self) -> Result<HashMap<Option<CategoryId>, usize>> {
        let mut counts = HashMap::new();
        for asset in &self.db.assets {
            *counts.entry(asset.category_id.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Number of assets per assigned location name
    #[instrument(skip(self), err)]
    pub async fn count_by_assigned_location(&mut self) -> Result<HashMap<String, usize>> {
        let mut counts = HashMap::new();
        for asset in &self.db.assets {
            *counts.entry(asset.assigned_location.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Assets<'c> {
    type CreateRequest = AssetCreateDBRequest;
    type UpdateRequest = AssetUpdateDBRequest;
    type Response = AssetDBResponse;
    type Id = AssetId;
    type Filter = AssetFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let name = required_text(&request.name, "assets", "assets_name_check", "Asset name")?;
        self.ensure_category(&request.category_id)?;
        self.ensure_custodian(&request.custodian_id)?;

        let id = generate_id(Entity::Asset, 7);
        let qr_code_id = {
            let mut codes = QrCodes::new(&mut *self.db);
            match &request.qr_code_id {
                Some(code) => {
                    codes.assign(code, &id).await?;
                    code.clone()
                }
                None => codes.allocate_unassigned(&id, request.registered_at).await?,
            }
        };

        let assigned_location = request.assigned_location.trim().to_string();
        let asset = AssetDBResponse {
            id,
            name,
            description: request.description.trim().to_string(),
            qr_code_id,
            status: request.status,
            category_id: request.category_id.clone(),
            custodian_id: request.custodian_id.clone(),
            location: request.location.clone().unwrap_or_else(|| GeoLocation {
                latitude: 0.0,
                longitude: 0.0,
                address: assigned_location.clone(),
            }),
            assigned_location,
            last_scan: request.registered_at,
            scan_details: None,
            is_bookable: request.is_bookable,
        };
        self.db.assets.push(asset.clone());
        Ok(asset)
    }

    #[instrument(skip(self), fields(asset_id = %id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        Ok(self.db.assets.iter().find(|a| a.id == id).cloned())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        Ok(self
            .db
            .assets
            .iter()
            .filter(|a| ids.contains(&a.id))
            .map(|a| (a.id.clone(), a.clone()))
            .collect())
    }

    #[instrument(skip(self, filter), fields(skip = filter.skip, limit = ?filter.limit, sort = ?filter.sort), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let needle = filter.search.as_ref().map(|s| s.to_lowercase());
        let mut rows: Vec<AssetDBResponse> = self
            .db
            .assets
            .iter()
            .filter(|a| filter.matches(a, needle.as_deref()))
            .cloned()
            .collect();

        let compare = |a: &AssetDBResponse, b: &AssetDBResponse| -> Ordering {
            match filter.sort {
                AssetSortKey::Registered => Ordering::Equal,
                AssetSortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                AssetSortKey::Status => a.status.to_string().to_lowercase().cmp(&b.status.to_string().to_lowercase()),
                AssetSortKey::Custodian => self.custodian_name(a).cmp(&self.custodian_name(b)),
                AssetSortKey::LastScan => a.last_scan.cmp(&b.last_scan),
            }
        };
        // Stable sort, ties keep registration order in both directions
        match filter.direction {
            SortDirection::Asc => rows.sort_by(compare),
            SortDirection::Desc => rows.sort_by(|a, b| compare(b, a)),
        }

        Ok(paginate(rows, filter.skip, filter.limit))
    }

    /// Delete an asset and release its QR code. Assets that are part of an upcoming or active
    /// booking cannot be deleted.
    #[instrument(skip(self), fields(asset_id = %id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let Some(position) = self.db.assets.iter().position(|a| a.id == id) else {
            return Ok(false);
        };

        if let Some(booking) = self
            .db
            .bookings
            .iter()
            .find(|b| b.status.is_calendar_eligible() && b.asset_ids.contains(&id))
        {
            return Err(DbError::foreign_key(
                "bookings",
                "bookings_asset_ids_fkey",
                format!("Asset {id} is part of booking {}", booking.id),
            ));
        }

        let asset = self.db.assets.remove(position);
        QrCodes::new(&mut *self.db).release(&asset.qr_code_id).await?;
        Ok(true)
    }

    #[instrument(skip(self, request), fields(asset_id = %id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let name = request
            .name
            .as_deref()
            .map(|name| required_text(name, "assets", "assets_name_check", "Asset name"))
            .transpose()?;
        if let Some(category_id) = &request.category_id {
            self.ensure_category(category_id)?;
        }
        if let Some(custodian_id) = &request.custodian_id {
            self.ensure_custodian(custodian_id)?;
        }

        let asset = self.asset_mut(&id)?;
        if let Some(name) = name {
            asset.name = name;
        }
        if let Some(description) = &request.description {
            asset.description = description.trim().to_string();
        }
        if let Some(status) = request.status {
            asset.status = status;
        }
        if let Some(category_id) = &request.category_id {
            asset.category_id = category_id.clone();
        }
        if let Some(assigned_location) = &request.assigned_location {
            asset.assigned_location = assigned_location.trim().to_string();
        }
        if let Some(custodian_id) = &request.custodian_id {
            asset.custodian_id = custodian_id.clone();
        }
        if let Some(is_bookable) = request.is_bookable {
            asset.is_bookable = is_bookable;
        }
        Ok(asset.clone())
    }
}
