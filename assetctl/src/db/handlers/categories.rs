//! Store repository for asset categories.

use crate::db::{
    Tables,
    errors::{DbError, Result},
    handlers::{paginate, repository::Repository, required_text},
    models::categories::{CategoryCreateDBRequest, CategoryDBResponse, CategoryUpdateDBRequest},
};
use crate::types::{CategoryId, Entity, generate_id};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing categories
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub skip: usize,
    pub limit: Option<usize>,
    /// Case-insensitive substring search on name and description
    pub search: Option<String>,
}

impl CategoryFilter {
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

pub struct Categories<'c> {
    db: &'c mut Tables,
}

impl<'c> Categories<'c> {
    pub fn new(db: &'c mut Tables) -> Self {
        Self { db }
    }
}

fn normalize_color(color: &str) -> Result<String> {
    let color = color.trim();
    let hex = color.strip_prefix('#').unwrap_or_default();
    if !matches!(hex.len(), 3 | 6) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DbError::check(
            "categories",
            "categories_color_check",
            format!("'{color}' is not a hex color"),
        ));
    }
    Ok(color.to_lowercase())
}

#[async_trait::async_trait]
impl<'c> Repository for Categories<'c> {
    type CreateRequest = CategoryCreateDBRequest;
    type UpdateRequest = CategoryUpdateDBRequest;
    type Response = CategoryDBResponse;
    type Id = CategoryId;
    type Filter = CategoryFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let category = CategoryDBResponse {
            id: generate_id(Entity::Category, 7),
            name: required_text(&request.name, "categories", "categories_name_check", "Category name")?,
            description: request.description.clone(),
            color: normalize_color(&request.color)?,
        };
        // Newest first, as the categories page shows them
        self.db.categories.insert(0, category.clone());
        Ok(category)
    }

    #[instrument(skip(self), fields(category_id = %id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        Ok(self.db.categories.iter().find(|c| c.id == id).cloned())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        Ok(self
            .db
            .categories
            .iter()
            .filter(|c| ids.contains(&c.id))
            .map(|c| (c.id.clone(), c.clone()))
            .collect())
    }

    #[instrument(skip(self, filter), fields(skip = filter.skip, limit = ?filter.limit), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let needle = filter.search.as_ref().map(|s| s.to_lowercase());
        let rows = self
            .db
            .categories
            .iter()
            .filter(|c| {
                needle.as_ref().is_none_or(|n| {
                    c.name.to_lowercase().contains(n)
                        || c.description.as_ref().is_some_and(|d| d.to_lowercase().contains(n))
                })
            })
            .cloned()
            .collect();
        Ok(paginate(rows, filter.skip, filter.limit))
    }

    /// Delete a category. Assets in it become uncategorized.
    #[instrument(skip(self), fields(category_id = %id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let before = self.db.categories.len();
        self.db.categories.retain(|c| c.id != id);
        if self.db.categories.len() == before {
            return Ok(false);
        }

        for asset in self.db.assets.iter_mut().filter(|a| a.category_id.as_ref() == Some(&id)) {
            asset.category_id = None;
        }
        Ok(true)
    }

    #[instrument(skip(self, request), fields(category_id = %id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let name = request
            .name
            .as_deref()
            .map(|name| required_text(name, "categories", "categories_name_check", "Category name"))
            .transpose()?;
        let color = request.color.as_deref().map(normalize_color).transpose()?;

        let category = self.db.categories.iter_mut().find(|c| c.id == id).ok_or(DbError::NotFound)?;
        if let Some(name) = name {
            category.name = name;
        }
        if let Some(description) = &request.description {
            category.description = Some(description.clone()).filter(|d| !d.trim().is_empty());
        }
        if let Some(color) = color {
            category.color = color;
        }
        Ok(category.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::categories::DEFAULT_CATEGORY_COLOR;
    use crate::db::seed::demo_tables;

    fn request(name: &str) -> CategoryCreateDBRequest {
        CategoryCreateDBRequest {
            name: name.to_string(),
            description: None,
            color: DEFAULT_CATEGORY_COLOR.to_string(),
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_create_category_is_listed_first() {
        let mut tables = demo_tables(chrono::Utc::now());
        let mut repo = Categories::new(&mut tables);

        let created = repo.create(&request("  Tools  ")).await.unwrap();
        assert!(created.id.starts_with("CAT-"));
        assert_eq!(created.name, "Tools");
        assert_eq!(created.color, "#6b7280");

        let listed = repo.list(&CategoryFilter::default()).await.unwrap();
        assert_eq!(listed[0].id, created.id);
        assert_eq!(listed.len(), 5);
    }

    #[test_log::test(tokio::test)]
    async fn test_create_category_rejects_blank_name_and_bad_color() {
        let mut tables = Tables::default();
        let mut repo = Categories::new(&mut tables);

        assert!(matches!(
            repo.create(&request("")).await,
            Err(DbError::CheckViolation { .. })
        ));

        let mut bad_color = request("Tools");
        bad_color.color = "blue".to_string();
        assert!(matches!(
            repo.create(&bad_color).await,
            Err(DbError::CheckViolation { .. })
        ));
    }

    #[test_log::test(tokio::test)]
    async fn test_delete_category_detaches_assets() {
        let mut tables = demo_tables(chrono::Utc::now());

        assert!(
            Categories::new(&mut tables)
                .delete("CAT-001".to_string())
                .await
                .unwrap()
        );

        // ASSET-001 and ASSET-002 were electronics
        for id in ["ASSET-001", "ASSET-002"] {
            let asset = tables.assets.iter().find(|a| a.id == id).unwrap();
            assert_eq!(asset.category_id, None);
        }
        assert_eq!(tables.categories.len(), 3);
    }

    #[test_log::test(tokio::test)]
    async fn test_update_category_fields() {
        let mut tables = demo_tables(chrono::Utc::now());
        let updated = Categories::new(&mut tables)
            .update(
                "CAT-003".to_string(),
                &CategoryUpdateDBRequest {
                    name: Some("Fleet".to_string()),
                    description: None,
                    color: Some("#00FF00".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Fleet");
        assert_eq!(updated.color, "#00ff00");
        assert_eq!(updated.description.as_deref(), Some("Company cars, vans, and trucks."));
    }
}
