//! Store repository for users (custodians).

use crate::db::{
    Tables,
    errors::{DbError, Result},
    handlers::{paginate, repository::Repository, required_text},
    models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
};
use crate::types::{Entity, UserId, generate_id};
use std::collections::HashMap;
use tracing::instrument;

/// Avatar used when a user is created without one
pub const DEFAULT_AVATAR_URL: &str = "https://placehold.co/100x100.png";

/// Filter for listing users
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub skip: usize,
    pub limit: Option<usize>,
    /// Case-insensitive substring search on name
    pub search: Option<String>,
}

impl UserFilter {
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

pub struct Users<'c> {
    db: &'c mut Tables,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut Tables) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user = UserDBResponse {
            id: generate_id(Entity::User, 7),
            name: required_text(&request.name, "users", "users_name_check", "Name")?,
            avatar_url: request
                .avatar_url
                .clone()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string()),
        };
        self.db.users.push(user.clone());
        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        Ok(self.db.users.iter().find(|u| u.id == id).cloned())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        Ok(self
            .db
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .map(|u| (u.id.clone(), u.clone()))
            .collect())
    }

    #[instrument(skip(self, filter), fields(skip = filter.skip, limit = ?filter.limit), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let needle = filter.search.as_ref().map(|s| s.to_lowercase());
        let rows = self
            .db
            .users
            .iter()
            .filter(|u| needle.as_ref().is_none_or(|n| u.name.to_lowercase().contains(n)))
            .cloned()
            .collect();
        Ok(paginate(rows, filter.skip, filter.limit))
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        if let Some(asset) = self.db.assets.iter().find(|a| a.custodian_id.as_ref() == Some(&id)) {
            return Err(DbError::foreign_key(
                "assets",
                "assets_custodian_id_fkey",
                format!("User {id} is the custodian of asset {}", asset.id),
            ));
        }
        let before = self.db.users.len();
        self.db.users.retain(|u| u.id != id);
        Ok(self.db.users.len() < before)
    }

    #[instrument(skip(self, request), fields(user_id = %id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let name = request
            .name
            .as_deref()
            .map(|name| required_text(name, "users", "users_name_check", "Name"))
            .transpose()?;

        let user = self.db.users.iter_mut().find(|u| u.id == id).ok_or(DbError::NotFound)?;
        if let Some(name) = name {
            user.name = name;
        }
        if let Some(avatar_url) = &request.avatar_url {
            user.avatar_url = avatar_url.clone();
        }
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed::demo_tables;

    #[test_log::test(tokio::test)]
    async fn test_create_user_defaults_avatar() {
        let mut tables = Tables::default();
        let mut repo = Users::new(&mut tables);

        let user = repo
            .create(&UserCreateDBRequest {
                name: "  Erin Hale ".to_string(),
                avatar_url: None,
            })
            .await
            .unwrap();

        assert!(user.id.starts_with("USER-"));
        assert_eq!(user.name, "Erin Hale");
        assert_eq!(user.avatar_url, DEFAULT_AVATAR_URL);
    }

    #[test_log::test(tokio::test)]
    async fn test_create_user_requires_name() {
        let mut tables = Tables::default();
        let result = Users::new(&mut tables)
            .create(&UserCreateDBRequest {
                name: "   ".to_string(),
                avatar_url: None,
            })
            .await;

        assert!(matches!(result, Err(DbError::CheckViolation { .. })));
    }

    #[test_log::test(tokio::test)]
    async fn test_list_users_with_search() {
        let mut tables = demo_tables(chrono::Utc::now());
        let users = Users::new(&mut tables)
            .list(&UserFilter::new(0, 10).with_search("bob".to_string()))
            .await
            .unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "USER-102");
    }

    #[test_log::test(tokio::test)]
    async fn test_cannot_delete_custodian() {
        let mut tables = demo_tables(chrono::Utc::now());
        let mut repo = Users::new(&mut tables);

        // USER-101 holds ASSET-001 in the demo data
        let result = repo.delete("USER-101".to_string()).await;
        assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));

        assert!(repo.delete("USER-104".to_string()).await.unwrap());
        assert!(!repo.delete("USER-104".to_string()).await.unwrap());
    }

    #[test_log::test(tokio::test)]
    async fn test_update_missing_user() {
        let mut tables = Tables::default();
        let result = Users::new(&mut tables)
            .update("USER-999".to_string(), &UserUpdateDBRequest::default())
            .await;
        assert!(matches!(result, Err(DbError::NotFound)));
    }
}
