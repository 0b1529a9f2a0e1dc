//! Store models for users (custodians).

use crate::api::models::users::{UserCreate, UserUpdate};
use crate::types::UserId;

/// Request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub name: String,
    pub avatar_url: Option<String>,
}

impl From<UserCreate> for UserCreateDBRequest {
    fn from(api: UserCreate) -> Self {
        Self {
            name: api.name,
            avatar_url: api.avatar_url,
        }
    }
}

/// Request for updating a user
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<UserUpdate> for UserUpdateDBRequest {
    fn from(api: UserUpdate) -> Self {
        Self {
            name: api.name,
            avatar_url: api.avatar_url,
        }
    }
}

/// Stored user
#[derive(Debug, Clone, PartialEq)]
pub struct UserDBResponse {
    pub id: UserId,
    pub name: String,
    pub avatar_url: String,
}
