//! Data layer: the in-memory store and its repositories.
//!
//! All state lives in a single owned [`Store`]. Nothing outside this module touches the
//! tables directly; handlers and the scan flow go through repositories opened on a
//! [`Transaction`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers, scan service)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - validation & queries)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - stored records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │    Store    │  (tables behind an async lock)
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations for CRUD operations
//! - [`models`]: Stored record structures
//! - [`errors`]: Store-specific error types
//! - [`seed`]: Demo data loaded at startup
//!
//! # Transactions
//!
//! [`Store::begin`] takes the write lock and hands out a private working copy of the
//! tables. Changes become visible to other requests only on [`Transaction::commit`];
//! dropping the transaction discards them.
//!
//! ```ignore
//! use assetctl::db::handlers::{Categories, Repository};
//!
//! let mut tx = store.begin().await;
//! let mut repo = Categories::new(&mut tx);
//! let category = repo.create(&request).await?;
//! tx.commit();
//! ```

pub mod errors;
pub mod handlers;
pub mod models;
pub mod seed;

use models::{
    assets::AssetDBResponse, bookings::BookingDBResponse, categories::CategoryDBResponse,
    locations::LocationDBResponse, qr_codes::QrBatchDBResponse, users::UserDBResponse,
};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockWriteGuard};

/// The tables of the store. Rows keep their listing order.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub(crate) assets: Vec<AssetDBResponse>,
    pub(crate) bookings: Vec<BookingDBResponse>,
    pub(crate) categories: Vec<CategoryDBResponse>,
    pub(crate) locations: Vec<LocationDBResponse>,
    pub(crate) users: Vec<UserDBResponse>,
    pub(crate) qr_batches: Vec<QrBatchDBResponse>,
}

/// Single owned store shared by all request handlers.
#[derive(Debug, Clone, Default)]
pub struct Store {
    tables: Arc<RwLock<Tables>>,
}

impl Store {
    pub fn new(tables: Tables) -> Self {
        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    /// Open a transaction. Writers are serialized; the lock is held until the transaction is
    /// committed or dropped.
    pub async fn begin(&self) -> Transaction<'_> {
        let guard = self.tables.write().await;
        let working = guard.clone();
        Transaction { guard, working }
    }
}

/// A unit of work over the store's tables.
pub struct Transaction<'a> {
    guard: RwLockWriteGuard<'a, Tables>,
    working: Tables,
}

impl Transaction<'_> {
    /// Publish the working copy.
    pub fn commit(mut self) {
        *self.guard = std::mem::take(&mut self.working);
    }
}

impl Deref for Transaction<'_> {
    type Target = Tables;

    fn deref(&self) -> &Self::Target {
        &self.working
    }
}

impl DerefMut for Transaction<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.working
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::{Repository, Users};
    use crate::db::models::users::UserCreateDBRequest;

    fn request(name: &str) -> UserCreateDBRequest {
        UserCreateDBRequest {
            name: name.to_string(),
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn test_commit_publishes_changes() {
        let store = Store::default();

        let mut tx = store.begin().await;
        Users::new(&mut tx).create(&request("Alice Johnson")).await.unwrap();
        tx.commit();

        let mut tx = store.begin().await;
        assert_eq!(tx.users.len(), 1);
        assert_eq!(Users::new(&mut tx).list(&Default::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let store = Store::default();

        {
            let mut tx = store.begin().await;
            Users::new(&mut tx).create(&request("Bob Williams")).await.unwrap();
        }

        let tx = store.begin().await;
        assert!(tx.users.is_empty());
    }
}
