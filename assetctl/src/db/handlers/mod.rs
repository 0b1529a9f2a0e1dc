//! Repository implementations for store access.
//!
//! This module provides repository structs for each entity in the system.
//! Repositories follow a consistent pattern and implement the [`Repository`] trait.
//!
//! # Design Pattern
//!
//! Each repository:
//! - Wraps the tables of an open [`crate::db::Transaction`]
//! - Provides strongly-typed CRUD operations
//! - Enforces constraints (required fields, references between tables)
//! - Returns records from [`crate::db::models`]
//!
//! # Available Repositories
//!
//! - [`Assets`]: Asset registry, custody and scan updates
//! - [`Bookings`]: Booking lifecycle and asset membership
//! - [`Categories`]: Asset categories
//! - [`Locations`]: Named locations assets are assigned to
//! - [`Users`]: Custodians
//! - [`QrCodes`]: QR-code batches and assignments (not a [`Repository`])
//!
//! # Common Pattern
//!
//! ```ignore
//! use assetctl::db::handlers::{Assets, Repository};
//!
//! let mut tx = store.begin().await;
//! let mut repo = Assets::new(&mut tx);
//! let assets = repo.list(&AssetFilter::default()).await?;
//! tx.commit();
//! ```

pub mod assets;
pub mod bookings;
pub mod categories;
pub mod locations;
pub mod qr_codes;
pub mod repository;
pub mod users;

pub use assets::Assets;
pub use bookings::Bookings;
pub use categories::Categories;
pub use locations::Locations;
pub use qr_codes::QrCodes;
pub use repository::Repository;
pub use users::Users;

/// Apply skip/limit to an already filtered listing
pub(crate) fn paginate<T>(rows: Vec<T>, skip: usize, limit: Option<usize>) -> Vec<T> {
    let rows = rows.into_iter().skip(skip);
    match limit {
        Some(limit) => rows.take(limit).collect(),
        None => rows.collect(),
    }
}

/// Trim a required text field, failing the named check constraint when nothing is left
pub(crate) fn required_text(
    value: &str,
    table: &'static str,
    constraint: &'static str,
    field: &str,
) -> crate::db::errors::Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::db::errors::DbError::check(table, constraint, format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
