//! Stored record types and repository request types.
//!
//! Each entity has `*CreateDBRequest` / `*UpdateDBRequest` types consumed by its repository,
//! and a `*DBResponse` type which is also the row kept in [`crate::db::Tables`].

pub mod assets;
pub mod bookings;
pub mod categories;
pub mod locations;
pub mod qr_codes;
pub mod users;
