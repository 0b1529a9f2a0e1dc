//! API request and response data models.
//!
//! These are the public JSON contract of the management API, kept separate from the store
//! models in [`crate::db::models`] so that either can change on its own. All models derive
//! `utoipa::ToSchema` for the OpenAPI document.
//!
//! - [`assets`]: assets, custody and location refresh
//! - [`bookings`]: bookings and their resolved assets
//! - [`calendar`]: month view queries and stateless track layout
//! - [`categories`], [`locations`], [`users`]: reference data
//! - [`qr_codes`]: QR-code batches and single codes
//! - [`scan`]: scan submissions and outcomes
//! - [`dashboard`]: summary counts
//! - [`pagination`]: shared `skip`/`limit` handling

pub mod assets;
pub mod bookings;
pub mod calendar;
pub mod categories;
pub mod dashboard;
pub mod locations;
pub mod pagination;
pub mod qr_codes;
pub mod scan;
pub mod users;
