//! HTTP request handlers for the management API.
//!
//! Handlers are grouped by resource. Each one opens a store transaction, delegates to the
//! repositories in [`crate::db::handlers`] and converts the records into API models.
//!
//! - [`assets`]: Asset registry, custody, booking membership and location refresh
//! - [`bookings`]: Booking lifecycle
//! - [`calendar`]: Month view and stateless track layout
//! - [`categories`], [`locations`], [`users`]: Reference data
//! - [`dashboard`]: Summary counts
//! - [`qr_codes`]: QR-code batches and codes
//! - [`scan`]: Scan submission

pub mod assets;
pub mod bookings;
pub mod calendar;
pub mod categories;
pub mod dashboard;
pub mod locations;
pub mod qr_codes;
pub mod scan;
pub mod users;
