//! Common type definitions shared by the store, the API and the scan flow.
//!
//! # ID Types
//!
//! Entity IDs are human-readable strings carrying an entity prefix, e.g. `ASSET-001` or
//! `CAT-7QK2M9X`. Seed data uses sequential suffixes; records created at runtime get a random
//! suffix from [`generate_id`].
//!
//! - [`AssetId`]: Asset identifier (`ASSET-`)
//! - [`BookingId`]: Booking identifier (`BOOK-`)
//! - [`CategoryId`]: Category identifier (`CAT-`)
//! - [`LocationId`]: Location identifier (`LOC-`)
//! - [`UserId`]: User (custodian) identifier (`USER-`)
//! - [`QrBatchId`]: QR-code batch identifier (`BATCH-`)
//! - [`QrCodeId`]: QR-code identifier (`QR-`)

use rand::prelude::RngExt;
use rand::rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

// Type aliases for IDs
pub type AssetId = String;
pub type BookingId = String;
pub type CategoryId = String;
pub type LocationId = String;
pub type UserId = String;
pub type QrBatchId = String;
pub type QrCodeId = String;

const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Entity kinds, used for ID prefixes and in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Asset,
    Booking,
    Category,
    Location,
    User,
    QrBatch,
    QrCode,
}

impl Entity {
    pub fn prefix(self) -> &'static str {
        match self {
            Entity::Asset => "ASSET",
            Entity::Booking => "BOOK",
            Entity::Category => "CAT",
            Entity::Location => "LOC",
            Entity::User => "USER",
            Entity::QrBatch => "BATCH",
            Entity::QrCode => "QR",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Asset => "Asset",
            Entity::Booking => "Booking",
            Entity::Category => "Category",
            Entity::Location => "Location",
            Entity::User => "User",
            Entity::QrBatch => "QR batch",
            Entity::QrCode => "QR code",
        };
        f.write_str(name)
    }
}

/// Generate a new identifier: entity prefix, a dash, and `len` random uppercase alphanumerics.
pub fn generate_id(entity: Entity, len: usize) -> String {
    let mut rng = rng();
    let suffix: String = (0..len)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}", entity.prefix(), suffix)
}

/// Lifecycle state of a physical asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Available,
    CheckedOut,
    InRepair,
    Booked,
}

impl AssetStatus {
    pub const ALL: [AssetStatus; 4] = [
        AssetStatus::Available,
        AssetStatus::CheckedOut,
        AssetStatus::InRepair,
        AssetStatus::Booked,
    ];
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AssetStatus::Available => "Available",
            AssetStatus::CheckedOut => "Checked Out",
            AssetStatus::InRepair => "In Repair",
            AssetStatus::Booked => "Booked",
        };
        f.write_str(label)
    }
}

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Upcoming,
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Whether bookings in this state take part in the calendar layout.
    pub fn is_calendar_eligible(self) -> bool {
        matches!(self, BookingStatus::Upcoming | BookingStatus::Active)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BookingStatus::Upcoming => "Upcoming",
            BookingStatus::Active => "Active",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_shape() {
        let id = generate_id(Entity::Category, 7);
        assert!(id.starts_with("CAT-"));
        let suffix = &id["CAT-".len()..];
        assert_eq!(suffix.len(), 7);
        assert!(suffix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_only_upcoming_and_active_are_eligible() {
        assert!(BookingStatus::Upcoming.is_calendar_eligible());
        assert!(BookingStatus::Active.is_calendar_eligible());
        assert!(!BookingStatus::Completed.is_calendar_eligible());
        assert!(!BookingStatus::Cancelled.is_calendar_eligible());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_string(&AssetStatus::CheckedOut).unwrap(), "\"checked_out\"");
        assert_eq!(AssetStatus::CheckedOut.to_string(), "Checked Out");
    }
}
