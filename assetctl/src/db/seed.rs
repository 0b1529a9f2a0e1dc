//! Demo data loaded into the store at startup when `seed_demo_data` is enabled.
//!
//! The two live bookings are placed relative to the startup time so that the calendar and the
//! bookings views always have something upcoming and something active to show.

use crate::db::Tables;
use crate::db::models::{
    assets::{AssetDBResponse, GeoLocation, ScanDetails},
    bookings::BookingDBResponse,
    categories::CategoryDBResponse,
    locations::LocationDBResponse,
    qr_codes::{QrBatchDBResponse, QrCodeDBResponse},
    users::UserDBResponse,
};
use crate::types::{AssetStatus, BookingStatus};
use chrono::{DateTime, Duration, TimeZone, Utc};

const AVATAR: &str = "https://placehold.co/100x100.png";

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn user(id: &str, name: &str) -> UserDBResponse {
    UserDBResponse {
        id: id.to_string(),
        name: name.to_string(),
        avatar_url: AVATAR.to_string(),
    }
}

fn category(id: &str, name: &str, description: &str, color: &str) -> CategoryDBResponse {
    CategoryDBResponse {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        color: color.to_string(),
    }
}

fn location(id: &str, name: &str, address: &str, description: &str) -> LocationDBResponse {
    LocationDBResponse {
        id: id.to_string(),
        name: name.to_string(),
        address: Some(address.to_string()),
        description: Some(description.to_string()),
    }
}

fn details(device: &str, browser: &str, os: &str, source: &str) -> Option<ScanDetails> {
    Some(ScanDetails {
        device: device.to_string(),
        browser: browser.to_string(),
        os: os.to_string(),
        source: source.to_string(),
    })
}

#[allow(clippy::too_many_arguments)]
fn asset(
    id: &str,
    name: &str,
    description: &str,
    qr_code_id: &str,
    status: AssetStatus,
    category_id: &str,
    assigned_location: &str,
    custodian_id: Option<&str>,
    (latitude, longitude): (f64, f64),
    last_scan: DateTime<Utc>,
    scan_details: Option<ScanDetails>,
    is_bookable: bool,
) -> AssetDBResponse {
    AssetDBResponse {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        qr_code_id: qr_code_id.to_string(),
        status,
        category_id: Some(category_id.to_string()),
        assigned_location: assigned_location.to_string(),
        custodian_id: custodian_id.map(str::to_string),
        location: GeoLocation {
            latitude,
            longitude,
            address: assigned_location.to_string(),
        },
        last_scan,
        scan_details,
        is_bookable,
    }
}

fn booking(
    id: &str,
    purpose: &str,
    asset_ids: &[&str],
    booked_by: &str,
    (start_date, end_date): (DateTime<Utc>, DateTime<Utc>),
    status: BookingStatus,
    notes: Option<&str>,
) -> BookingDBResponse {
    BookingDBResponse {
        id: id.to_string(),
        purpose: purpose.to_string(),
        asset_ids: asset_ids.iter().map(|a| a.to_string()).collect(),
        booked_by: booked_by.to_string(),
        start_date,
        end_date,
        status,
        notes: notes.map(str::to_string),
    }
}

fn batch(id: &str, created_at: DateTime<Utc>, codes: &[(&str, Option<&str>)]) -> QrBatchDBResponse {
    QrBatchDBResponse {
        id: id.to_string(),
        created_at,
        quantity: codes.len(),
        codes: codes
            .iter()
            .map(|(code, assigned_to)| QrCodeDBResponse {
                id: code.to_string(),
                assigned_to: assigned_to.map(str::to_string),
            })
            .collect(),
    }
}

/// Build the demo tables. Live bookings are placed around `now`.
pub fn demo_tables(now: DateTime<Utc>) -> Tables {
    let users = vec![
        user("USER-101", "Alice Johnson"),
        user("USER-102", "Bob Williams"),
        user("USER-103", "Charlie Brown"),
        user("USER-104", "Diana Prince"),
    ];

    let categories = vec![
        category("CAT-001", "Electronics", "Laptops, monitors, and peripherals.", "#3b82f6"),
        category("CAT-002", "Furniture", "Desks, chairs, and office furniture.", "#a855f7"),
        category("CAT-003", "Vehicles", "Company cars, vans, and trucks.", "#f97316"),
        category("CAT-004", "Equipment", "Specialized tools and machinery.", "#ef4444"),
    ];

    let assets = vec![
        asset(
            "ASSET-001",
            "MacBook Pro 16\"",
            "M2 Max, 64GB RAM, 2TB SSD. For engineering team.",
            "QR-T4U5V6",
            AssetStatus::CheckedOut,
            "CAT-001",
            "Floor 5, Desk 21, Los Angeles Office",
            Some("USER-101"),
            (34.052235, -118.243683),
            at(2023, 10, 26, 10, 0),
            details("Desktop", "Chrome", "macOS", "Manual Entry"),
            true,
        ),
        asset(
            "ASSET-002",
            "Dell 4K Monitor",
            "U2723QE 27-inch 4K UHD. For design team.",
            "QR-Q1R2S3",
            AssetStatus::Available,
            "CAT-001",
            "Storage Room B, New York Office",
            None,
            (40.712776, -74.005974),
            at(2023, 9, 15, 14, 30),
            details("Desktop", "Firefox", "Windows", "Initial Import"),
            true,
        ),
        asset(
            "ASSET-003",
            "Sony A7 IV Camera",
            "Full-frame mirrorless camera with 24-70mm f/2.8 lens.",
            "QR-G7H8I0",
            AssetStatus::Booked,
            "CAT-004",
            "Marketing Dept, London Office",
            None,
            (51.507351, -0.127758),
            at(2023, 10, 20, 9, 0),
            details("Mobile", "Safari", "iOS", "QR Code Scan"),
            true,
        ),
        asset(
            "ASSET-004",
            "Conference Projector",
            "Epson Pro EX9240 for meeting rooms.",
            "QR-Q1R2S4",
            AssetStatus::InRepair,
            "CAT-004",
            "IT Department, Tokyo Office",
            None,
            (35.689487, 139.691711),
            at(2023, 10, 22, 11, 20),
            details("Desktop", "Edge", "Windows", "Manual Entry"),
            false,
        ),
        asset(
            "ASSET-005",
            "Company Van",
            "Ford Transit for logistics and deliveries.",
            "QR-G1H2I3",
            AssetStatus::Available,
            "CAT-003",
            "Parking Garage, Level 2, Sydney Office",
            None,
            (-33.868820, 151.209290),
            at(2023, 10, 25, 18, 5),
            details("Mobile", "Chrome", "Android", "QR Code Scan"),
            true,
        ),
    ];

    let bookings = vec![
        booking(
            "BOOK-001",
            "Product Launch Photoshoot",
            &["ASSET-003"],
            "Marketing Team",
            (now + Duration::days(2), now + Duration::days(5)),
            BookingStatus::Upcoming,
            Some("For the upcoming product launch photoshoot."),
        ),
        booking(
            "BOOK-002",
            "Engineering Project",
            &["ASSET-001"],
            "Alice Johnson",
            (now - Duration::days(3), now + Duration::days(4)),
            BookingStatus::Active,
            None,
        ),
        booking(
            "BOOK-003",
            "Internal Tech Fair",
            &["ASSET-004", "ASSET-002"],
            "IT Support",
            (at(2023, 10, 10, 9, 0), at(2023, 10, 12, 17, 0)),
            BookingStatus::Completed,
            Some("Internal tech fair setup."),
        ),
        booking(
            "BOOK-004",
            "Logistics Delivery",
            &["ASSET-005"],
            "Logistics Dept",
            (at(2023, 9, 1, 8, 0), at(2023, 9, 5, 18, 0)),
            BookingStatus::Completed,
            None,
        ),
        booking(
            "BOOK-005",
            "Cancelled Project",
            &["ASSET-002"],
            "Alex Smith",
            (at(2023, 8, 15, 9, 0), at(2023, 8, 16, 17, 0)),
            BookingStatus::Cancelled,
            Some("Project requirements changed."),
        ),
    ];

    let locations = vec![
        location(
            "LOC-001",
            "Floor 5, Desk 21, Los Angeles Office",
            "123 Main St, Los Angeles, CA 90012",
            "Primary engineering workspace.",
        ),
        location(
            "LOC-002",
            "Storage Room B, New York Office",
            "456 Market St, New York, NY 10004",
            "Used for storing spare monitors and peripherals.",
        ),
        location(
            "LOC-003",
            "Marketing Dept, London Office",
            "789 High St, London, WC2N 5DU",
            "Hot-desking area for the marketing team.",
        ),
        location(
            "LOC-004",
            "IT Department, Tokyo Office",
            "1-1-2 Otemachi, Chiyoda-ku, Tokyo 100-8111",
            "IT support and repair center.",
        ),
        location(
            "LOC-005",
            "Parking Garage, Level 2, Sydney Office",
            "222 George St, Sydney NSW 2000",
            "Designated parking for company vehicles.",
        ),
    ];

    let qr_batches = vec![
        batch("BATCH-001", at(2023, 11, 6, 14, 0), &[("QR-1A2B3C", None), ("QR-4D5E6F", None)]),
        batch("BATCH-002", at(2023, 11, 5, 13, 0), &[("QR-T4U5V7", None), ("QR-X7Y8Z9", None)]),
        batch(
            "BATCH-003",
            at(2023, 11, 4, 12, 0),
            &[("QR-M4N5P7", None), ("QR-Q1R2S4", Some("ASSET-004"))],
        ),
        batch(
            "BATCH-004",
            at(2023, 11, 3, 11, 0),
            &[("QR-G7H8I0", Some("ASSET-003")), ("QR-J1K2L4", None)],
        ),
        batch("BATCH-005", at(2023, 11, 2, 10, 0), &[("QR-A1B2C4", None), ("QR-D4E5F7", None)]),
        batch(
            "BATCH-006",
            at(2023, 11, 1, 10, 0),
            &[("QR-G1H2I3", Some("ASSET-005")), ("QR-J4K5L6", None), ("QR-M7N8P9", None)],
        ),
        batch(
            "BATCH-007",
            at(2023, 10, 31, 15, 20),
            &[("QR-Q1R2S3", Some("ASSET-002")), ("QR-T4U5V6", Some("ASSET-001"))],
        ),
    ];

    Tables {
        assets,
        bookings,
        categories,
        locations,
        users,
        qr_batches,
    }
}
