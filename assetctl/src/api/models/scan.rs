//! API models for scanning.

use super::assets::AssetResponse;
use crate::scan::ScanOutcome;
use crate::scan::geolocation::GeolocationReport;
use crate::types::{AssetId, QrCodeId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A scan event from a scanning device
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScanSubmission {
    /// Decoded content of the QR code
    #[schema(example = "https://assets.example.com/scan?id=QR-T4U5V6")]
    pub payload: String,
    /// What the device's geolocation produced; omit if the device has none
    pub location: Option<GeolocationReport>,
}

/// What came of a scan attempt
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScanResponse {
    /// The asset's location was updated
    Updated { asset: AssetResponse },
    /// The code is valid but not attached to an asset yet
    Unassigned { code: QrCodeId, message: String },
    /// The attempt was dismissed before it finished; nothing changed
    Discarded { asset_id: AssetId },
    /// A newer scan was recorded meanwhile; nothing changed
    Superseded { asset: AssetResponse },
}

impl From<ScanOutcome> for ScanResponse {
    fn from(outcome: ScanOutcome) -> Self {
        match outcome {
            ScanOutcome::Updated { asset } => ScanResponse::Updated { asset: asset.into() },
            ScanOutcome::Unassigned { code } => ScanResponse::Unassigned {
                message: format!("QR code {code} is not assigned to any asset yet."),
                code,
            },
            ScanOutcome::Discarded { asset_id } => ScanResponse::Discarded { asset_id },
            ScanOutcome::Superseded { asset } => ScanResponse::Superseded { asset: asset.into() },
        }
    }
}
