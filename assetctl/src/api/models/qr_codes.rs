//! API models for QR-code batches and codes.

use super::pagination::Pagination;
use crate::db::models::qr_codes::{QrBatchDBResponse, QrCodeDBResponse, QrCodeWithBatch};
use crate::types::{AssetId, QrBatchId, QrCodeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

#[serde_as]
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListQrCodesQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Only codes that are (or are not) attached to an asset
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub assigned: Option<bool>,
    /// Case-insensitive substring match on the code
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BatchCreate {
    /// Number of codes to mint (default from configuration)
    #[schema(example = 20, minimum = 1)]
    pub quantity: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QrCodeEntry {
    #[schema(example = "QR-1A2B3C")]
    pub id: QrCodeId,
    pub assigned_to: Option<AssetId>,
}

impl From<QrCodeDBResponse> for QrCodeEntry {
    fn from(db: QrCodeDBResponse) -> Self {
        Self {
            id: db.id,
            assigned_to: db.assigned_to,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QrBatchResponse {
    #[schema(example = "BATCH-001")]
    pub id: QrBatchId,
    pub created_at: DateTime<Utc>,
    pub quantity: usize,
    /// Codes already attached to an asset
    pub assigned_count: usize,
    pub codes: Vec<QrCodeEntry>,
}

impl From<QrBatchDBResponse> for QrBatchResponse {
    fn from(db: QrBatchDBResponse) -> Self {
        Self {
            id: db.id,
            created_at: db.created_at,
            quantity: db.quantity,
            assigned_count: db.codes.iter().filter(|c| c.assigned_to.is_some()).count(),
            codes: db.codes.into_iter().map(Into::into).collect(),
        }
    }
}

/// A single code, with the link to print on its label
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QrCodeResponse {
    #[schema(example = "QR-1A2B3C")]
    pub id: QrCodeId,
    pub batch_id: QrBatchId,
    pub created_at: DateTime<Utc>,
    pub assigned_to: Option<AssetId>,
    /// Present when a public URL is configured
    #[schema(example = "https://assets.example.com/scan?id=QR-1A2B3C")]
    pub scan_url: Option<String>,
}

impl QrCodeResponse {
    pub fn new(db: QrCodeWithBatch, scan_url: Option<String>) -> Self {
        Self {
            id: db.code.id,
            batch_id: db.batch_id,
            created_at: db.created_at,
            assigned_to: db.code.assigned_to,
            scan_url,
        }
    }
}
