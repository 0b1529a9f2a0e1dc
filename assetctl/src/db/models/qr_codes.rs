//! Store models for QR-code batches.

use crate::types::{AssetId, QrBatchId, QrCodeId};
use chrono::{DateTime, Utc};

/// Stored QR code
#[derive(Debug, Clone, PartialEq)]
pub struct QrCodeDBResponse {
    pub id: QrCodeId,
    pub assigned_to: Option<AssetId>,
}

/// Stored batch of QR codes, generated together
#[derive(Debug, Clone, PartialEq)]
pub struct QrBatchDBResponse {
    pub id: QrBatchId,
    pub created_at: DateTime<Utc>,
    pub quantity: usize,
    pub codes: Vec<QrCodeDBResponse>,
}

/// A code together with the batch it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct QrCodeWithBatch {
    pub batch_id: QrBatchId,
    pub created_at: DateTime<Utc>,
    pub code: QrCodeDBResponse,
}
