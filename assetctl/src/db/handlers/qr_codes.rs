//! Store repository for QR-code batches.
//!
//! Codes are minted in batches and handed out to assets. A code is assigned to at most one
//! asset at a time; releasing it (asset deleted or re-labelled) makes it available again.

use crate::db::{
    Tables,
    errors::{DbError, Result},
    handlers::paginate,
    models::qr_codes::{QrBatchDBResponse, QrCodeDBResponse, QrCodeWithBatch},
};
use crate::types::{AssetId, Entity, QrBatchId, QrCodeId, generate_id};
use chrono::{DateTime, Utc};
use tracing::instrument;

/// Length of the random part of a QR-code identifier
pub const QR_CODE_ID_LEN: usize = 6;

/// Filter for listing individual codes across batches
#[derive(Debug, Clone, Default)]
pub struct QrCodeFilter {
    pub skip: usize,
    pub limit: Option<usize>,
    /// `Some(false)` lists only codes free to hand out
    pub assigned: Option<bool>,
    /// Case-insensitive substring search on the code id
    pub search: Option<String>,
}

pub struct QrCodes<'c> {
    db: &'c mut Tables,
}

impl<'c> QrCodes<'c> {
    pub fn new(db: &'c mut Tables) -> Self {
        Self { db }
    }

    fn code_exists(&self, id: &str) -> bool {
        self.db.qr_batches.iter().flat_map(|b| &b.codes).any(|c| c.id == id)
    }

    fn fresh_code_id(&self) -> QrCodeId {
        loop {
            let id = generate_id(Entity::QrCode, QR_CODE_ID_LEN);
            if !self.code_exists(&id) {
                return id;
            }
        }
    }

    fn code_mut(&mut self, id: &str) -> Option<&mut QrCodeDBResponse> {
        self.db
            .qr_batches
            .iter_mut()
            .flat_map(|b| b.codes.iter_mut())
            .find(|c| c.id == id)
    }

    /// Batches, newest first
    #[instrument(skip(self), err)]
    pub async fn list_batches(&mut self, skip: usize, limit: Option<usize>) -> Result<Vec<QrBatchDBResponse>> {
        let mut batches = self.db.qr_batches.clone();
        batches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(batches, skip, limit))
    }

    #[instrument(skip(self), fields(batch_id = %id), err)]
    pub async fn get_batch(&mut self, id: &QrBatchId) -> Result<Option<QrBatchDBResponse>> {
        Ok(self.db.qr_batches.iter().find(|b| &b.id == id).cloned())
    }

    /// Mint a batch of `quantity` unassigned codes
    #[instrument(skip(self), err)]
    pub async fn create_batch(&mut self, quantity: usize, created_at: DateTime<Utc>) -> Result<QrBatchDBResponse> {
        if quantity == 0 {
            return Err(DbError::check(
                "qr_batches",
                "qr_batches_quantity_check",
                "Quantity must be at least 1",
            ));
        }

        let mut codes: Vec<QrCodeDBResponse> = Vec::with_capacity(quantity);
        while codes.len() < quantity {
            let id = self.fresh_code_id();
            if codes.iter().any(|c| c.id == id) {
                continue;
            }
            codes.push(QrCodeDBResponse { id, assigned_to: None });
        }

        let batch = QrBatchDBResponse {
            id: generate_id(Entity::QrBatch, 7),
            created_at,
            quantity,
            codes,
        };
        self.db.qr_batches.insert(0, batch.clone());
        Ok(batch)
    }

    #[instrument(skip(self), fields(code_id = %id), err)]
    pub async fn get_code(&mut self, id: &QrCodeId) -> Result<Option<QrCodeWithBatch>> {
        Ok(self.db.qr_batches.iter().find_map(|batch| {
            batch.codes.iter().find(|c| &c.id == id).map(|code| QrCodeWithBatch {
                batch_id: batch.id.clone(),
                created_at: batch.created_at,
                code: code.clone(),
            })
        }))
    }

    /// Codes across all batches, newest batch first
    #[instrument(skip(self, filter), fields(assigned = ?filter.assigned), err)]
    pub async fn list_codes(&mut self, filter: &QrCodeFilter) -> Result<Vec<QrCodeWithBatch>> {
        let needle = filter.search.as_ref().map(|s| s.to_lowercase());
        let batches = self.list_batches(0, None).await?;
        let rows = batches
            .into_iter()
            .flat_map(|batch| {
                let (batch_id, created_at) = (batch.id, batch.created_at);
                batch.codes.into_iter().map(move |code| QrCodeWithBatch {
                    batch_id: batch_id.clone(),
                    created_at,
                    code,
                })
            })
            .filter(|c| filter.assigned.is_none_or(|assigned| c.code.assigned_to.is_some() == assigned))
            .filter(|c| needle.as_ref().is_none_or(|n| c.code.id.to_lowercase().contains(n)))
            .collect();
        Ok(paginate(rows, filter.skip, filter.limit))
    }

    /// Mark a code as assigned to an asset
    #[instrument(skip(self), fields(code_id = %id, asset_id = %asset_id), err)]
    pub async fn assign(&mut self, id: &QrCodeId, asset_id: &AssetId) -> Result<()> {
        let code = self.code_mut(id).ok_or_else(|| {
            DbError::foreign_key("assets", "assets_qr_code_id_fkey", format!("QR code {id} does not exist"))
        })?;
        match &code.assigned_to {
            Some(current) if current != asset_id => Err(DbError::UniqueViolation {
                constraint: "assets_qr_code_id_key",
                table: "assets",
                message: format!("QR code {id} is already assigned to {current}"),
                conflicting_value: Some(id.clone()),
            }),
            _ => {
                code.assigned_to = Some(asset_id.clone());
                Ok(())
            }
        }
    }

    /// Make a code available again. Returns false if the code is unknown.
    #[instrument(skip(self), fields(code_id = %id), err)]
    pub async fn release(&mut self, id: &QrCodeId) -> Result<bool> {
        Ok(match self.code_mut(id) {
            Some(code) => {
                code.assigned_to = None;
                true
            }
            None => false,
        })
    }

    /// Hand out a free code to `asset_id`: the first unassigned code in listing order, or a
    /// freshly minted single-code batch when none is left.
    #[instrument(skip(self), fields(asset_id = %asset_id), err)]
    pub async fn allocate_unassigned(&mut self, asset_id: &AssetId, now: DateTime<Utc>) -> Result<QrCodeId> {
        let free = self
            .list_codes(&QrCodeFilter {
                assigned: Some(false),
                limit: Some(1),
                ..Default::default()
            })
            .await?;

        let id = match free.into_iter().next() {
            Some(free) => free.code.id,
            None => {
                tracing::info!("No unassigned QR codes left, minting a new one");
                let batch = self.create_batch(1, now).await?;
                batch.codes[0].id.clone()
            }
        };
        self.assign(&id, asset_id).await?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed::demo_tables;

    #[test_log::test(tokio::test)]
    async fn test_create_batch_mints_unique_codes() {
        let mut tables = Tables::default();
        let batch = QrCodes::new(&mut tables).create_batch(20, Utc::now()).await.unwrap();

        assert_eq!(batch.quantity, 20);
        assert_eq!(batch.codes.len(), 20);
        let mut ids: Vec<_> = batch.codes.iter().map(|c| c.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
        assert!(batch.codes.iter().all(|c| c.id.len() == "QR-".len() + QR_CODE_ID_LEN));
        assert!(batch.codes.iter().all(|c| c.assigned_to.is_none()));
    }

    #[test_log::test(tokio::test)]
    async fn test_zero_quantity_is_rejected() {
        let mut tables = Tables::default();
        let result = QrCodes::new(&mut tables).create_batch(0, Utc::now()).await;
        assert!(matches!(result, Err(DbError::CheckViolation { .. })));
    }

    #[test_log::test(tokio::test)]
    async fn test_allocate_takes_newest_free_code() {
        let mut tables = demo_tables(Utc::now());
        let mut repo = QrCodes::new(&mut tables);

        // BATCH-001 is the newest batch and both of its codes are free
        let id = repo.allocate_unassigned(&"ASSET-900".to_string(), Utc::now()).await.unwrap();
        assert_eq!(id, "QR-1A2B3C");

        let code = repo.get_code(&id).await.unwrap().unwrap();
        assert_eq!(code.batch_id, "BATCH-001");
        assert_eq!(code.code.assigned_to.as_deref(), Some("ASSET-900"));
    }

    #[test_log::test(tokio::test)]
    async fn test_allocate_mints_when_exhausted() {
        let mut tables = Tables::default();
        let mut repo = QrCodes::new(&mut tables);

        let id = repo.allocate_unassigned(&"ASSET-900".to_string(), Utc::now()).await.unwrap();
        assert!(id.starts_with("QR-"));
        assert_eq!(repo.list_batches(0, None).await.unwrap().len(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_code_assigned_to_one_asset_only() {
        let mut tables = demo_tables(Utc::now());
        let mut repo = QrCodes::new(&mut tables);

        let taken = "QR-T4U5V6".to_string();
        let result = repo.assign(&taken, &"ASSET-900".to_string()).await;
        assert!(matches!(result, Err(DbError::UniqueViolation { .. })));

        assert!(repo.release(&taken).await.unwrap());
        repo.assign(&taken, &"ASSET-900".to_string()).await.unwrap();
    }

    #[test_log::test(tokio::test)]
    async fn test_list_unassigned_codes() {
        let mut tables = demo_tables(Utc::now());
        let free = QrCodes::new(&mut tables)
            .list_codes(&QrCodeFilter {
                assigned: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(free.len(), 10);
        assert!(free.iter().all(|c| c.code.assigned_to.is_none()));
    }
}
