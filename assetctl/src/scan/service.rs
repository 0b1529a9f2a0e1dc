//! Scan reconciliation: from a scanned payload to an updated asset location.
//!
//! A scan attempt runs in three steps:
//!
//! 1. parse the payload and resolve it to an asset (short transaction),
//! 2. get a position and reverse-geocode it (no lock held),
//! 3. record the result (second transaction).
//!
//! Every failure is terminal for the attempt and leaves the asset untouched. If the attempt is
//! cancelled while step 2 is in flight, or another scan of the same asset lands first, the
//! result is dropped.

use super::device::classify_user_agent;
use super::geocoding::{GeocodeError, ReverseGeocoder, address_label};
use super::geolocation::{GeolocationError, GeolocationReport, PositionOptions, ReportedPosition, locate};
use super::payload::{PayloadError, ScanTarget, parse_scan_payload};
use crate::db::errors::DbError;
use crate::db::handlers::{Assets, Repository};
use crate::db::models::assets::{AssetDBResponse, GeoLocation, ScanDetails, ScanUpdateDBRequest};
use crate::db::Store;
use crate::types::{AssetId, QrCodeId};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use url::Url;

/// Recorded as the scan source when a QR code was scanned
pub const SOURCE_QR_SCAN: &str = "QR Code Scan";
/// Recorded as the scan source for an explicit location refresh
pub const SOURCE_GPS_UPDATE: &str = "GPS Update";

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    InvalidCode(#[from] PayloadError),

    #[error("Asset {0} not found")]
    AssetNotFound(AssetId),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    #[error(transparent)]
    Geocoding(#[from] GeocodeError),

    #[error(transparent)]
    Database(#[from] DbError),
}

/// A scan event as reported by the scanning device
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Decoded content of the QR code
    pub payload: String,
    pub user_agent: Option<String>,
    /// What the device's geolocation produced; `None` if it has none
    pub location: Option<GeolocationReport>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// Location, last scan and scan details were recorded
    Updated { asset: AssetDBResponse },
    /// The code exists on a label but is not attached to any asset yet
    Unassigned { code: QrCodeId },
    /// The attempt was cancelled before its result could be recorded
    Discarded { asset_id: AssetId },
    /// A newer scan of the asset was recorded while this one was in flight
    Superseded { asset: AssetDBResponse },
}

#[derive(Clone)]
pub struct ScanService {
    store: Store,
    geocoder: Arc<dyn ReverseGeocoder>,
    options: PositionOptions,
    public_url: Option<Url>,
}

impl ScanService {
    pub fn new(store: Store, geocoder: Arc<dyn ReverseGeocoder>, options: PositionOptions, public_url: Option<Url>) -> Self {
        Self {
            store,
            geocoder,
            options,
            public_url,
        }
    }

    /// Options the scanning device should use when asking for a position
    pub fn position_options(&self) -> &PositionOptions {
        &self.options
    }

    /// Handle a scanned QR code
    #[instrument(skip(self, request, cancel), err)]
    pub async fn scan(&self, request: ScanRequest, cancel: CancellationToken) -> Result<ScanOutcome, ScanError> {
        // Nothing is looked up for payloads that aren't ours
        let target = parse_scan_payload(&request.payload, self.public_url.as_ref())?;

        let asset = {
            let mut tx = self.store.begin().await;
            let mut assets = Assets::new(&mut tx);
            match target {
                ScanTarget::QrCode(code) => match assets.get_by_qr_code(&code).await? {
                    Some(asset) => asset,
                    None => {
                        info!(code = %code, "Scanned code is not assigned to an asset");
                        return Ok(ScanOutcome::Unassigned { code });
                    }
                },
                ScanTarget::Asset(id) => assets
                    .get_by_id(id.clone())
                    .await?
                    .ok_or(ScanError::AssetNotFound(id))?,
            }
        };

        self.reconcile(&asset.id, request.location, request.user_agent.as_deref(), SOURCE_QR_SCAN, cancel)
            .await
    }

    /// Refresh the location of a known asset from the device's position
    #[instrument(skip(self, report, user_agent, cancel), fields(asset_id = %asset_id), err)]
    pub async fn refresh_location(
        &self,
        asset_id: &AssetId,
        report: Option<GeolocationReport>,
        user_agent: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<ScanOutcome, ScanError> {
        {
            let mut tx = self.store.begin().await;
            if Assets::new(&mut tx).get_by_id(asset_id.clone()).await?.is_none() {
                return Err(ScanError::AssetNotFound(asset_id.clone()));
            }
        }

        self.reconcile(asset_id, report, user_agent, SOURCE_GPS_UPDATE, cancel).await
    }

    async fn reconcile(
        &self,
        asset_id: &AssetId,
        report: Option<GeolocationReport>,
        user_agent: Option<&str>,
        source: &str,
        cancel: CancellationToken,
    ) -> Result<ScanOutcome, ScanError> {
        let started_at = Utc::now();

        let location = match self.resolve_location(report).await {
            Ok(location) => location,
            Err(e) if cancel.is_cancelled() => {
                debug!(error = %e, "Dropping failure of a cancelled scan attempt");
                return Ok(ScanOutcome::Discarded {
                    asset_id: asset_id.clone(),
                });
            }
            Err(e) => return Err(e),
        };

        let device = classify_user_agent(user_agent);
        let details = ScanDetails {
            device: device.device,
            browser: device.browser,
            os: device.os,
            source: source.to_string(),
        };

        self.record(asset_id, location, details, started_at, &cancel).await
    }

    async fn resolve_location(&self, report: Option<GeolocationReport>) -> Result<GeoLocation, ScanError> {
        let position = locate(&ReportedPosition::new(report), &self.options).await?;
        let place = self.geocoder.reverse(position.latitude, position.longitude).await?;
        Ok(GeoLocation {
            latitude: position.latitude,
            longitude: position.longitude,
            address: address_label(&place, position.latitude, position.longitude),
        })
    }

    async fn record(
        &self,
        asset_id: &AssetId,
        location: GeoLocation,
        details: ScanDetails,
        started_at: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<ScanOutcome, ScanError> {
        let mut tx = self.store.begin().await;

        if cancel.is_cancelled() {
            debug!(asset_id = %asset_id, "Scan attempt was cancelled, discarding result");
            return Ok(ScanOutcome::Discarded {
                asset_id: asset_id.clone(),
            });
        }

        let mut assets = Assets::new(&mut tx);
        let current = assets
            .get_by_id(asset_id.clone())
            .await?
            .ok_or_else(|| ScanError::AssetNotFound(asset_id.clone()))?;
        if current.last_scan > started_at {
            debug!(asset_id = %asset_id, last_scan = %current.last_scan, "A newer scan was recorded meanwhile");
            return Ok(ScanOutcome::Superseded { asset: current });
        }

        let update = ScanUpdateDBRequest {
            location,
            scanned_at: Utc::now(),
            details,
        };
        let asset = assets.record_scan(asset_id, &update).await?;
        tx.commit();

        info!(asset_id = %asset.id, address = %asset.location.address, "Recorded asset location");
        Ok(ScanOutcome::Updated { asset })
    }
}
