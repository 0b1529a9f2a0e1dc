//! Device position for a scan.
//!
//! The scanning device measures its own position and reports it with the scan. A
//! [`PositionSource`] turns that report into a [`Position`] or one of the distinct failure
//! kinds; the caller bounds the wait with [`PositionOptions::timeout`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use utoipa::ToSchema;

/// A position fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in metres, if the device knows it
    #[serde(default)]
    pub accuracy: Option<f64>,
    /// When the fix was taken; absent means "just now"
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// How a position should be acquired. Also handed to clients so they ask their device for the
/// same thing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    /// Longest wait for a fix
    #[serde(with = "humantime_serde")]
    #[schema(value_type = String, example = "10s")]
    pub timeout: Duration,
    /// Oldest cached fix that is acceptable
    #[serde(with = "humantime_serde")]
    #[schema(value_type = String, example = "0s")]
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Failure codes a device can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GeolocationFailure {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Unsupported,
}

/// What the device reported: `{"position": {...}}` or `{"error": "permission_denied"}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GeolocationReport {
    Position(Position),
    Error(GeolocationFailure),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Location permission denied. Please enable location services for this site.")]
    PermissionDenied,

    #[error("Location information is unavailable.")]
    PositionUnavailable,

    #[error("The request to get user location timed out after {0:?}.")]
    Timeout(Duration),

    #[error("Geolocation is not supported by this device.")]
    Unsupported,
}

/// Where positions come from
#[async_trait::async_trait]
pub trait PositionSource: Send + Sync {
    async fn current_position(&self, options: &PositionOptions) -> Result<Position, GeolocationError>;
}

/// A position the device already reported with the request
#[derive(Debug, Clone)]
pub struct ReportedPosition {
    report: Option<GeolocationReport>,
}

impl ReportedPosition {
    /// `None` means the device sent no location at all
    pub fn new(report: Option<GeolocationReport>) -> Self {
        Self { report }
    }
}

fn valid_coordinates(position: &Position) -> bool {
    position.latitude.is_finite()
        && position.longitude.is_finite()
        && (-90.0..=90.0).contains(&position.latitude)
        && (-180.0..=180.0).contains(&position.longitude)
}

#[async_trait::async_trait]
impl PositionSource for ReportedPosition {
    async fn current_position(&self, options: &PositionOptions) -> Result<Position, GeolocationError> {
        let position = match self.report {
            None => return Err(GeolocationError::Unsupported),
            Some(GeolocationReport::Error(failure)) => {
                return Err(match failure {
                    GeolocationFailure::PermissionDenied => GeolocationError::PermissionDenied,
                    GeolocationFailure::PositionUnavailable => GeolocationError::PositionUnavailable,
                    GeolocationFailure::Timeout => GeolocationError::Timeout(options.timeout),
                    GeolocationFailure::Unsupported => GeolocationError::Unsupported,
                });
            }
            Some(GeolocationReport::Position(position)) => position,
        };

        if !valid_coordinates(&position) {
            tracing::debug!(?position, "Device reported coordinates out of range");
            return Err(GeolocationError::PositionUnavailable);
        }

        // A fix may be at most `maximum_age` old when the request started, plus the time the
        // device was allowed to spend getting it.
        if let Some(taken_at) = position.timestamp {
            let age = (Utc::now() - taken_at).to_std().unwrap_or_default();
            if age > options.maximum_age + options.timeout {
                tracing::debug!(?age, "Device reported a stale fix");
                return Err(GeolocationError::PositionUnavailable);
            }
        }

        Ok(position)
    }
}

/// Ask `source` for a position, giving up after `options.timeout`
pub async fn locate(source: &dyn PositionSource, options: &PositionOptions) -> Result<Position, GeolocationError> {
    tokio::time::timeout(options.timeout, source.current_position(options))
        .await
        .unwrap_or(Err(GeolocationError::Timeout(options.timeout)))
}
