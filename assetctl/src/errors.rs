use crate::db::errors::DbError;
use crate::scan::geocoding::GeocodeError;
use crate::scan::geolocation::GeolocationError;
use crate::scan::ScanError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Store operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Scan or location refresh failed
    #[error(transparent)]
    Scan(#[from] ScanError),

}

fn db_status(db_err: &DbError) -> StatusCode {
    match db_err {
        DbError::NotFound => StatusCode::NOT_FOUND,
        DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
        DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
        DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
        DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn db_message(db_err: &DbError) -> String {
    match db_err {
        DbError::NotFound => "Resource not found".to_string(),
        DbError::UniqueViolation { message, .. }
        | DbError::ForeignKeyViolation { message, .. }
        | DbError::CheckViolation { message, .. } => message.clone(),
        DbError::Other(_) => "Store error occurred".to_string(),
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => db_status(db_err),
            Error::Scan(scan_err) => match scan_err {
                ScanError::InvalidCode(_) => StatusCode::BAD_REQUEST,
                ScanError::AssetNotFound(_) => StatusCode::NOT_FOUND,
                ScanError::Geolocation(GeolocationError::PermissionDenied) => StatusCode::FORBIDDEN,
                ScanError::Geolocation(GeolocationError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
                ScanError::Geolocation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ScanError::Geocoding(GeocodeError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
                ScanError::Geocoding(GeocodeError::Client(_)) => StatusCode::INTERNAL_SERVER_ERROR,
                ScanError::Geocoding(_) => StatusCode::BAD_GATEWAY,
                ScanError::Database(db_err) => db_status(db_err),
            },
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { resource, id } => {
                format!("{resource} with ID {id} not found")
            }
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Database(db_err) => db_message(db_err),
            Error::Scan(scan_err) => match scan_err {
                ScanError::InvalidCode(_) => "Invalid QR code. Please scan a valid asset QR code.".to_string(),
                ScanError::AssetNotFound(id) => format!("Asset with ID {id} not found"),
                ScanError::Geolocation(e) => e.to_string(),
                ScanError::Geocoding(GeocodeError::Client(_)) => "Internal server error".to_string(),
                ScanError::Geocoding(_) => "Could not resolve an address for this position. The location was not updated.".to_string(),
                ScanError::Database(db_err) => db_message(db_err),
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_))
            | Error::Scan(ScanError::Database(DbError::Other(_)))
            | Error::Scan(ScanError::Geocoding(GeocodeError::Client(_)))
            | Error::Internal { .. } => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) | Error::Scan(ScanError::Database(_)) => {
                tracing::warn!("Store constraint error: {}", self);
            }
            Error::Scan(ScanError::Geocoding(_)) => {
                tracing::warn!("Reverse geocoding failed: {}", self);
            }
            Error::Scan(_) | Error::BadRequest { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();

        match &self {
            // Unique violations carry structured JSON so clients can tell what clashed
            Error::Database(DbError::UniqueViolation {
                table, conflicting_value, ..
            }) => {
                use serde_json::json;

                let resource = match *table {
                    "assets" => "asset",
                    "bookings" => "booking",
                    "categories" => "category",
                    "locations" => "location",
                    "qr_codes" => "qr_code",
                    "users" => "user",
                    _ => "unknown",
                };
                let body = json!({
                    "message": self.user_message(),
                    "resource": resource,
                    "conflicting_value": conflicting_value,
                });

                (status, axum::response::Json(body)).into_response()
            }
            _ => {
                let user_message = self.user_message();
                (status, user_message).into_response()
            }
        }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
