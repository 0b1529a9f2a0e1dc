use crate::AppState;
use crate::api::models::scan::{ScanResponse, ScanSubmission};
use crate::errors::{Error, Result};
use crate::scan::geolocation::PositionOptions;
use crate::scan::{ScanError, ScanOutcome, ScanRequest};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header::USER_AGENT},
};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Run a scan attempt on its own task.
///
/// If the request is dropped (client disconnected, scanner dismissed) the token is cancelled.
/// The attempt still runs to completion, but its result is discarded instead of recorded.
pub(crate) async fn run_attempt<F, Fut>(attempt: F) -> Result<ScanOutcome>
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = std::result::Result<ScanOutcome, ScanError>> + Send + 'static,
{
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let outcome = tokio::spawn(attempt(cancel)).await.map_err(|e| Error::Internal {
        operation: format!("complete scan attempt: {e}"),
    })??;
    Ok(outcome)
}

#[utoipa::path(
    post,
    path = "/scan",
    tag = "scan",
    summary = "Submit a scan",
    description = "Resolves a scanned QR payload to an asset, then records the device position, \
                   a reverse-geocoded address and the scanning device.",
    request_body = ScanSubmission,
    responses(
        (status = 200, description = "Outcome of the scan", body = ScanResponse),
        (status = 400, description = "Payload is not a valid asset link"),
        (status = 403, description = "Location permission denied"),
        (status = 404, description = "Linked asset not found"),
        (status = 422, description = "Position unavailable or unsupported"),
        (status = 502, description = "Reverse geocoding failed"),
        (status = 504, description = "Timed out getting a position or an address"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn submit_scan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(submission): Json<ScanSubmission>,
) -> Result<Json<ScanResponse>> {
    let request = ScanRequest {
        payload: submission.payload,
        user_agent: headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        location: submission.location,
    };
    let scan = state.scan.clone();

    let outcome = run_attempt(move |cancel| async move { scan.scan(request, cancel).await }).await?;
    Ok(Json(ScanResponse::from(outcome)))
}

#[utoipa::path(
    get,
    path = "/scan/options",
    tag = "scan",
    summary = "Position options",
    description = "How scanning devices should ask for their position.",
    responses(
        (status = 200, description = "Position options", body = PositionOptions),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_scan_options(State(state): State<AppState>) -> Json<PositionOptions> {
    Json(*state.scan.position_options())
}

#[cfg(test)]
mod tests {
    use crate::api::models::assets::AssetResponse;
    use crate::api::models::scan::ScanResponse;
    use crate::test_utils::{FailingGeocoder, create_test_app, create_test_state, test_server};
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use std::sync::Arc;

    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 \
                          (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

    fn los_angeles() -> Value {
        json!({ "position": { "latitude": 34.0522, "longitude": -118.2437, "accuracy": 12.0 } })
    }

    #[test_log::test(tokio::test)]
    async fn test_scan_updates_asset() {
        let app = create_test_app().await;

        let response = app
            .post("/admin/api/v1/scan")
            .add_header("user-agent", IPHONE)
            .json(&json!({
                "payload": "https://assets.example.com/scan?id=QR-G1H2I3",
                "location": los_angeles(),
            }))
            .await;
        response.assert_status_ok();

        let ScanResponse::Updated { asset } = response.json::<ScanResponse>() else {
            panic!("expected the asset to be updated");
        };
        assert_eq!(asset.id, "ASSET-005");
        assert_eq!(asset.location.address, "Los Angeles, California");
        assert_eq!(asset.location.latitude, 34.0522);
        let details = asset.scan_details.expect("scan details recorded");
        assert_eq!(details.device, "Mobile");
        assert_eq!(details.browser, "Safari");
        assert_eq!(details.os, "iOS");
        assert_eq!(details.source, "QR Code Scan");

        let stored: AssetResponse = app.get("/admin/api/v1/assets/ASSET-005").await.json();
        assert_eq!(stored.location, asset.location);
        assert!(stored.last_scan.timestamp() > 1_700_000_000);
    }

    #[test_log::test(tokio::test)]
    async fn test_scan_unassigned_code() {
        let app = create_test_app().await;

        let response = app
            .post("/admin/api/v1/scan")
            .json(&json!({ "payload": "/scan?id=QR-1A2B3C", "location": los_angeles() }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["outcome"], "unassigned");
        assert_eq!(body["code"], "QR-1A2B3C");
        assert_eq!(body["message"], "QR code QR-1A2B3C is not assigned to any asset yet.");
    }

    #[test_log::test(tokio::test)]
    async fn test_scan_rejects_foreign_payloads() {
        let app = create_test_app().await;

        for payload in ["", "hello world", "https://evil.example.org/scan?id=QR-G1H2I3"] {
            app.post("/admin/api/v1/scan")
                .json(&json!({ "payload": payload, "location": los_angeles() }))
                .await
                .assert_status(StatusCode::BAD_REQUEST);
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_scan_location_failures() {
        let app = create_test_app().await;
        let payload = "https://assets.example.com/scan?id=QR-G1H2I3";

        app.post("/admin/api/v1/scan")
            .json(&json!({ "payload": payload, "location": { "error": "permission_denied" } }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        app.post("/admin/api/v1/scan")
            .json(&json!({ "payload": payload }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        app.post("/admin/api/v1/scan")
            .json(&json!({ "payload": payload, "location": { "error": "timeout" } }))
            .await
            .assert_status(StatusCode::GATEWAY_TIMEOUT);

        let asset: AssetResponse = app.get("/admin/api/v1/assets/ASSET-005").await.json();
        assert_eq!(asset.location.address, "Parking Garage, Level 2, Sydney Office");
    }

    #[test_log::test(tokio::test)]
    async fn test_scan_geocoding_failure_keeps_location() {
        let state = create_test_state(Arc::new(FailingGeocoder));
        let app = test_server(&state);

        app.post("/admin/api/v1/scan")
            .json(&json!({ "payload": "https://assets.example.com/scan?id=QR-G1H2I3", "location": los_angeles() }))
            .await
            .assert_status(StatusCode::BAD_GATEWAY);

        let asset: AssetResponse = app.get("/admin/api/v1/assets/ASSET-005").await.json();
        assert_eq!(asset.location.address, "Parking Garage, Level 2, Sydney Office");
        assert_eq!(asset.scan_details.map(|d| d.source), Some("QR Code Scan".to_string()));
    }

    #[test_log::test(tokio::test)]
    async fn test_scan_options() {
        let app = create_test_app().await;

        let body: Value = app.get("/admin/api/v1/scan/options").await.json();
        assert_eq!(body["high_accuracy"], true);
        assert_eq!(body["timeout"], "10s");
        assert_eq!(body["maximum_age"], "0s");
    }
}
