//! Shared helpers for API tests.

use crate::db::{Store, seed::demo_tables};
use crate::scan::ScanService;
use crate::scan::geocoding::{GeocodeError, Place, ReverseGeocoder};
use crate::{AppState, Config, build_router};
use async_trait::async_trait;
use axum_test::TestServer;
use std::sync::Arc;
use url::Url;

pub const TEST_PUBLIC_URL: &str = "https://assets.example.com";

/// Answers every lookup with Los Angeles, California
pub struct FixedGeocoder;

#[async_trait]
impl ReverseGeocoder for FixedGeocoder {
    async fn reverse(&self, _latitude: f64, _longitude: f64) -> Result<Place, GeocodeError> {
        Ok(Place {
            locality: Some("Los Angeles".to_string()),
            region: Some("California".to_string()),
            display_name: None,
        })
    }
}

/// Fails every lookup as if the provider were down
pub struct FailingGeocoder;

#[async_trait]
impl ReverseGeocoder for FailingGeocoder {
    async fn reverse(&self, _latitude: f64, _longitude: f64) -> Result<Place, GeocodeError> {
        Err(GeocodeError::Status {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }
}

pub fn create_test_state(geocoder: Arc<dyn ReverseGeocoder>) -> AppState {
    let config = Config {
        public_url: Some(Url::parse(TEST_PUBLIC_URL).expect("valid test URL")),
        ..Default::default()
    };
    let store = Store::new(demo_tables(chrono::Utc::now()));
    let scan = ScanService::new(
        store.clone(),
        geocoder,
        config.scan.position_options(),
        config.public_url.clone(),
    );
    AppState::builder().store(store).config(config).scan(scan).build()
}

pub fn test_server(state: &AppState) -> TestServer {
    let router = build_router(state).expect("Failed to build router");
    TestServer::new(router).expect("Failed to create test server")
}

/// Demo data, a geocoder that always answers
pub async fn create_test_app() -> TestServer {
    test_server(&create_test_state(Arc::new(FixedGeocoder)))
}
