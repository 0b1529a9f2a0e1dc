//! # assetctl: asset tracking control service
//!
//! `assetctl` keeps track of physical assets: what exists, who holds it, where it was last seen,
//! and when it is booked. It serves a JSON management API under `/admin/api/v1` for the
//! dashboard and for scanning devices.
//!
//! ## Overview
//!
//! Assets carry a QR-code label. Scanning the label with a phone submits the decoded link
//! together with the phone's position; the service resolves the code to an asset,
//! reverse-geocodes the position and records it as the asset's last known location, along with
//! a coarse classification of the scanning device. The same flow backs the explicit "update
//! GPS coordinates" action on an asset.
//!
//! Bookings reserve bookable assets for a date range. The bookings calendar lays them out on a
//! six-week month grid, placing overlapping bookings on separate horizontal tracks.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum). All state lives in a
//! single in-memory [`db::Store`], seeded with demo data at startup; nothing is persisted.
//!
//! - The **API layer** ([`api`]) holds the request handlers and the JSON models.
//! - The **store** ([`db`]) holds the tables and one repository per entity. Writers go through
//!   transactions that publish their changes on commit.
//! - The **calendar** ([`calendar`]) computes track layouts and month views. It is pure and has
//!   no access to the store.
//! - The **scan flow** ([`scan`]) parses scanned payloads, takes the device position and calls
//!   the reverse-geocoding provider, the only outbound network dependency.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use assetctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = assetctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     assetctl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod calendar;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod scan;
pub mod telemetry;
#[cfg(test)]
mod test_utils;
pub mod types;

use crate::config::CorsOrigin;
use crate::db::{Store, Tables, seed::demo_tables};
use crate::openapi::ApiDoc;
use crate::scan::{ScanService, geocoding::create_geocoder};
use axum::http::HeaderValue;
use axum::{
    Json, Router, http,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder()
///     .store(store)
///     .config(config)
///     .scan(scan_service)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub store: Store,
    pub config: Config,
    pub scan: ScanService,
}

/// The store the application starts with
pub fn create_store(config: &Config) -> Store {
    if config.seed_demo_data {
        info!("Seeding store with demo data");
        Store::new(demo_tables(chrono::Utc::now()))
    } else {
        Store::new(Tables::default())
    }
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let allow_origin = if config.cors.allowed_origins.contains(&CorsOrigin::Wildcard) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &config.cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.origin().ascii_serialization().parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PATCH,
            http::Method::DELETE,
        ])
        .allow_headers([http::header::CONTENT_TYPE])
        .expose_headers(vec![http::header::LOCATION]);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the router: management API under `/admin/api/v1`, health check, OpenAPI document and
/// docs UI, with CORS and request tracing applied.
///
/// # Errors
///
/// Returns an error if the CORS configuration is invalid.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    use api::handlers::{assets, bookings, calendar, categories, dashboard, locations, qr_codes, scan, users};

    let api_routes = Router::new()
        .route("/dashboard", get(dashboard::get_dashboard))
        // Assets
        .route("/assets", get(assets::list_assets).post(assets::create_asset))
        .route(
            "/assets/{id}",
            get(assets::get_asset).patch(assets::update_asset).delete(assets::delete_asset),
        )
        .route(
            "/assets/{id}/custody",
            post(assets::assign_custody).delete(assets::release_custody),
        )
        .route("/assets/{id}/bookings", post(assets::add_asset_to_booking))
        .route("/assets/{id}/location", post(assets::refresh_asset_location))
        // Bookings and calendar
        .route("/bookings", get(bookings::list_bookings).post(bookings::create_booking))
        .route(
            "/bookings/{id}",
            get(bookings::get_booking)
                .patch(bookings::update_booking)
                .delete(bookings::delete_booking),
        )
        .route("/calendar", get(calendar::get_month_view))
        .route("/calendar/layout", post(calendar::layout_bookings))
        // Reference data
        .route("/categories", get(categories::list_categories).post(categories::create_category))
        .route(
            "/categories/{id}",
            get(categories::get_category)
                .patch(categories::update_category)
                .delete(categories::delete_category),
        )
        .route("/locations", get(locations::list_locations).post(locations::create_location))
        .route(
            "/locations/{id}",
            get(locations::get_location)
                .patch(locations::update_location)
                .delete(locations::delete_location),
        )
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user).patch(users::update_user).delete(users::delete_user),
        )
        // QR codes
        .route("/qr-batches", get(qr_codes::list_batches).post(qr_codes::create_batch))
        .route("/qr-batches/{id}", get(qr_codes::get_batch))
        .route("/qr-codes", get(qr_codes::list_codes))
        .route("/qr-codes/{id}", get(qr_codes::get_code))
        // Scanning
        .route("/scan", post(scan::submit_scan))
        .route("/scan/options", get(scan::get_scan_options))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/admin/api/v1", api_routes)
        .merge(Scalar::with_url("/admin/docs", ApiDoc::openapi()))
        .layer(create_cors_layer(&state.config)?);

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting asset tracking service with configuration: {:#?}", config);

        let store = create_store(&config);
        let geocoder = create_geocoder(&config.geocoding)?;
        let scan = ScanService::new(
            store.clone(),
            geocoder,
            config.scan.position_options(),
            config.public_url.clone(),
        );

        let app_state = AppState::builder().store(store).config(config.clone()).scan(scan).build();
        let router = build_router(&app_state)?;

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Asset tracking service listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::create_test_app;

    #[tokio::test]
    async fn test_healthz() {
        let server = create_test_app().await;
        let response = server.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let server = create_test_app().await;
        let response = server.get("/api-docs/openapi.json").await;
        response.assert_status_ok();
        let doc: serde_json::Value = response.json();
        assert!(doc["paths"]["/assets"].is_object());
        assert!(doc["paths"]["/scan"].is_object());
    }

    #[tokio::test]
    async fn test_application_starts_without_demo_data() {
        let config = Config {
            seed_demo_data: false,
            ..Default::default()
        };
        let server = Application::new(config).await.unwrap().into_test_server();

        let response = server.get("/admin/api/v1/assets").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["total_count"], 0);
    }

    #[test]
    fn test_cors_layer_accepts_configured_origins() {
        let mut config = Config::default();
        config.cors.allowed_origins = vec![
            CorsOrigin::Url(url::Url::parse("https://dashboard.example.com").unwrap()),
        ];
        assert!(create_cors_layer(&config).is_ok());

        config.cors.allowed_origins.push(CorsOrigin::Wildcard);
        assert!(create_cors_layer(&config).is_ok());
    }
}
