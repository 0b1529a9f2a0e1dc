//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `ASSETCTL_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `ASSETCTL_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `ASSETCTL_CALENDAR__MAX_TRACKS=4` sets the `calendar.max_tracks` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use assetctl::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Parse CLI arguments
//! let args = Args::parse();
//!
//! // Load configuration from file and environment
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}:{}", config.host, config.port);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port`, `public_url` - HTTP binding and the address printed on labels
//! - **Data**: `seed_demo_data` - Load the demo records at startup
//! - **Calendar**: `calendar.max_tracks` - Booking lanes shown per day
//! - **Scanning**: `scan.geolocation_timeout`, `scan.high_accuracy`, `scan.maximum_age`
//! - **Geocoding**: `geocoding.big_data_cloud` or `geocoding.nominatim` - Reverse-geocoding provider
//! - **QR codes**: `qr_codes.default_batch_size`, `qr_codes.max_batch_size`
//! - **Security**: `cors.allowed_origins`
//! - **Telemetry**: `enable_otel_export`
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! ASSETCTL_PORT=8080
//!
//! # Where labels point to
//! ASSETCTL_PUBLIC_URL=https://assets.example.com
//!
//! # Switch geocoding provider
//! ASSETCTL_GEOCODING__NOMINATIM__USER_AGENT="acme-assets/1.0 (ops@example.com)"
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::Error;
use crate::scan::geolocation::PositionOptions;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "ASSETCTL_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Base URL the dashboard is served from (e.g., "https://assets.example.com").
    /// Scan links on labels point here, and scanned links must come from the same origin.
    pub public_url: Option<Url>,
    /// Load the demo users, assets, bookings, locations and QR batches at startup
    pub seed_demo_data: bool,
    /// Export traces over OTLP in addition to logging them
    pub enable_otel_export: bool,
    pub calendar: CalendarConfig,
    pub scan: ScanConfig,
    pub geocoding: GeocodingConfig,
    pub qr_codes: QrCodeConfig,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
}

/// Booking calendar rendering.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarConfig {
    /// Booking lanes drawn per day cell before the rest collapse into "+K more" (1-10)
    pub max_tracks: usize,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            max_tracks: crate::calendar::DEFAULT_MAX_TRACKS,
        }
    }
}

/// How scanning devices are asked for their position.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Longest wait for a position fix
    #[serde(with = "humantime_serde")]
    pub geolocation_timeout: Duration,
    /// Ask for a GPS-grade fix rather than a network estimate
    pub high_accuracy: bool,
    /// Oldest cached fix a device may answer with
    #[serde(with = "humantime_serde")]
    pub maximum_age: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            geolocation_timeout: Duration::from_secs(10),
            high_accuracy: true,
            maximum_age: Duration::ZERO,
        }
    }
}

impl ScanConfig {
    pub fn position_options(&self) -> PositionOptions {
        PositionOptions {
            high_accuracy: self.high_accuracy,
            timeout: self.geolocation_timeout,
            maximum_age: self.maximum_age,
        }
    }
}

/// Reverse-geocoding provider configuration.
///
/// ```yaml
/// geocoding:
///   nominatim:
///     user_agent: "acme-assets/1.0 (ops@example.com)"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocodingConfig {
    /// BigDataCloud's free client-side endpoint; no key needed
    BigDataCloud(BigDataCloudConfig),
    /// OpenStreetMap Nominatim; requires an identifying user agent
    Nominatim(NominatimConfig),
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        GeocodingConfig::BigDataCloud(BigDataCloudConfig::default())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BigDataCloudConfig {
    /// API base; `reverse-geocode-client` is resolved against it
    pub url: Url,
    /// Language for place names
    pub language: String,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for BigDataCloudConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("https://api.bigdatacloud.net/data/").expect("valid default URL"),
            language: "en".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct NominatimConfig {
    /// API base; `reverse` is resolved against it
    pub url: Url,
    /// Language for place names
    pub language: String,
    /// Sent as the User-Agent header, as the usage policy requires
    pub user_agent: String,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("https://nominatim.openstreetmap.org/").expect("valid default URL"),
            language: "en".to_string(),
            user_agent: concat!("assetctl/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// QR-code batch generation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct QrCodeConfig {
    /// Quantity used when a batch request does not name one
    pub default_batch_size: usize,
    /// Largest batch that can be generated at once
    pub max_batch_size: usize,
}

impl Default for QrCodeConfig {
    fn default() -> Self {
        Self {
            default_batch_size: 20,
            max_batch_size: 500,
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Url(
                Url::parse("http://localhost:9002").expect("valid default URL"), // Development dashboard
            )],
            max_age: Some(3600), // Cache preflight for 1 hour
        }
    }
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://app.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            public_url: None,
            seed_demo_data: true,
            enable_otel_export: false,
            calendar: CalendarConfig::default(),
            scan: ScanConfig::default(),
            geocoding: GeocodingConfig::default(),
            qr_codes: QrCodeConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if !(1..=crate::calendar::MAX_TRACKS_LIMIT).contains(&self.calendar.max_tracks) {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: calendar.max_tracks must be between 1 and {}, got {}",
                    crate::calendar::MAX_TRACKS_LIMIT,
                    self.calendar.max_tracks
                ),
            });
        }

        if self.scan.geolocation_timeout.is_zero() {
            return Err(Error::Internal {
                operation: "Config validation: scan.geolocation_timeout must be greater than zero".to_string(),
            });
        }

        if self.qr_codes.max_batch_size == 0 {
            return Err(Error::Internal {
                operation: "Config validation: qr_codes.max_batch_size must be at least 1".to_string(),
            });
        }
        if !(1..=self.qr_codes.max_batch_size).contains(&self.qr_codes.default_batch_size) {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: qr_codes.default_batch_size ({}) must be between 1 and max_batch_size ({})",
                    self.qr_codes.default_batch_size, self.qr_codes.max_batch_size
                ),
            });
        }

        if let Some(public_url) = &self.public_url {
            if !matches!(public_url.scheme(), "http" | "https") {
                return Err(Error::Internal {
                    operation: format!("Config validation: public_url must be an http(s) URL, got {public_url}"),
                });
            }
        }

        if let GeocodingConfig::Nominatim(nominatim) = &self.geocoding {
            if nominatim.user_agent.trim().is_empty() {
                return Err(Error::Internal {
                    operation: "Config validation: geocoding.nominatim.user_agent must identify this deployment"
                        .to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values. ASSETCTL_CONFIG names
            // the file itself and is not a setting.
            .merge(Env::prefixed("ASSETCTL_").ignore(&["config"]).split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
