//! Reverse geocoding: turning a position into a place name.
//!
//! One lookup per scan, no retries. A failed lookup fails the scan attempt and the asset keeps
//! its previous location.

use crate::config::{BigDataCloudConfig, GeocodingConfig, NominatimConfig};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;
use utoipa::ToSchema;

/// What a provider knows about a position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Place {
    /// City, town or village
    pub locality: Option<String>,
    /// State, province or similar
    pub region: Option<String>,
    /// Full formatted address, when the provider gives one
    pub display_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("could not reach geocoding service: {0}")]
    Unreachable(String),

    #[error("geocoding service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode geocoding response: {0}")]
    Decode(String),

    #[error("could not set up geocoding client: {0}")]
    Client(String),
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Place, GeocodeError>;
}

/// Build the configured geocoder
pub fn create_geocoder(config: &GeocodingConfig) -> Result<Arc<dyn ReverseGeocoder>, GeocodeError> {
    Ok(match config {
        GeocodingConfig::BigDataCloud(config) => Arc::new(BigDataCloudGeocoder::new(config)?),
        GeocodingConfig::Nominatim(config) => Arc::new(NominatimGeocoder::new(config)?),
    })
}

/// Label stored on the asset: "locality, region" when both are known, else the provider's
/// formatted address, else the raw coordinates.
pub fn address_label(place: &Place, latitude: f64, longitude: f64) -> String {
    let known = |value: &Option<String>| value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);
    match (known(&place.locality), known(&place.region), known(&place.display_name)) {
        (Some(locality), Some(region), _) => format!("{locality}, {region}"),
        (_, _, Some(display_name)) => display_name,
        _ => format!("Lat: {latitude:.4}, Lon: {longitude:.4}"),
    }
}

/// Makes sure a url has a trailing slash, so that `join` appends instead of replacing the last
/// path segment.
fn ensure_slash(url: &Url) -> Url {
    if url.path().ends_with('/') {
        url.clone()
    } else {
        let mut new_url = url.clone();
        let path = format!("{}/", new_url.path());
        new_url.set_path(&path);
        new_url
    }
}

fn http_client(timeout: Duration, user_agent: &str) -> Result<Client, GeocodeError> {
    // Already installed when running under main; tests and embedders may not have one yet
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| GeocodeError::Client(e.to_string()))
}

fn endpoint(base: &Url, path: &str) -> Result<Url, GeocodeError> {
    ensure_slash(base)
        .join(path)
        .map_err(|e| GeocodeError::Client(format!("invalid geocoding URL: {e}")))
}

/// Send a lookup and decode the JSON answer
async fn fetch<T: serde::de::DeserializeOwned>(client: &Client, url: Url, timeout: Duration) -> Result<T, GeocodeError> {
    let response = client.get(url.clone()).send().await.map_err(|e| {
        if e.is_timeout() {
            GeocodeError::Timeout(timeout)
        } else {
            GeocodeError::Unreachable(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(%url, %status, "Geocoding request failed");
        return Err(GeocodeError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let body_text = response.text().await.map_err(|e| {
        if e.is_timeout() {
            GeocodeError::Timeout(timeout)
        } else {
            GeocodeError::Unreachable(e.to_string())
        }
    })?;
    serde_json::from_str(&body_text).map_err(|e| {
        tracing::error!("Failed to parse geocoding response as JSON. Error: {}", e);
        tracing::error!("Response body was: {}", body_text);
        GeocodeError::Decode(e.to_string())
    })
}

/// BigDataCloud's `reverse-geocode-client` endpoint
pub struct BigDataCloudGeocoder {
    client: Client,
    base_url: Url,
    language: String,
    request_timeout: Duration,
}

impl BigDataCloudGeocoder {
    pub fn new(config: &BigDataCloudConfig) -> Result<Self, GeocodeError> {
        Ok(Self {
            client: http_client(config.request_timeout, concat!("assetctl/", env!("CARGO_PKG_VERSION")))?,
            base_url: config.url.clone(),
            language: config.language.clone(),
            request_timeout: config.request_timeout,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BigDataCloudResponse {
    #[serde(default)]
    locality: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    principal_subdivision: Option<String>,
}

#[async_trait]
impl ReverseGeocoder for BigDataCloudGeocoder {
    #[tracing::instrument(skip(self), err)]
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Place, GeocodeError> {
        let mut url = endpoint(&self.base_url, "reverse-geocode-client")?;
        url.query_pairs_mut()
            .append_pair("latitude", &latitude.to_string())
            .append_pair("longitude", &longitude.to_string())
            .append_pair("localityLanguage", &self.language);

        let response: BigDataCloudResponse = fetch(&self.client, url, self.request_timeout).await?;
        Ok(Place {
            locality: response.locality.filter(|l| !l.is_empty()).or(response.city),
            region: response.principal_subdivision,
            display_name: None,
        })
    }
}

/// OpenStreetMap Nominatim's `reverse` endpoint
pub struct NominatimGeocoder {
    client: Client,
    base_url: Url,
    language: String,
    request_timeout: Duration,
}

impl NominatimGeocoder {
    pub fn new(config: &NominatimConfig) -> Result<Self, GeocodeError> {
        Ok(Self {
            client: http_client(config.request_timeout, &config.user_agent)?,
            base_url: config.url.clone(),
            language: config.language.clone(),
            request_timeout: config.request_timeout,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<NominatimAddress>,
    /// Set instead of an address when nothing is there (open sea, ...)
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    #[tracing::instrument(skip(self), err)]
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Place, GeocodeError> {
        let mut url = endpoint(&self.base_url, "reverse")?;
        url.query_pairs_mut()
            .append_pair("format", "jsonv2")
            .append_pair("lat", &latitude.to_string())
            .append_pair("lon", &longitude.to_string())
            .append_pair("accept-language", &self.language);

        let response: NominatimResponse = fetch(&self.client, url, self.request_timeout).await?;
        if let Some(error) = response.error {
            tracing::debug!(error, "Nominatim has no address for this position");
            return Ok(Place::default());
        }

        let address = response.address.unwrap_or_default();
        Ok(Place {
            locality: address.city.or(address.town).or(address.village),
            region: address.state,
            display_name: response.display_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn big_data_cloud(server: &MockServer) -> BigDataCloudGeocoder {
        BigDataCloudGeocoder::new(&BigDataCloudConfig {
            url: Url::parse(&format!("{}/data", server.uri())).unwrap(),
            language: "en".to_string(),
            request_timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    #[test]
    fn test_address_label() {
        let full = Place {
            locality: Some("Los Angeles".to_string()),
            region: Some("California".to_string()),
            display_name: Some("Grand Park, Los Angeles".to_string()),
        };
        assert_eq!(address_label(&full, 34.05, -118.24), "Los Angeles, California");

        let partial = Place {
            locality: Some("Los Angeles".to_string()),
            region: Some(" ".to_string()),
            display_name: Some("Grand Park, Los Angeles".to_string()),
        };
        assert_eq!(address_label(&partial, 34.05, -118.24), "Grand Park, Los Angeles");

        assert_eq!(
            address_label(&Place::default(), 34.052235, -118.243683),
            "Lat: 34.0522, Lon: -118.2437"
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_big_data_cloud_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/reverse-geocode-client"))
            .and(query_param("latitude", "34.05"))
            .and(query_param("longitude", "-118.24"))
            .and(query_param("localityLanguage", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "locality": "Los Angeles",
                "principalSubdivision": "California",
                "countryName": "United States of America"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let place = big_data_cloud(&server).reverse(34.05, -118.24).await.unwrap();
        assert_eq!(place.locality.as_deref(), Some("Los Angeles"));
        assert_eq!(place.region.as_deref(), Some("California"));
    }

    #[test_log::test(tokio::test)]
    async fn test_service_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .expect(1)
            .mount(&server)
            .await;

        let result = big_data_cloud(&server).reverse(1.0, 2.0).await;
        assert!(matches!(result, Err(GeocodeError::Status { status: 503, .. })));
    }

    #[test_log::test(tokio::test)]
    async fn test_garbage_body_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = big_data_cloud(&server).reverse(1.0, 2.0).await;
        assert!(matches!(result, Err(GeocodeError::Decode(_))));
    }

    #[test_log::test(tokio::test)]
    async fn test_slow_service_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let geocoder = BigDataCloudGeocoder::new(&BigDataCloudConfig {
            url: Url::parse(&server.uri()).unwrap(),
            language: "en".to_string(),
            request_timeout: Duration::from_millis(50),
        })
        .unwrap();
        let result = geocoder.reverse(1.0, 2.0).await;
        assert!(matches!(result, Err(GeocodeError::Timeout(_))));
    }

    #[test_log::test(tokio::test)]
    async fn test_nominatim_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("format", "jsonv2"))
            .and(query_param("lat", "51.5"))
            .and(query_param("lon", "-0.12"))
            .and(header("user-agent", "acme-assets/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "display_name": "Trafalgar Square, London, Greater London, England",
                "address": { "city": "London", "state": "England" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let geocoder = create_geocoder(&GeocodingConfig::Nominatim(NominatimConfig {
            url: Url::parse(&server.uri()).unwrap(),
            user_agent: "acme-assets/1.0".to_string(),
            ..Default::default()
        }))
        .unwrap();

        let place = geocoder.reverse(51.5, -0.12).await.unwrap();
        assert_eq!(address_label(&place, 51.5, -0.12), "London, England");
    }

    #[test_log::test(tokio::test)]
    async fn test_nominatim_nothing_here() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "error": "Unable to geocode" })))
            .mount(&server)
            .await;

        let geocoder = NominatimGeocoder::new(&NominatimConfig {
            url: Url::parse(&server.uri()).unwrap(),
            ..Default::default()
        })
        .unwrap();

        let place = geocoder.reverse(0.0, -30.0).await.unwrap();
        assert_eq!(address_label(&place, 0.0, -30.0), "Lat: 0.0000, Lon: -30.0000");
    }
}
