//! Scanned QR payloads.
//!
//! Asset labels encode a link to the scan page: `<public_url>/scan?id=QR-XXXXXX`. Older labels
//! link straight to an asset with `/scan?assetId=ASSET-001`. Anything else is not one of our
//! codes.

use crate::types::{AssetId, QrCodeId};
use thiserror::Error;
use url::Url;

/// Path of the scan page, relative to the public URL
pub const SCAN_PATH: &str = "scan";

/// Placeholder base for resolving relative payloads when no public URL is configured
const FALLBACK_BASE: &str = "http://localhost/";

/// What a scanned payload points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanTarget {
    QrCode(QrCodeId),
    /// Legacy direct link to an asset
    Asset(AssetId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("scanned code is empty")]
    Empty,

    #[error("scanned code is not a link")]
    NotALink,

    #[error("scanned link points to {actual}, not {expected}")]
    ForeignOrigin { expected: String, actual: String },

    #[error("scanned link does not open the scan page")]
    WrongPath,

    #[error("scanned link carries no code")]
    MissingId,

    #[error("'{0}' is not a valid QR code identifier")]
    MalformedCode(String),
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

fn scan_page(base: &Url) -> Result<Url, PayloadError> {
    ensure_slash(base).join(SCAN_PATH).map_err(|_| PayloadError::NotALink)
}

/// The link printed on a code's label
pub fn scan_url(public_url: &Url, code: &str) -> Result<Url, url::ParseError> {
    let mut url = ensure_slash(public_url).join(SCAN_PATH)?;
    url.query_pairs_mut().append_pair("id", code);
    Ok(url)
}

fn is_code_id(value: &str) -> bool {
    value
        .strip_prefix("QR-")
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()))
}

/// Work out what a scanned payload refers to, without looking anything up.
///
/// `payload` may be absolute or relative to `public_url`. When `public_url` is set, absolute
/// links must share its origin.
pub fn parse_scan_payload(payload: &str, public_url: Option<&Url>) -> Result<ScanTarget, PayloadError> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(PayloadError::Empty);
    }

    let fallback;
    let base = match public_url {
        Some(url) => url,
        None => {
            fallback = Url::parse(FALLBACK_BASE).map_err(|_| PayloadError::NotALink)?;
            &fallback
        }
    };

    let url = match Url::parse(payload) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) if payload.starts_with('/') => {
            base.join(payload).map_err(|_| PayloadError::NotALink)?
        }
        Err(_) => return Err(PayloadError::NotALink),
    };

    if !matches!(url.scheme(), "http" | "https") {
        return Err(PayloadError::NotALink);
    }
    if let Some(public_url) = public_url {
        if url.origin() != public_url.origin() {
            return Err(PayloadError::ForeignOrigin {
                expected: public_url.origin().ascii_serialization(),
                actual: url.origin().ascii_serialization(),
            });
        }
    }

    let path = url.path().trim_end_matches('/');
    let expected = scan_page(base)?;
    if path != "/scan" && path != expected.path() {
        return Err(PayloadError::WrongPath);
    }

    let param = |name: &str| {
        url.query_pairs()
            .find(|(key, value)| key == name && !value.trim().is_empty())
            .map(|(_, value)| value.trim().to_string())
    };

    if let Some(code) = param("id") {
        if !is_code_id(&code) {
            return Err(PayloadError::MalformedCode(code));
        }
        return Ok(ScanTarget::QrCode(code));
    }
    if let Some(asset_id) = param("assetId") {
        return Ok(ScanTarget::Asset(asset_id));
    }
    Err(PayloadError::MissingId)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn public() -> Url {
        Url::parse("https://assets.example.com").unwrap()
    }

    #[test]
    fn test_scan_url_round_trips() {
        let url = scan_url(&public(), "QR-T4U5V6").unwrap();
        assert_eq!(url.as_str(), "https://assets.example.com/scan?id=QR-T4U5V6");
        assert_eq!(
            parse_scan_payload(url.as_str(), Some(&public())),
            Ok(ScanTarget::QrCode("QR-T4U5V6".to_string()))
        );
    }

    #[test]
    fn test_relative_and_legacy_payloads() {
        assert_eq!(
            parse_scan_payload("/scan?id=QR-1A2B3C", Some(&public())),
            Ok(ScanTarget::QrCode("QR-1A2B3C".to_string()))
        );
        assert_eq!(
            parse_scan_payload("/scan?id=QR-1A2B3C", None),
            Ok(ScanTarget::QrCode("QR-1A2B3C".to_string()))
        );
        assert_eq!(
            parse_scan_payload("https://anywhere.test/scan/?assetId=ASSET-001", None),
            Ok(ScanTarget::Asset("ASSET-001".to_string()))
        );
    }

    #[test]
    fn test_public_url_with_path_prefix() {
        let public = Url::parse("https://example.com/tracker").unwrap();
        let url = scan_url(&public, "QR-M7N8P9").unwrap();
        assert_eq!(url.path(), "/tracker/scan");
        assert_eq!(
            parse_scan_payload(url.as_str(), Some(&public)),
            Ok(ScanTarget::QrCode("QR-M7N8P9".to_string()))
        );
    }

    #[test]
    fn test_rejects_other_payloads() {
        let public = public();
        let cases = [
            ("", PayloadError::Empty),
            ("QR-T4U5V6", PayloadError::NotALink),
            ("mailto:someone@example.com", PayloadError::NotALink),
            ("https://assets.example.com/assets/ASSET-001", PayloadError::WrongPath),
            ("https://assets.example.com/scan", PayloadError::MissingId),
            ("https://assets.example.com/scan?id=", PayloadError::MissingId),
            (
                "https://assets.example.com/scan?id=qr-lower",
                PayloadError::MalformedCode("qr-lower".to_string()),
            ),
        ];
        for (payload, expected) in cases {
            assert_eq!(parse_scan_payload(payload, Some(&public)), Err(expected), "payload {payload:?}");
        }
    }

    #[test]
    fn test_rejects_foreign_origin() {
        let result = parse_scan_payload("https://evil.example.net/scan?id=QR-T4U5V6", Some(&public()));
        assert!(matches!(result, Err(PayloadError::ForeignOrigin { .. })));
    }
}
