//! Coarse device classification from a user-agent string.
//!
//! This is a heuristic built on fixed substring matches. It is good enough to tell a phone
//! from a laptop in the scan history and nothing more.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeviceInfo {
    /// "Mobile" or "Desktop"
    pub device: String,
    pub browser: String,
    pub os: String,
}

fn detect_os(ua: &str) -> &'static str {
    // iOS agents say "like Mac OS X", so they are checked first
    if ua.contains("windows") {
        "Windows"
    } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") {
        "iOS"
    } else if ua.contains("macintosh") || ua.contains("mac os x") {
        "macOS"
    } else if ua.contains("android") {
        "Android"
    } else if ua.contains("linux") {
        "Linux"
    } else {
        UNKNOWN
    }
}

fn detect_browser(ua: &str) -> &'static str {
    // Order matters: Edge and Chrome both claim to be Chrome, Chrome claims to be Safari
    if ua.contains("edg") {
        "Edge"
    } else if ua.contains("chrome") && !ua.contains("chromium") {
        "Chrome"
    } else if ua.contains("firefox") {
        "Firefox"
    } else if ua.contains("safari") && !ua.contains("chrome") {
        "Safari"
    } else {
        UNKNOWN
    }
}

/// Classify a user agent. Missing or unrecognised parts come back as "Unknown".
pub fn classify_user_agent(user_agent: Option<&str>) -> DeviceInfo {
    let Some(ua) = user_agent.map(str::to_lowercase).filter(|ua| !ua.trim().is_empty()) else {
        return DeviceInfo {
            device: UNKNOWN.to_string(),
            browser: UNKNOWN.to_string(),
            os: UNKNOWN.to_string(),
        };
    };

    DeviceInfo {
        device: if ua.contains("mobi") { "Mobile" } else { "Desktop" }.to_string(),
        browser: detect_browser(&ua).to_string(),
        os: detect_os(&ua).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(ua: &str) -> (String, String, String) {
        let info = classify_user_agent(Some(ua));
        (info.device, info.browser, info.os)
    }

    #[test]
    fn test_common_agents() {
        let cases = [
            (
                "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
                ("Mobile", "Safari", "iOS"),
            ),
            (
                "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36",
                ("Mobile", "Chrome", "Android"),
            ),
            (
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
                ("Desktop", "Edge", "Windows"),
            ),
            (
                "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
                ("Desktop", "Firefox", "Linux"),
            ),
            (
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
                ("Desktop", "Chrome", "macOS"),
            ),
        ];

        for (ua, (device, browser, os)) in cases {
            assert_eq!(classify(ua), (device.to_string(), browser.to_string(), os.to_string()), "{ua}");
        }
    }

    #[test]
    fn test_unknown_agent() {
        assert_eq!(classify("curl/8.4.0"), ("Desktop".to_string(), UNKNOWN.to_string(), UNKNOWN.to_string()));
        assert_eq!(
            classify_user_agent(None),
            DeviceInfo {
                device: UNKNOWN.to_string(),
                browser: UNKNOWN.to_string(),
                os: UNKNOWN.to_string(),
            }
        );
    }
}
