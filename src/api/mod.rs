//! Clients for the third-party HTTP APIs the home screen reads from.
//!
//! Every response crosses a parsing boundary here before it reaches the
//! tracker: unexpected shapes degrade to unknown values instead of errors.

pub mod aladhan;
pub mod geocode;

use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;

use crate::config::ApiConfig;
use crate::models::DayTimings;

pub use aladhan::AladhanClient;
pub use geocode::Geocoder;

const USER_AGENT: &str = concat!("noor/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (DNS, TLS, timeout, ...)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx HTTP status
    #[error("API returned error status {status}: {body}")]
    Status { status: u16, body: String },

    /// 2xx HTTP status but the payload reports a failure
    #[error("API rejected request ({code}): {status}")]
    Rejected { code: u16, status: String },

    /// Body was not JSON at all
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Where today's prayer timings come from.
pub trait TimingsSource {
    fn fetch_todays_times(&self, latitude: f64, longitude: f64) -> Result<DayTimings, ApiError>;
}

/// Shared blocking HTTP client with the configured timeout.
pub fn http_client(config: &ApiConfig) -> Result<Client, ApiError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .map_err(ApiError::from)
}

/// Keep error bodies short enough to log.
fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::Status {
            status: 503,
            body: "Service Unavailable".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("Service Unavailable"));

        let err = ApiError::Rejected {
            code: 400,
            status: "Bad Request".to_string(),
        };
        assert!(err.to_string().contains("400"));
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short"), "short");
        let long = "x".repeat(500);
        let cut = truncate_body(&long);
        assert_eq!(cut.chars().count(), 201);
        assert!(cut.ends_with('…'));
    }
}
