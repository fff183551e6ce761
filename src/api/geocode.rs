use log::{debug, warn};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::api::{ApiError, truncate_body};
use crate::config::ApiConfig;

pub const UNKNOWN_CITY: &str = "Unknown";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReverseResponse {
    address: Option<Address>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
}

/// City name from a Nominatim reverse lookup: city, then town, then village.
pub fn parse_city(body: &str) -> Option<String> {
    let resp: ReverseResponse = serde_json::from_str(body).ok()?;
    let address = resp.address?;
    [address.city, address.town, address.village]
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    http: Client,
    base_url: String,
}

impl Geocoder {
    pub fn new(http: Client, config: &ApiConfig) -> Self {
        Self {
            http,
            base_url: config.geocode_url.trim_end_matches('/').to_string(),
        }
    }

    fn lookup(&self, latitude: f64, longitude: f64) -> Result<Option<String>, ApiError> {
        let url = format!("{}/reverse", self.base_url);
        debug!("GET {} lat={} lon={}", url, latitude, longitude);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("format", "json".to_string()),
            ])
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }
        Ok(parse_city(&body))
    }

    /// Never fails: any error or empty address yields [`UNKNOWN_CITY`].
    pub fn reverse_city(&self, latitude: f64, longitude: f64) -> String {
        match self.lookup(latitude, longitude) {
            Ok(Some(city)) => city,
            Ok(None) => UNKNOWN_CITY.to_string(),
            Err(e) => {
                warn!("Reverse geocoding failed: {}", e);
                UNKNOWN_CITY.to_string()
            }
        }
    }
}
