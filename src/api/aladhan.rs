use chrono::{Local, NaiveDate};
use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::api::{ApiError, TimingsSource, truncate_body};
use crate::config::ApiConfig;
use crate::models::{ClockTime, DayTimings, HijriDay, PrayerName, PrayerTimeSet};
use crate::utils::hijri::hijri_month_name;

// ─── Response shape ─────────────────────────────────────────────────────────
//
// Every field is a raw `Value` and each nested block is decoded on its own,
// so one block of the wrong shape only loses the fields inside it.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Envelope {
    code: Option<u16>,
    status: Option<String>,
    data: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TimingsData {
    timings: Value,
    date: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DateBlock {
    gregorian: Value,
    hijri: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GregorianBlock {
    /// "DD-MM-YYYY"
    date: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HijriBlock {
    day: Value,
    month: Value,
    year: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HijriMonthBlock {
    number: Value,
    en: Value,
}

// ─── Conversion ─────────────────────────────────────────────────────────────

/// Decode one nested block, or its empty default if absent or not an object.
fn block<T: DeserializeOwned + Default>(value: &Value, what: &str) -> T {
    if value.is_null() {
        return T::default();
    }
    serde_json::from_value(value.clone()).unwrap_or_else(|e| {
        warn!("Ignoring malformed {} block ({})", what, e);
        T::default()
    })
}

fn value_to_u32(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn timing(timings: &Map<String, Value>, key: &str) -> ClockTime {
    match timings.get(key) {
        Some(Value::String(s)) => ClockTime::parse(s).unwrap_or_else(|| {
            warn!("Unparseable {} timing '{}', treating as unknown", key, s);
            ClockTime::Unknown
        }),
        Some(other) => {
            warn!("Unexpected {} timing value {}, treating as unknown", key, other);
            ClockTime::Unknown
        }
        None => {
            warn!("Response has no {} timing", key);
            ClockTime::Unknown
        }
    }
}

fn api_key(name: PrayerName) -> &'static str {
    match name {
        PrayerName::Fajr => "Fajr",
        PrayerName::Sunrise => "Sunrise",
        PrayerName::Dhuhr => "Dhuhr",
        PrayerName::Asr => "Asr",
        PrayerName::Maghrib => "Maghrib",
        PrayerName::Isha => "Isha",
    }
}

fn convert_hijri(hijri: &HijriBlock) -> Option<HijriDay> {
    let day = value_to_u32(&hijri.day)?;
    let year = value_to_u32(&hijri.year)?;
    let month: HijriMonthBlock = block(&hijri.month, "hijri.month");
    let month_name = match value_to_u32(&month.number) {
        Some(n @ 1..=12) => hijri_month_name(n as usize).to_string(),
        _ => month.en.as_str()?.to_string(),
    };
    Some(HijriDay {
        day,
        month_name,
        year,
    })
}

fn convert(data: TimingsData) -> DayTimings {
    let empty = Map::new();
    let timings = match &data.timings {
        Value::Object(map) => map,
        Value::Null => &empty,
        other => {
            warn!("Timings field is not an object: {}", other);
            &empty
        }
    };

    let mut times = PrayerTimeSet::unknown();
    for name in PrayerName::ALL {
        times.set(name, timing(timings, api_key(name)));
    }

    let midnight = match timings.get("Midnight") {
        Some(Value::String(s)) => ClockTime::parse_or_unknown(s),
        _ => ClockTime::Unknown,
    };

    let dates: DateBlock = block(&data.date, "date");
    let gregorian: GregorianBlock = block(&dates.gregorian, "date.gregorian");
    let date = gregorian
        .date
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s, "%d-%m-%Y").ok());

    let hijri = if dates.hijri.is_null() {
        None
    } else {
        convert_hijri(&block(&dates.hijri, "date.hijri"))
    };

    DayTimings {
        times,
        midnight,
        date,
        hijri,
    }
}

/// Turn a raw timings response body into [`DayTimings`].
///
/// Only an unreadable body or an explicit failure code is an error; a
/// readable body with missing pieces yields unknown slots.
pub fn parse_timings(body: &str) -> Result<DayTimings, ApiError> {
    let envelope: Envelope = serde_json::from_str(body)?;

    if let Some(code) = envelope.code {
        if code != 200 {
            return Err(ApiError::Rejected {
                code,
                status: envelope.status.unwrap_or_default(),
            });
        }
    }

    Ok(convert(block(&envelope.data, "data")))
}

// ─── Client ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AladhanClient {
    http: Client,
    base_url: String,
    method: u8,
    school: u8,
}

impl AladhanClient {
    pub fn new(http: Client, config: &ApiConfig) -> Self {
        Self {
            http,
            base_url: config.timings_url.trim_end_matches('/').to_string(),
            method: config.method,
            school: config.school,
        }
    }

    pub fn fetch_times_for(
        &self,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
    ) -> Result<DayTimings, ApiError> {
        let url = format!("{}/timings/{}", self.base_url, date.format("%d-%m-%Y"));
        debug!("GET {} lat={} lon={}", url, latitude, longitude);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("method", self.method.to_string()),
                ("school", self.school.to_string()),
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

        let timings = parse_timings(&body)?;
        info!(
            "Fetched timings for {} ({}/6 known)",
            date,
            timings.times.iter().filter(|(_, t)| t.is_known()).count()
        );
        Ok(timings)
    }
}

impl TimingsSource for AladhanClient {
    fn fetch_todays_times(&self, latitude: f64, longitude: f64) -> Result<DayTimings, ApiError> {
        self.fetch_times_for(Local::now().date_naive(), latitude, longitude)
    }
}
