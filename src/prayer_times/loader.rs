use anyhow::{Result, anyhow};
use chrono::{Local, NaiveDate};
use log::{info, warn};
use rusqlite::Connection;

use crate::api::{ApiError, TimingsSource};
use crate::db::{CacheRepo, MetaRepo};
use crate::models::DayTimings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingsOrigin {
    Network,
    Cache,
}

impl TimingsOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            TimingsOrigin::Network => "live",
            TimingsOrigin::Cache => "cached",
        }
    }
}

/// Settle the outcome of a fetch against the cache.
///
/// A successful fetch with at least one known slot is written through. A
/// failed or empty one falls back to the cached row for the same day and
/// place, if any. Without either the error is returned and the caller keeps
/// its times unknown.
pub fn resolve_fetch(
    conn: &Connection,
    date: NaiveDate,
    latitude: f64,
    longitude: f64,
    fetched: Result<DayTimings, ApiError>,
) -> Result<(DayTimings, TimingsOrigin)> {
    let failure = match fetched {
        Ok(timings) if !timings.times.is_unknown() => {
            if !timings.times.is_complete() {
                warn!("Timings for {} are partial, unknown slots will be skipped", date);
            }
            CacheRepo::store(conn, date, latitude, longitude, &timings)?;
            MetaRepo::set(conn, MetaRepo::LAST_FETCH, &Local::now().to_rfc3339())?;
            return Ok((timings, TimingsOrigin::Network));
        }
        Ok(_) => anyhow!("Timings response contained no usable times"),
        Err(e) => anyhow!(e),
    };

    warn!("Fetching timings failed: {}", failure);
    match CacheRepo::get(conn, date, latitude, longitude)? {
        Some(cached) => {
            info!("Using cached timings for {}", date);
            Ok((cached, TimingsOrigin::Cache))
        }
        None => Err(failure.context("No cached timings for today either")),
    }
}

/// Fetch today's timings, falling back to the cache. With `offline` the
/// network is skipped entirely.
pub fn load_today<S: TimingsSource>(
    source: &S,
    conn: &Connection,
    latitude: f64,
    longitude: f64,
    offline: bool,
) -> Result<(DayTimings, TimingsOrigin)> {
    let today = Local::now().date_naive();
    if offline {
        return CacheRepo::get(conn, today, latitude, longitude)?
            .map(|t| (t, TimingsOrigin::Cache))
            .ok_or_else(|| anyhow!("No cached timings for {}", today));
    }
    let fetched = source.fetch_todays_times(latitude, longitude);
    resolve_fetch(conn, today, latitude, longitude, fetched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{ClockTime, PrayerTimeSet};
    use std::cell::Cell;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn timings() -> DayTimings {
        DayTimings {
            times: PrayerTimeSet::from_slots([ClockTime::hm(5, 0); 6]),
            ..DayTimings::unknown()
        }
    }

    fn offline_error() -> ApiError {
        ApiError::Status {
            status: 503,
            body: String::new(),
        }
    }

    struct FakeSource {
        calls: Cell<u32>,
        ok: bool,
    }

    impl TimingsSource for FakeSource {
        fn fetch_todays_times(&self, _: f64, _: f64) -> Result<DayTimings, ApiError> {
            self.calls.set(self.calls.get() + 1);
            if self.ok { Ok(timings()) } else { Err(offline_error()) }
        }
    }

    #[test]
    fn test_success_writes_through() {
        let conn = conn();
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let (t, origin) = resolve_fetch(&conn, date, 1.0, 2.0, Ok(timings())).unwrap();
        assert_eq!(origin, TimingsOrigin::Network);
        assert_eq!(t.times, timings().times);
        assert!(CacheRepo::get(&conn, date, 1.0, 2.0).unwrap().is_some());
        assert!(MetaRepo::get(&conn, MetaRepo::LAST_FETCH).unwrap().is_some());
    }

    #[test]
    fn test_failure_falls_back_to_cache() {
        let conn = conn();
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        CacheRepo::store(&conn, date, 1.0, 2.0, &timings()).unwrap();

        let (t, origin) = resolve_fetch(&conn, date, 1.0, 2.0, Err(offline_error())).unwrap();
        assert_eq!(origin, TimingsOrigin::Cache);
        assert!(t.times.is_complete());
    }

    #[test]
    fn test_empty_response_is_not_cached() {
        let conn = conn();
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert!(resolve_fetch(&conn, date, 1.0, 2.0, Ok(DayTimings::unknown())).is_err());
        assert!(CacheRepo::get(&conn, date, 1.0, 2.0).unwrap().is_none());
    }

    #[test]
    fn test_failure_without_cache_is_error() {
        let conn = conn();
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert!(resolve_fetch(&conn, date, 1.0, 2.0, Err(offline_error())).is_err());
    }

    #[test]
    fn test_offline_skips_network() {
        let conn = conn();
        let source = FakeSource {
            calls: Cell::new(0),
            ok: true,
        };
        assert!(load_today(&source, &conn, 1.0, 2.0, true).is_err());
        assert_eq!(source.calls.get(), 0);

        let (_, origin) = load_today(&source, &conn, 1.0, 2.0, false).unwrap();
        assert_eq!(origin, TimingsOrigin::Network);
        assert_eq!(source.calls.get(), 1);

        let (_, origin) = load_today(&source, &conn, 1.0, 2.0, true).unwrap();
        assert_eq!(origin, TimingsOrigin::Cache);
    }

    #[test]
    fn test_network_failure_uses_cache() {
        let conn = conn();
        let good = FakeSource {
            calls: Cell::new(0),
            ok: true,
        };
        load_today(&good, &conn, 1.0, 2.0, false).unwrap();

        let bad = FakeSource {
            calls: Cell::new(0),
            ok: false,
        };
        let (_, origin) = load_today(&bad, &conn, 1.0, 2.0, false).unwrap();
        assert_eq!(origin, TimingsOrigin::Cache);
        assert_eq!(bad.calls.get(), 1);
    }
}
