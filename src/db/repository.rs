use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};

use crate::models::{ClockTime, DayTimings, HijriDay, PrayerName, PrayerTimeSet};

// ─── Cached timings ─────────────────────────────────────────────────────────

/// ~11 m of precision; nearby fixes share a cache row.
fn round_coord(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub struct CacheRepo;

impl CacheRepo {
    pub fn store(
        conn: &Connection,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
        timings: &DayTimings,
    ) -> Result<()> {
        let t = &timings.times;
        let hijri = timings.hijri.as_ref();
        conn.execute(
            "INSERT OR REPLACE INTO timings_cache
                (date, latitude, longitude, fajr, sunrise, dhuhr, asr, maghrib, isha, midnight,
                 hijri_day, hijri_month, hijri_year, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, datetime('now'))",
            params![
                date_key(date),
                round_coord(latitude),
                round_coord(longitude),
                t.get(PrayerName::Fajr).to_string(),
                t.get(PrayerName::Sunrise).to_string(),
                t.get(PrayerName::Dhuhr).to_string(),
                t.get(PrayerName::Asr).to_string(),
                t.get(PrayerName::Maghrib).to_string(),
                t.get(PrayerName::Isha).to_string(),
                timings.midnight.to_string(),
                hijri.map(|h| h.day),
                hijri.map(|h| h.month_name.clone()),
                hijri.map(|h| h.year),
            ],
        )?;
        Ok(())
    }

    pub fn get(
        conn: &Connection,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<DayTimings>> {
        let row = conn
            .query_row(
                "SELECT fajr, sunrise, dhuhr, asr, maghrib, isha, midnight,
                        hijri_day, hijri_month, hijri_year
                 FROM timings_cache
                 WHERE date = ?1 AND latitude = ?2 AND longitude = ?3",
                params![date_key(date), round_coord(latitude), round_coord(longitude)],
                |row| {
                    let mut slots = [ClockTime::Unknown; 6];
                    for (i, slot) in slots.iter_mut().enumerate() {
                        *slot = ClockTime::parse_or_unknown(&row.get::<_, String>(i)?);
                    }
                    let midnight = ClockTime::parse_or_unknown(&row.get::<_, String>(6)?);
                    let hijri_day: Option<u32> = row.get(7)?;
                    let hijri_month: Option<String> = row.get(8)?;
                    let hijri_year: Option<u32> = row.get(9)?;
                    Ok((slots, midnight, hijri_day, hijri_month, hijri_year))
                },
            )
            .optional()?;

        Ok(row.map(|(slots, midnight, day, month, year)| {
            let hijri = match (day, month, year) {
                (Some(day), Some(month_name), Some(year)) => Some(HijriDay {
                    day,
                    month_name,
                    year,
                }),
                _ => None,
            };
            DayTimings {
                times: PrayerTimeSet::from_slots(slots),
                midnight,
                date: Some(date),
                hijri,
            }
        }))
    }

    /// Drop rows older than `date`. Returns the number removed.
    pub fn prune_before(conn: &Connection, date: NaiveDate) -> Result<usize> {
        let removed = conn.execute(
            "DELETE FROM timings_cache WHERE date < ?1",
            params![date_key(date)],
        )?;
        Ok(removed)
    }
}

// ─── App meta ───────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    /// RFC 3339 timestamp of the last fetch that reached the network.
    pub const LAST_FETCH: &'static str = "last_fetch";

    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}
