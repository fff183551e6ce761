use chrono::{Datelike, Duration, NaiveDate};
use hijri_date::HijriDate;
use log::debug;

use crate::models::HijriDay;

/// Islamic month names in English (index 0 = Muharram = month 1)
const HIJRI_MONTH_NAMES: &[&str] = &[
    "Muharram",
    "Safar",
    "Rabi' al-Awwal",
    "Rabi' al-Thani",
    "Jumada al-Awwal",
    "Jumada al-Thani",
    "Rajab",
    "Sha'ban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qi'dah",
    "Dhu al-Hijjah",
];

pub fn hijri_month_name(month: usize) -> &'static str {
    if (1..=12).contains(&month) {
        HIJRI_MONTH_NAMES[month - 1]
    } else {
        "Unknown"
    }
}

/// Compute the Hijri date for a Gregorian day, shifted by `offset_days`
/// for local moon sighting (e.g. -1 where the month starts a day later).
pub fn local_hijri(date: NaiveDate, offset_days: i32) -> Option<HijriDay> {
    let adjusted = date + Duration::days(offset_days as i64);
    match HijriDate::from_gr(
        adjusted.year() as usize,
        adjusted.month() as usize,
        adjusted.day() as usize,
    ) {
        Ok(hd) => Some(HijriDay {
            day: hd.day() as u32,
            month_name: hijri_month_name(hd.month()).to_string(),
            year: hd.year() as u32,
        }),
        Err(e) => {
            debug!("Hijri conversion failed for {}: {}", adjusted, e);
            None
        }
    }
}

/// Header label: the provider's Hijri date when it sent one, otherwise the
/// locally computed date.
pub fn hijri_label(provided: Option<&HijriDay>, date: NaiveDate, offset_days: i32) -> String {
    provided
        .cloned()
        .or_else(|| local_hijri(date, offset_days))
        .map(|h| h.formatted())
        .unwrap_or_else(|| "--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_names() {
        assert_eq!(hijri_month_name(1), "Muharram");
        assert_eq!(hijri_month_name(9), "Ramadan");
        assert_eq!(hijri_month_name(0), "Unknown");
        assert_eq!(hijri_month_name(13), "Unknown");
    }

    #[test]
    fn test_provider_date_wins() {
        let provided = HijriDay {
            day: 6,
            month_name: "Jumada al-Awwal".to_string(),
            year: 1448,
        };
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(hijri_label(Some(&provided), date, -1), "6 Jumada al-Awwal 1448");
    }

    #[test]
    fn test_local_fallback_is_plausible() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let hijri = local_hijri(date, 0).unwrap();
        assert!((1..=30).contains(&hijri.day));
        assert!((1447..=1449).contains(&hijri.year));
        assert_ne!(hijri.month_name, "Unknown");
    }
}
