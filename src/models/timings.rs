use chrono::NaiveDate;

use crate::models::{ClockTime, PrayerTimeSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HijriDay {
    pub day: u32,
    pub month_name: String,
    pub year: u32,
}

impl HijriDay {
    pub fn formatted(&self) -> String {
        format!("{} {} {}", self.day, self.month_name, self.year)
    }
}

/// Everything a single timings fetch yields for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayTimings {
    pub times: PrayerTimeSet,
    pub midnight: ClockTime,
    /// Gregorian date the provider computed the timings for, if reported.
    pub date: Option<NaiveDate>,
    pub hijri: Option<HijriDay>,
}

impl DayTimings {
    pub fn unknown() -> Self {
        Self {
            times: PrayerTimeSet::unknown(),
            midnight: ClockTime::Unknown,
            date: None,
            hijri: None,
        }
    }
}
