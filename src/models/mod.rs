pub mod prayer;
pub mod timings;

pub use prayer::{ClockTime, PrayerName, PrayerTimeSet};
pub use timings::{DayTimings, HijriDay};
