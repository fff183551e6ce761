use chrono::{NaiveTime, Timelike};
use std::fmt;

/// The six daily slots, in the order they occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrayerName {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    pub const ALL: [PrayerName; 6] = [
        PrayerName::Fajr,
        PrayerName::Sunrise,
        PrayerName::Dhuhr,
        PrayerName::Asr,
        PrayerName::Maghrib,
        PrayerName::Isha,
    ];

    pub fn index(self) -> usize {
        match self {
            PrayerName::Fajr => 0,
            PrayerName::Sunrise => 1,
            PrayerName::Dhuhr => 2,
            PrayerName::Asr => 3,
            PrayerName::Maghrib => 4,
            PrayerName::Isha => 5,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Sunrise => "Sunrise",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
        }
    }
}

impl fmt::Display for PrayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A local clock time without a date, or the "no data yet" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockTime {
    #[default]
    Unknown,
    At(NaiveTime),
}

impl ClockTime {
    #[cfg(test)]
    pub fn hm(hour: u32, minute: u32) -> Self {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(ClockTime::At)
            .unwrap_or(ClockTime::Unknown)
    }

    /// Parse the leading `HH:MM` token of a timing string.
    ///
    /// Accepts the bare form (`"05:07"`) and the annotated form some
    /// providers return (`"05:07 (PKT)"`). Anything else is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let token = s.split_whitespace().next()?;
        let (h, m) = token.split_once(':')?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return None;
        }
        let hour: u32 = h.parse().ok()?;
        let minute: u32 = m.parse().ok()?;
        NaiveTime::from_hms_opt(hour, minute, 0).map(ClockTime::At)
    }

    /// Same as [`ClockTime::parse`] but degrades to `Unknown`.
    pub fn parse_or_unknown(s: &str) -> Self {
        Self::parse(s).unwrap_or(ClockTime::Unknown)
    }

    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            ClockTime::Unknown => None,
            ClockTime::At(t) => Some(*t),
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, ClockTime::At(_))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockTime::Unknown => f.pad("--"),
            ClockTime::At(t) => f.pad(&format!("{:02}:{:02}", t.hour(), t.minute())),
        }
    }
}

/// Today's clock time for every prayer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrayerTimeSet {
    slots: [ClockTime; 6],
}

impl PrayerTimeSet {
    /// A set with every slot unknown.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn from_slots(slots: [ClockTime; 6]) -> Self {
        Self { slots }
    }

    pub fn get(&self, name: PrayerName) -> ClockTime {
        self.slots[name.index()]
    }

    pub fn set(&mut self, name: PrayerName, time: ClockTime) {
        self.slots[name.index()] = time;
    }

    #[cfg(test)]
    pub fn with(mut self, name: PrayerName, time: ClockTime) -> Self {
        self.set(name, time);
        self
    }

    /// Slots in fixed order, Fajr first.
    pub fn iter(&self) -> impl Iterator<Item = (PrayerName, ClockTime)> + '_ {
        PrayerName::ALL.iter().map(|n| (*n, self.get(*n)))
    }

    pub fn is_unknown(&self) -> bool {
        self.slots.iter().all(|s| !s.is_known())
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(ClockTime::is_known)
    }
}
