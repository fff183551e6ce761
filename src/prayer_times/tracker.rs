//! Next-prayer selection and the per-tick countdown state.
//!
//! All instants are built in the timezone of the `now` handed in, which for
//! [`SystemClock`](super::SystemClock) is the device's local zone. Nothing here
//! converts between zones.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};
use log::{debug, info};
use thiserror::Error;

use crate::models::{PrayerName, PrayerTimeSet};
use crate::prayer_times::Clock;
use crate::utils::format::format_countdown_millis;

const EMPTY_COUNTDOWN: &str = "00:00:00";

/// Longest stretch of skipped wall-clock time the rollover walks past.
const MAX_GAP_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// Neither a remaining prayer today nor tomorrow's Fajr can be scheduled.
    #[error("prayer times not available yet")]
    NotReady,
}

/// The prayer selected as next, resolved to an absolute instant.
#[derive(Debug, Clone, PartialEq)]
pub struct NextPrayer<Tz: TimeZone> {
    pub name: PrayerName,
    pub at: DateTime<Tz>,
    /// True when every prayer today has passed and this is tomorrow's Fajr.
    pub rolled_over: bool,
}

/// Resolve a wall-clock time on `date` in `tz`.
///
/// A time skipped by a DST jump yields `None`; a repeated one resolves to
/// its earlier occurrence.
fn instant_on<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&date.and_time(time)).earliest()
}

/// Like [`instant_on`], but a time inside a DST gap moves forward to the
/// first wall-clock minute that exists again.
fn first_instant_from<Tz: TimeZone>(
    tz: &Tz,
    date: NaiveDate,
    time: NaiveTime,
) -> Option<DateTime<Tz>> {
    let start = date.and_time(time);
    (0..=MAX_GAP_MINUTES).find_map(|m| {
        let local = start.checked_add_signed(Duration::minutes(m))?;
        tz.from_local_datetime(&local).earliest()
    })
}

/// Pick the first prayer, in fixed order, whose instant today is strictly
/// after `now`. Falls back to tomorrow's Fajr once today is exhausted.
///
/// Unknown slots are skipped, as are today's slots that fall in a DST gap.
/// Tomorrow's Fajr is never skipped: inside a gap it moves to the end of
/// the gap. A prayer exactly at `now` counts as passed.
pub fn select_next<Tz: TimeZone>(
    times: &PrayerTimeSet,
    now: &DateTime<Tz>,
) -> Result<NextPrayer<Tz>, TrackerError> {
    let tz = now.timezone();
    let today = now.date_naive();

    for (name, clock) in times.iter() {
        let Some(time) = clock.time() else {
            continue;
        };
        let Some(at) = instant_on(&tz, today, time) else {
            debug!("{} at {} does not exist on {}, skipping", name, time, today);
            continue;
        };
        if at > *now {
            return Ok(NextPrayer {
                name,
                at,
                rolled_over: false,
            });
        }
    }

    let fajr = times
        .get(PrayerName::Fajr)
        .time()
        .ok_or(TrackerError::NotReady)?;
    let tomorrow = today.succ_opt().ok_or(TrackerError::NotReady)?;
    let at = first_instant_from(&tz, tomorrow, fajr).ok_or(TrackerError::NotReady)?;

    Ok(NextPrayer {
        name: PrayerName::Fajr,
        at,
        rolled_over: true,
    })
}

/// Countdown text from `now` to `target`, or `None` once the target is
/// reached. A `None` means the target is stale and must be reselected.
pub fn format_remaining<Tz: TimeZone>(target: &DateTime<Tz>, now: &DateTime<Tz>) -> Option<String> {
    let diff = target.clone().signed_duration_since(now.clone());
    format_countdown_millis(diff.num_milliseconds())
}

/// What the UI layer shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub next_prayer_name: String,
    pub countdown_text: String,
    pub is_ready: bool,
}

#[derive(Debug, Clone)]
pub struct TrackerState<Tz: TimeZone> {
    /// Last prayer shown. Survives data swaps and `NotReady` ticks.
    pub next_prayer: Option<PrayerName>,
    /// Instant being counted down to. Cleared when the data set is replaced.
    pub target: Option<DateTime<Tz>>,
    pub remaining: Option<Duration>,
    pub countdown: String,
}

impl<Tz: TimeZone> Default for TrackerState<Tz> {
    fn default() -> Self {
        Self {
            next_prayer: None,
            target: None,
            remaining: None,
            countdown: EMPTY_COUNTDOWN.to_string(),
        }
    }
}

/// Tracks the next prayer for one screen.
///
/// Call [`tick`](Self::tick) once per second. While the current target is
/// still in the future only the countdown text is recomputed; once it is
/// reached (or the data set was replaced) the full selection runs again.
pub struct PrayerScheduleTracker<C: Clock> {
    clock: C,
    times: PrayerTimeSet,
    state: TrackerState<C::Tz>,
}

impl<C: Clock> PrayerScheduleTracker<C> {
    pub fn new(clock: C) -> Self {
        Self::with_times(clock, PrayerTimeSet::unknown())
    }

    pub fn with_times(clock: C, times: PrayerTimeSet) -> Self {
        Self {
            clock,
            times,
            state: TrackerState::default(),
        }
    }

    pub fn times(&self) -> &PrayerTimeSet {
        &self.times
    }

    pub fn state(&self) -> &TrackerState<C::Tz> {
        &self.state
    }

    /// Swap in a freshly fetched set. The displayed text is kept until the
    /// next tick reselects against the new data.
    pub fn set_times(&mut self, times: PrayerTimeSet) {
        self.times = times;
        self.state.target = None;
        self.state.remaining = None;
    }

    pub fn tick(&mut self) -> DisplayState {
        let now = self.clock.now();

        let countdown = self
            .state
            .target
            .as_ref()
            .and_then(|target| format_remaining(target, &now));

        match countdown {
            Some(text) => {
                self.state.remaining = self
                    .state
                    .target
                    .as_ref()
                    .map(|target| target.clone().signed_duration_since(now.clone()));
                self.state.countdown = text;
            }
            None => self.reselect(&now),
        }

        self.display_state()
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            next_prayer_name: self
                .state
                .next_prayer
                .map(|n| n.display_name().to_string())
                .unwrap_or_default(),
            countdown_text: self.state.countdown.clone(),
            is_ready: self.state.next_prayer.is_some(),
        }
    }

    fn reselect(&mut self, now: &DateTime<C::Tz>) {
        let next = match select_next(&self.times, now) {
            Ok(next) => next,
            Err(TrackerError::NotReady) => {
                debug!("no prayer target yet, keeping last display state");
                return;
            }
        };

        if next.rolled_over {
            info!("today's prayers have passed, counting down to tomorrow's Fajr");
        } else if self.state.next_prayer != Some(next.name) {
            info!("next prayer is {} at {}", next.name, next.at.naive_local());
        }

        // `at` is strictly after `now`, so this only falls back when it is
        // less than a millisecond away.
        self.state.countdown =
            format_remaining(&next.at, now).unwrap_or_else(|| EMPTY_COUNTDOWN.to_string());
        self.state.remaining = Some(next.at.clone().signed_duration_since(now.clone()));
        self.state.next_prayer = Some(next.name);
        self.state.target = Some(next.at);
    }
}
