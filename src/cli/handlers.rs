use anyhow::{Context, Result, anyhow};
use chrono::{Local, TimeZone};
use rusqlite::Connection;
use std::io::{self, Write};
use std::ops::ControlFlow;
use std::time::Duration;

use crate::api::{AladhanClient, http_client};
use crate::config::AppConfig;
use crate::db::MetaRepo;
use crate::models::{ClockTime, DayTimings};
use crate::prayer_times::{
    Clock, FixedClock, PrayerScheduleTracker, ScheduledTask, SystemClock, TimingsOrigin, load_today,
};
use crate::utils::format::{format_duration_secs, format_time};
use crate::utils::hijri::hijri_label;

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const AMBER: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;232;190;96m";

fn fetch_today(conn: &Connection, config: &AppConfig, offline: bool) -> Result<(DayTimings, TimingsOrigin)> {
    let client = AladhanClient::new(http_client(&config.api)?, &config.api);
    load_today(
        &client,
        conn,
        config.location.latitude,
        config.location.longitude,
        offline,
    )
    .context("Loading today's prayer times")
}

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times(
    conn: &Connection,
    config: &AppConfig,
    offline: bool,
    at: Option<&str>,
) -> Result<()> {
    let (timings, origin) = fetch_today(conn, config, offline)?;
    if origin == TimingsOrigin::Cache {
        if let Some(last) = MetaRepo::get(conn, MetaRepo::LAST_FETCH)? {
            println_colored!(DIM, "  Using cached times (last fetched {})", last);
        }
    }

    match at {
        None => print_times(config, &timings, origin, SystemClock),
        Some(s) => {
            let time = ClockTime::parse(s)
                .and_then(|c| c.time())
                .ok_or_else(|| anyhow!("Expected HH:MM, got '{}'", s))?;
            let today = Local::now().date_naive();
            let now = Local
                .from_local_datetime(&today.and_time(time))
                .earliest()
                .ok_or_else(|| anyhow!("{} does not exist today in the local timezone", s))?;
            print_times(config, &timings, origin, FixedClock(now))
        }
    }
}

fn print_times<C: Clock>(
    config: &AppConfig,
    timings: &DayTimings,
    origin: TimingsOrigin,
    clock: C,
) -> Result<()> {
    let now = clock.now();
    let today = now.date_naive();
    let now_time = now.time();

    let mut tracker = PrayerScheduleTracker::with_times(clock, timings.times);
    let state = tracker.tick();
    let next = tracker.state().next_prayer;

    println!();
    println_colored!(
        GOLD,
        "  Prayer Times — {} ({})",
        config.location.name,
        today.format("%Y-%m-%d")
    );
    println_colored!(
        DIM,
        "  {}  ·  {}",
        hijri_label(timings.hijri.as_ref(), today, config.display.hijri_offset),
        origin.label()
    );
    println!();

    for (name, time) in timings.times.iter() {
        let time_str = time.time().map(format_time).unwrap_or_else(|| "--".to_string());
        let marker = if next == Some(name) { "›" } else { " " };
        let is_past = time.time().is_some_and(|t| t <= now_time);
        if is_past {
            println_colored!(DIM, " {} {:<10}  {}", marker, name.display_name(), time_str);
        } else {
            println_colored!(BOLD, " {} {:<10}  {}", marker, name.display_name(), time_str);
        }
    }
    if timings.midnight.is_known() {
        println_colored!(DIM, "   {:<10}  {}", "Midnight", timings.midnight);
    }

    println!();
    if state.is_ready {
        let secs = tracker
            .state()
            .remaining
            .map(|d| d.num_seconds())
            .unwrap_or_default();
        println_colored!(
            AMBER,
            "  Next: {} in {}  ({})",
            state.next_prayer_name,
            state.countdown_text,
            format_duration_secs(secs)
        );
    } else {
        println_colored!(DIM, "  Next: prayer times unavailable");
    }
    println!();
    Ok(())
}

// ─── Countdown ───────────────────────────────────────────────────────────────

pub fn handle_countdown(
    conn: &Connection,
    config: &AppConfig,
    ticks: Option<u32>,
    offline: bool,
) -> Result<()> {
    let (timings, _) = fetch_today(conn, config, offline)?;
    let mut tracker = PrayerScheduleTracker::with_times(SystemClock, timings.times);
    let mut remaining_ticks = ticks;

    let task = ScheduledTask::spawn(
        "countdown",
        Duration::from_millis(config.display.tick_ms.max(1)),
        move || {
            let state = tracker.tick();
            let line = if state.is_ready {
                format!("{}{:<8}{} {}", BOLD, state.next_prayer_name, "\x1b[0m", state.countdown_text)
            } else {
                format!("{}waiting for prayer times\x1b[0m", DIM)
            };
            print!("\r  {}  ", line);
            let _ = io::stdout().flush();

            match remaining_ticks.as_mut() {
                Some(n) => {
                    *n = n.saturating_sub(1);
                    if *n == 0 {
                        ControlFlow::Break(())
                    } else {
                        ControlFlow::Continue(())
                    }
                }
                None => ControlFlow::Continue(()),
            }
        },
    )
    .context("Starting countdown timer")?;

    task.wait();
    println!();
    Ok(())
}

// ─── Location ────────────────────────────────────────────────────────────────

pub fn handle_location(
    config: &mut AppConfig,
    lat: Option<f64>,
    lon: Option<f64>,
    name: Option<String>,
) -> Result<()> {
    let changed = lat.is_some() || lon.is_some() || name.is_some();

    if let (Some(lat), Some(lon)) = (lat, lon) {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(anyhow!("Coordinates out of range: {}, {}", lat, lon));
        }
        config.location.latitude = lat;
        config.location.longitude = lon;
    }
    if let Some(name) = name {
        config.location.name = name;
    }

    if changed {
        config.save()?;
        println_colored!(GOLD, "  ✓ Location saved");
    }

    println!(
        "  {}  ({:.4}, {:.4})",
        config.location.name, config.location.latitude, config.location.longitude
    );
    println_colored!(DIM, "  {}", AppConfig::config_path()?.display());
    Ok(())
}
