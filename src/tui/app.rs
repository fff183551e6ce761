use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::{debug, warn};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;
use std::ops::ControlFlow;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::api::{AladhanClient, Geocoder, TimingsSource, http_client};
use crate::config::AppConfig;
use crate::models::DayTimings;
use crate::prayer_times::{
    DisplayState, PrayerScheduleTracker, ScheduledTask, SystemClock, TimingsOrigin, resolve_fetch,
};
use crate::tui::events::{Event, EventHandler, FetchOutcome};
use crate::tui::theme;
use crate::tui::widgets::{header, next_prayer, prayers, statusbar};
use crate::utils::hijri::hijri_label;

/// The home screen. Owns its tracker and the timer driving it.
pub struct App {
    pub config: AppConfig,
    pub should_quit: bool,
    pub show_help: bool,

    pub tracker: PrayerScheduleTracker<SystemClock>,
    pub display: DisplayState,
    pub timings: DayTimings,
    pub origin: Option<TimingsOrigin>,
    pub city: String,
    pub today: NaiveDate,
    pub loading: bool,
    pub last_error: Option<String>,

    client: AladhanClient,
    geocoder: Option<Geocoder>,
    events: Option<Sender<Event>>,
    timer: Option<ScheduledTask>,
}

impl App {
    pub fn new(config: AppConfig, client: AladhanClient, geocoder: Option<Geocoder>) -> Self {
        let tracker = PrayerScheduleTracker::new(SystemClock);
        let display = tracker.display_state();
        let city = config.location.name.clone();

        App {
            config,
            should_quit: false,
            show_help: false,
            tracker,
            display,
            timings: DayTimings::unknown(),
            origin: None,
            city,
            today: Local::now().date_naive(),
            loading: false,
            last_error: None,
            client,
            geocoder,
            events: None,
            timer: None,
        }
    }

    /// Start the countdown timer and the first fetch.
    pub fn mount(&mut self, events: Sender<Event>) -> Result<()> {
        let tick_tx = events.clone();
        let interval = Duration::from_millis(self.config.display.tick_ms.max(1));
        let timer = ScheduledTask::spawn("home-tick", interval, move || {
            match tick_tx.send(Event::Tick) {
                Ok(()) => ControlFlow::Continue(()),
                Err(_) => ControlFlow::Break(()),
            }
        })
        .context("Starting countdown timer")?;

        self.timer = Some(timer);
        self.events = Some(events);
        self.request_fetch();
        Ok(())
    }

    /// Stop the timer. Safe to call more than once.
    pub fn unmount(&mut self) {
        if let Some(timer) = self.timer.take() {
            debug!("Stopping {}", timer.name());
            timer.cancel();
        }
        self.events = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.timer.is_some()
    }

    /// Fetch timings (and the city name) on a worker thread. The result
    /// comes back as [`Event::Timings`].
    pub fn request_fetch(&mut self) {
        if self.loading {
            return;
        }
        let Some(tx) = self.events.clone() else {
            return;
        };

        self.loading = true;
        let client = self.client.clone();
        let geocoder = self.geocoder.clone();
        let latitude = self.config.location.latitude;
        let longitude = self.config.location.longitude;
        let date = Local::now().date_naive();

        thread::spawn(move || {
            let fetched = client.fetch_todays_times(latitude, longitude);
            let city = geocoder.map(|g| g.reverse_city(latitude, longitude));
            let outcome = FetchOutcome {
                date,
                latitude,
                longitude,
                fetched,
                city,
            };
            let _ = tx.send(Event::Timings(Box::new(outcome)));
        });
    }

    /// Apply a finished fetch. Failures keep whatever is shown now.
    pub fn on_timings(&mut self, conn: &Connection, outcome: FetchOutcome) {
        self.loading = false;

        if let Some(city) = outcome.city {
            if city != crate::api::geocode::UNKNOWN_CITY {
                self.city = city;
            }
        }

        match resolve_fetch(
            conn,
            outcome.date,
            outcome.latitude,
            outcome.longitude,
            outcome.fetched,
        ) {
            Ok((timings, origin)) => {
                if let Some(date) = timings.date {
                    if date != outcome.date {
                        warn!("Provider sent timings for {} (asked for {})", date, outcome.date);
                    }
                }
                self.tracker.set_times(timings.times);
                self.timings = timings;
                self.origin = Some(origin);
                self.today = outcome.date;
                self.last_error = None;
                self.tick();
            }
            Err(e) => {
                warn!("Keeping previous timings: {:#}", e);
                self.last_error = Some("could not fetch prayer times".to_string());
            }
        }
    }

    pub fn tick(&mut self) {
        self.display = self.tracker.tick();

        // Timings are per calendar day; refresh once the date moves on.
        let today = Local::now().date_naive();
        if today != self.today && !self.loading && self.is_mounted() {
            debug!("Date changed to {}, refetching timings", today);
            self.today = today;
            self.request_fetch();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Some terminals also report release and repeat events
        if key.kind != KeyEventKind::Press {
            return;
        }
        if self.show_help {
            self.show_help = false;
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('r') => self.request_fetch(),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::screen()), area);

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(9),
                Constraint::Length(1),
            ])
            .split(area);

        let hijri = hijri_label(
            self.timings.hijri.as_ref(),
            self.today,
            self.config.display.hijri_offset,
        );
        header::render(frame, outer[0], &self.city, &hijri, self.today);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer[1]);

        prayers::render(
            frame,
            body[0],
            self.tracker.times(),
            self.timings.midnight,
            self.tracker.state().next_prayer,
            Local::now().time(),
        );
        next_prayer::render(frame, body[1], &self.display, self.loading);

        statusbar::render(
            frame,
            outer[2],
            self.origin.map(|o| o.label()),
            self.last_error.as_deref(),
        );

        if self.show_help {
            self.draw_help_overlay(frame);
        }
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();

        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: (area.height / 2).min(10),
        };

        frame.render_widget(Clear, popup_area);

        let help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::accent().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("  [r]          ", theme::accent()),
                Span::styled("Refetch today's times", theme::muted()),
            ]),
            Line::from(vec![
                Span::styled("  [?]          ", theme::accent()),
                Span::styled("Toggle help", theme::muted()),
            ]),
            Line::from(vec![
                Span::styled("  [q] / [Esc]  ", theme::accent()),
                Span::styled("Quit", theme::muted()),
            ]),
        ];

        let block = Block::default()
            .title(Span::styled(" Help ", theme::accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::accent())
            .style(theme::panel());

        let paragraph = Paragraph::new(help_text).block(block);
        frame.render_widget(paragraph, popup_area);
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Run the home screen until the user quits.
pub fn run(conn: Connection, config: AppConfig) -> Result<()> {
    let http = http_client(&config.api)?;
    let client = AladhanClient::new(http.clone(), &config.api);
    let geocoder = config
        .location
        .reverse_geocode
        .then(|| Geocoder::new(http, &config.api));

    let mut app = App::new(config, client, geocoder);
    let events = EventHandler::new();
    events.listen_keys();

    // Mount before taking over the terminal so a failure leaves it untouched.
    app.mount(events.sender())?;
    let mut terminal = ratatui::init();

    let result = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| app.draw(frame))?;

            match events.next()? {
                Event::Key(key) => {
                    app.handle_key(key);
                    if app.should_quit {
                        break;
                    }
                }
                Event::Tick => app.tick(),
                Event::Timings(outcome) => app.on_timings(&conn, *outcome),
            }
        }
        Ok(())
    })();

    app.unmount();
    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::db::migrations::run_migrations;
    use crate::models::{ClockTime, PrayerTimeSet};
    use crossterm::event::KeyModifiers;
    use std::sync::mpsc;

    fn app() -> App {
        let mut config = AppConfig::default();
        // nothing listens on the discard port; fetches fail fast
        config.api.timings_url = "http://127.0.0.1:9".to_string();
        let client = AladhanClient::new(reqwest::blocking::Client::new(), &config.api);
        App::new(config, client, None)
    }

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn outcome(fetched: Result<DayTimings, ApiError>) -> FetchOutcome {
        FetchOutcome {
            date: Local::now().date_naive(),
            latitude: 33.6938,
            longitude: 73.0651,
            fetched,
            city: Some("Islamabad".to_string()),
        }
    }

    fn all_day() -> DayTimings {
        // one minute before midnight keeps a future target all day
        DayTimings {
            times: PrayerTimeSet::from_slots([ClockTime::hm(23, 59); 6]),
            ..DayTimings::unknown()
        }
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn test_starts_not_ready() {
        let app = app();
        assert!(!app.display.is_ready);
        assert_eq!(app.display.countdown_text, "00:00:00");
        assert!(!app.is_mounted());
    }

    #[test]
    fn test_timings_make_tracker_ready() {
        let conn = conn();
        let mut app = app();
        app.on_timings(&conn, outcome(Ok(all_day())));

        assert!(app.display.is_ready);
        assert_eq!(app.origin, Some(TimingsOrigin::Network));
        assert_eq!(app.tracker.times(), &all_day().times);
        assert!(app.last_error.is_none());
    }

    #[test]
    fn test_failed_fetch_keeps_state() {
        let conn = conn();
        let mut app = app();
        app.on_timings(&conn, outcome(Ok(all_day())));
        let before = app.display.clone();

        app.on_timings(
            &conn,
            outcome(Err(ApiError::Status {
                status: 500,
                body: String::new(),
            })),
        );
        // falls back to the row cached by the first fetch
        assert_eq!(app.origin, Some(TimingsOrigin::Cache));
        assert_eq!(app.display.next_prayer_name, before.next_prayer_name);
    }

    #[test]
    fn test_failed_fetch_without_cache_stays_unknown() {
        let conn = conn();
        let mut app = app();
        app.on_timings(
            &conn,
            outcome(Err(ApiError::Status {
                status: 500,
                body: String::new(),
            })),
        );
        assert!(app.tracker.times().is_unknown());
        assert!(!app.display.is_ready);
        assert!(app.last_error.is_some());
        assert!(!app.loading);
    }

    #[test]
    fn test_keys() {
        let mut app = app();
        app.handle_key(key('?'));
        assert!(app.show_help);
        // any key closes help without acting
        app.handle_key(key('q'));
        assert!(!app.show_help);
        assert!(!app.should_quit);
        app.handle_key(key('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_draw_lists_tracker_times() {
        use ratatui::{Terminal, backend::TestBackend};

        let conn = conn();
        let mut app = app();
        app.on_timings(&conn, outcome(Ok(all_day())));

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Maghrib"));
        assert!(screen.contains("23:59"));
    }

    #[test]
    fn test_mount_ticks_and_unmount_cancels() {
        let mut app = app();
        let (tx, rx) = mpsc::channel();
        app.config.display.tick_ms = 5;
        app.mount(tx).unwrap();
        assert!(app.is_mounted());

        let mut saw_tick = false;
        for _ in 0..20 {
            match rx.recv_timeout(Duration::from_secs(5)) {
                Ok(Event::Tick) => {
                    saw_tick = true;
                    break;
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
        assert!(saw_tick);

        app.unmount();
        assert!(!app.is_mounted());
        // drain what was queued before cancellation, then nothing more arrives
        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(30));
        assert!(!matches!(rx.try_recv(), Ok(Event::Tick)));
    }
}
