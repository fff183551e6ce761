use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::event::{self, Event as CEvent, KeyEvent};
use log::warn;

use crate::api::ApiError;
use crate::models::DayTimings;

/// Result of one out-of-band fetch for the home screen.
#[derive(Debug)]
pub struct FetchOutcome {
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub fetched: Result<DayTimings, ApiError>,
    pub city: Option<String>,
}

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Tick,
    Timings(Box<FetchOutcome>),
}

/// Single queue the UI loop drains. Keys come from a polling thread; ticks
/// and fetch results are pushed by whoever holds a [`sender`](Self::sender).
pub struct EventHandler {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// Start forwarding terminal key events into the queue.
    pub fn listen_keys(&self) {
        let tx = self.tx.clone();
        thread::spawn(move || forward_keys(&tx, event::poll, event::read));
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}

/// Push key presses into `tx` until the receiver goes away or the terminal
/// stops answering.
fn forward_keys<P, R>(tx: &Sender<Event>, mut poll: P, mut read: R)
where
    P: FnMut(Duration) -> io::Result<bool>,
    R: FnMut() -> io::Result<CEvent>,
{
    loop {
        match poll(Duration::from_millis(250)) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                warn!("Stopped reading keys: {}", e);
                return;
            }
        }
        match read() {
            Ok(CEvent::Key(key)) => {
                if tx.send(Event::Key(key)).is_err() {
                    return;
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Stopped reading keys: {}", e);
                return;
            }
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_poll_error_stops_listener() {
        let (tx, rx) = mpsc::channel();
        let mut polls = 0;
        forward_keys(
            &tx,
            |_| {
                polls += 1;
                Err(io::Error::other("no tty"))
            },
            || panic!("read after failed poll"),
        );
        assert_eq!(polls, 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_keys_forwarded_until_read_fails() {
        let (tx, rx) = mpsc::channel();
        let mut reads = 0;
        forward_keys(
            &tx,
            |_| Ok(true),
            || {
                reads += 1;
                match reads {
                    1 => Ok(CEvent::Key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE))),
                    2 => Ok(CEvent::FocusGained),
                    _ => Err(io::Error::other("closed")),
                }
            },
        );
        assert!(matches!(rx.try_recv(), Ok(Event::Key(k)) if k.code == KeyCode::Char('r')));
        assert!(rx.try_recv().is_err());
        assert_eq!(reads, 3);
    }
}
