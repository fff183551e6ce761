use std::io;
use std::ops::ControlFlow;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, warn};

/// A callback run on a fixed interval on its own thread.
///
/// The callback runs once right away and then once per `interval`. Ticks
/// never overlap: a slow callback delays the next tick rather than racing
/// it. The task stops when the callback returns `Break`, when
/// [`cancel`](Self::cancel) is called, or when the task is dropped.
pub struct ScheduledTask {
    name: String,
    cancel: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    pub fn spawn<F>(name: &str, interval: Duration, mut callback: F) -> io::Result<Self>
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        let thread_name = name.to_string();

        let thread = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                let mut next_tick = Instant::now();
                loop {
                    if callback().is_break() {
                        debug!("task '{}' finished", thread_name);
                        break;
                    }

                    next_tick += interval;
                    let wait = next_tick.saturating_duration_since(Instant::now());
                    match cancel_rx.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                            debug!("task '{}' cancelled", thread_name);
                            break;
                        }
                    }

                    // Fell more than a whole interval behind (suspend, slow
                    // callback): resume from now instead of bursting.
                    let now = Instant::now();
                    if now > next_tick + interval {
                        next_tick = now;
                    }
                }
            })?;

        Ok(Self {
            name: name.to_string(),
            cancel: Some(cancel_tx),
            thread: Some(thread),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop the task and wait for an in-flight tick to complete.
    pub fn cancel(mut self) {
        self.shutdown(true);
    }

    /// Block until the callback itself ends the task.
    pub fn wait(mut self) {
        self.shutdown(false);
    }

    fn shutdown(&mut self, signal: bool) {
        if signal {
            if let Some(tx) = self.cancel.take() {
                let _ = tx.send(());
            }
        }
        if let Some(thread) = self.thread.take() {
            if thread.thread().id() == thread::current().id() {
                return;
            }
            if thread.join().is_err() {
                warn!("task '{}' panicked", self.name);
            }
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.shutdown(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_runs_immediately_and_repeats() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let task = ScheduledTask::spawn("test-repeat", Duration::from_millis(10), move || {
            c.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        })
        .unwrap();

        thread::sleep(Duration::from_millis(100));
        task.cancel();
        assert!(count.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn test_no_ticks_after_cancel() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let task = ScheduledTask::spawn("test-cancel", Duration::from_millis(5), move || {
            c.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        })
        .unwrap();

        thread::sleep(Duration::from_millis(30));
        task.cancel();
        let stopped_at = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(count.load(Ordering::SeqCst), stopped_at);
    }

    #[test]
    fn test_drop_cancels() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        {
            let _task = ScheduledTask::spawn("test-drop", Duration::from_millis(5), move || {
                c.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Continue(())
            })
            .unwrap();
            thread::sleep(Duration::from_millis(20));
        }
        let stopped_at = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(count.load(Ordering::SeqCst), stopped_at);
    }

    #[test]
    fn test_cancel_wakes_long_interval() {
        let task = ScheduledTask::spawn("test-wake", Duration::from_secs(3600), || {
            ControlFlow::Continue(())
        })
        .unwrap();
        let started = Instant::now();
        task.cancel();
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_break_ends_task() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let task = ScheduledTask::spawn("test-break", Duration::from_millis(1), move || {
            if c.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();
        assert_eq!(task.name(), "test-break");
        task.wait();
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
