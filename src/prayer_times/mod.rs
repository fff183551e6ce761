pub mod clock;
pub mod loader;
pub mod ticker;
pub mod tracker;

pub use clock::{Clock, FixedClock, SystemClock};
pub use loader::{TimingsOrigin, load_today, resolve_fetch};
pub use ticker::ScheduledTask;
pub use tracker::{DisplayState, PrayerScheduleTracker};
