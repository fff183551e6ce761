use chrono::NaiveTime;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Format a millisecond difference as a zero-padded "HH:MM:SS" countdown.
///
/// Hours do not wrap at 24 and fractional seconds are truncated.
/// Returns `None` when the difference is not positive.
pub fn format_countdown_millis(diff_ms: i64) -> Option<String> {
    if diff_ms <= 0 {
        return None;
    }
    let hours = diff_ms / 3_600_000;
    let minutes = (diff_ms % 3_600_000) / 60_000;
    let seconds = (diff_ms % 60_000) / 1000;
    Some(format!("{:02}:{:02}:{:02}", hours, minutes, seconds))
}

/// Format a duration in seconds to "Xh Ym" or "Ym" string
pub fn format_duration_secs(secs: i64) -> String {
    if secs <= 0 {
        return "now".to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Format a NaiveTime to "HH:MM"
pub fn format_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// Truncate or right-pad `s` to exactly `width` terminal columns.
///
/// City names from reverse geocoding are often non-Latin, so this counts
/// display columns instead of chars.
pub fn fit_width(s: &str, width: usize) -> String {
    if s.width() <= width {
        let pad = width - s.width();
        return format!("{}{}", s, " ".repeat(pad));
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}
