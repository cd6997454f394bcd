//! Match time-of-day helpers

use chrono::{NaiveTime, Timelike};
use std::cmp::Ordering;

/// Parse a 24-hour "HH:MM" (or "H:MM") time
pub fn parse_time(time: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(time.trim(), "%H:%M").ok()
}

/// Earliest first; unparseable times go last
pub fn earliest_first(a: &str, b: &str) -> Ordering {
    match (parse_time(a), parse_time(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Latest first; unparseable times go last
pub fn latest_first(a: &str, b: &str) -> Ordering {
    match (parse_time(a), parse_time(b)) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Convert "13:05" into "1:05 PM". Unparseable input is returned as-is.
pub fn format_time_12h(time: &str) -> String {
    let Some(t) = parse_time(time) else {
        return time.to_string();
    };
    let (is_pm, hour) = t.hour12();
    format!("{}:{:02} {}", hour, t.minute(), if is_pm { "PM" } else { "AM" })
}
