//! Calendar days of the meet
//!
//! Parses the loose date labels used on tournaments and matches
//! ("9 nov", "Nov 9 - 2025", "2025-11-09") into comparable days.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static ISO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{4})-([0-9]{1,2})-([0-9]{1,2})").expect("valid ISO date pattern")
});

/// "9 nov", "10 de noviembre de 2025"
static DAY_FIRST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([0-9]{1,2})\s+(?:de\s+)?([a-záéíóú]{3,})\.?(?:,?\s+(?:de\s+)?([0-9]{4}))?")
        .expect("valid day-first pattern")
});

/// "Nov 9 - 2025", "November 10, 2025"
static MONTH_FIRST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-záéíóú]{3,})\.?\s+([0-9]{1,2})\b(?:\s*[-,]?\s*([0-9]{4}))?")
        .expect("valid month-first pattern")
});

const MONTH_ABBR: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// A day of the event, with the year when the source carried one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventDay {
    pub month: u32,
    pub day: u32,
    pub year: Option<i32>,
}

impl EventDay {
    /// Build a day, rejecting impossible month/day combinations
    pub fn new(month: u32, day: u32, year: Option<i32>) -> Option<Self> {
        // 2000 is a leap year, so 29 feb passes when no year is known
        NaiveDate::from_ymd_opt(year.unwrap_or(2000), month, day)?;
        Some(EventDay { month, day, year })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        EventDay {
            month: date.month(),
            day: date.day(),
            year: Some(date.year()),
        }
    }

    /// Parse a date label in any of the accepted shapes
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(caps) = ISO_PATTERN.captures(text) {
            let year: i32 = caps.get(1)?.as_str().parse().ok()?;
            let month: u32 = caps.get(2)?.as_str().parse().ok()?;
            let day: u32 = caps.get(3)?.as_str().parse().ok()?;
            return Self::new(month, day, Some(year));
        }

        for caps in DAY_FIRST_PATTERN.captures_iter(text) {
            let Some(month) = caps.get(2).and_then(|m| month_from_name(m.as_str())) else {
                continue;
            };
            let day: u32 = caps.get(1)?.as_str().parse().ok()?;
            let year = caps.get(3).and_then(|m| m.as_str().parse().ok());
            return Self::new(month, day, year);
        }

        for caps in MONTH_FIRST_PATTERN.captures_iter(text) {
            let Some(month) = caps.get(1).and_then(|m| month_from_name(m.as_str())) else {
                continue;
            };
            let day: u32 = caps.get(2)?.as_str().parse().ok()?;
            let year = caps.get(3).and_then(|m| m.as_str().parse().ok());
            return Self::new(month, day, year);
        }

        None
    }

    /// Same calendar day; years only compared when both are known
    pub fn same_day(&self, other: &EventDay) -> bool {
        self.month == other.month
            && self.day == other.day
            && match (self.year, other.year) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
    }

    /// Stable bucket key, e.g. "nov-9"
    pub fn key(&self) -> String {
        format!("{}-{}", self.month_abbr(), self.day)
    }

    fn month_abbr(&self) -> &'static str {
        (self.month as usize)
            .checked_sub(1)
            .and_then(|i| MONTH_ABBR.get(i))
            .copied()
            .unwrap_or("???")
    }
}

impl fmt::Display for EventDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.month_abbr())?;
        if let Some(year) = self.year {
            write!(f, " {}", year)?;
        }
        Ok(())
    }
}

/// Month number from an English or Spanish name or abbreviation
fn month_from_name(name: &str) -> Option<u32> {
    let month = match name.trim_end_matches('.').to_lowercase().as_str() {
        "jan" | "january" | "ene" | "enero" => 1,
        "feb" | "february" | "febrero" => 2,
        "mar" | "march" | "marzo" => 3,
        "apr" | "april" | "abr" | "abril" => 4,
        "may" | "mayo" => 5,
        "jun" | "june" | "junio" => 6,
        "jul" | "july" | "julio" => 7,
        "aug" | "august" | "ago" | "agosto" => 8,
        "sep" | "sept" | "september" | "set" | "septiembre" | "setiembre" => 9,
        "oct" | "october" | "octubre" => 10,
        "nov" | "november" | "noviembre" => 11,
        "dec" | "december" | "dic" | "diciembre" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso() {
        let day = EventDay::parse("2025-11-09").unwrap();
        assert_eq!(day, EventDay { month: 11, day: 9, year: Some(2025) });

        // Datetime strings keep only the date part
        let day = EventDay::parse("2025-11-10T09:30:00").unwrap();
        assert_eq!(day.day, 10);
    }

    #[test]
    fn test_parse_day_first() {
        assert_eq!(
            EventDay::parse("9 nov"),
            Some(EventDay { month: 11, day: 9, year: None })
        );
        assert_eq!(
            EventDay::parse("10 de noviembre de 2025"),
            Some(EventDay { month: 11, day: 10, year: Some(2025) })
        );
        assert_eq!(EventDay::parse("3 ene").map(|d| d.month), Some(1));
    }

    #[test]
    fn test_parse_month_first() {
        assert_eq!(
            EventDay::parse("Nov 9 - 2025"),
            Some(EventDay { month: 11, day: 9, year: Some(2025) })
        );
        assert_eq!(
            EventDay::parse("November 10, 2025"),
            Some(EventDay { month: 11, day: 10, year: Some(2025) })
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(EventDay::parse(""), None);
        assert_eq!(EventDay::parse("sábado"), None);
        assert_eq!(EventDay::parse("31 feb"), None);
        assert_eq!(EventDay::parse("2025-13-01"), None);
        assert_eq!(EventDay::parse("Martes 11"), None);
        assert_eq!(EventDay::parse("Octavos 3"), None);
        assert_eq!(EventDay::parse("3 marcadores"), None);
    }

    #[test]
    fn test_same_day_ignores_missing_year() {
        let a = EventDay::parse("9 nov").unwrap();
        let b = EventDay::parse("2025-11-09").unwrap();
        let c = EventDay::parse("2024-11-09").unwrap();
        assert!(a.same_day(&b));
        assert!(a.same_day(&c));
        assert!(!b.same_day(&c));
        assert!(!a.same_day(&EventDay::parse("10 nov").unwrap()));
    }

    #[test]
    fn test_key_and_display() {
        let day = EventDay::parse("Nov 10 - 2025").unwrap();
        assert_eq!(day.key(), "nov-10");
        assert_eq!(day.to_string(), "10 nov 2025");
    }
}
