//! Day-by-day match classification
//!
//! Splits a tournament's matches into one bucket per event day, each holding
//! pending and finished matches in display order.

use super::clock::{earliest_first, latest_first};
use super::event_day::EventDay;
use crate::{Match, ScheduleConfig, Tournament};
use serde::Serialize;
use std::cmp::Ordering;

/// Key of the catch-all bucket used when no event day is known
pub const UNSCHEDULED_KEY: &str = "unscheduled";

/// Matches played on one event day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBucket {
    pub key: String,
    pub day: Option<EventDay>,
    /// Pending matches, earliest first
    #[serde(rename = "pendientes")]
    pub pending: Vec<Match>,
    /// Finished matches, latest first
    #[serde(rename = "finalizados")]
    pub finished: Vec<Match>,
}

impl DayBucket {
    fn new(day: Option<EventDay>) -> Self {
        DayBucket {
            key: day.map(|d| d.key()).unwrap_or_else(|| UNSCHEDULED_KEY.to_string()),
            day,
            pending: Vec::new(),
            finished: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len() + self.finished.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Matches grouped by event day, buckets in event order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySchedule {
    pub buckets: Vec<DayBucket>,
}

impl DaySchedule {
    /// Classify matches into the given day buckets.
    ///
    /// A match whose day is unknown or outside every bucket lands in the
    /// first bucket. With no days at all a single unscheduled bucket holds
    /// every match.
    pub fn classify(matches: &[Match], days: &[EventDay]) -> Self {
        let mut buckets: Vec<DayBucket> = Vec::new();
        for day in days {
            // Two labels for the same day would otherwise split its matches
            if !buckets.iter().any(|b| b.day.is_some_and(|d| d.same_day(day))) {
                buckets.push(DayBucket::new(Some(*day)));
            }
        }
        if buckets.is_empty() {
            buckets.push(DayBucket::new(None));
        }

        for m in matches {
            let idx = match_day(m)
                .and_then(|day| {
                    buckets
                        .iter()
                        .position(|b| b.day.is_some_and(|d| d.same_day(&day)))
                })
                .unwrap_or(0);

            let bucket = &mut buckets[idx];
            if m.is_finished() {
                bucket.finished.push(m.clone());
            } else {
                bucket.pending.push(m.clone());
            }
        }

        for bucket in &mut buckets {
            bucket.pending.sort_by(|a, b| earliest_first(&a.time, &b.time));
            bucket.finished.sort_by(|a, b| latest_first(&a.time, &b.time));
        }

        DaySchedule { buckets }
    }

    /// Classify using the days a tournament is played on.
    ///
    /// Days come from the tournament's dates, then the configured defaults,
    /// then the distinct days found on the matches themselves.
    pub fn for_tournament(
        tournament: &Tournament,
        matches: &[Match],
        config: &ScheduleConfig,
    ) -> Self {
        let mut days = parse_days(&tournament.dates);
        if days.is_empty() {
            log::debug!(
                "Tournament {} has no parseable dates, using configured defaults",
                tournament.id
            );
            days = parse_days(&config.default_days);
        }
        if days.is_empty() {
            days = days_from_matches(matches);
        }
        Self::classify(matches, &days)
    }

    pub fn get(&self, key: &str) -> Option<&DayBucket> {
        self.buckets.iter().find(|b| b.key == key)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Match> {
        self.buckets.iter().flat_map(|b| b.pending.iter())
    }

    pub fn finished(&self) -> impl Iterator<Item = &Match> {
        self.buckets.iter().flat_map(|b| b.finished.iter())
    }
}

/// Day a match is played on: its raw date, else its display date
pub fn match_day(m: &Match) -> Option<EventDay> {
    m.raw_date
        .map(EventDay::from_date)
        .or_else(|| EventDay::parse(&m.date))
}

/// Parse date labels, skipping the ones that are not dates
pub fn parse_days(labels: &[String]) -> Vec<EventDay> {
    labels
        .iter()
        .filter_map(|label| {
            let day = EventDay::parse(label);
            if day.is_none() {
                log::warn!("Ignoring unrecognized event date: {:?}", label);
            }
            day
        })
        .collect()
}

/// Sort matches by day, then start time, then id.
///
/// Days without a year take the earliest year seen on the other matches.
/// Matches with no recognizable day go last.
pub fn sort_chronologically(matches: &mut [Match]) {
    let days: Vec<Option<EventDay>> = matches.iter().map(match_day).collect();
    let year = default_year(days.iter().flatten());

    let mut keyed: Vec<(Option<(i32, u32, u32)>, Match)> = days
        .into_iter()
        .map(|day| day.map(|d| day_key(&d, year)))
        .zip(matches.iter().cloned())
        .collect();
    keyed.sort_by(|(ka, a), (kb, b)| {
        let by_day = match (ka, kb) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_day
            .then_with(|| earliest_first(&a.time, &b.time))
            .then_with(|| a.id.0.cmp(&b.id.0))
    });

    for (slot, (_, m)) in matches.iter_mut().zip(keyed) {
        *slot = m;
    }
}

/// Distinct match days in chronological order
fn days_from_matches(matches: &[Match]) -> Vec<EventDay> {
    let mut days: Vec<EventDay> = Vec::new();
    for day in matches.iter().filter_map(match_day) {
        if !days.iter().any(|d| d.same_day(&day)) {
            days.push(day);
        }
    }
    let year = default_year(days.iter());
    days.sort_by_key(|d| day_key(d, year));
    days
}

fn default_year<'a>(days: impl Iterator<Item = &'a EventDay>) -> i32 {
    days.filter_map(|d| d.year).min().unwrap_or(0)
}

fn day_key(day: &EventDay, default_year: i32) -> (i32, u32, u32) {
    (day.year.unwrap_or(default_year), day.month, day.day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MatchId, MatchStatus, Player, TournamentId};
    use chrono::NaiveDate;

    fn make_match(id: i64, date: &str, time: &str, status: MatchStatus) -> Match {
        Match {
            id: MatchId(id),
            date: date.to_string(),
            raw_date: None,
            time: time.to_string(),
            status,
            player1: Player::new("Karen Muñiz", "Asturiano"),
            player2: Player::new("Fernanda López", "Hacienda"),
            score1: None,
            score2: None,
            sets: None,
            photo_url: None,
            tournament_id: Some(TournamentId(1)),
        }
    }

    fn two_days() -> Vec<EventDay> {
        parse_days(&["Nov 9 - 2025".to_string(), "Nov 10 - 2025".to_string()])
    }

    fn ids(matches: &[Match]) -> Vec<i64> {
        matches.iter().map(|m| m.id.0).collect()
    }

    #[test]
    fn test_split_by_day_and_status() {
        let matches = vec![
            make_match(1, "9 nov", "09:30", MatchStatus::Pendiente),
            make_match(2, "10 nov", "09:30", MatchStatus::Pendiente),
            make_match(3, "9 nov", "10:10", MatchStatus::Finalizado),
        ];

        let schedule = DaySchedule::classify(&matches, &two_days());
        assert_eq!(schedule.buckets.len(), 2);

        let first = schedule.get("nov-9").unwrap();
        assert_eq!(ids(&first.pending), vec![1]);
        assert_eq!(ids(&first.finished), vec![3]);

        let second = schedule.get("nov-10").unwrap();
        assert_eq!(ids(&second.pending), vec![2]);
        assert!(second.finished.is_empty());
    }

    #[test]
    fn test_raw_date_wins_over_display_date() {
        let mut m = make_match(1, "9 nov", "09:30", MatchStatus::Pendiente);
        m.raw_date = NaiveDate::from_ymd_opt(2025, 11, 10);

        let schedule = DaySchedule::classify(&[m], &two_days());
        assert_eq!(schedule.get("nov-10").unwrap().len(), 1);
    }

    #[test]
    fn test_unmatched_day_goes_to_first_bucket() {
        let matches = vec![
            make_match(1, "12 nov", "09:30", MatchStatus::Pendiente),
            make_match(2, "", "09:50", MatchStatus::Finalizado),
        ];

        let schedule = DaySchedule::classify(&matches, &two_days());
        let first = schedule.get("nov-9").unwrap();
        assert_eq!(ids(&first.pending), vec![1]);
        assert_eq!(ids(&first.finished), vec![2]);
        assert!(schedule.get("nov-10").unwrap().is_empty());
    }

    #[test]
    fn test_time_ordering() {
        let matches = vec![
            make_match(1, "9 nov", "11:00", MatchStatus::Pendiente),
            make_match(2, "9 nov", "09:30", MatchStatus::Pendiente),
            make_match(3, "9 nov", "10:10", MatchStatus::Pendiente),
            make_match(4, "9 nov", "09:30", MatchStatus::Finalizado),
            make_match(5, "9 nov", "12:00", MatchStatus::Finalizado),
            make_match(6, "9 nov", "10:40", MatchStatus::Finalizado),
        ];

        let schedule = DaySchedule::classify(&matches, &two_days());
        let bucket = schedule.get("nov-9").unwrap();
        assert_eq!(ids(&bucket.pending), vec![2, 3, 1]);
        assert_eq!(ids(&bucket.finished), vec![5, 6, 4]);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let matches = vec![
            make_match(1, "10 nov", "11:00", MatchStatus::Pendiente),
            make_match(2, "9 nov", "09:30", MatchStatus::Finalizado),
            make_match(3, "9 nov", "09:30", MatchStatus::Pendiente),
        ];
        let before = matches.clone();

        let first = DaySchedule::classify(&matches, &two_days());
        let second = DaySchedule::classify(&matches, &two_days());
        assert_eq!(first, second);
        assert_eq!(matches, before);
    }

    #[test]
    fn test_sort_chronologically() {
        let mut matches = vec![
            make_match(1, "10 nov", "09:30", MatchStatus::Pendiente),
            make_match(2, "sin fecha", "08:00", MatchStatus::Pendiente),
            make_match(3, "9 nov", "10:10", MatchStatus::Pendiente),
            make_match(4, "9 nov", "9:50", MatchStatus::Pendiente),
        ];
        matches[0].raw_date = NaiveDate::from_ymd_opt(2025, 11, 10);

        sort_chronologically(&mut matches);
        assert_eq!(ids(&matches), vec![4, 3, 1, 2]);
    }

    #[test]
    fn test_no_days_uses_single_bucket() {
        let matches = vec![make_match(1, "9 nov", "09:30", MatchStatus::Pendiente)];
        let schedule = DaySchedule::classify(&matches, &[]);
        assert_eq!(schedule.buckets.len(), 1);
        assert_eq!(schedule.buckets[0].key, UNSCHEDULED_KEY);
        assert_eq!(schedule.pending().count(), 1);
    }

    #[test]
    fn test_for_tournament_falls_back_to_match_days() {
        let tournament = Tournament {
            id: TournamentId(1),
            name: "Dual Meet".to_string(),
            dates: vec!["por definir".to_string()],
            club1: "Asturiano".to_string(),
            club2: "Hacienda".to_string(),
            description: None,
        };
        let matches = vec![
            make_match(1, "10 nov", "09:30", MatchStatus::Pendiente),
            make_match(2, "9 nov", "09:30", MatchStatus::Pendiente),
        ];

        let schedule = DaySchedule::for_tournament(&tournament, &matches, &ScheduleConfig::default());
        let keys: Vec<&str> = schedule.buckets.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["nov-9", "nov-10"]);

        let config = ScheduleConfig {
            default_days: vec!["9 nov".to_string()],
        };
        let schedule = DaySchedule::for_tournament(&tournament, &matches, &config);
        assert_eq!(schedule.buckets.len(), 1);
        assert_eq!(schedule.buckets[0].len(), 2);
    }
}
