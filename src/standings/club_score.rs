//! Club-vs-club score
//!
//! Totals of matches and sets won by each of the tournament's two clubs.

use crate::{Match, PlayerSide};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static SETS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*-\s*([0-9]+)").expect("valid sets pattern"));

/// Which of the tournament's two clubs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClubSlot {
    Club1,
    Club2,
}

/// A count for each club
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubTally {
    pub club1: u32,
    pub club2: u32,
}

impl ClubTally {
    fn add(&mut self, slot: ClubSlot, count: u32) {
        match slot {
            ClubSlot::Club1 => self.club1 += count,
            ClubSlot::Club2 => self.club2 += count,
        }
    }

    /// Credit `lead` to one club and `other` to the opposite club
    fn split(&mut self, slot: ClubSlot, lead: u32, other: u32) {
        match slot {
            ClubSlot::Club1 => {
                self.club1 += lead;
                self.club2 += other;
            }
            ClubSlot::Club2 => {
                self.club2 += lead;
                self.club1 += other;
            }
        }
    }
}

/// Global score between the two clubs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubScore {
    /// Matches won
    #[serde(rename = "partidos")]
    pub matches_won: ClubTally,
    /// Sets won
    #[serde(rename = "sets")]
    pub sets_won: ClubTally,
}

/// Accumulates club totals over a tournament's matches
pub struct ClubScoreComputer<'a> {
    club1: &'a str,
    club2: &'a str,
    score: ClubScore,
}

impl<'a> ClubScoreComputer<'a> {
    pub fn new(club1: &'a str, club2: &'a str) -> Self {
        ClubScoreComputer {
            club1,
            club2,
            score: ClubScore::default(),
        }
    }

    /// Slot of a club name, by exact comparison
    pub fn slot(&self, club: &str) -> Option<ClubSlot> {
        if club == self.club1 {
            Some(ClubSlot::Club1)
        } else if club == self.club2 {
            Some(ClubSlot::Club2)
        } else {
            None
        }
    }

    /// Fold one match into the totals.
    ///
    /// Only finished matches with both scores count. Anything that cannot be
    /// attributed to one of the two clubs contributes nothing.
    pub fn add_match(&mut self, m: &Match) {
        let Some((score1, score2)) = m.result() else {
            return;
        };

        let winner = m.winner();
        if let Some(slot) = winner.and_then(|side| self.slot(&m.player(side).club)) {
            self.score.matches_won.add(slot, 1);
        }

        match m.sets_text() {
            Some(text) => {
                if let Some((sets1, sets2)) = parse_sets(text) {
                    let leader = if sets2 > sets1 {
                        PlayerSide::Player2
                    } else {
                        PlayerSide::Player1
                    };
                    self.credit_sets(m, leader, sets1, sets2);
                }
            }
            // Without a set count the scores stand in for sets
            None => {
                if let Some(side) = winner {
                    self.credit_sets(m, side, score1, score2);
                }
            }
        }
    }

    fn credit_sets(&mut self, m: &Match, leader: PlayerSide, count1: u32, count2: u32) {
        let (lead, other) = match leader {
            PlayerSide::Player1 => (count1, count2),
            PlayerSide::Player2 => (count2, count1),
        };
        if let Some(slot) = self.slot(&m.player(leader).club) {
            self.score.sets_won.split(slot, lead, other);
        }
    }

    pub fn process_matches(&mut self, matches: &[Match]) {
        for m in matches {
            self.add_match(m);
        }
    }

    pub fn score(&self) -> ClubScore {
        self.score
    }
}

/// Compute the global score of a tournament's matches
pub fn club_score(matches: &[Match], club1: &str, club2: &str) -> ClubScore {
    let mut computer = ClubScoreComputer::new(club1, club2);
    computer.process_matches(matches);
    computer.score()
}

/// Extract "W - L" set counts from free text
pub fn parse_sets(text: &str) -> Option<(u32, u32)> {
    let caps = SETS_PATTERN.captures(text)?;
    let sets1 = caps.get(1)?.as_str().parse().ok()?;
    let sets2 = caps.get(2)?.as_str().parse().ok()?;
    Some((sets1, sets2))
}
