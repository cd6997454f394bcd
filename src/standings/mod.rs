//! Tournament standings
//!
//! Club totals, the prediction leaderboard and the combined tournament view.

pub mod club_score;
pub mod predictions;

pub use club_score::{club_score, ClubScore, ClubTally};
pub use predictions::{ranking, RankingEntry};

use crate::data::MeetSource;
use crate::schedule::DaySchedule;
use crate::{Match, Result, ScheduleConfig, Tournament, TournamentId};
use serde::Serialize;

/// Everything shown on a tournament's page
#[derive(Debug, Clone, Serialize)]
pub struct TournamentOverview {
    pub tournament: Tournament,
    pub score: ClubScore,
    pub schedule: DaySchedule,
}

impl TournamentOverview {
    pub fn build(tournament: Tournament, matches: &[Match], config: &ScheduleConfig) -> Self {
        let score = club_score(matches, &tournament.club1, &tournament.club2);
        let schedule = DaySchedule::for_tournament(&tournament, matches, config);
        TournamentOverview {
            tournament,
            score,
            schedule,
        }
    }
}

/// Load a tournament and its matches, then score and schedule them.
///
/// Returns None when the tournament does not exist.
pub fn overview<S: MeetSource>(
    source: &S,
    id: TournamentId,
    config: &ScheduleConfig,
) -> Result<Option<TournamentOverview>> {
    let Some(tournament) = source.fetch_tournament(id)? else {
        return Ok(None);
    };
    let matches = source.fetch_matches(Some(id))?;
    log::debug!(
        "Building overview for {} with {} matches",
        tournament.name,
        matches.len()
    );
    Ok(Some(TournamentOverview::build(tournament, &matches, config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MatchId, MatchStatus, Player};
    use std::cell::Cell;

    /// In-memory source that counts fetches
    struct FixedSource {
        tournament: Tournament,
        matches: Vec<Match>,
        fetches: Cell<usize>,
    }

    impl MeetSource for FixedSource {
        fn fetch_matches(&self, tournament: Option<TournamentId>) -> Result<Vec<Match>> {
            self.fetches.set(self.fetches.get() + 1);
            Ok(self
                .matches
                .iter()
                .filter(|m| tournament.is_none() || m.tournament_id == tournament)
                .cloned()
                .collect())
        }

        fn fetch_tournament(&self, id: TournamentId) -> Result<Option<Tournament>> {
            Ok((id == self.tournament.id).then(|| self.tournament.clone()))
        }
    }

    fn make_match(id: i64, status: MatchStatus, score: Option<(u32, u32)>, sets: Option<&str>) -> Match {
        Match {
            id: MatchId(id),
            date: "9 nov".to_string(),
            raw_date: None,
            time: "09:30".to_string(),
            status,
            player1: Player::new("Karen Muñiz", "Asturiano"),
            player2: Player::new("Fernanda López", "Hacienda"),
            score1: score.map(|s| s.0),
            score2: score.map(|s| s.1),
            sets: sets.map(str::to_string),
            photo_url: None,
            tournament_id: Some(TournamentId(1)),
        }
    }

    fn dual_meet() -> Tournament {
        Tournament {
            id: TournamentId(1),
            name: "Dual Meet Asturiano Vs Hacienda".to_string(),
            dates: vec!["Nov 9 - 2025".to_string(), "Nov 10 - 2025".to_string()],
            club1: "Asturiano".to_string(),
            club2: "Hacienda".to_string(),
            description: None,
        }
    }

    #[test]
    fn test_overview_end_to_end() {
        let source = FixedSource {
            tournament: dual_meet(),
            matches: vec![
                make_match(1, MatchStatus::Finalizado, Some((3, 1)), Some("3-1")),
                make_match(2, MatchStatus::Pendiente, None, None),
            ],
            fetches: Cell::new(0),
        };

        let view = overview(&source, TournamentId(1), &ScheduleConfig::default())
            .unwrap()
            .unwrap();

        assert_eq!(view.score.matches_won, ClubTally { club1: 1, club2: 0 });
        assert_eq!(view.score.sets_won, ClubTally { club1: 3, club2: 1 });

        let pending: Vec<MatchId> = view.schedule.pending().map(|m| m.id).collect();
        assert_eq!(pending, vec![MatchId(2)]);
        assert_eq!(view.schedule.finished().count(), 1);
        let first_day = view.schedule.get("nov-9").unwrap();
        assert_eq!(first_day.finished.len(), 1);
        assert_eq!(source.fetches.get(), 1);
    }

    #[test]
    fn test_overview_missing_tournament() {
        let source = FixedSource {
            tournament: dual_meet(),
            matches: vec![],
            fetches: Cell::new(0),
        };
        let view = overview(&source, TournamentId(7), &ScheduleConfig::default()).unwrap();
        assert!(view.is_none());
        assert_eq!(source.fetches.get(), 0);
    }
}
