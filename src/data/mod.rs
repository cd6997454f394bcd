//! Data access and storage
//!
//! The `MeetSource` seam used by the standings, a SQLite store behind it,
//! and JSON fixture import for seeding a meet.

pub mod database;
pub mod fixtures;

pub use database::{Database, NewMatch, NewProduct, NewTournament};
pub use fixtures::Fixture;

use crate::{Match, Result, Tournament, TournamentId};

/// Read access to tournaments and their matches
pub trait MeetSource {
    /// Matches of one tournament, or all matches, ordered by date then time
    fn fetch_matches(&self, tournament: Option<TournamentId>) -> Result<Vec<Match>>;

    fn fetch_tournament(&self, id: TournamentId) -> Result<Option<Tournament>>;
}
