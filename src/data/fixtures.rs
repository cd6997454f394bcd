//! JSON fixture import
//!
//! Seeds a database from a file listing tournaments, matches and products.
//! Tournament ids in the file are local labels; matches refer to them and
//! are linked to the database ids created on import.

use super::database::{Database, NewMatch, NewProduct, NewTournament};
use crate::{MatchStatus, Player, Result, TournamentId};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Fixture-local identifier, written as a string or a number
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum FixtureKey {
    Text(String),
    Number(i64),
}

impl FixtureKey {
    fn normalized(&self) -> String {
        match self {
            FixtureKey::Text(s) => s.trim().to_string(),
            FixtureKey::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureTournament {
    pub id: FixtureKey,
    #[serde(flatten)]
    pub tournament: NewTournament,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureMatch {
    pub date: String,
    #[serde(default)]
    pub raw_date: Option<String>,
    pub time: String,
    pub status: MatchStatus,
    pub player1: Player,
    pub player2: Player,
    #[serde(default)]
    pub score1: Option<u32>,
    #[serde(default)]
    pub score2: Option<u32>,
    #[serde(default)]
    pub sets: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub tournament_id: Option<FixtureKey>,
}

impl FixtureMatch {
    fn to_new_match(&self, tournament_id: Option<TournamentId>) -> NewMatch {
        NewMatch {
            date: self.date.clone(),
            raw_date: self.raw_date.as_deref().and_then(parse_raw_date),
            time: self.time.clone(),
            status: self.status,
            player1: self.player1.clone(),
            player2: self.player2.clone(),
            score1: self.score1,
            score2: self.score2,
            sets: self.sets.clone(),
            photo_url: self.photo_url.clone(),
            tournament_id,
        }
    }
}

/// Contents of a fixture file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub tournaments: Vec<FixtureTournament>,
    #[serde(default)]
    pub matches: Vec<FixtureMatch>,
    #[serde(default)]
    pub products: Vec<NewProduct>,
}

/// Counts from one import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub tournaments: usize,
    pub matches: usize,
    pub products: usize,
    pub skipped: usize,
}

impl Fixture {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write everything into the database.
    ///
    /// Matches that fail validation or name an unknown tournament are
    /// skipped with a warning.
    pub fn import(&self, db: &Database) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        let mut ids: HashMap<String, TournamentId> = HashMap::new();

        for entry in &self.tournaments {
            let created = db.create_tournament(&entry.tournament)?;
            ids.insert(entry.id.normalized(), created.id);
            summary.tournaments += 1;
        }

        for (i, m) in self.matches.iter().enumerate() {
            let tournament_id = match &m.tournament_id {
                Some(key) => match ids.get(&key.normalized()) {
                    Some(id) => Some(*id),
                    None => {
                        log::warn!(
                            "Skipping match #{}: unknown tournament {:?}",
                            i + 1,
                            key.normalized()
                        );
                        summary.skipped += 1;
                        continue;
                    }
                },
                None => None,
            };

            let new = m.to_new_match(tournament_id);
            if let Err(e) = new.validate() {
                log::warn!("Skipping match #{}: {}", i + 1, e);
                summary.skipped += 1;
                continue;
            }
            db.create_match(&new)?;
            summary.matches += 1;
        }

        for product in &self.products {
            db.create_product(product)?;
            summary.products += 1;
        }

        log::info!(
            "Imported {} tournaments, {} matches, {} products ({} skipped)",
            summary.tournaments,
            summary.matches,
            summary.products,
            summary.skipped
        );
        Ok(summary)
    }
}

/// ISO date, ignoring any time part
fn parse_raw_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.split('T').next()?.trim();
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
