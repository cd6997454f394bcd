//! SQLite database management for meet data

use super::MeetSource;
use crate::schedule::buckets::sort_chronologically;
use crate::schedule::clock::parse_time;
use crate::standings::predictions::grade_predictions;
use crate::{
    Match, MatchId, MatchStatus, MeetError, Player, PlayerSide, Prediction, PredictionId,
    Product, ProductId, Result, Tournament, TournamentId,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;

const MATCH_COLUMNS: &str = "id, date, raw_date, time, status,
    player1_name, player1_club, player1_photo_url,
    player2_name, player2_club, player2_photo_url,
    score1, score2, sets, photo_url, tournament_id";

/// Tournament fields as entered by an organizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTournament {
    pub name: String,
    #[serde(default)]
    pub dates: Vec<String>,
    pub club1: String,
    pub club2: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Match fields as entered by an organizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMatch {
    pub date: String,
    #[serde(default)]
    pub raw_date: Option<NaiveDate>,
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
    pub tournament_id: Option<TournamentId>,
}

impl NewMatch {
    /// Reject matches the standings could not use
    pub fn validate(&self) -> Result<()> {
        if self.player1.name.trim().is_empty() || self.player2.name.trim().is_empty() {
            return Err(MeetError::InvalidMatch("both players need a name".to_string()));
        }
        if parse_time(&self.time).is_none() {
            return Err(MeetError::InvalidMatch(format!(
                "time must be HH:MM, got {:?}",
                self.time
            )));
        }
        if self.status == MatchStatus::Finalizado && (self.score1.is_none() || self.score2.is_none())
        {
            return Err(MeetError::InvalidMatch(
                "a finished match needs both scores".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

/// Database connection and operations
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tournaments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                dates TEXT NOT NULL DEFAULT '[]',
                club1 TEXT NOT NULL,
                club2 TEXT NOT NULL,
                description TEXT
            );

            CREATE TABLE IF NOT EXISTS matches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                raw_date TEXT,
                time TEXT NOT NULL,
                status TEXT NOT NULL CHECK(status IN ('pendiente', 'finalizado')),
                player1_name TEXT NOT NULL,
                player1_club TEXT NOT NULL,
                player1_photo_url TEXT,
                player2_name TEXT NOT NULL,
                player2_club TEXT NOT NULL,
                player2_photo_url TEXT,
                score1 INTEGER,
                score2 INTEGER,
                sets TEXT,
                photo_url TEXT,
                tournament_id INTEGER REFERENCES tournaments(id)
            );

            CREATE TABLE IF NOT EXISTS predictions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                match_id INTEGER NOT NULL REFERENCES matches(id),
                predicted_winner TEXT NOT NULL CHECK(predicted_winner IN ('player1', 'player2')),
                user_name TEXT NOT NULL,
                is_correct INTEGER
            );

            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                image_url TEXT,
                link TEXT,
                price REAL
            );

            CREATE INDEX IF NOT EXISTS idx_matches_tournament_id ON matches(tournament_id);
            CREATE INDEX IF NOT EXISTS idx_matches_status ON matches(status);
            CREATE INDEX IF NOT EXISTS idx_predictions_match_id ON predictions(match_id);
            "#,
        )?;
        Ok(())
    }

    // ==================== Tournament Operations ====================

    pub fn create_tournament(&self, tournament: &NewTournament) -> Result<Tournament> {
        self.conn.execute(
            "INSERT INTO tournaments (name, dates, club1, club2, description) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                tournament.name,
                serde_json::to_string(&tournament.dates)?,
                tournament.club1,
                tournament.club2,
                tournament.description,
            ],
        )?;

        let id = TournamentId(self.conn.last_insert_rowid());
        log::debug!("Created tournament {} ({})", tournament.name, id);
        Ok(Tournament {
            id,
            name: tournament.name.clone(),
            dates: tournament.dates.clone(),
            club1: tournament.club1.clone(),
            club2: tournament.club2.clone(),
            description: tournament.description.clone(),
        })
    }

    /// Get tournament by ID
    pub fn get_tournament(&self, id: TournamentId) -> Result<Option<Tournament>> {
        let tournament = self
            .conn
            .query_row(
                "SELECT id, name, dates, club1, club2, description FROM tournaments WHERE id = ?1",
                params![id.0],
                Self::row_to_tournament,
            )
            .optional()?;
        Ok(tournament)
    }

    /// Get all tournaments
    pub fn get_all_tournaments(&self) -> Result<Vec<Tournament>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, dates, club1, club2, description FROM tournaments ORDER BY name",
        )?;
        let tournaments = stmt
            .query_map([], Self::row_to_tournament)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tournaments)
    }

    pub fn update_tournament(&self, id: TournamentId, tournament: &NewTournament) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE tournaments SET name = ?1, dates = ?2, club1 = ?3, club2 = ?4, description = ?5
             WHERE id = ?6",
            params![
                tournament.name,
                serde_json::to_string(&tournament.dates)?,
                tournament.club1,
                tournament.club2,
                tournament.description,
                id.0,
            ],
        )?;
        if changed == 0 {
            return Err(MeetError::TournamentNotFound(id));
        }
        Ok(())
    }

    /// Delete a tournament along with its matches and their predictions
    pub fn delete_tournament(&self, id: TournamentId) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM predictions WHERE match_id IN (SELECT id FROM matches WHERE tournament_id = ?1)",
            params![id.0],
        )?;
        let matches = tx.execute("DELETE FROM matches WHERE tournament_id = ?1", params![id.0])?;
        let changed = tx.execute("DELETE FROM tournaments WHERE id = ?1", params![id.0])?;
        if changed == 0 {
            return Err(MeetError::TournamentNotFound(id));
        }
        tx.commit()?;
        log::info!("Deleted tournament {} and {} matches", id, matches);
        Ok(())
    }

    fn row_to_tournament(row: &rusqlite::Row) -> rusqlite::Result<Tournament> {
        let dates_raw: String = row.get(2)?;
        Ok(Tournament {
            id: TournamentId(row.get(0)?),
            name: row.get(1)?,
            dates: decode_dates(&dates_raw),
            club1: row.get(3)?,
            club2: row.get(4)?,
            description: row.get(5)?,
        })
    }

    // ==================== Match Operations ====================

    pub fn create_match(&self, new: &NewMatch) -> Result<Match> {
        new.validate()?;
        self.conn.execute(
            r#"
            INSERT INTO matches (date, raw_date, time, status,
                                 player1_name, player1_club, player1_photo_url,
                                 player2_name, player2_club, player2_photo_url,
                                 score1, score2, sets, photo_url, tournament_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                new.date,
                new.raw_date.map(|d| d.format("%Y-%m-%d").to_string()),
                new.time.trim(),
                new.status.as_str(),
                new.player1.name,
                new.player1.club,
                new.player1.photo_url,
                new.player2.name,
                new.player2.club,
                new.player2.photo_url,
                new.score1,
                new.score2,
                new.sets,
                new.photo_url,
                new.tournament_id.map(|t| t.0),
            ],
        )?;

        let id = MatchId(self.conn.last_insert_rowid());
        Ok(Match {
            id,
            date: new.date.clone(),
            raw_date: new.raw_date,
            time: new.time.trim().to_string(),
            status: new.status,
            player1: new.player1.clone(),
            player2: new.player2.clone(),
            score1: new.score1,
            score2: new.score2,
            sets: new.sets.clone(),
            photo_url: new.photo_url.clone(),
            tournament_id: new.tournament_id,
        })
    }

    pub fn get_match(&self, id: MatchId) -> Result<Option<Match>> {
        let m = self
            .conn
            .query_row(
                &format!("SELECT {} FROM matches WHERE id = ?1", MATCH_COLUMNS),
                params![id.0],
                Self::row_to_match,
            )
            .optional()?;
        Ok(m)
    }

    /// Get matches, optionally limited to one tournament
    pub fn get_matches(&self, tournament: Option<TournamentId>) -> Result<Vec<Match>> {
        let order = "ORDER BY id";
        let mut matches = match tournament {
            Some(id) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM matches WHERE tournament_id = ?1 {}",
                    MATCH_COLUMNS, order
                ))?;
                let rows = stmt
                    .query_map(params![id.0], Self::row_to_match)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("SELECT {} FROM matches {}", MATCH_COLUMNS, order))?;
                let rows = stmt
                    .query_map([], Self::row_to_match)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
        };
        // Display dates ("9 nov") do not sort as text
        sort_chronologically(&mut matches);
        Ok(matches)
    }

    /// Replace every field of a match
    pub fn update_match(&self, id: MatchId, new: &NewMatch) -> Result<()> {
        new.validate()?;
        let changed = self.conn.execute(
            r#"
            UPDATE matches SET date = ?1, raw_date = ?2, time = ?3, status = ?4,
                player1_name = ?5, player1_club = ?6, player1_photo_url = ?7,
                player2_name = ?8, player2_club = ?9, player2_photo_url = ?10,
                score1 = ?11, score2 = ?12, sets = ?13, photo_url = ?14, tournament_id = ?15
            WHERE id = ?16
            "#,
            params![
                new.date,
                new.raw_date.map(|d| d.format("%Y-%m-%d").to_string()),
                new.time.trim(),
                new.status.as_str(),
                new.player1.name,
                new.player1.club,
                new.player1.photo_url,
                new.player2.name,
                new.player2.club,
                new.player2.photo_url,
                new.score1,
                new.score2,
                new.sets,
                new.photo_url,
                new.tournament_id.map(|t| t.0),
                id.0,
            ],
        )?;
        if changed == 0 {
            return Err(MeetError::MatchNotFound(id));
        }
        Ok(())
    }

    /// Record a final score and mark the match finished
    pub fn record_result(
        &self,
        id: MatchId,
        score1: u32,
        score2: u32,
        sets: Option<&str>,
    ) -> Result<()> {
        let sets = sets.map(str::trim).filter(|s| !s.is_empty());
        let changed = self.conn.execute(
            "UPDATE matches SET status = 'finalizado', score1 = ?1, score2 = ?2, sets = ?3 WHERE id = ?4",
            params![score1, score2, sets, id.0],
        )?;
        if changed == 0 {
            return Err(MeetError::MatchNotFound(id));
        }
        log::info!("Match {} finished {}-{}", id, score1, score2);
        Ok(())
    }

    /// Delete a match and its predictions
    pub fn delete_match(&self, id: MatchId) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM predictions WHERE match_id = ?1", params![id.0])?;
        let changed = tx.execute("DELETE FROM matches WHERE id = ?1", params![id.0])?;
        if changed == 0 {
            return Err(MeetError::MatchNotFound(id));
        }
        tx.commit()?;
        Ok(())
    }

    /// Rewrite a player's details in every match of a tournament.
    ///
    /// Returns the number of match slots changed.
    pub fn rename_player(
        &self,
        tournament: TournamentId,
        old: &Player,
        new: &Player,
    ) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut changed = 0;
        for slot in ["player1", "player2"] {
            changed += tx.execute(
                &format!(
                    "UPDATE matches SET {slot}_name = ?1, {slot}_club = ?2,
                         {slot}_photo_url = COALESCE(?3, {slot}_photo_url)
                     WHERE tournament_id = ?4 AND {slot}_name = ?5 AND {slot}_club = ?6"
                ),
                params![new.name, new.club, new.photo_url, tournament.0, old.name, old.club],
            )?;
        }
        tx.commit()?;
        log::info!(
            "Renamed {} ({}) to {} ({}) in {} slots",
            old.name,
            old.club,
            new.name,
            new.club,
            changed
        );
        Ok(changed)
    }

    fn row_to_match(row: &rusqlite::Row) -> rusqlite::Result<Match> {
        let raw_date: Option<String> = row.get(2)?;
        let raw_date = raw_date.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok());

        let status_str: String = row.get(4)?;
        let status = MatchStatus::parse(&status_str).unwrap_or(MatchStatus::Pendiente);

        let tournament_id: Option<i64> = row.get(15)?;

        Ok(Match {
            id: MatchId(row.get(0)?),
            date: row.get(1)?,
            raw_date,
            time: row.get(3)?,
            status,
            player1: Player {
                name: row.get(5)?,
                club: row.get(6)?,
                photo_url: row.get(7)?,
            },
            player2: Player {
                name: row.get(8)?,
                club: row.get(9)?,
                photo_url: row.get(10)?,
            },
            score1: row.get(11)?,
            score2: row.get(12)?,
            sets: row.get(13)?,
            photo_url: row.get(14)?,
            tournament_id: tournament_id.map(TournamentId),
        })
    }

    // ==================== Prediction Operations ====================

    pub fn create_prediction(
        &self,
        match_id: MatchId,
        predicted_winner: PlayerSide,
        user_name: &str,
    ) -> Result<Prediction> {
        let m = self
            .get_match(match_id)?
            .ok_or(MeetError::MatchNotFound(match_id))?;
        if m.is_finished() {
            return Err(MeetError::InvalidMatch(format!(
                "match {} is already finished",
                match_id
            )));
        }
        self.conn.execute(
            "INSERT INTO predictions (match_id, predicted_winner, user_name) VALUES (?1, ?2, ?3)",
            params![match_id.0, predicted_winner.as_str(), user_name],
        )?;
        Ok(Prediction {
            id: PredictionId(self.conn.last_insert_rowid()),
            match_id,
            predicted_winner,
            user_name: user_name.to_string(),
            is_correct: None,
        })
    }

    /// Get predictions, optionally for one match
    pub fn get_predictions(&self, match_id: Option<MatchId>) -> Result<Vec<Prediction>> {
        let sql = "SELECT id, match_id, predicted_winner, user_name, is_correct FROM predictions";
        let predictions = match match_id {
            Some(id) => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("{} WHERE match_id = ?1 ORDER BY user_name, id", sql))?;
                let rows = stmt
                    .query_map(params![id.0], Self::row_to_prediction)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(&format!("{} ORDER BY user_name, id", sql))?;
                let rows = stmt
                    .query_map([], Self::row_to_prediction)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(predictions)
    }

    /// Store `is_correct` for every prediction from current match results.
    ///
    /// Returns the number of predictions with a definite grade.
    pub fn grade_predictions(&self) -> Result<usize> {
        let graded = grade_predictions(&self.get_predictions(None)?, &self.get_matches(None)?);
        let tx = self.conn.unchecked_transaction()?;
        let mut decided = 0;
        for p in &graded {
            tx.execute(
                "UPDATE predictions SET is_correct = ?1 WHERE id = ?2",
                params![p.is_correct, p.id.0],
            )?;
            if p.is_correct.is_some() {
                decided += 1;
            }
        }
        tx.commit()?;
        log::debug!("Graded {} of {} predictions", decided, graded.len());
        Ok(decided)
    }

    fn row_to_prediction(row: &rusqlite::Row) -> rusqlite::Result<Prediction> {
        let side_str: String = row.get(2)?;
        let predicted_winner = PlayerSide::parse(&side_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("unknown side {:?}", side_str).into(),
            )
        })?;
        Ok(Prediction {
            id: PredictionId(row.get(0)?),
            match_id: MatchId(row.get(1)?),
            predicted_winner,
            user_name: row.get(3)?,
            is_correct: row.get(4)?,
        })
    }

    // ==================== Product Operations ====================

    pub fn create_product(&self, product: &NewProduct) -> Result<Product> {
        self.conn.execute(
            "INSERT INTO products (name, description, image_url, link, price) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                product.name,
                product.description,
                product.image_url,
                product.link,
                product.price,
            ],
        )?;
        Ok(Product {
            id: ProductId(self.conn.last_insert_rowid()),
            name: product.name.clone(),
            description: product.description.clone(),
            image_url: product.image_url.clone(),
            link: product.link.clone(),
            price: product.price,
        })
    }

    pub fn get_products(&self) -> Result<Vec<Product>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, image_url, link, price FROM products ORDER BY name, id",
        )?;
        let products = stmt
            .query_map([], |row| {
                Ok(Product {
                    id: ProductId(row.get(0)?),
                    name: row.get(1)?,
                    description: row.get(2)?,
                    image_url: row.get(3)?,
                    link: row.get(4)?,
                    price: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(products)
    }

    pub fn delete_product(&self, id: ProductId) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1", params![id.0])?;
        Ok(changed > 0)
    }

    // ==================== Statistics ====================

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as usize)
        };

        Ok(DatabaseStats {
            tournament_count: count("SELECT COUNT(*) FROM tournaments")?,
            match_count: count("SELECT COUNT(*) FROM matches")?,
            finished_count: count("SELECT COUNT(*) FROM matches WHERE status = 'finalizado'")?,
            prediction_count: count("SELECT COUNT(*) FROM predictions")?,
            product_count: count("SELECT COUNT(*) FROM products")?,
        })
    }
}

impl MeetSource for Database {
    fn fetch_matches(&self, tournament: Option<TournamentId>) -> Result<Vec<Match>> {
        self.get_matches(tournament)
    }

    fn fetch_tournament(&self, id: TournamentId) -> Result<Option<Tournament>> {
        self.get_tournament(id)
    }
}

/// Tournament dates column: a JSON array, or a legacy comma-joined list
fn decode_dates(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.starts_with('[') {
        return match serde_json::from_str(raw) {
            Ok(dates) => dates,
            Err(e) => {
                log::warn!("Ignoring malformed tournament dates {:?}: {}", raw, e);
                Vec::new()
            }
        };
    }
    raw.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub tournament_count: usize,
    pub match_count: usize,
    pub finished_count: usize,
    pub prediction_count: usize,
    pub product_count: usize,
}
