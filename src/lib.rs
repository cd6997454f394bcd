//! Squash dual meet results
//!
//! Schedules, club standings and winner predictions for a two-club squash
//! tournament.

pub mod data;
pub mod roster;
pub mod schedule;
pub mod standings;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unique identifier for a tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TournamentId(pub i64);

impl fmt::Display for TournamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchId(pub i64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PredictionId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub i64);

/// Lifecycle state of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// Scheduled, no result yet
    Pendiente,
    /// Completed with a recorded score
    Finalizado,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pendiente => "pendiente",
            MatchStatus::Finalizado => "finalizado",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pendiente" => Some(MatchStatus::Pendiente),
            "finalizado" => Some(MatchStatus::Finalizado),
            _ => None,
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Pendiente => write!(f, "Pendiente"),
            MatchStatus::Finalizado => write!(f, "Finalizado"),
        }
    }
}

/// One of the two slots in a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerSide {
    Player1,
    Player2,
}

impl PlayerSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerSide::Player1 => "player1",
            PlayerSide::Player2 => "player2",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "player1" | "1" => Some(PlayerSide::Player1),
            "player2" | "2" => Some(PlayerSide::Player2),
            _ => None,
        }
    }
}

impl fmt::Display for PlayerSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A player as it appears in a match slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    pub club: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl Player {
    pub fn new(name: &str, club: &str) -> Self {
        Player {
            name: name.to_string(),
            club: club.to_string(),
            photo_url: None,
        }
    }
}

/// A single player-vs-player contest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    /// Display date, e.g. "9 nov"
    pub date: String,
    pub raw_date: Option<NaiveDate>,
    /// 24-hour "HH:MM"
    pub time: String,
    pub status: MatchStatus,
    pub player1: Player,
    pub player2: Player,
    pub score1: Option<u32>,
    pub score2: Option<u32>,
    /// Set count as "W - L"
    pub sets: Option<String>,
    pub photo_url: Option<String>,
    pub tournament_id: Option<TournamentId>,
}

impl Match {
    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finalizado
    }

    /// Both scores, when the match is finished and fully scored
    pub fn result(&self) -> Option<(u32, u32)> {
        if !self.is_finished() {
            return None;
        }
        match (self.score1, self.score2) {
            (Some(s1), Some(s2)) => Some((s1, s2)),
            _ => None,
        }
    }

    /// Returns the winning side, or None for a tie or an unscored match
    pub fn winner(&self) -> Option<PlayerSide> {
        let (s1, s2) = self.result()?;
        match s1.cmp(&s2) {
            std::cmp::Ordering::Greater => Some(PlayerSide::Player1),
            std::cmp::Ordering::Less => Some(PlayerSide::Player2),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn player(&self, side: PlayerSide) -> &Player {
        match side {
            PlayerSide::Player1 => &self.player1,
            PlayerSide::Player2 => &self.player2,
        }
    }

    /// Set string, treating a blank value as absent
    pub fn sets_text(&self) -> Option<&str> {
        self.sets.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// A named event between two clubs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    /// Event days in display form, in order
    pub dates: Vec<String>,
    pub club1: String,
    pub club2: String,
    pub description: Option<String>,
}

impl Tournament {
    /// Check whether a club takes part in this tournament
    pub fn has_club(&self, club: &str) -> bool {
        self.club1 == club || self.club2 == club
    }
}

/// A spectator's pick for the winner of a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub id: PredictionId,
    pub match_id: MatchId,
    pub predicted_winner: PlayerSide,
    pub user_name: String,
    pub is_correct: Option<bool>,
}

/// A sponsor product shown alongside the schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub price: Option<f64>,
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum MeetError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Tournament not found with ID: {0}")]
    TournamentNotFound(TournamentId),

    #[error("Match not found with ID: {0}")]
    MatchNotFound(MatchId),

    #[error("Invalid match: {0}")]
    InvalidMatch(String),
}

pub type Result<T> = std::result::Result<T, MeetError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub database_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Event days used when a tournament lists none, e.g. ["9 nov", "10 nov"]
    #[serde(default)]
    pub default_days: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show match times as "1:05 PM" instead of "13:05"
    pub twelve_hour_clock: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            twelve_hour_clock: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig {
                database_path: "data/dualmeet.db".to_string(),
            },
            schedule: ScheduleConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MeetError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| MeetError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MeetError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_match(score1: Option<u32>, score2: Option<u32>, status: MatchStatus) -> Match {
        Match {
            id: MatchId(1),
            date: "9 nov".to_string(),
            raw_date: None,
            time: "09:30".to_string(),
            status,
            player1: Player::new("Karen", "Asturiano"),
            player2: Player::new("Fernanda", "Hacienda"),
            score1,
            score2,
            sets: None,
            photo_url: None,
            tournament_id: None,
        }
    }

    #[test]
    fn test_winner() {
        let m = make_match(Some(3), Some(1), MatchStatus::Finalizado);
        assert_eq!(m.winner(), Some(PlayerSide::Player1));

        let m = make_match(Some(0), Some(3), MatchStatus::Finalizado);
        assert_eq!(m.winner(), Some(PlayerSide::Player2));
        assert_eq!(m.player(PlayerSide::Player2).club, "Hacienda");
    }

    #[test]
    fn test_no_winner_for_tie_or_pending() {
        assert_eq!(make_match(Some(2), Some(2), MatchStatus::Finalizado).winner(), None);
        assert_eq!(make_match(Some(3), Some(1), MatchStatus::Pendiente).winner(), None);
        assert_eq!(make_match(Some(3), None, MatchStatus::Finalizado).winner(), None);
    }

    #[test]
    fn test_blank_sets_are_absent() {
        let mut m = make_match(Some(3), Some(1), MatchStatus::Finalizado);
        m.sets = Some("  ".to_string());
        assert_eq!(m.sets_text(), None);
        m.sets = Some("3 - 1".to_string());
        assert_eq!(m.sets_text(), Some("3 - 1"));
    }

    #[test]
    fn test_has_club() {
        let t = Tournament {
            id: TournamentId(1),
            name: "Dual Meet".to_string(),
            dates: vec![],
            club1: "Asturiano".to_string(),
            club2: "Hacienda".to_string(),
            description: None,
        };
        assert!(t.has_club("Hacienda"));
        assert!(!t.has_club("hacienda"));
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&MatchStatus::Finalizado).unwrap();
        assert_eq!(json, "\"finalizado\"");
        assert_eq!(MatchStatus::parse("Pendiente"), Some(MatchStatus::Pendiente));
        assert_eq!(PlayerSide::parse("player2"), Some(PlayerSide::Player2));
    }

    #[test]
    fn test_config_round_trip() {
        let path = std::env::temp_dir().join(format!("dualmeet-config-{}.toml", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let mut config = Config::default();
        config.schedule.default_days = vec!["9 nov".to_string(), "10 nov".to_string()];
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_config_sections_optional() {
        let config: Config = toml::from_str("[data]\ndatabase_path = \"x.db\"\n").unwrap();
        assert_eq!(config.data.database_path, "x.db");
        assert!(config.schedule.default_days.is_empty());
        assert_eq!(config.display, Config::default().display);
        assert!(config.display.twelve_hour_clock);

        let config: Config =
            toml::from_str("[data]\ndatabase_path = \"x.db\"\n[display]\n").unwrap();
        assert!(config.display.twelve_hour_clock);

        let config: Config = toml::from_str(
            "[data]\ndatabase_path = \"x.db\"\n[display]\ntwelve_hour_clock = false\n",
        )
        .unwrap();
        assert!(!config.display.twelve_hour_clock);
    }
}
