//! Players derived from match slots
//!
//! Players are not stored on their own; a roster is the set of distinct
//! `(name, club)` pairs appearing in a tournament's matches.

use crate::{Match, Player};
use std::collections::HashMap;

/// Distinct players, sorted by club then name.
///
/// The first photo seen for a player is kept.
pub fn roster(matches: &[Match]) -> Vec<Player> {
    let mut seen: HashMap<(&str, &str), usize> = HashMap::new();
    let mut players: Vec<Player> = Vec::new();

    for player in matches.iter().flat_map(|m| [&m.player1, &m.player2]) {
        let key = (player.name.as_str(), player.club.as_str());
        match seen.get(&key) {
            Some(&idx) => {
                if players[idx].photo_url.is_none() {
                    players[idx].photo_url = player.photo_url.clone();
                }
            }
            None => {
                seen.insert(key, players.len());
                players.push(player.clone());
            }
        }
    }

    players.sort_by(|a, b| a.club.cmp(&b.club).then_with(|| a.name.cmp(&b.name)));
    players
}

/// Players of one club
pub fn club_roster<'a>(players: &'a [Player], club: &'a str) -> impl Iterator<Item = &'a Player> {
    players.iter().filter(move |p| p.club == club)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MatchId, MatchStatus};

    fn make_match(p1: Player, p2: Player) -> Match {
        Match {
            id: MatchId(1),
            date: "9 nov".to_string(),
            raw_date: None,
            time: "09:30".to_string(),
            status: MatchStatus::Pendiente,
            player1: p1,
            player2: p2,
            score1: None,
            score2: None,
            sets: None,
            photo_url: None,
            tournament_id: None,
        }
    }

    #[test]
    fn test_roster_dedup_and_order() {
        let matches = vec![
            make_match(
                Player::new("Mario Toledano", "Asturiano"),
                Player::new("David Camacho", "Hacienda"),
            ),
            make_match(
                Player::new("Karen Muñiz", "Asturiano"),
                Player::new("David Camacho", "Hacienda"),
            ),
            make_match(
                Player::new("Mario Toledano", "Asturiano"),
                Player::new("Adriana Martínez", "Hacienda"),
            ),
        ];

        let players = roster(&matches);
        let names: Vec<(&str, &str)> = players
            .iter()
            .map(|p| (p.club.as_str(), p.name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Asturiano", "Karen Muñiz"),
                ("Asturiano", "Mario Toledano"),
                ("Hacienda", "Adriana Martínez"),
                ("Hacienda", "David Camacho"),
            ]
        );
        assert_eq!(club_roster(&players, "Hacienda").count(), 2);
    }

    #[test]
    fn test_same_name_other_club_is_distinct() {
        let matches = vec![make_match(
            Player::new("Cisneros", "Asturiano"),
            Player::new("Cisneros", "Hacienda"),
        )];
        assert_eq!(roster(&matches).len(), 2);
    }

    #[test]
    fn test_keeps_first_photo() {
        let mut with_photo = Player::new("Karen Muñiz", "Asturiano");
        with_photo.photo_url = Some("karen.jpg".to_string());
        let matches = vec![
            make_match(Player::new("Karen Muñiz", "Asturiano"), Player::new("B", "Hacienda")),
            make_match(with_photo, Player::new("B", "Hacienda")),
        ];

        let players = roster(&matches);
        assert_eq!(players[0].photo_url.as_deref(), Some("karen.jpg"));
    }
}
