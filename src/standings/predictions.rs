//! Prediction grading and the spectator leaderboard

use crate::{Match, MatchId, Prediction};
use serde::Serialize;
use std::collections::HashMap;

/// One user's row on the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub user_name: String,
    pub correct: u32,
    pub total: u32,
    /// Percentage, two decimals
    pub accuracy: f64,
}

/// Whether a prediction came true; None while its match has no winner yet
pub fn grade(prediction: &Prediction, m: &Match) -> Option<bool> {
    m.winner().map(|side| side == prediction.predicted_winner)
}

/// Fill in `is_correct` for every prediction from the match results
pub fn grade_predictions(predictions: &[Prediction], matches: &[Match]) -> Vec<Prediction> {
    let by_id: HashMap<MatchId, &Match> = matches.iter().map(|m| (m.id, m)).collect();
    predictions
        .iter()
        .map(|p| Prediction {
            is_correct: by_id.get(&p.match_id).and_then(|m| grade(p, m)),
            ..p.clone()
        })
        .collect()
}

/// Rank users by correct predictions.
///
/// Only predictions on matches with a winner are counted. Ties on correct
/// picks go to the user with more graded picks, then by name.
pub fn ranking(predictions: &[Prediction], matches: &[Match]) -> Vec<RankingEntry> {
    let by_id: HashMap<MatchId, &Match> = matches.iter().map(|m| (m.id, m)).collect();
    let mut stats: HashMap<&str, (u32, u32)> = HashMap::new();

    for p in predictions {
        let entry = stats.entry(p.user_name.as_str()).or_default();
        if let Some(correct) = by_id.get(&p.match_id).and_then(|m| grade(p, m)) {
            entry.1 += 1;
            if correct {
                entry.0 += 1;
            }
        }
    }

    let mut entries: Vec<RankingEntry> = stats
        .into_iter()
        .map(|(user, (correct, total))| RankingEntry {
            user_name: user.to_string(),
            correct,
            total,
            accuracy: accuracy(correct, total),
        })
        .collect();

    entries.sort_by(|a, b| {
        b.correct
            .cmp(&a.correct)
            .then(b.total.cmp(&a.total))
            .then_with(|| a.user_name.cmp(&b.user_name))
    });
    entries
}

fn accuracy(correct: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        let pct = correct as f64 / total as f64 * 100.0;
        (pct * 100.0).round() / 100.0
    }
}
