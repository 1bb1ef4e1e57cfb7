use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::{
    history::GameMeta,
    restriction::{Restriction, standard},
    variants::VariantCatalog,
};

/// Progress toward the first win in one variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreHuntRow {
    pub variant_id: u32,
    pub variant_name: String,
    pub best_score: u32,
    pub won: bool,
    /// Seconds played in this variant up to and including the first win.
    pub duration: f64,
    pub attempts: u32,
}

impl ScoreHuntRow {
    pub const HEADER: [&'static str; 5] = ["variant", "max score", "won", "duration", "attempts"];
}

pub fn has_winning_score(game: &GameMeta, catalog: &VariantCatalog) -> bool {
    game.score == catalog.max_score(&game.options.variant_name)
}

/// Walks a user's history and reports, per variant, the best score and the
/// time and attempts spent before the first win.
///
/// The server lists history newest first; games are sorted by id here so
/// the order of `history` does not matter.
pub fn score_hunt(
    history: &[GameMeta],
    filter: &Restriction,
    catalog: &VariantCatalog,
) -> Vec<ScoreHuntRow> {
    let mut games: Vec<&GameMeta> = history.iter().filter(|g| filter.validate(*g)).collect();
    games.sort_by_key(|g| g.id);

    let mut rows: Vec<ScoreHuntRow> = Vec::new();
    let mut index: HashMap<u32, usize> = HashMap::new();

    for game in games {
        let variant_id = game.options.variant_id;
        let slot = *index.entry(variant_id).or_insert_with(|| {
            rows.push(ScoreHuntRow {
                variant_id,
                variant_name: game.options.variant_name.clone(),
                best_score: 0,
                won: false,
                duration: 0.0,
                attempts: 0,
            });
            rows.len() - 1
        });

        let row = &mut rows[slot];
        if row.won {
            continue;
        }

        row.best_score = row.best_score.max(game.score);
        row.duration += game.duration_secs().unwrap_or(0.0);
        row.attempts += 1;
        row.won = has_winning_score(game, catalog);

        if row.won {
            debug!(
                "first win in {} after {} attempts (game {})",
                row.variant_name, row.attempts, game.id
            );
        }
    }

    rows
}

/// Standard games at `num_players` seats, optionally only those shared
/// with `partner`.
pub fn score_hunt_filter(num_players: u32, partner: Option<&str>) -> Restriction {
    let filter = standard(Some(num_players));
    match partner {
        Some(name) => filter.and(Restriction::contains("playerNames", name)),
        None => filter,
    }
}

/// Fraction of games passing `filter` that also pass `goal`, or `None`
/// when nothing passes the filter.
pub fn success_rate(games: &[GameMeta], filter: &Restriction, goal: &Restriction) -> Option<f64> {
    let eligible: Vec<&GameMeta> = games.iter().filter(|g| filter.validate(*g)).collect();
    if eligible.is_empty() {
        return None;
    }

    let wins = eligible.iter().filter(|g| goal.validate(**g)).count();
    Some(wins as f64 / eligible.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        history::{GameMeta, tests::HISTORY_ROW},
        restriction::{self, max_score},
        variants::Variant,
    };
    use chrono::{Duration, TimeZone, Utc};

    fn catalog() -> VariantCatalog {
        VariantCatalog::new(vec![
            Variant::new(0, "No Variant", &["R", "Y", "G", "B", "P"]),
            Variant::new(1, "6 Suits", &["R", "Y", "G", "B", "P", "T"]),
        ])
    }

    fn game(id: u64, variant_id: u32, score: u32, minutes: i64) -> GameMeta {
        let mut meta: GameMeta = serde_json::from_str(HISTORY_ROW).unwrap();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        meta.id = id;
        meta.score = score;
        meta.options.variant_id = variant_id;
        meta.options.variant_name = catalog().by_id(variant_id).unwrap().name.clone();
        meta.datetime_started = Some(start);
        meta.datetime_finished = Some(start + Duration::minutes(minutes));
        meta
    }

    #[test]
    fn test_score_hunt_stops_at_first_win() {
        // Newest first, as delivered by the server.
        let history = vec![
            game(6, 0, 25, 40),
            game(5, 1, 30, 10),
            game(4, 0, 25, 30),
            game(3, 0, 23, 20),
            game(2, 1, 12, 5),
            game(1, 0, 18, 10),
        ];

        let rows = score_hunt(&history, &restriction::standard(Some(2)), &catalog());

        assert_eq!(rows.len(), 2);
        let no_variant = &rows[0];
        assert_eq!(no_variant.variant_name, "No Variant");
        assert!(no_variant.won);
        assert_eq!(no_variant.best_score, 25);
        assert_eq!(no_variant.attempts, 3);
        assert_eq!(no_variant.duration, 60.0 * 60.0);

        let six = &rows[1];
        assert!(six.won);
        assert_eq!(six.attempts, 2);
        assert_eq!(six.duration, 15.0 * 60.0);
    }

    #[test]
    fn test_score_hunt_respects_filter() {
        let mut speedrun = game(2, 0, 25, 5);
        speedrun.options.speedrun = true;
        let history = vec![speedrun, game(1, 0, 20, 10)];

        let rows = score_hunt(&history, &restriction::standard(None), &catalog());

        assert_eq!(rows.len(), 1);
        assert!(!rows[0].won);
        assert_eq!(rows[0].attempts, 1);
        assert_eq!(rows[0].best_score, 20);
    }

    #[test]
    fn test_score_hunt_with_partner() {
        let mut with_carol = game(3, 0, 25, 20);
        with_carol.player_names = vec!["alice".into(), "carol".into()];
        let history = vec![with_carol, game(2, 0, 25, 15), game(1, 0, 20, 10)];

        let rows = score_hunt(&history, &score_hunt_filter(2, Some("carol")), &catalog());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].attempts, 1);
        assert_eq!(rows[0].duration, 20.0 * 60.0);

        let rows = score_hunt(&history, &score_hunt_filter(2, Some("bob")), &catalog());
        assert_eq!(rows[0].attempts, 2);
        assert_eq!(rows[0].duration, 25.0 * 60.0);

        assert!(score_hunt(&history, &score_hunt_filter(2, Some("dave")), &catalog()).is_empty());
    }

    #[test]
    fn test_success_rate() {
        let games = vec![
            game(1, 0, 25, 10),
            game(2, 0, 24, 10),
            game(3, 0, 25, 10),
            game(4, 0, 19, 10),
        ];

        let rate = success_rate(&games, &restriction::standard(None), &max_score(25));
        assert_eq!(rate, Some(0.5));
    }

    #[test]
    fn test_success_rate_without_eligible_games() {
        let games = vec![game(1, 0, 25, 10)];

        assert_eq!(
            success_rate(&games, &restriction::standard(Some(5)), &max_score(25)),
            None
        );
    }
}
