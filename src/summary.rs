use serde::Serialize;
use tracing::{info, warn};

use crate::{
    game::{GameRecord, ReplayEngine, ReplayError},
    variants::VariantCatalog,
};

/// Board counters after a given number of actions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TurnStats {
    pub turn: usize,
    pub score: u32,
    pub clue_tokens: f64,
    pub strikes: u32,
}

/// One-line overview of a finished game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSummary {
    pub game_id: u64,
    pub player_count: usize,
    pub player_names: String,
    pub variant_name: String,
    pub turn_count: usize,
    pub final_score: u32,
    pub strikes: u32,
    pub turns_at_zero_clues: usize,
}

impl LineSummary {
    pub const HEADER: [&'static str; 8] = [
        "ID",
        "Player Count",
        "Player Names",
        "Variant",
        "Turn Count",
        "Score",
        "Strike Count",
        "Turns at 0 clues",
    ];

    /// True if the game reached the variant's maximum score.
    pub fn is_win(&self, catalog: &VariantCatalog) -> bool {
        self.final_score == catalog.max_score(&self.variant_name)
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.game_id.to_string(),
            self.player_count.to_string(),
            self.player_names.clone(),
            self.variant_name.clone(),
            self.turn_count.to_string(),
            self.final_score.to_string(),
            self.strikes.to_string(),
            self.turns_at_zero_clues.to_string(),
        ]
    }
}

/// Counters for every prefix of the action log, `len(actions) + 1` rows.
pub fn per_turn_series(record: &GameRecord) -> Result<Vec<TurnStats>, ReplayError> {
    ReplayEngine::new(record)
        .snapshots()
        .map(|state| {
            state.map(|s| TurnStats {
                turn: s.turn(),
                score: s.score(),
                clue_tokens: s.clue_tokens(),
                strikes: s.strikes(),
            })
        })
        .collect()
}

pub fn line_summary(record: &GameRecord) -> Result<LineSummary, ReplayError> {
    let series = per_turn_series(record)?;

    let (final_score, strikes) = series
        .last()
        .map_or((0, 0), |last| (last.score, last.strikes));

    let turns_at_zero_clues = series.iter().filter(|row| row.clue_tokens < 1.0).count();

    Ok(LineSummary {
        game_id: record.id,
        player_count: record.player_count(),
        player_names: record.players.join(" "),
        variant_name: record.variant_name().to_string(),
        turn_count: record.actions.len(),
        final_score,
        strikes,
        turns_at_zero_clues,
    })
}

/// Summaries for a batch of games. Records whose replay fails are logged
/// and returned separately instead of aborting the batch.
pub fn summarize_all<'a, I>(records: I) -> (Vec<LineSummary>, Vec<ReplayError>)
where
    I: IntoIterator<Item = &'a GameRecord>,
{
    let mut summaries = Vec::new();
    let mut failures = Vec::new();

    for record in records {
        match line_summary(record) {
            Ok(summary) => summaries.push(summary),
            Err(e) => {
                warn!(game_id = e.game_id(), turn = ?e.turn(), "skipping game: {}", e);
                failures.push(e);
            }
        }
    }

    info!(
        "summarized {} games, skipped {}",
        summaries.len(),
        failures.len()
    );
    (summaries, failures)
}
