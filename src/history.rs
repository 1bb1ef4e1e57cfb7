//! Rows of the server's game history listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::restriction::{FieldSource, FieldValue};

/// Options as reported by the history API, which always lists every key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaOptions {
    pub num_players: u32,
    pub starting_player: u32,
    #[serde(rename = "variantID")]
    pub variant_id: u32,
    pub variant_name: String,
    pub timed: bool,
    pub speedrun: bool,
    pub card_cycle: bool,
    pub deck_plays: bool,
    pub empty_clues: bool,
    pub one_extra_card: bool,
    pub one_less_card: bool,
    pub all_or_nothing: bool,
    pub detrimental_characters: bool,
}

/// A finished game as listed in a user's or a seed's history: outcome and
/// options, but no deck or actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMeta {
    pub id: u64,
    #[serde(default)]
    pub options: MetaOptions,
    #[serde(default)]
    pub seed: String,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub num_turns: u32,
    #[serde(default)]
    pub end_condition: u32,
    #[serde(default)]
    pub datetime_started: Option<DateTime<Utc>>,
    #[serde(default)]
    pub datetime_finished: Option<DateTime<Utc>>,
    #[serde(default)]
    pub player_names: Vec<String>,
}

impl GameMeta {
    /// Wall-clock length of the game in seconds, if both timestamps are known.
    pub fn duration_secs(&self) -> Option<f64> {
        match (self.datetime_started, self.datetime_finished) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds() as f64 / 1000.0),
            _ => None,
        }
    }
}

impl FieldSource for GameMeta {
    fn field(&self, path: &str) -> Option<FieldValue> {
        let value = match path {
            "id" => FieldValue::Int(self.id as i64),
            "seed" => FieldValue::Text(self.seed.clone()),
            "score" => FieldValue::Int(self.score.into()),
            "numTurns" => FieldValue::Int(self.num_turns.into()),
            "endCondition" => FieldValue::Int(self.end_condition.into()),
            "playerNames" => FieldValue::List(self.player_names.clone()),
            "options.numPlayers" => FieldValue::Int(self.options.num_players.into()),
            "options.startingPlayer" => FieldValue::Int(self.options.starting_player.into()),
            "options.variantID" => FieldValue::Int(self.options.variant_id.into()),
            "options.variantName" => FieldValue::Text(self.options.variant_name.clone()),
            "options.timed" => FieldValue::Bool(self.options.timed),
            "options.speedrun" => FieldValue::Bool(self.options.speedrun),
            "options.cardCycle" => FieldValue::Bool(self.options.card_cycle),
            "options.deckPlays" => FieldValue::Bool(self.options.deck_plays),
            "options.emptyClues" => FieldValue::Bool(self.options.empty_clues),
            "options.oneExtraCard" => FieldValue::Bool(self.options.one_extra_card),
            "options.oneLessCard" => FieldValue::Bool(self.options.one_less_card),
            "options.allOrNothing" => FieldValue::Bool(self.options.all_or_nothing),
            "options.detrimentalCharacters" => {
                FieldValue::Bool(self.options.detrimental_characters)
            }
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const HISTORY_ROW: &str = r#"{
        "id": 812345,
        "options": {
            "numPlayers": 2,
            "startingPlayer": 0,
            "variantID": 0,
            "variantName": "No Variant",
            "timed": false,
            "timeBase": 0,
            "timePerTurn": 0,
            "speedrun": false,
            "cardCycle": false,
            "deckPlays": false,
            "emptyClues": false,
            "oneExtraCard": false,
            "oneLessCard": false,
            "allOrNothing": false,
            "detrimentalCharacters": false
        },
        "seed": "p2v0s17",
        "score": 25,
        "numTurns": 61,
        "endCondition": 1,
        "datetimeStarted": "2023-04-01T18:00:00Z",
        "datetimeFinished": "2023-04-01T18:25:30Z",
        "numGamesOnThisSeed": 40,
        "playerNames": ["alice", "bob"],
        "incrementNumGames": true,
        "tags": ""
    }"#;

    #[test]
    fn test_parse_history_row() {
        let meta: GameMeta = serde_json::from_str(HISTORY_ROW).unwrap();

        assert_eq!(meta.id, 812345);
        assert_eq!(meta.options.num_players, 2);
        assert_eq!(meta.options.variant_name, "No Variant");
        assert_eq!(meta.seed, "p2v0s17");
        assert_eq!(meta.player_names, vec!["alice", "bob"]);
        assert_eq!(meta.duration_secs(), Some(1530.0));
    }

    #[test]
    fn test_missing_timestamps() {
        let meta: GameMeta = serde_json::from_str(r#"{"id": 3, "score": 10}"#).unwrap();

        assert_eq!(meta.duration_secs(), None);
        assert_eq!(meta.options, MetaOptions::default());
    }

    #[test]
    fn test_field_lookup() {
        let meta: GameMeta = serde_json::from_str(HISTORY_ROW).unwrap();

        assert_eq!(meta.field("score"), Some(FieldValue::Int(25)));
        assert_eq!(meta.field("options.speedrun"), Some(FieldValue::Bool(false)));
        assert_eq!(
            meta.field("options.variantName"),
            Some(FieldValue::Text("No Variant".to_string()))
        );
        assert_eq!(meta.field("cheated"), None);
    }
}
