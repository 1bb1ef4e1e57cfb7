//! Immutable game records as exported by the server.

use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_VARIANT: &str = "No Variant";

/// One card of the deck. `order` is the card's index in the deck. The
/// export does not carry it, so it is assigned when a record is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub suit_index: usize,
    pub rank: u8,
    #[serde(default)]
    pub order: usize,
}

impl Card {
    pub fn new(suit_index: usize, rank: u8, order: usize) -> Self {
        Self {
            suit_index,
            rank,
            order,
        }
    }
}

/// Numeric action tag as recorded in the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ActionType {
    /// Play attempt; whether it lands or bombs depends on the stacks.
    Play,
    Discard,
    ColorClue,
    RankClue,
    /// Out-of-band entries (tags 4 and 5) that do not consume a turn.
    NonTurn(u8),
}

impl TryFrom<u8> for ActionType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ActionType::Play),
            1 => Ok(ActionType::Discard),
            2 => Ok(ActionType::ColorClue),
            3 => Ok(ActionType::RankClue),
            4 | 5 => Ok(ActionType::NonTurn(value)),
            _ => Err(format!("unknown action type {}", value)),
        }
    }
}

impl From<ActionType> for u8 {
    fn from(value: ActionType) -> Self {
        match value {
            ActionType::Play => 0,
            ActionType::Discard => 1,
            ActionType::ColorClue => 2,
            ActionType::RankClue => 3,
            ActionType::NonTurn(tag) => tag,
        }
    }
}

/// One entry of the action log. `target` is a card order for plays and
/// discards, a seat index for clues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionType,
    #[serde(default)]
    pub target: usize,
    #[serde(default)]
    pub value: i64,
}

impl Action {
    pub fn play(order: usize) -> Self {
        Self {
            kind: ActionType::Play,
            target: order,
            value: 0,
        }
    }

    pub fn discard(order: usize) -> Self {
        Self {
            kind: ActionType::Discard,
            target: order,
            value: 0,
        }
    }

    pub fn color_clue(seat: usize, color: i64) -> Self {
        Self {
            kind: ActionType::ColorClue,
            target: seat,
            value: color,
        }
    }

    pub fn rank_clue(seat: usize, rank: i64) -> Self {
        Self {
            kind: ActionType::RankClue,
            target: seat,
            value: rank,
        }
    }
}

/// Game options. The export only lists keys that differ from the
/// defaults, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameOptions {
    pub variant: Option<String>,
    #[serde(rename = "variantID")]
    pub variant_id: Option<u32>,
    pub starting_player: Option<usize>,
    pub one_extra_card: bool,
    pub one_less_card: bool,
    pub speedrun: bool,
    pub timed: bool,
    pub card_cycle: bool,
    pub deck_plays: bool,
    pub empty_clues: bool,
    pub all_or_nothing: bool,
    pub detrimental_characters: bool,
}

/// A complete played game: who sat where, the deck order and every action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: u64,
    pub players: Vec<String>,
    #[serde(deserialize_with = "deserialize_deck")]
    pub deck: Vec<Card>,
    pub actions: Vec<Action>,
    #[serde(default)]
    pub options: GameOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
}

fn deserialize_deck<'de, D>(deserializer: D) -> Result<Vec<Card>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut deck = Vec::<Card>::deserialize(deserializer)?;
    for (order, card) in deck.iter_mut().enumerate() {
        card.order = order;
    }
    Ok(deck)
}

impl GameRecord {
    pub fn variant_name(&self) -> &str {
        self.options.variant.as_deref().unwrap_or(DEFAULT_VARIANT)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Card at deck position `order`, with its order filled in.
    pub fn card(&self, order: usize) -> Option<Card> {
        self.deck.get(order).map(|c| Card::new(c.suit_index, c.rank, order))
    }

    pub fn suit_count(&self) -> usize {
        self.deck.iter().map(|c| c.suit_index + 1).max().unwrap_or(0)
    }

    /// Cards per hand: 5 below four players, 4 below six, else 3,
    /// shifted by the extra/less card options.
    pub fn hand_size(&self) -> usize {
        let base: usize = match self.player_count() {
            0..=3 => 5,
            4 | 5 => 4,
            _ => 3,
        };

        let mut size = base;
        if self.options.one_extra_card {
            size += 1;
        }
        if self.options.one_less_card {
            size -= 1;
        }
        size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"{
        "id": 123456,
        "players": ["alice", "bob"],
        "deck": [
            {"suitIndex": 0, "rank": 1},
            {"suitIndex": 4, "rank": 5}
        ],
        "actions": [
            {"type": 3, "target": 1, "value": 2},
            {"type": 0, "target": 0},
            {"type": 4, "target": 0, "value": 1}
        ],
        "options": {"variant": "Rainbow (6 Suits)", "oneExtraCard": true},
        "seed": "p2v16s12"
    }"#;

    #[test]
    fn test_parse_export() {
        let record: GameRecord = serde_json::from_str(EXPORT).unwrap();

        assert_eq!(record.id, 123456);
        assert_eq!(record.players, vec!["alice", "bob"]);
        assert_eq!(record.actions[0].kind, ActionType::RankClue);
        assert_eq!(record.actions[1], Action::play(0));
        assert_eq!(record.actions[2].kind, ActionType::NonTurn(4));
        assert_eq!(record.variant_name(), "Rainbow (6 Suits)");
        assert!(record.options.one_extra_card);
        assert!(!record.options.one_less_card);
        assert_eq!(record.suit_count(), 5);
    }

    #[test]
    fn test_card_lookup_fills_order() {
        let record: GameRecord = serde_json::from_str(EXPORT).unwrap();
        let card = record.card(1).unwrap();

        assert_eq!(card, Card::new(4, 5, 1));
        assert!(record.card(2).is_none());
    }

    #[test]
    fn test_parsed_deck_is_numbered() {
        let json = r#"{
            "id": 7,
            "players": ["a", "b"],
            "deck": [
                {"suitIndex": 2, "rank": 3, "order": 40},
                {"suitIndex": 0, "rank": 1},
                {"suitIndex": 1, "rank": 4}
            ],
            "actions": []
        }"#;
        let record: GameRecord = serde_json::from_str(json).unwrap();

        let orders: Vec<usize> = record.deck.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        assert_eq!(record.deck[2], record.card(2).unwrap());
    }

    #[test]
    fn test_missing_options_default_variant() {
        let json = r#"{"id": 1, "players": ["a", "b"], "deck": [], "actions": []}"#;
        let record: GameRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.variant_name(), DEFAULT_VARIANT);
        assert_eq!(record.options, GameOptions::default());
    }

    #[test]
    fn test_unknown_action_type_rejected() {
        let json = r#"{"id": 1, "players": ["a"], "deck": [], "actions": [{"type": 9, "target": 0}]}"#;
        let parsed: Result<GameRecord, _> = serde_json::from_str(json);

        assert!(parsed.is_err());
    }

    #[test]
    fn test_hand_size_by_player_count() {
        let mut record: GameRecord = serde_json::from_str(EXPORT).unwrap();
        record.options = GameOptions::default();

        let sizes: Vec<usize> = (2..=6)
            .map(|n| {
                record.players = (0..n).map(|i| format!("p{}", i)).collect();
                record.hand_size()
            })
            .collect();
        assert_eq!(sizes, vec![5, 5, 4, 4, 3]);

        record.players.truncate(2);
        record.options.one_extra_card = true;
        assert_eq!(record.hand_size(), 6);

        record.options.one_extra_card = false;
        record.options.one_less_card = true;
        assert_eq!(record.hand_size(), 4);
    }
}
