use std::fmt;

use super::{
    error::ReplayError,
    record::{Card, GameRecord},
};

pub const MAX_CLUE_TOKENS: f64 = 8.0;

const SUIT_LETTERS: &[u8] = b"RYGBPTKM";

/// Board state after some prefix of a game's action log.
///
/// Only the replay engine mutates a state; callers read it through the
/// accessors below.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub(super) turn: usize,
    pub(super) actions_applied: usize,
    pub(super) current_player_index: usize,
    pub(super) clue_tokens: f64,
    pub(super) hands: Vec<Vec<Card>>,
    pub(super) discard_pile: Vec<Card>,
    pub(super) play_stacks: Vec<Vec<Card>>,
    pub(super) score: u32,
    pub(super) strikes: u32,
    pub(super) draw_pile_size: usize,
}

impl GameState {
    /// Deals the opening hands. Player `p` receives the deck block
    /// `p * hand_size .. (p + 1) * hand_size`, last-dealt card first.
    pub(super) fn deal(record: &GameRecord) -> Result<Self, ReplayError> {
        let player_count = record.player_count();
        if player_count == 0 {
            return Err(ReplayError::MalformedRecord {
                game_id: record.id,
                reason: "no players".to_string(),
            });
        }

        let hand_size = record.hand_size();
        let dealt = player_count * hand_size;
        if record.deck.len() < dealt {
            return Err(ReplayError::MalformedRecord {
                game_id: record.id,
                reason: format!(
                    "deck of {} cards cannot deal {} hands of {}",
                    record.deck.len(),
                    player_count,
                    hand_size
                ),
            });
        }

        let hands = (0..player_count)
            .map(|p| {
                (p * hand_size..(p + 1) * hand_size)
                    .rev()
                    .filter_map(|order| record.card(order))
                    .collect()
            })
            .collect();

        Ok(Self {
            turn: 0,
            actions_applied: 0,
            current_player_index: 0,
            clue_tokens: MAX_CLUE_TOKENS,
            hands,
            discard_pile: Vec::new(),
            play_stacks: vec![Vec::new(); record.suit_count()],
            score: 0,
            strikes: 0,
            draw_pile_size: record.deck.len() - dealt,
        })
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    /// Number of log entries applied, including ones that do not consume a turn.
    pub fn actions_applied(&self) -> usize {
        self.actions_applied
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn clue_tokens(&self) -> f64 {
        self.clue_tokens
    }

    pub fn hands(&self) -> &[Vec<Card>] {
        &self.hands
    }

    pub fn hand(&self, player: usize) -> Option<&[Card]> {
        self.hands.get(player).map(Vec::as_slice)
    }

    pub fn discard_pile(&self) -> &[Card] {
        &self.discard_pile
    }

    pub fn play_stacks(&self) -> &[Vec<Card>] {
        &self.play_stacks
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn strikes(&self) -> u32 {
        self.strikes
    }

    pub fn draw_pile_size(&self) -> usize {
        self.draw_pile_size
    }

    /// Cards accounted for across hands, discards, stacks and the draw pile.
    /// Always equals the deck size.
    pub fn card_count(&self) -> usize {
        self.hands.iter().map(Vec::len).sum::<usize>()
            + self.discard_pile.len()
            + self.play_stacks.iter().map(Vec::len).sum::<usize>()
            + self.draw_pile_size
    }

    /// Next rank the stack for `suit` accepts.
    pub fn next_rank(&self, suit: usize) -> usize {
        self.play_stacks.get(suit).map_or(1, |stack| stack.len() + 1)
    }

    pub(super) fn take_from_hand(&mut self, player: usize, order: usize) -> Option<Card> {
        let hand = self.hands.get_mut(player)?;
        let index = hand.iter().position(|c| c.order == order)?;
        Some(hand.remove(index))
    }

    /// Moves the top of the draw pile to the front of the acting player's hand.
    pub(super) fn draw(&mut self, record: &GameRecord) {
        if self.draw_pile_size == 0 {
            return;
        }

        let order = record.deck.len() - self.draw_pile_size;
        if let Some(card) = record.card(order) {
            self.hands[self.current_player_index].insert(0, card);
            self.draw_pile_size -= 1;
        }
    }

    pub(super) fn regain_clue(&mut self, amount: f64) {
        self.clue_tokens = (self.clue_tokens + amount).min(MAX_CLUE_TOKENS);
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "turn {} | score {} | clues {} | strikes {} | deck {}",
            self.turn, self.score, self.clue_tokens, self.strikes, self.draw_pile_size
        )?;

        for (seat, hand) in self.hands.iter().enumerate() {
            let marker = if seat == self.current_player_index { '>' } else { ' ' };
            let cards: Vec<String> = hand.iter().map(card_label).collect();
            writeln!(f, "{} P{}: {}", marker, seat, cards.join(" "))?;
        }

        let stacks: Vec<String> = self
            .play_stacks
            .iter()
            .enumerate()
            .map(|(suit, stack)| format!("{}{}", suit_letter(suit), stack.len()))
            .collect();
        writeln!(f, "stacks: {}", stacks.join(" "))?;

        let discards: Vec<String> = self.discard_pile.iter().map(card_label).collect();
        write!(f, "discards: {}", discards.join(" "))
    }
}

fn suit_letter(suit: usize) -> char {
    SUIT_LETTERS.get(suit).map_or('?', |&b| b as char)
}

fn card_label(card: &Card) -> String {
    format!("{}{}", suit_letter(card.suit_index), card.rank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::record::GameOptions;

    fn record(players: usize, deck_len: usize) -> GameRecord {
        GameRecord {
            id: 7,
            players: (0..players).map(|i| format!("p{}", i)).collect(),
            deck: (0..deck_len)
                .map(|i| Card::new(i % 5, (i / 5 % 5) as u8 + 1, 0))
                .collect(),
            actions: Vec::new(),
            options: GameOptions::default(),
            seed: None,
        }
    }

    #[test]
    fn test_deal_contiguous_blocks_newest_first() {
        let state = GameState::deal(&record(2, 50)).unwrap();

        let first: Vec<usize> = state.hands[0].iter().map(|c| c.order).collect();
        let second: Vec<usize> = state.hands[1].iter().map(|c| c.order).collect();
        assert_eq!(first, vec![4, 3, 2, 1, 0]);
        assert_eq!(second, vec![9, 8, 7, 6, 5]);
        assert_eq!(state.draw_pile_size(), 40);
        assert_eq!(state.card_count(), 50);
    }

    #[test]
    fn test_deal_rejects_short_deck() {
        let err = GameState::deal(&record(4, 10)).unwrap_err();
        assert!(matches!(err, ReplayError::MalformedRecord { game_id: 7, .. }));
    }

    #[test]
    fn test_deal_rejects_empty_table() {
        let err = GameState::deal(&record(0, 50)).unwrap_err();
        assert!(matches!(err, ReplayError::MalformedRecord { .. }));
    }

    #[test]
    fn test_draw_goes_to_front_of_acting_hand() {
        let game = record(2, 50);
        let mut state = GameState::deal(&game).unwrap();

        state.current_player_index = 1;
        state.draw(&game);

        assert_eq!(state.hands[1][0].order, 10);
        assert_eq!(state.hands[1].len(), 6);
        assert_eq!(state.draw_pile_size(), 39);
    }

    #[test]
    fn test_regain_clue_caps_at_max() {
        let mut state = GameState::deal(&record(2, 50)).unwrap();
        state.clue_tokens = 7.5;
        state.regain_clue(1.0);
        assert_eq!(state.clue_tokens(), MAX_CLUE_TOKENS);
    }

    #[test]
    fn test_display_lists_hands() {
        let state = GameState::deal(&record(2, 50)).unwrap();
        let text = state.to_string();

        assert!(text.starts_with("turn 0 | score 0 | clues 8"));
        assert!(text.contains("> P0:"));
        assert!(text.contains("  P1:"));
    }
}
