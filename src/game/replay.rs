use tracing::{debug, trace};

use super::{
    error::ReplayError,
    record::{Action, ActionType, Card, GameRecord},
    state::GameState,
};

const CLUE_STARVED_PREFIX: &str = "clue starved";

/// What an action did to the board once the stacks are taken into account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    RankClue,
    ColorClue,
    Discard,
    Play,
    Bomb,
    NonTurn,
}

/// Whether a variant regenerates half a clue per event.
pub fn is_clue_starved(variant: &str) -> bool {
    variant
        .get(..CLUE_STARVED_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(CLUE_STARVED_PREFIX))
}

/// Rebuilds board states from a game record by replaying its action log.
#[derive(Debug, Clone, Copy)]
pub struct ReplayEngine<'a> {
    record: &'a GameRecord,
    clue_regen: f64,
}

impl<'a> ReplayEngine<'a> {
    pub fn new(record: &'a GameRecord) -> Self {
        let clue_regen = if is_clue_starved(record.variant_name()) {
            0.5
        } else {
            1.0
        };

        Self { record, clue_regen }
    }

    pub fn record(&self) -> &'a GameRecord {
        self.record
    }

    /// State before any action has been applied.
    pub fn initial_state(&self) -> Result<GameState, ReplayError> {
        GameState::deal(self.record)
    }

    /// State after the first `target_turn` actions of the log.
    pub fn replay(&self, target_turn: usize) -> Result<GameState, ReplayError> {
        let max = self.record.actions.len();
        if target_turn > max {
            return Err(ReplayError::OutOfRange {
                game_id: self.record.id,
                target: target_turn,
                max,
            });
        }

        self.record.actions[..target_turn]
            .iter()
            .try_fold(self.initial_state()?, |state, action| {
                self.apply_action(state, action)
            })
    }

    /// Decides how `action` lands on `state`. Only plays need the board:
    /// a play whose rank is not the next one for its suit is a bomb.
    pub fn classify(&self, state: &GameState, action: &Action) -> Result<Move, ReplayError> {
        let kind = match action.kind {
            ActionType::RankClue => Move::RankClue,
            ActionType::ColorClue => Move::ColorClue,
            ActionType::Discard => Move::Discard,
            ActionType::NonTurn(_) => Move::NonTurn,
            ActionType::Play => {
                let card = self
                    .record
                    .card(action.target)
                    .ok_or_else(|| self.card_not_found(state, action.target))?;

                if card.rank as usize == state.next_rank(card.suit_index) {
                    Move::Play
                } else {
                    Move::Bomb
                }
            }
        };

        Ok(kind)
    }

    /// Applies one log entry, returning the next state.
    pub fn apply_action(
        &self,
        mut state: GameState,
        action: &Action,
    ) -> Result<GameState, ReplayError> {
        let kind = self.classify(&state, action)?;
        trace!(
            game_id = self.record.id,
            action = state.actions_applied,
            ?kind,
            target = action.target,
            "applying action"
        );

        match kind {
            Move::RankClue | Move::ColorClue => {
                let remaining = state.clue_tokens - 1.0;
                if remaining < 0.0 {
                    debug!(game_id = self.record.id, "clue given without tokens");
                    return Err(ReplayError::IllegalState {
                        game_id: self.record.id,
                        turn: state.actions_applied,
                        clue_tokens: state.clue_tokens,
                    });
                }
                state.clue_tokens = remaining;
            }
            Move::Discard => {
                let card = self.take(&mut state, action.target)?;
                state.regain_clue(self.clue_regen);
                state.discard_pile.push(card);
                state.draw(self.record);
            }
            Move::Play => {
                let card = self.take(&mut state, action.target)?;
                state.play_stacks[card.suit_index].push(card);
                state.draw(self.record);
                state.score += 1;

                if card.rank == 5 {
                    state.regain_clue(self.clue_regen);
                }
            }
            Move::Bomb => {
                let card = self.take(&mut state, action.target)?;
                state.discard_pile.push(card);
                state.strikes += 1;
                state.draw(self.record);
            }
            Move::NonTurn => {}
        }

        if kind != Move::NonTurn {
            state.current_player_index = (state.current_player_index + 1) % state.hands.len();
            state.turn += 1;
        }
        state.actions_applied += 1;

        Ok(state)
    }

    /// Every state of the game, from the deal to the last action, in one
    /// forward pass.
    pub fn snapshots(&self) -> Snapshots<'a> {
        Snapshots {
            engine: *self,
            state: None,
            next_action: 0,
            done: false,
        }
    }

    fn take(&self, state: &mut GameState, order: usize) -> Result<Card, ReplayError> {
        let player = state.current_player_index;
        state
            .take_from_hand(player, order)
            .ok_or_else(|| self.card_not_found(state, order))
    }

    fn card_not_found(&self, state: &GameState, order: usize) -> ReplayError {
        ReplayError::CardNotFound {
            game_id: self.record.id,
            turn: state.actions_applied,
            player: state.current_player_index,
            order,
        }
    }
}

/// Iterator over successive states of one game. Yields `len(actions) + 1`
/// states, or stops after the first error.
#[derive(Debug)]
pub struct Snapshots<'a> {
    engine: ReplayEngine<'a>,
    state: Option<GameState>,
    next_action: usize,
    done: bool,
}

impl Iterator for Snapshots<'_> {
    type Item = Result<GameState, ReplayError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let next = match self.state.take() {
            None => self.engine.initial_state(),
            Some(state) => {
                let actions = &self.engine.record.actions;
                let action = actions.get(self.next_action)?;
                self.next_action += 1;
                self.engine.apply_action(state, action)
            }
        };

        match &next {
            Ok(state) => {
                if self.next_action < self.engine.record.actions.len() {
                    self.state = Some(state.clone());
                } else {
                    self.done = true;
                }
            }
            Err(_) => self.done = true,
        }

        Some(next)
    }
}

/// Convenience wrapper around [`ReplayEngine::replay`].
pub fn replay(record: &GameRecord, target_turn: usize) -> Result<GameState, ReplayError> {
    ReplayEngine::new(record).replay(target_turn)
}
