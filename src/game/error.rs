use thiserror::Error;

/// Reasons a replay cannot continue. Each variant names the game and the
/// index of the action being applied so batch callers can flag the record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplayError {
    #[error("game {game_id}: turn {target} is outside 0..={max}")]
    OutOfRange {
        game_id: u64,
        target: usize,
        max: usize,
    },

    #[error("game {game_id}, action {turn}: card {order} is not in player {player}'s hand")]
    CardNotFound {
        game_id: u64,
        turn: usize,
        player: usize,
        order: usize,
    },

    #[error("game {game_id}, action {turn}: clue given with {clue_tokens} clue tokens")]
    IllegalState {
        game_id: u64,
        turn: usize,
        clue_tokens: f64,
    },

    #[error("game {game_id}: {reason}")]
    MalformedRecord { game_id: u64, reason: String },
}

impl ReplayError {
    pub fn game_id(&self) -> u64 {
        match self {
            ReplayError::OutOfRange { game_id, .. }
            | ReplayError::CardNotFound { game_id, .. }
            | ReplayError::IllegalState { game_id, .. }
            | ReplayError::MalformedRecord { game_id, .. } => *game_id,
        }
    }

    /// Index of the offending action, when the failure happened mid-replay.
    pub fn turn(&self) -> Option<usize> {
        match self {
            ReplayError::CardNotFound { turn, .. } | ReplayError::IllegalState { turn, .. } => {
                Some(*turn)
            }
            ReplayError::OutOfRange { .. } | ReplayError::MalformedRecord { .. } => None,
        }
    }
}
