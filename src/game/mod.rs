//! Deterministic replay of recorded games.

pub mod error;
pub mod record;
pub mod replay;
pub mod state;

pub use error::ReplayError;
pub use record::{Action, ActionType, Card, GameOptions, GameRecord};
pub use replay::{Move, ReplayEngine, Snapshots, is_clue_starved, replay};
pub use state::{GameState, MAX_CLUE_TOKENS};
