//! Game status and its transition function.
//!
//! `InProgress` is the only non-terminal status. `Won` and `Lost` have no
//! outgoing transitions: [`GameStatus::transition`] rejects any further
//! guess outcome on them.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::RulesError;

/// Lifecycle status of a game session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
)]
pub enum GameStatus {
    /// Game is active and accepting guesses.
    InProgress,
    /// The secret was guessed.
    Won,
    /// All attempts were used without guessing the secret.
    Lost,
}

/// What a scored guess means for the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Every position matched.
    Solved,
    /// At least one position was wrong.
    Missed {
        /// Attempts used including this guess.
        attempts_used: u32,
        /// Maximum attempts for the game.
        attempt_limit: u32,
    },
}

impl GameStatus {
    /// Returns true for `Won` and `Lost`.
    pub fn is_terminal(self) -> bool {
        match self {
            GameStatus::InProgress => false,
            GameStatus::Won | GameStatus::Lost => true,
        }
    }

    /// Computes the status after a guess with the given outcome.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::GameFinished`] if `self` is terminal.
    #[instrument]
    pub fn transition(self, outcome: GuessOutcome) -> Result<GameStatus, RulesError> {
        match (self, outcome) {
            (GameStatus::Won | GameStatus::Lost, _) => Err(RulesError::GameFinished { status: self }),
            (GameStatus::InProgress, GuessOutcome::Solved) => Ok(GameStatus::Won),
            (
                GameStatus::InProgress,
                GuessOutcome::Missed {
                    attempts_used,
                    attempt_limit,
                },
            ) if attempts_used >= attempt_limit => Ok(GameStatus::Lost),
            (GameStatus::InProgress, GuessOutcome::Missed { .. }) => Ok(GameStatus::InProgress),
        }
    }
}
