//! Rule violations raised while applying a guess.

use crate::GameStatus;

/// Error that can occur when validating or applying a guess.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum RulesError {
    /// The game already reached a terminal status.
    #[display("Game is already completed with status {status}")]
    GameFinished {
        /// Terminal status the game is in.
        status: GameStatus,
    },

    /// The guess does not have the same length as the secret.
    #[display("Guess must contain exactly {expected} digits, got {actual}")]
    LengthMismatch {
        /// Length of the secret combination.
        expected: usize,
        /// Length of the submitted guess.
        actual: usize,
    },

    /// A guess digit lies outside the configured range.
    #[display("Guess digit {digit} is out of range [{min}, {max}]")]
    DigitOutOfRange {
        /// Offending digit.
        digit: i32,
        /// Inclusive lower bound.
        min: i32,
        /// Inclusive upper bound.
        max: i32,
    },
}
