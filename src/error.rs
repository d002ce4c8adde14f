//! Game engine error types.

use derive_more::{Display, Error};
use mastermind_rules::RulesError;
use tracing::instrument;

use crate::store::{StoreError, StoreErrorKind};

/// Category of a game engine failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum GameErrorKind {
    /// No game exists under the id, or it expired.
    #[display("not found")]
    NotFound,
    /// The game is already won or lost.
    #[display("conflict")]
    Conflict,
    /// The guess or key was rejected.
    #[display("invalid argument")]
    InvalidArgument,
    /// The session store failed.
    #[display("store failure")]
    StoreFailure,
    /// The secret source produced digits that break the game rules.
    #[display("upstream failure")]
    UpstreamFailure,
    /// The caller's cancellation token fired.
    #[display("cancelled")]
    Cancelled,
}

/// Game engine error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Game error ({}): {} at {}:{}", kind, message, file, line)]
pub struct GameError {
    /// Failure category.
    pub kind: GameErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl GameError {
    /// Creates a new game error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: GameErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for [`GameErrorKind::NotFound`].
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(GameErrorKind::NotFound, message)
    }

    /// Shorthand for [`GameErrorKind::Cancelled`].
    #[track_caller]
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(GameErrorKind::Cancelled, message)
    }
}

impl From<RulesError> for GameError {
    #[track_caller]
    fn from(err: RulesError) -> Self {
        let kind = match err {
            RulesError::GameFinished { .. } => GameErrorKind::Conflict,
            RulesError::LengthMismatch { .. } | RulesError::DigitOutOfRange { .. } => GameErrorKind::InvalidArgument,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<StoreError> for GameError {
    #[track_caller]
    fn from(err: StoreError) -> Self {
        let kind = match err.kind {
            StoreErrorKind::Cancelled => GameErrorKind::Cancelled,
            StoreErrorKind::InvalidKey => GameErrorKind::InvalidArgument,
            StoreErrorKind::Serialization | StoreErrorKind::Backend => GameErrorKind::StoreFailure,
        };
        Self::new(kind, err.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastermind_rules::GameStatus;

    #[test]
    fn finished_game_is_a_conflict() {
        let err = GameError::from(RulesError::GameFinished { status: GameStatus::Won });
        assert_eq!(err.kind, GameErrorKind::Conflict);
    }

    #[test]
    fn bad_guess_is_invalid_argument() {
        let err = GameError::from(RulesError::LengthMismatch { expected: 4, actual: 3 });
        assert_eq!(err.kind, GameErrorKind::InvalidArgument);
    }

    #[test]
    fn store_kinds_map_through() {
        assert_eq!(
            GameError::from(StoreError::cancelled("stop")).kind,
            GameErrorKind::Cancelled
        );
        assert_eq!(
            GameError::from(StoreError::invalid_key("blank")).kind,
            GameErrorKind::InvalidArgument
        );
        assert_eq!(
            GameError::from(StoreError::backend("down")).kind,
            GameErrorKind::StoreFailure
        );
    }
}
