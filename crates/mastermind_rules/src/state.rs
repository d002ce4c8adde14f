//! Session data model.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{DigitRange, GameStatus, GuessOutcome, RulesError, score, validate_guess};

/// Unique identifier of a game session.
pub type GameId = Uuid;

/// Feedback for a single guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct Feedback {
    /// Digits matching the secret at the same index.
    correct_positions: u32,
    /// Digits present in the secret regardless of position, including positional matches.
    correct_numbers: u32,
}

impl Feedback {
    /// Creates feedback from its two counts.
    pub fn new(correct_positions: u32, correct_numbers: u32) -> Self {
        debug_assert!(correct_numbers >= correct_positions);
        Self {
            correct_positions,
            correct_numbers,
        }
    }
}

/// A recorded guess within a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct GuessEntry {
    /// One-based attempt number; equals the attempts used when it was recorded.
    attempt_number: u32,
    /// The guessed digits.
    guess: Vec<i32>,
    /// Feedback computed for the guess.
    feedback: Feedback,
    /// When the guess was recorded.
    timestamp: DateTime<Utc>,
}

/// Complete state of one game session.
///
/// The session store owns the serialized form; the engine loads it, applies
/// one operation and writes the whole value back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct GameState {
    /// Session identifier.
    id: GameId,
    /// The hidden digits the player must deduce.
    secret_combination: Vec<i32>,
    /// Maximum number of guesses.
    attempt_limit: u32,
    /// Guesses scored so far.
    attempts_used: u32,
    /// Lifecycle status.
    status: GameStatus,
    /// Creation time.
    created_at: DateTime<Utc>,
    /// Time of the last mutation.
    last_touched_at: DateTime<Utc>,
    /// Time the game reached a terminal status.
    completed_at: Option<DateTime<Utc>>,
    /// Recorded guesses in attempt order.
    guess_history: Vec<GuessEntry>,
}

impl GameState {
    /// Starts a new game with a fresh identifier.
    #[instrument(skip(secret_combination), fields(len = secret_combination.len()))]
    pub fn new(secret_combination: Vec<i32>, attempt_limit: u32, now: DateTime<Utc>) -> Self {
        let id = Uuid::new_v4();
        info!(game_id = %id, attempt_limit, "Starting new game");
        Self {
            id,
            secret_combination,
            attempt_limit,
            attempts_used: 0,
            status: GameStatus::InProgress,
            created_at: now,
            last_touched_at: now,
            completed_at: None,
            guess_history: Vec::new(),
        }
    }

    /// Attempts left before the game is lost.
    pub fn attempts_remaining(&self) -> u32 {
        self.attempt_limit.saturating_sub(self.attempts_used)
    }

    /// Validates, scores and records a guess, advancing the status.
    ///
    /// The state is untouched when an error is returned.
    ///
    /// # Errors
    ///
    /// - [`RulesError::GameFinished`] if the game is already won or lost.
    /// - [`RulesError::LengthMismatch`] or [`RulesError::DigitOutOfRange`] for
    ///   an invalid guess.
    #[instrument(skip(self, guess), fields(game_id = %self.id, attempts_used = self.attempts_used))]
    pub fn apply_guess(
        &mut self,
        guess: Vec<i32>,
        range: DigitRange,
        now: DateTime<Utc>,
    ) -> Result<GuessEntry, RulesError> {
        if self.status.is_terminal() {
            return Err(RulesError::GameFinished { status: self.status });
        }

        validate_guess(&guess, self.secret_combination.len(), range)?;

        let feedback = score(&self.secret_combination, &guess);
        let attempts_used = self.attempts_used + 1;
        let outcome = if feedback.correct_positions as usize == self.secret_combination.len() {
            GuessOutcome::Solved
        } else {
            GuessOutcome::Missed {
                attempts_used,
                attempt_limit: self.attempt_limit,
            }
        };
        let status = self.status.transition(outcome)?;

        let entry = GuessEntry {
            attempt_number: attempts_used,
            guess,
            feedback,
            timestamp: now,
        };

        self.attempts_used = attempts_used;
        self.guess_history.push(entry.clone());
        self.status = status;
        if status.is_terminal() {
            info!(game_id = %self.id, %status, attempts_used, "Game completed");
            self.completed_at = Some(now);
        }
        self.last_touched_at = now;

        debug!(
            correct_positions = feedback.correct_positions,
            correct_numbers = feedback.correct_numbers,
            %status,
            "Guess recorded"
        );

        Ok(entry)
    }
}
