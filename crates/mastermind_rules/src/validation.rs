//! Guess validation against the secret length and the digit range.

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::RulesError;

/// Inclusive range of digits allowed in secrets and guesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DigitRange {
    min: i32,
    max: i32,
}

impl DigitRange {
    /// Creates a range covering `min..=max`.
    ///
    /// Callers are expected to pass `min <= max`; an inverted range contains nothing.
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Inclusive lower bound.
    pub fn min(&self) -> i32 {
        self.min
    }

    /// Inclusive upper bound.
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Returns true if `digit` lies within the range.
    pub fn contains(&self, digit: i32) -> bool {
        (self.min..=self.max).contains(&digit)
    }
}

/// Checks that `guess` has `required_len` digits, each inside `range`.
///
/// # Errors
///
/// Returns [`RulesError::LengthMismatch`] when the length differs and
/// [`RulesError::DigitOutOfRange`] for the first digit outside the range.
#[instrument(skip(guess), fields(guess_len = guess.len()))]
pub fn validate_guess(guess: &[i32], required_len: usize, range: DigitRange) -> Result<(), RulesError> {
    if guess.len() != required_len {
        warn!(expected = required_len, actual = guess.len(), "Guess has wrong length");
        return Err(RulesError::LengthMismatch {
            expected: required_len,
            actual: guess.len(),
        });
    }

    if let Some(&digit) = guess.iter().find(|d| !range.contains(**d)) {
        warn!(digit, min = range.min, max = range.max, "Guess digit out of range");
        return Err(RulesError::DigitOutOfRange {
            digit,
            min: range.min,
            max: range.max,
        });
    }

    Ok(())
}
