//! Pure Mastermind game logic.
//!
//! This crate has no I/O. It owns the session data model, guess validation,
//! the scoring algorithm and the status transition function. Persistence and
//! secret generation live in the `mastermind` crate.
//!
//! # Example
//!
//! ```
//! use mastermind_rules::{DigitRange, GameState, GameStatus};
//!
//! let now = chrono::Utc::now();
//! let mut game = GameState::new(vec![0, 1, 2, 3], 10, now);
//! let entry = game
//!     .apply_guess(vec![0, 1, 2, 3], DigitRange::new(0, 7), now)
//!     .expect("valid guess");
//!
//! assert_eq!(*entry.feedback().correct_positions(), 4);
//! assert_eq!(*game.status(), GameStatus::Won);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod scoring;
mod state;
mod transition;
mod validation;

pub use error::RulesError;
pub use scoring::score;
pub use state::{Feedback, GameId, GameState, GuessEntry};
pub use transition::{GameStatus, GuessOutcome};
pub use validation::{DigitRange, validate_guess};
