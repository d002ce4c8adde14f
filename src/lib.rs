//! Mastermind game server library
//!
//! Players try to deduce a hidden sequence of digits. Each guess is scored
//! with the number of digits in the right position and the number of digits
//! shared with the secret regardless of position.
//!
//! # Architecture
//!
//! - **Rules**: scoring, validation and status transitions (`mastermind_rules`)
//! - **Random**: secret generation via random.org with a local fallback
//! - **Store**: expiring JSON session store over memory or HTTP backends
//! - **Engine**: create, guess and read operations over stored game state
//! - **Server**: axum routes exposing the engine
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mastermind::{GameEngine, Settings};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = GameEngine::from_settings(&Settings::default())?;
//! let cancel = CancellationToken::new();
//!
//! let game = engine.create_game(&cancel).await?;
//! let entry = engine.submit_guess(*game.id(), vec![0, 1, 2, 3], &cancel).await?;
//! println!("{} in place", entry.feedback().correct_positions());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod engine;
mod error;
mod random;
mod server;
mod store;

// Crate-level exports - Configuration
pub use config::{
    ConfigError, GamePlaySettings, MIN_SECRET_LENGTH, RandomApiSettings, ServerSettings, Settings, StoreBackend,
    StoreSettings,
};

// Crate-level exports - Engine
pub use engine::GameEngine;
pub use error::{GameError, GameErrorKind};

// Crate-level exports - Secret sources
pub use random::{LocalSource, RandomOrgSource, SecretSource, UpstreamError};

// Crate-level exports - Session store
pub use store::{
    ABSOLUTE_TTL_PARAM, EntryOptions, HttpStore, KeyValueStore, MAX_KEY_CHARS, MemoryStore, SLIDING_TTL_PARAM,
    SessionStore, StoreError, StoreErrorKind, StoreKey, Ttl, TtlDefaults, build_key, normalize_key,
    normalize_segment,
};

// Crate-level exports - HTTP surface
pub use server::{ApiError, GameResponse, GuessDto, GuessRequest, HealthResponse, Problem, router};

// Crate-level exports - Game rules
pub use mastermind_rules::{
    DigitRange, Feedback, GameId, GameState, GameStatus, GuessEntry, GuessOutcome, RulesError, score, validate_guess,
};
