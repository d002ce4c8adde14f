//! Game session engine.

use std::sync::Arc;

use chrono::Utc;
use mastermind_rules::{GameId, GameState, GuessEntry};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{ConfigError, GamePlaySettings, Settings, StoreBackend};
use crate::error::{GameError, GameErrorKind};
use crate::random::{RandomOrgSource, SecretSource};
use crate::store::{HttpStore, KeyValueStore, MemoryStore, SessionStore};

/// Creates games, scores guesses and reads game state.
///
/// Every operation loads the whole [`GameState`] from the session store,
/// applies one change and writes it back. Concurrent guesses on the same game
/// are last-write-wins: there is no compare-and-swap or per-game lock.
#[derive(Clone)]
pub struct GameEngine {
    store: SessionStore<Arc<dyn KeyValueStore>>,
    secrets: Arc<dyn SecretSource>,
    settings: GamePlaySettings,
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl GameEngine {
    /// Creates an engine over the given store and secret source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `settings` fail [`GamePlaySettings::validate`].
    pub fn new(
        store: SessionStore<Arc<dyn KeyValueStore>>,
        secrets: Arc<dyn SecretSource>,
        settings: GamePlaySettings,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            store,
            secrets,
            settings,
        })
    }

    /// Wires the configured store backend and random.org source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the settings are invalid or a client cannot
    /// be built from them.
    #[instrument(skip(settings), fields(backend = %settings.store().backend()))]
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let store_settings = settings.store();
        let backend: Arc<dyn KeyValueStore> = match store_settings.backend() {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::Http => {
                let base_url = store_settings
                    .base_url()
                    .as_deref()
                    .ok_or_else(|| ConfigError::new("store.base_url is required for the http backend"))?;
                let store = HttpStore::new(base_url, store_settings.timeout())
                    .map_err(|e| ConfigError::new(e.message))?;
                Arc::new(store)
            }
        };
        let store = SessionStore::new(backend, store_settings.ttl_defaults())
            .with_diagnostics(*store_settings.enable_diagnostics());

        let random_api = settings.random_api();
        let secrets = RandomOrgSource::new(
            random_api.base_address(),
            random_api.integers_endpoint(),
            random_api.timeout(),
        )
        .map_err(|e| ConfigError::new(e.message))?;

        info!("Game engine ready");
        Self::new(store, Arc::new(secrets), settings.game_play().clone())
    }

    /// Game rules in effect.
    pub fn settings(&self) -> &GamePlaySettings {
        &self.settings
    }

    /// Starts a new game with a fresh secret and persists it.
    ///
    /// # Errors
    ///
    /// - `GameErrorKind::Cancelled` if `cancel` fires; nothing is stored.
    /// - `GameErrorKind::UpstreamFailure` if the secret source returns the
    ///   wrong number of digits or digits outside the range.
    /// - `GameErrorKind::StoreFailure` if the write fails.
    #[instrument(skip(self, cancel))]
    pub async fn create_game(&self, cancel: &CancellationToken) -> Result<GameState, GameError> {
        let length = *self.settings.secret_combination_length();
        let range = self.settings.digit_range();
        let secret = self.secrets.generate(length, range, cancel).await;

        if secret.len() != length || !secret.iter().all(|digit| range.contains(*digit)) {
            error!(expected = length, actual = secret.len(), "Secret source returned an unusable secret");
            return Err(GameError::new(
                GameErrorKind::UpstreamFailure,
                format!("Secret source returned an unusable secret of {} digits", secret.len()),
            ));
        }

        if cancel.is_cancelled() {
            warn!("Game creation cancelled before persisting");
            return Err(GameError::cancelled("Game creation cancelled"));
        }

        let state = GameState::new(secret, *self.settings.default_attempt_limit(), Utc::now());
        self.save(&state, cancel).await?;

        info!(game_id = %state.id(), "Game created");
        Ok(state)
    }

    /// Scores `guess` against the game and persists the new state.
    ///
    /// # Errors
    ///
    /// - `GameErrorKind::NotFound` if the game does not exist or expired.
    /// - `GameErrorKind::Conflict` if the game is already won or lost.
    /// - `GameErrorKind::InvalidArgument` for a malformed guess; the stored
    ///   state is left unchanged.
    /// - `GameErrorKind::StoreFailure` or `GameErrorKind::Cancelled` from the store.
    #[instrument(skip(self, guess, cancel), fields(game_id = %id, guess_len = guess.len()))]
    pub async fn submit_guess(
        &self,
        id: GameId,
        guess: Vec<i32>,
        cancel: &CancellationToken,
    ) -> Result<GuessEntry, GameError> {
        let mut state = self.load(id, cancel).await?;

        let entry = state
            .apply_guess(guess, self.settings.digit_range(), Utc::now())
            .map_err(|e| {
                warn!(error = %e, "Guess rejected");
                GameError::from(e)
            })?;

        self.save(&state, cancel).await?;

        info!(
            attempt = entry.attempt_number(),
            correct_positions = entry.feedback().correct_positions(),
            correct_numbers = entry.feedback().correct_numbers(),
            status = %state.status(),
            "Guess scored"
        );
        Ok(entry)
    }

    /// Returns the current state of a game.
    ///
    /// # Errors
    ///
    /// Returns `GameErrorKind::NotFound` if the game does not exist or expired.
    #[instrument(skip(self, cancel), fields(game_id = %id))]
    pub async fn get_game(&self, id: GameId, cancel: &CancellationToken) -> Result<GameState, GameError> {
        self.load(id, cancel).await
    }

    async fn load(&self, id: GameId, cancel: &CancellationToken) -> Result<GameState, GameError> {
        match self.store.get::<GameState>(id.to_string(), cancel).await? {
            Some(state) => {
                debug!(status = %state.status(), attempts_used = state.attempts_used(), "Game loaded");
                Ok(state)
            }
            None => Err(GameError::not_found(format!("Game {} not found", id))),
        }
    }

    async fn save(&self, state: &GameState, cancel: &CancellationToken) -> Result<(), GameError> {
        if cancel.is_cancelled() {
            return Err(GameError::cancelled("Cancelled before saving game"));
        }
        self.store
            .set(state.id().to_string(), state, self.settings.ttl(), cancel)
            .await?;
        Ok(())
    }
}
