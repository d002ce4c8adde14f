//! HTTP surface for the game engine.
//!
//! Routes:
//!
//! - `POST /api/games` creates a game (201, `Location` header).
//! - `POST /api/games/{id}/guesses` scores a guess and returns the updated game.
//! - `GET /api/games/{id}` returns the game.
//! - `GET /api/health` reports liveness.
//!
//! The secret combination never leaves the engine.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use derive_new::new;
use mastermind_rules::{GameId, GameState, GameStatus, GuessEntry};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tracing::{debug, error, info, instrument, warn};

use crate::engine::GameEngine;
use crate::error::{GameError, GameErrorKind};

/// Body of `POST /api/games/{id}/guesses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct GuessRequest {
    /// Guessed digits.
    pub guess: Vec<i32>,
}

/// One scored guess as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct GuessDto {
    /// One-based attempt number.
    pub attempt: u32,
    /// Guessed digits.
    pub guess: Vec<i32>,
    /// Digits present in the secret regardless of position.
    pub correct_numbers: u32,
    /// Digits in the right position.
    pub correct_positions: u32,
    /// When the guess was scored.
    pub at_utc: DateTime<Utc>,
}

impl From<&GuessEntry> for GuessDto {
    fn from(entry: &GuessEntry) -> Self {
        Self::new(
            *entry.attempt_number(),
            entry.guess().clone(),
            *entry.feedback().correct_numbers(),
            *entry.feedback().correct_positions(),
            *entry.timestamp(),
        )
    }
}

/// Public view of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct GameResponse {
    /// Game identifier.
    pub game_id: GameId,
    /// Lifecycle status.
    pub status: GameStatus,
    /// Guesses left.
    pub attempts_remaining: u32,
    /// Scored guesses in attempt order.
    pub history: Vec<GuessDto>,
}

impl From<&GameState> for GameResponse {
    fn from(state: &GameState) -> Self {
        Self::new(
            *state.id(),
            *state.status(),
            state.attempts_remaining(),
            state.guess_history().iter().map(GuessDto::from).collect(),
        )
    }
}

/// Error body returned for failed requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct Problem {
    /// Short summary of the failure class.
    pub title: String,
    /// Human-readable explanation.
    pub detail: String,
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct HealthResponse {
    /// Always `Healthy` while the process serves requests.
    pub status: String,
    /// Server time.
    pub timestamp_utc: DateTime<Utc>,
}

/// [`GameError`] rendered as an HTTP problem response.
#[derive(Debug)]
pub struct ApiError(GameError);

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, title) = match self.0.kind {
            GameErrorKind::InvalidArgument => (StatusCode::BAD_REQUEST, "Invalid guess"),
            GameErrorKind::NotFound => (StatusCode::NOT_FOUND, "Game not found"),
            GameErrorKind::Conflict => (StatusCode::CONFLICT, "Game already completed"),
            GameErrorKind::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, "Request cancelled"),
            GameErrorKind::StoreFailure => (StatusCode::INTERNAL_SERVER_ERROR, "Session store failure"),
            GameErrorKind::UpstreamFailure => (StatusCode::INTERNAL_SERVER_ERROR, "Upstream failure"),
        };

        if status.is_server_error() {
            error!(kind = %self.0.kind, error = %self.0, "Request failed");
        } else {
            debug!(kind = %self.0.kind, error = %self.0, "Request rejected");
        }

        (status, Json(Problem::new(title.to_string(), self.0.message))).into_response()
    }
}

/// Builds the application router.
pub fn router(engine: Arc<GameEngine>) -> Router {
    Router::new()
        .route("/api/games", post(create_game))
        .route("/api/games/{id}", get(get_game))
        .route("/api/games/{id}/guesses", post(submit_guess))
        .route("/api/health", get(health))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(engine)
}

/// Token cancelled when the returned guard drops, i.e. when the handler
/// future completes or is dropped on client disconnect.
fn request_token() -> (CancellationToken, tokio_util::sync::DropGuard) {
    let token = CancellationToken::new();
    let guard = token.clone().drop_guard();
    (token, guard)
}

#[instrument(skip(engine))]
async fn create_game(State(engine): State<Arc<GameEngine>>) -> Result<Response, ApiError> {
    let (cancel, _guard) = request_token();
    let state = engine.create_game(&cancel).await?;

    let location = format!("/api/games/{}", state.id());
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(GameResponse::from(&state)),
    )
        .into_response())
}

#[instrument(skip(engine))]
async fn get_game(
    State(engine): State<Arc<GameEngine>>,
    Path(id): Path<GameId>,
) -> Result<Json<GameResponse>, ApiError> {
    let (cancel, _guard) = request_token();
    let state = engine.get_game(id, &cancel).await?;
    Ok(Json(GameResponse::from(&state)))
}

#[instrument(skip(engine, request), fields(guess_len = request.guess.len()))]
async fn submit_guess(
    State(engine): State<Arc<GameEngine>>,
    Path(id): Path<GameId>,
    Json(request): Json<GuessRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    let (cancel, _guard) = request_token();
    engine.submit_guess(id, request.guess, &cancel).await?;

    let state = engine.get_game(id, &cancel).await.map_err(|e| {
        warn!(error = %e, "Game vanished after scoring");
        e
    })?;
    Ok(Json(GameResponse::from(&state)))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::new("Healthy".to_string(), Utc::now()))
}
