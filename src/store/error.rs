//! Session store error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Category of a store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum StoreErrorKind {
    /// Key is empty or normalizes to nothing.
    #[display("invalid key")]
    InvalidKey,
    /// Value could not be encoded or decoded.
    #[display("serialization")]
    Serialization,
    /// The backing store failed.
    #[display("backend")]
    Backend,
    /// The caller's cancellation token fired.
    #[display("cancelled")]
    Cancelled,
}

/// Session store error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Store error ({}): {} at {}:{}", kind, message, file, line)]
pub struct StoreError {
    /// Failure category.
    pub kind: StoreErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for [`StoreErrorKind::Backend`].
    #[track_caller]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Backend, message)
    }

    /// Shorthand for [`StoreErrorKind::InvalidKey`].
    #[track_caller]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::InvalidKey, message)
    }

    /// Shorthand for [`StoreErrorKind::Cancelled`].
    #[track_caller]
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Cancelled, message)
    }
}

impl From<serde_json::Error> for StoreError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(StoreErrorKind::Serialization, format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for StoreError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::backend(format!("HTTP store request failed: {}", err))
    }
}
