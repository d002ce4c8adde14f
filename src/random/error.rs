//! Remote randomness service errors.

use derive_more::{Display, Error};
use tracing::instrument;

/// Failure talking to the remote randomness service.
#[derive(Debug, Clone, Display, Error)]
#[display("Upstream error: {} at {}:{}", message, file, line)]
pub struct UpstreamError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl UpstreamError {
    /// Creates a new upstream error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(format!("Random service timed out: {}", err))
        } else {
            Self::new(format!("Random service request failed: {}", err))
        }
    }
}
