//! Failure taxonomy for one answer-retrieval call.
//!
//! Exactly one of these is produced per failed call; the Display prefix is the
//! machine-readable category operators grep for in channel history and logs.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnswerError {
    /// Backend responded with a non-200 status. The body is not parsed.
    #[error("http-status: backend returned status {0}")]
    HttpStatus(u16),

    /// Transport-level failure (connect, timeout, mid-stream read). Reported,
    /// not retried; the caller decides whether to retry.
    #[error("network-error: {0}")]
    Network(String),

    /// Word delivery to the platform failed inside the streaming path.
    #[error("platform-error: {0}")]
    Platform(String),
}

impl AnswerError {
    /// Wraps a reqwest transport error as [`AnswerError::Network`].
    pub(crate) fn network(e: reqwest::Error) -> Self {
        AnswerError::Network(e.to_string())
    }
}
