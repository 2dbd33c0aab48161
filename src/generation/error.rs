//! Error types for the generation round-trip.

use thiserror::Error;

/// Longest slice of a failed response body kept in an error message.
const BODY_EXCERPT_CHARS: usize = 300;

/// Any failure of one generation round-trip.
///
/// Callers are expected to treat every variant the same way: the round
/// failed and the previous artifact stays in place. The variants only exist
/// so the logs say why.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Network or transport failure (includes transport timeouts).
    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("generation service returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Start of the response body.
        body: String,
    },

    /// The service answered without any text payload.
    #[error("generation service returned no payload")]
    EmptyResponse,

    /// The payload was not the structured object we asked for.
    #[error("generation payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    /// The payload decoded but a required source was blank.
    #[error("generation payload has an empty `{0}` field")]
    BlankField(&'static str),

    /// No API credential was configured.
    #[error("API key required for the generation service")]
    MissingApiKey,
}

impl GenerationError {
    /// Build a [`GenerationError::Status`] keeping only the start of the body.
    #[must_use]
    pub fn status(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
        }
    }
}

/// Convenience result alias for generation operations.
pub type GenerationResult<T> = Result<T, GenerationError>;
