//! Error types for Chat DNA

use thiserror::Error;

/// Errors that can occur during computation
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse chat export: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Timeline is not in chronological order at message {index}: {current} precedes {previous}")]
    UnorderedTimeline {
        index: usize,
        previous: String,
        current: String,
    },

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Participant not found in timeline: {0}")]
    UnknownParticipant(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
