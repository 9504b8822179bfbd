//! Chat export adapter
//!
//! Parses a chat export JSON document and turns it into a validated
//! [`Timeline`]. Messages are taken in the order they appear; the adapter
//! never sorts them.

use crate::error::ComputeError;
use crate::types::{Message, Participant, Timeline};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A chat export: one conversation with its participants and messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatExport {
    /// Conversation identifier
    #[serde(default)]
    pub chat_id: String,
    /// Declared participants (may be empty; message authors are authoritative)
    #[serde(default)]
    pub participants: Vec<Participant>,
    /// Messages in chronological order
    pub messages: Vec<Message>,
}

/// Parse a chat export JSON string
pub fn parse_chat_export(json: &str) -> Result<ChatExport, ComputeError> {
    serde_json::from_str(json)
        .map_err(|e| ComputeError::ParseError(format!("Failed to parse chat export: {}", e)))
}

/// Convert a parsed export into a timeline, validating chronological order
pub fn export_to_timeline(export: ChatExport) -> Result<Timeline, ComputeError> {
    let chat_id = export.chat_id;
    let count = export.messages.len();

    let timeline = Timeline::new(export.messages).inspect_err(|e| {
        warn!(chat_id = chat_id.as_str(), error = %e, "rejecting chat export");
    })?;

    debug!(chat_id = chat_id.as_str(), messages = count, "chat export accepted");
    Ok(timeline)
}

/// Parse a chat export JSON string straight into a timeline
pub fn parse_timeline(json: &str) -> Result<Timeline, ComputeError> {
    export_to_timeline(parse_chat_export(json)?)
}
