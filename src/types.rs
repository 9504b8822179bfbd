//! Chat timeline and behavioral fingerprint types
//!
//! This module defines the messages that flow into the engine and the derived
//! statistics, anomalies and profiles that flow out of it.

use crate::error::ComputeError;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single chat message as exported by the collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier
    pub id: String,
    /// Author identifier
    #[serde(alias = "sender_id")]
    pub participant_id: String,
    /// Author display name
    #[serde(alias = "sender_name")]
    pub participant_name: String,
    /// Text content (may be empty or whitespace-only)
    #[serde(default)]
    pub content: String,
    /// Timestamp with the offset it was recorded in
    pub timestamp: DateTime<FixedOffset>,
    /// Author role (unused by the engine)
    #[serde(default = "default_role")]
    pub role: String,
    /// Free-form metadata (unused by the engine)
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

fn default_role() -> String {
    "user".to_string()
}

impl Message {
    /// Create a message with empty metadata and the default role
    pub fn new(
        id: impl Into<String>,
        participant_id: impl Into<String>,
        participant_name: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: id.into(),
            participant_id: participant_id.into(),
            participant_name: participant_name.into(),
            content: content.into(),
            timestamp,
            role: default_role(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Whether the message carries any non-whitespace text
    pub fn has_text(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// A conversation participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
}

/// Chronologically ordered messages of one conversation.
///
/// The timeline is never re-sorted; construction fails if a timestamp goes
/// backwards. Equal timestamps keep their input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Message>", into = "Vec<Message>")]
pub struct Timeline {
    messages: Vec<Message>,
}

impl Timeline {
    /// Build a timeline, validating that timestamps are non-decreasing
    pub fn new(messages: Vec<Message>) -> Result<Self, ComputeError> {
        for (index, pair) in messages.windows(2).enumerate() {
            if pair[1].timestamp < pair[0].timestamp {
                return Err(ComputeError::UnorderedTimeline {
                    index: index + 1,
                    previous: pair[0].timestamp.to_rfc3339(),
                    current: pair[1].timestamp.to_rfc3339(),
                });
            }
        }
        Ok(Self { messages })
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The last `n` messages of the whole timeline (all participants)
    pub fn tail(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Participants in order of first appearance
    pub fn participants(&self) -> Vec<Participant> {
        let mut seen = HashSet::new();
        self.messages
            .iter()
            .filter(|m| seen.insert(m.participant_id.as_str()))
            .map(|m| Participant {
                id: m.participant_id.clone(),
                name: m.participant_name.clone(),
            })
            .collect()
    }

    /// Look up a participant by id
    pub fn participant(&self, participant_id: &str) -> Option<Participant> {
        self.messages
            .iter()
            .find(|m| m.participant_id == participant_id)
            .map(|m| Participant {
                id: m.participant_id.clone(),
                name: m.participant_name.clone(),
            })
    }
}

impl TryFrom<Vec<Message>> for Timeline {
    type Error = ComputeError;

    fn try_from(messages: Vec<Message>) -> Result<Self, Self::Error> {
        Self::new(messages)
    }
}

impl From<Timeline> for Vec<Message> {
    fn from(timeline: Timeline) -> Self {
        timeline.messages
    }
}

/// Sending cadence classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CommStyle {
    /// Sends bursts of rapid messages
    Batcher,
    /// Sends a steady flow of single messages
    #[default]
    Streamer,
}

/// Timing statistics for one participant
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimingStats {
    /// Mean gap (seconds) between another participant's message and this participant's reply
    pub avg_reply_latency_seconds: f64,
    /// Up to 5 most active hours (0-23), most frequent first, ties by ascending hour
    pub peak_activity_hours: Vec<u32>,
    /// Fraction of conversations started by this participant (0-1)
    #[serde(alias = "initiation_rate")]
    pub reciprocity_ratio: f64,
    /// Batcher or Streamer
    pub comm_style: CommStyle,
}

impl TimingStats {
    /// Same value as `reciprocity_ratio`
    pub fn initiation_rate(&self) -> f64 {
        self.reciprocity_ratio
    }
}

/// Linguistic statistics for one participant
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinguisticStats {
    /// Emoji runs per non-empty message, rounded to 2 decimals
    pub emoji_density: f64,
    /// Whitespace-delimited words per non-empty message (truncated)
    pub avg_word_count: u32,
}

/// Timing and linguistic statistics computed over the same slice
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BehaviorStats {
    pub timing: TimingStats,
    pub linguistic: LinguisticStats,
}

/// Metrics tracked by the anomaly detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyMetric {
    ReplyLatency,
    EmojiDensity,
    AvgWordCount,
}

impl AnomalyMetric {
    /// Human-readable label used in anomaly descriptions
    pub fn label(&self) -> &'static str {
        match self {
            AnomalyMetric::ReplyLatency => "Reply latency",
            AnomalyMetric::EmojiDensity => "Emoji density",
            AnomalyMetric::AvgWordCount => "Average word count",
        }
    }
}

/// A recent-window deviation from the full-history baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    /// Which metric deviated
    pub metric: AnomalyMetric,
    /// Full-history value
    pub baseline: f64,
    /// Recent-window value
    pub current: f64,
    /// current / baseline
    pub deviation_factor: f64,
    /// Human-readable summary
    pub description: String,
}

/// Raw activity counts for one participant
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivitySummary {
    /// All messages authored, including empty ones
    pub message_count: u32,
    /// Messages with non-whitespace content
    pub text_message_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_seen: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<FixedOffset>>,
}

/// Deterministic fingerprint of one participant, before any enrichment.
///
/// This is the read-only record handed to the external enrichment step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedProfile {
    pub contact_id: String,
    pub contact_name: String,
    /// Whether this participant is the configured owner
    pub is_owner: bool,
    /// Full-history timing statistics
    pub timing: TimingStats,
    /// Full-history linguistic statistics
    pub linguistic: LinguisticStats,
    /// Statistics over the recent window
    pub recent: BehaviorStats,
    pub anomalies: Vec<Anomaly>,
    pub activity: ActivitySummary,
}

/// Typing-style fields returned by the enrichment step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingStyleEnrichment {
    /// Numeric estimate, discarded on assembly
    pub emoji_density: Option<f64>,
    /// Numeric estimate, discarded on assembly
    pub avg_word_count: Option<f64>,
    pub formality_level: Option<String>,
    pub use_of_slang: Option<bool>,
    pub punctuation_style: Option<String>,
    pub jargon_used: Vec<String>,
}

/// Everything the external enrichment step may return for a participant.
///
/// Narrative fields pass through to the final profile untouched. Numeric
/// estimates are accepted so model output parses, but never survive assembly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Enrichment {
    pub vibe_description: Option<String>,
    pub core_topics: Vec<String>,
    pub typing_style: TypingStyleEnrichment,
    /// Numeric estimate, discarded on assembly
    pub reciprocity_ratio: Option<f64>,
    /// Numeric estimate, discarded on assembly
    pub avg_latency: Option<f64>,
    /// Categorical estimate, discarded on assembly
    pub comm_style: Option<String>,
    /// Numeric estimate, discarded on assembly
    pub peak_activity_hours: Option<Vec<u32>>,
}

/// Narrative fields carried from enrichment into the final profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileNarrative {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vibe_description: Option<String>,
    pub core_topics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formality_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_of_slang: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub punctuation_style: Option<String>,
    pub jargon_used: Vec<String>,
}

/// Final per-participant record: computed statistics plus advisory narrative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralProfile {
    pub contact_id: String,
    pub contact_name: String,
    pub is_owner: bool,
    pub timing: TimingStats,
    pub linguistic: LinguisticStats,
    pub recent: BehaviorStats,
    pub anomalies: Vec<Anomaly>,
    pub activity: ActivitySummary,
    pub narrative: ProfileNarrative,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .timestamp_opt(1_705_327_200 + secs, 0)
            .unwrap()
    }

    #[test]
    fn test_message_deserialization_with_export_field_names() {
        let json = r#"{
            "id": "m1",
            "sender_id": "u2",
            "sender_name": "Aarav",
            "content": "Bro did you watch the F1 qualifying?",
            "timestamp": "2024-01-15T14:05:00+05:30"
        }"#;

        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.participant_id, "u2");
        assert_eq!(msg.participant_name, "Aarav");
        assert_eq!(msg.role, "user");
        assert!(msg.metadata.is_empty());
        assert_eq!(msg.timestamp.offset().local_minus_utc(), 19_800);
    }

    #[test]
    fn test_has_text() {
        assert!(Message::new("m1", "u1", "A", "hey", at(0)).has_text());
        assert!(!Message::new("m2", "u1", "A", "  \n\t", at(0)).has_text());
        assert!(!Message::new("m3", "u1", "A", "", at(0)).has_text());
    }

    #[test]
    fn test_timeline_rejects_out_of_order() {
        let messages = vec![
            Message::new("m1", "u1", "A", "first", at(100)),
            Message::new("m2", "u2", "B", "second", at(50)),
        ];

        match Timeline::new(messages) {
            Err(ComputeError::UnorderedTimeline { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected UnorderedTimeline, got {other:?}"),
        }
    }

    #[test]
    fn test_timeline_accepts_equal_timestamps() {
        let messages = vec![
            Message::new("m1", "u1", "A", "first", at(0)),
            Message::new("m2", "u2", "B", "same instant", at(0)),
        ];

        let timeline = Timeline::new(messages).unwrap();
        assert_eq!(timeline.messages()[0].id, "m1");
        assert_eq!(timeline.messages()[1].id, "m2");
    }

    #[test]
    fn test_timeline_tail_and_participants() {
        let messages = vec![
            Message::new("m1", "u2", "Priya", "hi", at(0)),
            Message::new("m2", "u1", "Anupam", "hey", at(10)),
            Message::new("m3", "u2", "Priya", "how are you", at(20)),
        ];
        let timeline = Timeline::new(messages).unwrap();

        assert_eq!(timeline.tail(2).len(), 2);
        assert_eq!(timeline.tail(2)[0].id, "m2");
        assert_eq!(timeline.tail(30).len(), 3);

        let ids: Vec<String> = timeline.participants().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["u2", "u1"]);
        assert_eq!(timeline.participant("u1").unwrap().name, "Anupam");
        assert!(timeline.participant("u9").is_none());
    }

    #[test]
    fn test_timeline_deserialization_validates_order() {
        let json = r#"[
            {"id": "m1", "sender_id": "u1", "sender_name": "A", "content": "x", "timestamp": "2024-01-15T14:05:00Z"},
            {"id": "m2", "sender_id": "u2", "sender_name": "B", "content": "y", "timestamp": "2024-01-15T14:00:00Z"}
        ]"#;

        let result: Result<Timeline, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_comm_style_serialization() {
        assert_eq!(serde_json::to_string(&CommStyle::Batcher).unwrap(), "\"Batcher\"");
        let parsed: CommStyle = serde_json::from_str("\"Streamer\"").unwrap();
        assert_eq!(parsed, CommStyle::Streamer);
    }

    #[test]
    fn test_anomaly_metric_serialization() {
        let json = serde_json::to_string(&AnomalyMetric::ReplyLatency).unwrap();
        assert_eq!(json, "\"reply_latency\"");
        assert_eq!(AnomalyMetric::AvgWordCount.label(), "Average word count");
    }

    #[test]
    fn test_timing_stats_accepts_initiation_rate_alias() {
        let json = r#"{
            "avg_reply_latency_seconds": 12.5,
            "peak_activity_hours": [21, 9],
            "initiation_rate": 0.25,
            "comm_style": "Batcher"
        }"#;

        let stats: TimingStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.initiation_rate(), 0.25);
        assert_eq!(stats.comm_style, CommStyle::Batcher);
    }

    #[test]
    fn test_enrichment_tolerates_partial_payload() {
        let json = r#"{
            "contact_name": "Priya",
            "vibe_description": "Warm, lots of emotional sharing",
            "typing_style": {"formality_level": "Casual"}
        }"#;

        let enrichment: Enrichment = serde_json::from_str(json).unwrap();
        assert_eq!(
            enrichment.vibe_description.as_deref(),
            Some("Warm, lots of emotional sharing")
        );
        assert!(enrichment.core_topics.is_empty());
        assert_eq!(enrichment.typing_style.formality_level.as_deref(), Some("Casual"));
        assert!(enrichment.reciprocity_ratio.is_none());
    }
}
