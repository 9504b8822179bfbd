//! Pipeline orchestration
//!
//! This module provides the public API for Chat DNA. It runs the full
//! computation for a timeline: baseline statistics, recent-window statistics,
//! anomaly detection and profile assembly.

use crate::adapter::parse_timeline;
use crate::anomaly::{compute_behavior_stats, compute_recent_stats, detect_anomalies};
use crate::config::EngineConfig;
use crate::error::ComputeError;
use crate::profile::ProfileAssembler;
use crate::types::{
    ActivitySummary, BehavioralProfile, ComputedProfile, Enrichment, Message, Participant,
    Timeline,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Computed profiles for every participant of a timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintReport {
    /// Profile of the configured owner, if present in the timeline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<ComputedProfile>,
    /// Everyone else, in order of first appearance
    pub contacts: Vec<ComputedProfile>,
}

impl FingerprintReport {
    /// Owner first (if any), then contacts
    pub fn into_profiles(self) -> Vec<ComputedProfile> {
        self.owner.into_iter().chain(self.contacts).collect()
    }
}

/// Convert a chat export JSON document to a JSON array of profiles (stateless, one-shot).
///
/// No enrichment is applied; narrative fields are empty. The output depends
/// only on the inputs, so equal calls return equal strings.
///
/// # Example
/// ```ignore
/// let profiles_json = chat_export_to_profiles_json(export_json, EngineConfig::default())?;
/// ```
pub fn chat_export_to_profiles_json(
    export_json: &str,
    config: EngineConfig,
) -> Result<String, ComputeError> {
    // Stage 1: Parse export into an ordered timeline
    let timeline = parse_timeline(export_json)?;

    // Stage 2: Compute fingerprints
    let engine = DnaEngine::new(config)?;
    let report = engine.fingerprint_all(&timeline);

    // Stage 3: Assemble without enrichment
    let profiles: Vec<BehavioralProfile> = report
        .into_profiles()
        .into_iter()
        .map(|computed| engine.assemble(computed, None))
        .collect();

    // Stage 4: Serialize
    for profile in &profiles {
        check_finite(profile)?;
    }
    serde_json::to_string_pretty(&profiles).map_err(ComputeError::JsonError)
}

fn check_finite(profile: &BehavioralProfile) -> Result<(), ComputeError> {
    let values = [
        ("avg_reply_latency_seconds", profile.timing.avg_reply_latency_seconds),
        ("reciprocity_ratio", profile.timing.reciprocity_ratio),
        ("emoji_density", profile.linguistic.emoji_density),
        (
            "recent.avg_reply_latency_seconds",
            profile.recent.timing.avg_reply_latency_seconds,
        ),
        ("recent.reciprocity_ratio", profile.recent.timing.reciprocity_ratio),
        ("recent.emoji_density", profile.recent.linguistic.emoji_density),
    ];

    match values.iter().find(|(_, v)| !v.is_finite()) {
        Some((field, value)) => Err(ComputeError::EncodingError(format!(
            "{} has non-finite {}: {}",
            profile.contact_id, field, value
        ))),
        None => Ok(()),
    }
}

/// Behavioral fingerprint engine
///
/// Holds only configuration; every call is a pure function of its inputs, so
/// one engine can be shared across threads.
#[derive(Debug, Clone)]
pub struct DnaEngine {
    config: EngineConfig,
}

impl DnaEngine {
    /// Create an engine, validating the configuration
    pub fn new(config: EngineConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute the fingerprint of one participant
    pub fn fingerprint(
        &self,
        timeline: &Timeline,
        participant_id: &str,
    ) -> Result<ComputedProfile, ComputeError> {
        let participant = timeline
            .participant(participant_id)
            .ok_or_else(|| ComputeError::UnknownParticipant(participant_id.to_string()))?;
        Ok(self.fingerprint_participant(timeline, participant))
    }

    /// Compute fingerprints for every participant, split into owner and contacts
    pub fn fingerprint_all(&self, timeline: &Timeline) -> FingerprintReport {
        let mut owner = None;
        let mut contacts = Vec::new();

        for participant in timeline.participants() {
            let profile = self.fingerprint_participant(timeline, participant);
            if profile.is_owner {
                owner = Some(profile);
            } else {
                contacts.push(profile);
            }
        }

        debug!(
            messages = timeline.len(),
            contacts = contacts.len(),
            has_owner = owner.is_some(),
            "fingerprinted timeline"
        );
        FingerprintReport { owner, contacts }
    }

    /// Merge a computed profile with enrichment; computed numbers always win
    pub fn assemble(
        &self,
        computed: ComputedProfile,
        enrichment: Option<Enrichment>,
    ) -> BehavioralProfile {
        ProfileAssembler::assemble(computed, enrichment)
    }

    fn fingerprint_participant(
        &self,
        timeline: &Timeline,
        participant: Participant,
    ) -> ComputedProfile {
        let id = participant.id.as_str();

        // Stage 1: Full-history baseline
        let baseline = compute_behavior_stats(timeline.messages(), id, &self.config);

        // Stage 2: Recent window from the global tail
        let recent = compute_recent_stats(timeline, id, &self.config);

        // Stage 3: Deviations
        let anomalies = detect_anomalies(&baseline, &recent, &self.config);

        // Stage 4: Activity counts
        let activity = summarize_activity(timeline.messages(), id);

        debug!(
            participant = id,
            anomalies = anomalies.len(),
            comm_style = ?baseline.timing.comm_style,
            "computed fingerprint"
        );

        ComputedProfile {
            is_owner: self.config.is_owner(id),
            contact_id: participant.id,
            contact_name: participant.name,
            timing: baseline.timing,
            linguistic: baseline.linguistic,
            recent,
            anomalies,
            activity,
        }
    }
}

/// Message counts and first/last timestamps for one participant
pub fn summarize_activity(messages: &[Message], participant_id: &str) -> ActivitySummary {
    let mut summary = ActivitySummary::default();
    for msg in messages.iter().filter(|m| m.participant_id == participant_id) {
        summary.message_count += 1;
        if msg.has_text() {
            summary.text_message_count += 1;
        }
        if summary.first_seen.is_none() {
            summary.first_seen = Some(msg.timestamp);
        }
        summary.last_seen = Some(msg.timestamp);
    }
    summary
}
