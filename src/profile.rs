//! Profile assembly
//!
//! Merges a [`ComputedProfile`] with the enrichment returned by the external
//! language-model step. Computed numbers always win: enrichment contributes
//! narrative fields only, and any numeric estimates it carries are dropped.

use crate::error::ComputeError;
use crate::types::{BehavioralProfile, CommStyle, ComputedProfile, Enrichment, ProfileNarrative};
use tracing::debug;

/// Maximum number of core topics kept from enrichment
pub const MAX_CORE_TOPICS: usize = 5;

/// Parse enrichment JSON as returned by a language model.
///
/// Markdown code fences around the payload are stripped. Unknown fields are
/// ignored and missing ones default, so partial answers still parse.
pub fn parse_enrichment(raw: &str) -> Result<Enrichment, ComputeError> {
    let body = strip_code_fences(raw);
    serde_json::from_str(body)
        .map_err(|e| ComputeError::ParseError(format!("Failed to parse enrichment: {}", e)))
}

fn strip_code_fences(raw: &str) -> &str {
    let mut body = raw.trim();
    if body.starts_with("```") {
        body = body.split_once('\n').map_or("", |(_, rest)| rest);
    }
    if let Some(stripped) = body.trim_end().strip_suffix("```") {
        body = stripped;
    }
    body.trim()
}

/// Builds final profiles from computed statistics and optional enrichment
pub struct ProfileAssembler;

impl ProfileAssembler {
    /// Assemble the final profile.
    ///
    /// Identity, statistics, anomalies and activity come from `computed`.
    /// Narrative fields come from `enrichment` unchanged, apart from capping
    /// `core_topics` at [`MAX_CORE_TOPICS`].
    pub fn assemble(
        computed: ComputedProfile,
        enrichment: Option<Enrichment>,
    ) -> BehavioralProfile {
        let narrative = match enrichment {
            Some(enrichment) => {
                log_discarded_estimates(&computed, &enrichment);
                into_narrative(enrichment)
            }
            None => ProfileNarrative::default(),
        };

        BehavioralProfile {
            contact_id: computed.contact_id,
            contact_name: computed.contact_name,
            is_owner: computed.is_owner,
            timing: computed.timing,
            linguistic: computed.linguistic,
            recent: computed.recent,
            anomalies: computed.anomalies,
            activity: computed.activity,
            narrative,
        }
    }
}

fn into_narrative(enrichment: Enrichment) -> ProfileNarrative {
    let Enrichment {
        vibe_description,
        mut core_topics,
        typing_style,
        ..
    } = enrichment;
    core_topics.truncate(MAX_CORE_TOPICS);

    ProfileNarrative {
        vibe_description,
        core_topics,
        formality_level: typing_style.formality_level,
        use_of_slang: typing_style.use_of_slang,
        punctuation_style: typing_style.punctuation_style,
        jargon_used: typing_style.jargon_used,
    }
}

fn log_discarded_estimates(computed: &ComputedProfile, enrichment: &Enrichment) {
    let contact = computed.contact_id.as_str();

    if let Some(estimate) = enrichment.avg_latency {
        if estimate != computed.timing.avg_reply_latency_seconds {
            debug!(
                contact,
                estimate,
                computed = computed.timing.avg_reply_latency_seconds,
                "discarding enrichment avg_latency"
            );
        }
    }
    if let Some(estimate) = enrichment.reciprocity_ratio {
        if estimate != computed.timing.reciprocity_ratio {
            debug!(
                contact,
                estimate,
                computed = computed.timing.reciprocity_ratio,
                "discarding enrichment reciprocity_ratio"
            );
        }
    }
    if let Some(estimate) = enrichment.comm_style.as_deref() {
        let computed_style = match computed.timing.comm_style {
            CommStyle::Batcher => "Batcher",
            CommStyle::Streamer => "Streamer",
        };
        if !estimate.eq_ignore_ascii_case(computed_style) {
            debug!(
                contact,
                estimate,
                computed = computed_style,
                "discarding enrichment comm_style"
            );
        }
    }
    if let Some(estimate) = &enrichment.peak_activity_hours {
        if *estimate != computed.timing.peak_activity_hours {
            debug!(
                contact,
                estimate = ?estimate,
                computed = ?computed.timing.peak_activity_hours,
                "discarding enrichment peak_activity_hours"
            );
        }
    }
    if let Some(estimate) = enrichment.typing_style.emoji_density {
        if estimate != computed.linguistic.emoji_density {
            debug!(
                contact,
                estimate,
                computed = computed.linguistic.emoji_density,
                "discarding enrichment emoji_density"
            );
        }
    }
    if let Some(estimate) = enrichment.typing_style.avg_word_count {
        if estimate != computed.linguistic.avg_word_count as f64 {
            debug!(
                contact,
                estimate,
                computed = computed.linguistic.avg_word_count,
                "discarding enrichment avg_word_count"
            );
        }
    }
}
