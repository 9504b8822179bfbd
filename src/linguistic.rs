//! Linguistic statistics
//!
//! Emoji density and average word count over a participant's messages that
//! carry text. Empty and whitespace-only messages are ignored.

use crate::emoji::count_emoji;
use crate::types::{LinguisticStats, Message};

/// Compute linguistic statistics for `participant_id` over `messages`
pub fn compute_linguistic_stats(messages: &[Message], participant_id: &str) -> LinguisticStats {
    let mut text_messages = 0usize;
    let mut emoji_total = 0usize;
    let mut word_total = 0usize;

    for msg in messages
        .iter()
        .filter(|m| m.participant_id == participant_id && m.has_text())
    {
        text_messages += 1;
        emoji_total += count_emoji(&msg.content);
        word_total += msg.content.split_whitespace().count();
    }

    if text_messages == 0 {
        return LinguisticStats::default();
    }

    LinguisticStats {
        emoji_density: round2(emoji_total as f64 / text_messages as f64),
        avg_word_count: (word_total / text_messages) as u32,
    }
}

/// Round to 2 decimals, halves away from zero (0.125 becomes 0.13)
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
