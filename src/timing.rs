//! Timing statistics
//!
//! Reply latency, peak activity hours, conversation initiation rate and
//! batching style for one participant. Each metric is a single ordered pass
//! over the message slice; the slice is read as given and never re-sorted.

use crate::config::{EngineConfig, MAX_PEAK_HOURS};
use crate::types::{CommStyle, Message, TimingStats};
use chrono::Timelike;

/// Compute all timing statistics for `participant_id` over `messages`
pub fn compute_timing_stats(
    messages: &[Message],
    participant_id: &str,
    config: &EngineConfig,
) -> TimingStats {
    let episodes = count_batch_episodes(
        messages,
        participant_id,
        config.batch_gap_secs,
        config.batch_min_streak,
    );
    let comm_style = if episodes >= config.batcher_min_episodes {
        CommStyle::Batcher
    } else {
        CommStyle::Streamer
    };

    TimingStats {
        avg_reply_latency_seconds: compute_reply_latency(messages, participant_id),
        peak_activity_hours: compute_peak_hours(
            messages,
            participant_id,
            config.peak_hours_limit,
        ),
        reciprocity_ratio: compute_initiation_rate(
            messages,
            participant_id,
            config.conversation_gap_secs,
        ),
        comm_style,
    }
}

/// Seconds elapsed from `earlier` to `later`
fn gap_seconds(earlier: &Message, later: &Message) -> f64 {
    (later.timestamp - earlier.timestamp).num_milliseconds() as f64 / 1000.0
}

/// Mean reply latency in seconds
///
/// A reply is a message from the participant immediately preceded by a message
/// from someone else. Non-positive gaps are skipped. Returns 0.0 with no replies.
pub fn compute_reply_latency(messages: &[Message], participant_id: &str) -> f64 {
    let gaps: Vec<f64> = messages
        .windows(2)
        .filter(|pair| {
            pair[1].participant_id == participant_id && pair[0].participant_id != participant_id
        })
        .map(|pair| gap_seconds(&pair[0], &pair[1]))
        .filter(|&gap| gap > 0.0)
        .collect();

    if gaps.is_empty() {
        return 0.0;
    }
    gaps.iter().sum::<f64>() / gaps.len() as f64
}

/// Most active hours of the day, most messages first
///
/// Hours come from each timestamp's own offset. Equal counts are ordered by
/// ascending hour. At most [`MAX_PEAK_HOURS`] hours are returned whatever
/// `limit` asks for.
pub fn compute_peak_hours(messages: &[Message], participant_id: &str, limit: usize) -> Vec<u32> {
    let mut counts = [0u32; 24];
    for msg in messages.iter().filter(|m| m.participant_id == participant_id) {
        counts[msg.timestamp.hour() as usize] += 1;
    }

    let mut ranked: Vec<(u32, u32)> = (0u32..24)
        .zip(counts)
        .filter(|&(_, count)| count > 0)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .take(limit.min(MAX_PEAK_HOURS))
        .map(|(hour, _)| hour)
        .collect()
}

/// Indices of the messages that open a conversation
///
/// The first message always opens one; afterwards any gap of at least
/// `conversation_gap_secs` opens another.
pub fn conversation_starts(messages: &[Message], conversation_gap_secs: i64) -> Vec<usize> {
    if messages.is_empty() {
        return Vec::new();
    }

    let threshold = conversation_gap_secs as f64;
    let mut starts = vec![0];
    starts.extend(
        messages
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| gap_seconds(&pair[0], &pair[1]) >= threshold)
            .map(|(i, _)| i + 1),
    );
    starts
}

/// Fraction of conversations opened by the participant (0-1)
pub fn compute_initiation_rate(
    messages: &[Message],
    participant_id: &str,
    conversation_gap_secs: i64,
) -> f64 {
    let starts = conversation_starts(messages, conversation_gap_secs);
    if starts.is_empty() {
        return 0.0;
    }

    let initiated = starts
        .iter()
        .filter(|&&i| messages[i].participant_id == participant_id)
        .count();
    initiated as f64 / starts.len() as f64
}

/// Number of bursts of at least `min_streak` own messages
///
/// Consecutive own messages no more than `batch_gap_secs` apart extend the
/// current streak; a longer gap ends it. The trailing streak counts too.
pub fn count_batch_episodes(
    messages: &[Message],
    participant_id: &str,
    batch_gap_secs: i64,
    min_streak: usize,
) -> usize {
    let own: Vec<&Message> = messages
        .iter()
        .filter(|m| m.participant_id == participant_id)
        .collect();
    if own.is_empty() {
        return 0;
    }

    let max_gap = batch_gap_secs as f64;
    let mut episodes = 0;
    let mut streak = 1;
    for pair in own.windows(2) {
        if gap_seconds(pair[0], pair[1]) <= max_gap {
            streak += 1;
        } else {
            if streak >= min_streak {
                episodes += 1;
            }
            streak = 1;
        }
    }
    if streak >= min_streak {
        episodes += 1;
    }
    episodes
}
