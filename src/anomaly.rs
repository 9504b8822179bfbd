//! Recent-window comparison and anomaly detection
//!
//! The recent window is the tail of the global timeline (all participants),
//! so a participant who went quiet shows up as a change rather than as an
//! unchanged window of their own old messages. Deviations are multiplicative:
//! a metric is anomalous when the recent value is at least `anomaly_high_ratio`
//! times, or at most `anomaly_low_ratio` times, its full-history baseline.

use crate::config::EngineConfig;
use crate::linguistic::compute_linguistic_stats;
use crate::timing::compute_timing_stats;
use crate::types::{Anomaly, AnomalyMetric, BehaviorStats, Message, Timeline};
use tracing::debug;

/// Compute timing and linguistic statistics over the same slice
pub fn compute_behavior_stats(
    messages: &[Message],
    participant_id: &str,
    config: &EngineConfig,
) -> BehaviorStats {
    BehaviorStats {
        timing: compute_timing_stats(messages, participant_id, config),
        linguistic: compute_linguistic_stats(messages, participant_id),
    }
}

/// Statistics for `participant_id` over the last `config.window_size` messages
pub fn compute_recent_stats(
    timeline: &Timeline,
    participant_id: &str,
    config: &EngineConfig,
) -> BehaviorStats {
    compute_behavior_stats(timeline.tail(config.window_size), participant_id, config)
}

/// Compare recent statistics to the baseline and flag every deviating metric
pub fn detect_anomalies(
    baseline: &BehaviorStats,
    current: &BehaviorStats,
    config: &EngineConfig,
) -> Vec<Anomaly> {
    [
        (
            AnomalyMetric::ReplyLatency,
            baseline.timing.avg_reply_latency_seconds,
            current.timing.avg_reply_latency_seconds,
        ),
        (
            AnomalyMetric::EmojiDensity,
            baseline.linguistic.emoji_density,
            current.linguistic.emoji_density,
        ),
        (
            AnomalyMetric::AvgWordCount,
            baseline.linguistic.avg_word_count as f64,
            current.linguistic.avg_word_count as f64,
        ),
    ]
    .into_iter()
    .filter_map(|(metric, base, curr)| compare_metric(metric, base, curr, config))
    .collect()
}

/// Evaluate one metric. Returns `None` for a zero baseline, since no ratio exists.
pub fn compare_metric(
    metric: AnomalyMetric,
    baseline: f64,
    current: f64,
    config: &EngineConfig,
) -> Option<Anomaly> {
    if baseline == 0.0 || !baseline.is_finite() || !current.is_finite() {
        return None;
    }

    let ratio = current / baseline;
    let direction = if ratio >= config.anomaly_high_ratio {
        "rose to"
    } else if ratio <= config.anomaly_low_ratio {
        "dropped to"
    } else {
        return None;
    };

    debug!(
        metric = ?metric,
        baseline,
        current,
        ratio,
        "recent window deviates from baseline"
    );

    Some(Anomaly {
        metric,
        baseline,
        current,
        deviation_factor: ratio,
        description: format!(
            "{} {} {:.1}x the baseline (baseline {:.2}, current {:.2})",
            metric.label(),
            direction,
            ratio,
            baseline,
            current
        ),
    })
}
