//! Engine configuration
//!
//! All thresholds that shape the statistics live here so a single
//! parameterised implementation serves every caller.

use crate::error::ComputeError;
use serde::{Deserialize, Serialize};

/// Default number of trailing timeline messages in the recent window
pub const DEFAULT_WINDOW_SIZE: usize = 30;

/// Default maximum gap (seconds) between own messages inside a burst
pub const DEFAULT_BATCH_GAP_SECS: i64 = 60;

/// Default gap (seconds) that starts a new conversation
pub const DEFAULT_CONVERSATION_GAP_SECS: i64 = 3600;

/// Default minimum streak length that counts as a batch episode
pub const DEFAULT_BATCH_MIN_STREAK: usize = 3;

/// Default number of batch episodes that makes a participant a Batcher
pub const DEFAULT_BATCHER_MIN_EPISODES: usize = 2;

/// Hard cap on the number of peak activity hours reported
pub const MAX_PEAK_HOURS: usize = 5;

/// Default maximum number of peak activity hours reported
pub const DEFAULT_PEAK_HOURS_LIMIT: usize = MAX_PEAK_HOURS;

/// Default ratio at or above which a metric is anomalous
pub const DEFAULT_ANOMALY_HIGH_RATIO: f64 = 2.0;

/// Default ratio at or below which a metric is anomalous
pub const DEFAULT_ANOMALY_LOW_RATIO: f64 = 0.5;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Participant id of the account owner, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// Trailing messages of the global timeline used as the recent window
    pub window_size: usize,
    /// Maximum gap between own messages that keeps a burst going
    pub batch_gap_secs: i64,
    /// Gap between consecutive messages that starts a new conversation
    pub conversation_gap_secs: i64,
    /// Minimum burst length counted as one batch episode
    pub batch_min_streak: usize,
    /// Batch episodes needed to classify as Batcher
    pub batcher_min_episodes: usize,
    /// Maximum number of peak hours reported (1 to [`MAX_PEAK_HOURS`])
    pub peak_hours_limit: usize,
    /// Upper anomaly ratio threshold (inclusive)
    pub anomaly_high_ratio: f64,
    /// Lower anomaly ratio threshold (inclusive)
    pub anomaly_low_ratio: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            owner_id: None,
            window_size: DEFAULT_WINDOW_SIZE,
            batch_gap_secs: DEFAULT_BATCH_GAP_SECS,
            conversation_gap_secs: DEFAULT_CONVERSATION_GAP_SECS,
            batch_min_streak: DEFAULT_BATCH_MIN_STREAK,
            batcher_min_episodes: DEFAULT_BATCHER_MIN_EPISODES,
            peak_hours_limit: DEFAULT_PEAK_HOURS_LIMIT,
            anomaly_high_ratio: DEFAULT_ANOMALY_HIGH_RATIO,
            anomaly_low_ratio: DEFAULT_ANOMALY_LOW_RATIO,
        }
    }
}

impl EngineConfig {
    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_batch_gap_secs(mut self, secs: i64) -> Self {
        self.batch_gap_secs = secs;
        self
    }

    pub fn with_conversation_gap_secs(mut self, secs: i64) -> Self {
        self.conversation_gap_secs = secs;
        self
    }

    /// Check that every threshold is usable
    pub fn validate(&self) -> Result<(), ComputeError> {
        if self.window_size == 0 {
            return Err(ComputeError::InvalidConfig(
                "window_size must be at least 1".to_string(),
            ));
        }
        if self.batch_gap_secs <= 0 {
            return Err(ComputeError::InvalidConfig(format!(
                "batch_gap_secs must be positive, got {}",
                self.batch_gap_secs
            )));
        }
        if self.conversation_gap_secs <= 0 {
            return Err(ComputeError::InvalidConfig(format!(
                "conversation_gap_secs must be positive, got {}",
                self.conversation_gap_secs
            )));
        }
        if self.batch_min_streak < 2 {
            return Err(ComputeError::InvalidConfig(format!(
                "batch_min_streak must be at least 2, got {}",
                self.batch_min_streak
            )));
        }
        if self.batcher_min_episodes == 0 {
            return Err(ComputeError::InvalidConfig(
                "batcher_min_episodes must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_PEAK_HOURS).contains(&self.peak_hours_limit) {
            return Err(ComputeError::InvalidConfig(format!(
                "peak_hours_limit must be between 1 and {MAX_PEAK_HOURS}, got {}",
                self.peak_hours_limit
            )));
        }
        let low = self.anomaly_low_ratio;
        let high = self.anomaly_high_ratio;
        if !(low.is_finite() && high.is_finite() && low > 0.0 && low < 1.0 && high > 1.0) {
            return Err(ComputeError::InvalidConfig(format!(
                "anomaly ratios must satisfy 0 < low < 1 < high, got low={low} high={high}"
            )));
        }
        Ok(())
    }

    /// Load a configuration from JSON, filling omitted fields with defaults
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Whether the given participant is the configured owner
    pub fn is_owner(&self, participant_id: &str) -> bool {
        self.owner_id.as_deref() == Some(participant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.window_size, 30);
        assert_eq!(config.batch_gap_secs, 60);
        assert_eq!(config.conversation_gap_secs, 3600);
        assert!(config.owner_id.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(r#"{"owner_id": "u1", "window_size": 20}"#).unwrap();
        assert_eq!(config.owner_id.as_deref(), Some("u1"));
        assert_eq!(config.window_size, 20);
        assert_eq!(config.conversation_gap_secs, DEFAULT_CONVERSATION_GAP_SECS);
        assert!(config.is_owner("u1"));
        assert!(!config.is_owner("u2"));
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"window_size": 0}"#),
            Err(ComputeError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_json("not json"),
            Err(ComputeError::JsonError(_))
        ));
    }

    #[test]
    fn test_validate_thresholds() {
        let mut config = EngineConfig::default().with_batch_gap_secs(0);
        assert!(config.validate().is_err());

        config = EngineConfig::default().with_conversation_gap_secs(-5);
        assert!(config.validate().is_err());

        config = EngineConfig {
            anomaly_low_ratio: 1.5,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        config = EngineConfig {
            anomaly_high_ratio: f64::NAN,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        config = EngineConfig {
            batch_min_streak: 1,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_peak_hours_limit_is_capped() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"peak_hours_limit": 8}"#),
            Err(ComputeError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"peak_hours_limit": 0}"#),
            Err(ComputeError::InvalidConfig(_))
        ));

        let config = EngineConfig::from_json(r#"{"peak_hours_limit": 3}"#).unwrap();
        assert_eq!(config.peak_hours_limit, 3);
    }

    #[test]
    fn test_json_roundtrip_keeps_owner() {
        let config = EngineConfig::default().with_owner("u1").with_window_size(12);
        let json = config.to_json().unwrap();
        let loaded = EngineConfig::from_json(&json).unwrap();
        assert_eq!(loaded, config);
    }
}
