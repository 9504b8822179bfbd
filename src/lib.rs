//! Chat DNA - Deterministic behavioral fingerprints for chat timelines
//!
//! Chat DNA turns an ordered per-contact message timeline into timing,
//! reciprocity and style statistics, then flags recent behavior that deviates
//! from the full-history baseline. Pipeline: chat export → timeline →
//! baseline statistics → recent-window statistics → anomalies → profile.
//!
//! ## Modules
//!
//! - **Statistics**: [`timing`], [`linguistic`] and [`emoji`] compute the fingerprint
//! - **Anomalies**: [`anomaly`] compares the recent window against the baseline
//! - **Profiles**: [`profile`] merges statistics with external enrichment,
//!   keeping computed numbers authoritative
//! - **Pipeline**: [`pipeline::DnaEngine`] runs everything for a timeline

pub mod adapter;
pub mod anomaly;
pub mod config;
pub mod emoji;
pub mod error;
pub mod linguistic;
pub mod pipeline;
pub mod profile;
pub mod timing;
pub mod types;

pub use config::EngineConfig;
pub use error::ComputeError;
pub use pipeline::{chat_export_to_profiles_json, DnaEngine, FingerprintReport};
pub use profile::{parse_enrichment, ProfileAssembler};
pub use types::{
    Anomaly, AnomalyMetric, BehaviorStats, BehavioralProfile, CommStyle, ComputedProfile,
    Enrichment, LinguisticStats, Message, Participant, Timeline, TimingStats,
};
