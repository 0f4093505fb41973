//! Opportunity History
//!
//! Adaptive memory over what has been offered: per-id and per-type
//! counters driving recency penalties, a novelty bonus, and a bounded
//! variety correction that keeps disliked types from disappearing
//! forever. Persisted across sessions.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use camp_events::{OpportunityDefinition, OpportunityType};

use crate::config::HistoryConfig;

/// External learning system fed by player behavior.
///
/// The tracker supplies a blended preference delta per type; the
/// generator reports what it showed and what the player took.
pub trait BehaviorTracker {
    /// Learned preference delta for a type, already scaled by the host.
    fn preference_delta(&self, opportunity_type: OpportunityType) -> f32;
    /// Called when an opportunity is offered.
    fn note_presented(&mut self, id: &str, opportunity_type: OpportunityType);
    /// Called when the player commits to an opportunity.
    fn note_engaged(&mut self, id: &str, opportunity_type: OpportunityType);
}

/// Tracker that learns nothing; the default wiring.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBehaviorTracker;

impl BehaviorTracker for NullBehaviorTracker {
    fn preference_delta(&self, _opportunity_type: OpportunityType) -> f32 {
        0.0
    }

    fn note_presented(&mut self, _id: &str, _opportunity_type: OpportunityType) {}

    fn note_engaged(&mut self, _id: &str, _opportunity_type: OpportunityType) {}
}

/// Append-only counters for one id or type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Total hours at last presentation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_presented_hours: Option<u64>,
    pub times_seen: u32,
    pub times_engaged: u32,
    pub times_ignored: u32,
}

/// Per-id and per-type presentation memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpportunityHistory {
    #[serde(default)]
    per_id: HashMap<String, HistoryRecord>,
    #[serde(default)]
    per_type: HashMap<OpportunityType, HistoryRecord>,
}

impl OpportunityHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that an opportunity was shown.
    pub fn record_presented(&mut self, id: &str, kind: OpportunityType, now_hours: u64) {
        let record = self.per_id.entry(id.to_string()).or_default();
        record.last_presented_hours = Some(now_hours);
        record.times_seen += 1;

        let record = self.per_type.entry(kind).or_default();
        record.last_presented_hours = Some(now_hours);
        record.times_seen += 1;
    }

    /// Records that the player committed to an opportunity.
    pub fn record_engaged(&mut self, id: &str, kind: OpportunityType) {
        self.per_id.entry(id.to_string()).or_default().times_engaged += 1;
        self.per_type.entry(kind).or_default().times_engaged += 1;
    }

    /// Records that the player let an opportunity pass.
    pub fn record_ignored(&mut self, id: &str, kind: OpportunityType) {
        self.per_id.entry(id.to_string()).or_default().times_ignored += 1;
        self.per_type.entry(kind).or_default().times_ignored += 1;
    }

    /// Hours at which this id was last shown.
    pub fn last_presented_id(&self, id: &str) -> Option<u64> {
        self.per_id.get(id).and_then(|r| r.last_presented_hours)
    }

    /// Hours at which this type was last shown.
    pub fn last_presented_type(&self, kind: OpportunityType) -> Option<u64> {
        self.per_type.get(&kind).and_then(|r| r.last_presented_hours)
    }

    /// Engaged-over-seen ratio for a type, if it has been seen.
    pub fn engagement_rate(&self, kind: OpportunityType) -> Option<f32> {
        let record = self.per_type.get(&kind)?;
        if record.times_seen == 0 {
            return None;
        }
        Some(record.times_engaged as f32 / record.times_seen as f32)
    }

    /// True when the type has never been offered.
    pub fn never_seen(&self, kind: OpportunityType) -> bool {
        self.per_type
            .get(&kind)
            .map(|r| r.times_seen == 0)
            .unwrap_or(true)
    }

    /// The full history layer of the fitness score.
    ///
    /// Recency penalties by type, the external learned-preference delta
    /// at its blend weight, a novelty bonus for unseen types, and the
    /// variety correction for low-engagement types.
    pub fn modifier(
        &self,
        definition: &OpportunityDefinition,
        now_hours: u64,
        config: &HistoryConfig,
        tracker: &dyn BehaviorTracker,
    ) -> f32 {
        let kind = definition.opportunity_type;
        let mut modifier = 0.0;

        if let Some(last) = self.last_presented_type(kind) {
            let age = now_hours.saturating_sub(last);
            if age < config.strong_window_hours {
                modifier += config.recent_penalty_strong;
            } else if age < config.mild_window_hours {
                modifier += config.recent_penalty_mild;
            }
        }

        modifier += tracker.preference_delta(kind) * config.learned_weight;

        if self.never_seen(kind) {
            modifier += config.novelty_bonus;
        } else if self
            .engagement_rate(kind)
            .map(|rate| rate < config.variety_engagement_threshold)
            .unwrap_or(false)
            && variety_gate(now_hours, kind, config.time_bucket_hours)
        {
            modifier += config.variety_bonus;
        }

        modifier
    }
}

/// Deterministic pseudo-random gate for the variety correction, firing
/// for roughly 30% of (time bucket, type) pairs.
///
/// Deliberately outside the injected RNG: the gate varies with the clock
/// bucket, not the seed, so scoring stays reproducible for a fixed
/// timeline.
fn variety_gate(now_hours: u64, kind: OpportunityType, bucket_hours: u64) -> bool {
    let bucket = if bucket_hours == 0 {
        now_hours
    } else {
        now_hours / bucket_hours
    };
    let mut hasher = DefaultHasher::new();
    bucket.hash(&mut hasher);
    kind.hash(&mut hasher);
    hasher.finish() % 100 < 30
}
