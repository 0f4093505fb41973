//! Content Definition Types
//!
//! Immutable, externally supplied definitions for incidents and
//! opportunities. These records are loaded from configuration by the
//! definition repository and never mutated by the simulation; runtime
//! state (cooldowns, fitness scores) lives elsewhere.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::clock::DayPhase;

/// A company resource tracked by the needs store, 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeedResource {
    Supplies,
    Morale,
    Discipline,
    Rest,
}

impl NeedResource {
    /// Returns all resource variants.
    pub fn all() -> &'static [NeedResource] {
        &[
            NeedResource::Supplies,
            NeedResource::Morale,
            NeedResource::Discipline,
            NeedResource::Rest,
        ]
    }
}

impl fmt::Display for NeedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeedResource::Supplies => write!(f, "supplies"),
            NeedResource::Morale => write!(f, "morale"),
            NeedResource::Discipline => write!(f, "discipline"),
            NeedResource::Rest => write!(f, "rest"),
        }
    }
}

/// Identifier for an incident definition.
///
/// Newtype so cooldown and flag maps cannot be keyed by arbitrary strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncidentId(pub String);

impl IncidentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IncidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IncidentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Broad grouping for incident selection and weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentCategory {
    /// Something went wrong: spoilage, theft, broken gear
    Problems,
    /// Mood of the camp: songs, quarrels, card games
    Morale,
    /// A stroke of luck: found supplies, a good omen
    Fortune,
    /// Word travels: rumors, letters, gossip from other companies
    Rumor,
}

/// How severe an incident reads in the news feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentSeverity {
    Minor,
    Moderate,
    Serious,
}

/// A small, randomly drawn camp event with narrative text and effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentDefinition {
    /// Unique incident identifier
    pub id: IncidentId,
    /// Selection grouping
    pub category: IncidentCategory,
    /// Severity for news presentation
    pub severity: IncidentSeverity,
    /// Relative selection weight among eligible incidents
    pub weight: f32,
    /// Days before this incident may fire again; None uses the engine default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_days: Option<u32>,
    /// Flag that must be set for this incident to be eligible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_flag: Option<String>,
    /// Flag this incident sets when it fires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets_flag: Option<String>,
    /// Resource deltas applied when the incident fires
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub effects: HashMap<NeedResource, i32>,
    /// One-line news text
    pub headline: String,
}

/// Kind of activity an opportunity represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityType {
    Training,
    Social,
    Economic,
    Recovery,
    Special,
}

impl OpportunityType {
    /// Returns all opportunity type variants.
    pub fn all() -> &'static [OpportunityType] {
        &[
            OpportunityType::Training,
            OpportunityType::Social,
            OpportunityType::Economic,
            OpportunityType::Recovery,
            OpportunityType::Special,
        ]
    }
}

impl fmt::Display for OpportunityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpportunityType::Training => write!(f, "training"),
            OpportunityType::Social => write!(f, "social"),
            OpportunityType::Economic => write!(f, "economic"),
            OpportunityType::Recovery => write!(f, "recovery"),
            OpportunityType::Special => write!(f, "special"),
        }
    }
}

/// Inclusive player-tier window for an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRange {
    pub min: u8,
    pub max: u8,
}

impl TierRange {
    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    /// Covers every tier.
    pub fn any() -> Self {
        Self { min: 0, max: u8::MAX }
    }

    pub fn contains(&self, tier: u8) -> bool {
        tier >= self.min && tier <= self.max
    }
}

impl Default for TierRange {
    fn default() -> Self {
        Self::any()
    }
}

/// Whether an opportunity can be taken while the player holds an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderCompatibility {
    /// Freely compatible with duty
    #[default]
    Free,
    /// Possible but may be noticed; the detection mechanic applies
    Risky,
    /// Not available while this order is held
    Blocked,
}

/// Chance parameters for being caught at a risky opportunity while on duty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionSettings {
    /// Base chance of being noticed, 0-1
    pub base_chance: f32,
    /// Added at night
    #[serde(default)]
    pub night_modifier: f32,
    /// Added when officer reputation is high (the officers watch their star)
    #[serde(default)]
    pub high_rep_modifier: f32,
}

/// Penalties applied when the player is caught.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CaughtConsequences {
    /// Officer-reputation delta (usually negative)
    #[serde(default)]
    pub reputation_delta: i32,
    /// Company-discipline delta (usually negative)
    #[serde(default)]
    pub discipline_delta: i32,
    /// Chance that the held order is also compromised, 0-1
    #[serde(default)]
    pub order_failure_risk: f32,
}

/// A discrete, time-boxed, optional activity offered to the player.
///
/// Immutable template; candidates carry the runtime score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityDefinition {
    /// Unique opportunity identifier
    pub id: String,
    /// Player-facing title
    pub title: String,
    /// Player-facing description
    pub description: String,
    /// Decision delivered when the opportunity fires as a commitment
    pub decision_id: String,
    /// Kind of activity
    pub opportunity_type: OpportunityType,
    /// Inclusive tier window
    #[serde(default)]
    pub tier_range: TierRange,
    /// Hours before the same opportunity may be shown again
    pub cooldown_hours: u64,
    /// Baseline desirability, 0-100
    pub base_fitness: f32,
    /// Phases this opportunity may appear in; empty means unrestricted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub valid_phases: Vec<DayPhase>,
    /// Available while the party travels by sea
    #[serde(default)]
    pub allowed_at_sea: bool,
    /// Available while the party travels by land
    #[serde(default = "default_true")]
    pub allowed_on_land: bool,
    /// Per-order compatibility overrides, keyed by order name
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub order_compatibility: HashMap<String, OrderCompatibility>,
    /// Compatibility for orders without an explicit entry
    #[serde(default)]
    pub default_compatibility: OrderCompatibility,
    /// Detection parameters; None means the attempt always succeeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection: Option<DetectionSettings>,
    /// Penalties when caught
    #[serde(default)]
    pub caught: CaughtConsequences,
    /// Flag that must be set for eligibility
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_flag: Option<String>,
    /// Flag that suppresses this opportunity while set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_by_flag: Option<String>,
    /// Free-form tags ("gambling", "quiet", ...)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Fixed hour of day this opportunity happens at, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_hour: Option<u8>,
}

fn default_true() -> bool {
    true
}

impl OpportunityDefinition {
    /// Returns true if the opportunity may appear in the given phase.
    pub fn valid_in_phase(&self, phase: DayPhase) -> bool {
        self.valid_phases.is_empty() || self.valid_phases.contains(&phase)
    }

    /// Returns the compatibility for the given order, if any is held.
    pub fn compatibility_for(&self, order: Option<&str>) -> OrderCompatibility {
        match order {
            Some(name) => self
                .order_compatibility
                .get(name)
                .copied()
                .unwrap_or(self.default_compatibility),
            None => OrderCompatibility::Free,
        }
    }

    /// Returns true if the definition carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
