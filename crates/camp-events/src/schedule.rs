//! Schedule Output Types
//!
//! The per-phase activity plan produced by the schedule manager and
//! consumed by the routine resolver and the opportunity generator.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clock::DayPhase;
use crate::definitions::OpportunityType;

/// Category of a scheduled camp activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    /// Weapons practice and formation drill
    Drill,
    /// Camp labor: ditches, firewood, wagons
    Labor,
    /// Gathering food and fodder
    Foraging,
    /// Sentry and picket rotation
    Watch,
    /// Sleep and recuperation
    Rest,
    /// Free time around the fires
    Leisure,
}

impl ActivityCategory {
    /// Maps the activity to the opportunity type it reinforces, if any.
    pub fn opportunity_type(self) -> Option<OpportunityType> {
        match self {
            ActivityCategory::Drill => Some(OpportunityType::Training),
            ActivityCategory::Labor => Some(OpportunityType::Economic),
            ActivityCategory::Foraging => Some(OpportunityType::Economic),
            ActivityCategory::Watch => None,
            ActivityCategory::Rest => Some(OpportunityType::Recovery),
            ActivityCategory::Leisure => Some(OpportunityType::Social),
        }
    }

    /// Returns all category variants.
    pub fn all() -> &'static [ActivityCategory] {
        &[
            ActivityCategory::Drill,
            ActivityCategory::Labor,
            ActivityCategory::Foraging,
            ActivityCategory::Watch,
            ActivityCategory::Rest,
            ActivityCategory::Leisure,
        ]
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityCategory::Drill => write!(f, "drill"),
            ActivityCategory::Labor => write!(f, "labor"),
            ActivityCategory::Foraging => write!(f, "foraging"),
            ActivityCategory::Watch => write!(f, "watch"),
            ActivityCategory::Rest => write!(f, "rest"),
            ActivityCategory::Leisure => write!(f, "leisure"),
        }
    }
}

/// One activity slot inside a scheduled phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySlot {
    /// What kind of activity fills the slot
    pub category: ActivityCategory,
    /// Short description shown to the player
    pub description: String,
    /// Relative emphasis after all modifiers
    pub weight: f32,
    /// True when a modifier removed this slot from the plan
    #[serde(default)]
    pub skipped: bool,
}

impl ActivitySlot {
    /// Creates an active slot with the given category and weight.
    pub fn new(category: ActivityCategory, description: impl Into<String>, weight: f32) -> Self {
        Self {
            category,
            description: description.into(),
            weight,
            skipped: false,
        }
    }

    /// Marks the slot skipped.
    pub fn skip(&mut self) {
        self.skipped = true;
    }
}

/// Marker recording that the player committed to something this phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitmentMarker {
    /// Title of the committed opportunity
    pub title: String,
}

/// A lightweight view of an active player commitment.
///
/// The schedule manager only needs to know *when* a commitment lands and
/// what to call it; the full record stays with the commitment scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitmentNote {
    /// Day the commitment lands on
    pub day: u32,
    /// Phase the commitment lands in
    pub phase: DayPhase,
    /// Title of the committed opportunity
    pub title: String,
}

/// The finalized plan for one day phase.
///
/// Recomputed on request; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPhase {
    /// Which phase this plan covers
    pub phase: DayPhase,
    /// The two activity slots
    pub slots: [ActivitySlot; 2],
    /// Why the plan deviates from baseline, if it does
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation: Option<String>,
    /// Flavor line for the camp feed
    pub flavor: String,
    /// Set when a player commitment overrides routine processing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commitment: Option<CommitmentMarker>,
}

impl ScheduledPhase {
    /// Returns true when a player commitment suppresses routine resolution.
    pub fn is_player_committed(&self) -> bool {
        self.commitment.is_some()
    }

    /// Returns the slots that survived modifier application.
    pub fn active_slots(&self) -> impl Iterator<Item = &ActivitySlot> {
        self.slots.iter().filter(|s| !s.skipped)
    }

    /// Returns the category of the heaviest active slot, if any.
    pub fn dominant_category(&self) -> Option<ActivityCategory> {
        self.active_slots()
            .max_by(|a, b| a.weight.total_cmp(&b.weight))
            .map(|s| s.category)
    }
}
