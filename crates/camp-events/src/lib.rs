//! Shared vocabulary types for the living-camp simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod clock;
pub mod definitions;
pub mod news;
pub mod schedule;
pub mod snapshot;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

// Re-export clock types
pub use clock::{CampClock, DayPhase, ParsePhaseError, HOURS_PER_DAY, PHASE_BOUNDARY_HOURS};

// Re-export definition types
pub use definitions::{
    CaughtConsequences, DetectionSettings, IncidentCategory, IncidentDefinition, IncidentId,
    IncidentSeverity, NeedResource, OpportunityDefinition, OpportunityType, OrderCompatibility,
    TierRange,
};

// Re-export schedule types
pub use schedule::{
    ActivityCategory, ActivitySlot, CommitmentMarker, CommitmentNote, ScheduledPhase,
};

// Re-export snapshot types
pub use snapshot::{
    CampMood, CampSnapshot, ExpectedActivity, LordSituation, PlayerSnapshot, TravelMode,
    WorldSituation,
};

// Re-export news types
pub use news::{DeliveredEvent, MessageColor, NewsCategory, NewsEntry, NewsSeverity};
