//! Core camp simulation: roster health, pressure, incidents, scheduling,
//! and routine outcome resolution.
//!
//! This crate owns the mutable camp state and the daily/phase machinery
//! around it. It never talks to the host game directly; everything that
//! crosses the boundary goes through the traits in [`sinks`], [`world`],
//! and [`persistence`], so the whole simulation can run headless under a
//! seeded RNG.
//!
//! # Modules
//!
//! - [`components`]: company roster and pressure counters
//! - [`config`]: TOML-backed simulation, schedule, and outcome settings
//! - [`repository`]: definition loading with built-in fallbacks
//! - [`systems`]: the daily tick (recovery, conditions, incidents, crises)
//! - [`schedule`]: per-phase activity planning
//! - [`outcome`]: unattended-routine resolution
//! - [`sinks`]: outbound interfaces (needs, effects, news, delivery)
//! - [`persistence`]: key/value save and restore helpers

pub mod components;
pub mod config;
pub mod outcome;
pub mod persistence;
pub mod repository;
pub mod schedule;
pub mod sinks;
pub mod systems;
pub mod world;

pub use components::{CompanyPressure, CompanyRoster};
pub use config::{CampConfig, ConfigError, OutcomeConfig, ScheduleConfig, SimulationConfig};
pub use outcome::{OutcomeQuality, RoutineOutcome, RoutineOutcomeResolver};
pub use persistence::{MemoryStore, PersistenceStore};
pub use repository::{BuiltinRepository, DefinitionRepository, TomlRepository};
pub use schedule::{PressureEffect, ScheduleManager};
pub use sinks::{
    CollectingDelivery, CompanyNeedsStore, EffectSinks, EventDeliveryQueue, Externals,
    InMemoryNeeds, NewsSink, NotificationSink, RecordingNews, RecordingNotifications,
    RecordingSinks,
};
pub use systems::daily::DailyCompanySim;
pub use systems::incidents::IncidentEngine;
pub use world::{StaticSituationProvider, WorldSituationProvider};

use thiserror::Error;

/// Errors raised inside the core simulation.
///
/// Tick handlers catch these at the boundary, log them, and abandon the
/// tick; nothing here is fatal to the host.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No active enlistment, lord, or party to simulate against.
    #[error("no active enlistment context")]
    MissingContext,
    /// A day's simulation failed part-way and was abandoned.
    #[error("simulation failed on day {day}: {reason}")]
    DayFailed { day: u32, reason: String },
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
