//! World Situation Provider
//!
//! Read-only view of what the wider world is doing. The simulation polls
//! this at the top of each tick; it is never pushed.

use camp_events::{DayPhase, WorldSituation};

/// Source of the current world situation snapshot.
pub trait WorldSituationProvider {
    /// Analyzes the world and returns a fresh snapshot.
    fn analyze_situation(&self) -> WorldSituation;
}

/// Fixed situation provider for tests and the headless runner.
#[derive(Debug, Clone)]
pub struct StaticSituationProvider {
    pub situation: WorldSituation,
}

impl StaticSituationProvider {
    /// A calm garrison at dawn.
    pub fn garrison() -> Self {
        Self {
            situation: WorldSituation::calm(DayPhase::Dawn),
        }
    }

    pub fn new(situation: WorldSituation) -> Self {
        Self { situation }
    }

    /// Replaces the current phase, keeping everything else.
    pub fn set_phase(&mut self, phase: DayPhase) {
        self.situation.day_phase = phase;
    }
}

impl WorldSituationProvider for StaticSituationProvider {
    fn analyze_situation(&self) -> WorldSituation {
        self.situation
    }
}
