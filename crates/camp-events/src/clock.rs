//! Simulation Clock Types
//!
//! Handles camp time as whole days and hours, with the day split into four
//! recurring phases used as the scheduling granularity.
//!
//! # Example
//!
//! ```
//! use camp_events::{CampClock, DayPhase};
//!
//! let clock = CampClock::new(3, 14);
//! assert_eq!(clock.day, 3);
//! assert_eq!(clock.phase(), DayPhase::Midday);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of hours in a simulated day.
pub const HOURS_PER_DAY: u64 = 24;

/// The exact hours at which one day phase hands over to the next.
pub const PHASE_BOUNDARY_HOURS: [u8; 4] = [6, 12, 18, 0];

/// One of the four recurring segments of a simulated day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPhase {
    Dawn,
    Midday,
    Dusk,
    Night,
}

impl DayPhase {
    /// Returns the phase covering the given hour of day.
    pub fn of_hour(hour: u8) -> Self {
        match hour % 24 {
            6..=11 => DayPhase::Dawn,
            12..=17 => DayPhase::Midday,
            18..=23 => DayPhase::Dusk,
            _ => DayPhase::Night,
        }
    }

    /// Returns the hour at which this phase begins.
    pub fn start_hour(self) -> u8 {
        match self {
            DayPhase::Dawn => 6,
            DayPhase::Midday => 12,
            DayPhase::Dusk => 18,
            DayPhase::Night => 0,
        }
    }

    /// Returns the next phase in order.
    pub fn next(self) -> Self {
        match self {
            DayPhase::Dawn => DayPhase::Midday,
            DayPhase::Midday => DayPhase::Dusk,
            DayPhase::Dusk => DayPhase::Night,
            DayPhase::Night => DayPhase::Dawn,
        }
    }

    /// Returns true if the handover into the following phase crosses midnight.
    pub fn ends_at_midnight(self) -> bool {
        matches!(self, DayPhase::Dusk)
    }

    /// Returns all phase variants in day order starting at dawn.
    pub fn all() -> &'static [DayPhase] {
        &[
            DayPhase::Dawn,
            DayPhase::Midday,
            DayPhase::Dusk,
            DayPhase::Night,
        ]
    }
}

impl fmt::Display for DayPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayPhase::Dawn => write!(f, "dawn"),
            DayPhase::Midday => write!(f, "midday"),
            DayPhase::Dusk => write!(f, "dusk"),
            DayPhase::Night => write!(f, "night"),
        }
    }
}

/// Error type for parsing a DayPhase from a string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsePhaseError(pub String);

impl fmt::Display for ParsePhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid day phase: '{}'", self.0)
    }
}

impl std::error::Error for ParsePhaseError {}

impl FromStr for DayPhase {
    type Err = ParsePhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dawn" => Ok(DayPhase::Dawn),
            "midday" => Ok(DayPhase::Midday),
            "dusk" => Ok(DayPhase::Dusk),
            "night" => Ok(DayPhase::Night),
            _ => Err(ParsePhaseError(s.to_string())),
        }
    }
}

/// A point in camp time.
///
/// Days count from enlistment (day 1); hours run 0-23.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampClock {
    /// Days since enlistment, starting at 1.
    pub day: u32,
    /// Hour of day, 0-23.
    pub hour: u8,
}

impl CampClock {
    /// Creates a clock at the given day and hour.
    pub fn new(day: u32, hour: u8) -> Self {
        Self {
            day,
            hour: hour % 24,
        }
    }

    /// Creates a clock at dawn of the first day of service.
    pub fn start() -> Self {
        Self { day: 1, hour: 6 }
    }

    /// Total hours elapsed since day 1, hour 0.
    ///
    /// Used for cooldown arithmetic; monotonically increasing.
    pub fn total_hours(&self) -> u64 {
        (self.day as u64 - 1) * HOURS_PER_DAY + self.hour as u64
    }

    /// Returns the phase the clock currently sits in.
    pub fn phase(&self) -> DayPhase {
        DayPhase::of_hour(self.hour)
    }

    /// Returns true if the current hour is a phase handover hour.
    pub fn is_phase_boundary(&self) -> bool {
        PHASE_BOUNDARY_HOURS.contains(&self.hour)
    }

    /// Advances the clock by one hour, rolling the day over at midnight.
    pub fn advance_hour(&mut self) {
        self.hour += 1;
        if self.hour >= 24 {
            self.hour = 0;
            self.day += 1;
        }
    }

    /// Advances the clock by whole days, keeping the hour.
    pub fn advance_days(&mut self, days: u32) {
        self.day += days;
    }
}

impl Default for CampClock {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for CampClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day_{}.{:02}h", self.day, self.hour)
    }
}
