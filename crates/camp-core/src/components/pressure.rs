//! Company Pressure
//!
//! Rolling day-counters measuring sustained adverse conditions. Counters
//! increment while their trigger holds and reset otherwise; desertion
//! pressure instead decays on victories and over long time-skips.

use serde::{Deserialize, Serialize};

/// Rolling pressure counters for the company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyPressure {
    /// Consecutive days with supplies below the low threshold
    pub days_low_supplies: u32,
    /// Consecutive days with supplies below the critical threshold
    pub days_critical_supplies: u32,
    /// Consecutive days with discipline below the low threshold
    pub days_low_discipline: u32,
    /// Consecutive days with the sick ratio above the high threshold
    pub days_high_sickness: u32,
    /// Desertions confirmed recently; decays rather than resets
    pub recent_desertions: u32,
    /// One-shot guard for the critical-supply pulse notification
    #[serde(default)]
    pub supply_pulse_sent: bool,
    /// One-shot guard for the desertion crisis event
    #[serde(default)]
    pub desertion_crisis_sent: bool,
}

impl CompanyPressure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps the supply counters for one day.
    pub fn note_supplies(&mut self, supplies: i32, low_threshold: i32, critical_threshold: i32) {
        if supplies < low_threshold {
            self.days_low_supplies += 1;
        } else {
            self.days_low_supplies = 0;
        }
        if supplies < critical_threshold {
            self.days_critical_supplies += 1;
        } else {
            self.days_critical_supplies = 0;
            self.supply_pulse_sent = false;
        }
    }

    /// Steps the discipline counter for one day.
    pub fn note_discipline(&mut self, discipline: i32, low_threshold: i32) {
        if discipline < low_threshold {
            self.days_low_discipline += 1;
        } else {
            self.days_low_discipline = 0;
        }
    }

    /// Steps the sickness counter for one day.
    pub fn note_sickness(&mut self, sick_ratio: f32, high_threshold: f32) {
        if sick_ratio > high_threshold {
            self.days_high_sickness += 1;
        } else {
            self.days_high_sickness = 0;
        }
    }

    /// Records confirmed desertions.
    pub fn note_desertions(&mut self, count: u32) {
        self.recent_desertions += count;
        if self.recent_desertions < 5 {
            self.desertion_crisis_sent = false;
        }
    }

    /// A victory steadies the company; desertion pressure eases.
    pub fn note_victory(&mut self) {
        self.recent_desertions = self.recent_desertions.saturating_sub(2);
        if self.recent_desertions < 5 {
            self.desertion_crisis_sent = false;
        }
    }

    /// Decay applied when a long time-skip is collapsed into one step.
    ///
    /// Old grievances fade over skipped weeks; one desertion is forgotten
    /// per two skipped days.
    pub fn decay_over_skip(&mut self, days_skipped: u32) {
        self.recent_desertions = self.recent_desertions.saturating_sub(days_skipped / 2);
        if self.recent_desertions < 5 {
            self.desertion_crisis_sent = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_supply_counter_increments_and_resets() {
        let mut pressure = CompanyPressure::new();
        pressure.note_supplies(35, 40, 20);
        pressure.note_supplies(30, 40, 20);
        assert_eq!(pressure.days_low_supplies, 2);
        assert_eq!(pressure.days_critical_supplies, 0);

        pressure.note_supplies(55, 40, 20);
        assert_eq!(pressure.days_low_supplies, 0);
    }

    #[test]
    fn test_critical_counter_tracks_separately() {
        let mut pressure = CompanyPressure::new();
        pressure.note_supplies(15, 40, 20);
        pressure.note_supplies(18, 40, 20);
        assert_eq!(pressure.days_low_supplies, 2);
        assert_eq!(pressure.days_critical_supplies, 2);
    }

    #[test]
    fn test_pulse_flag_rearms_when_supplies_recover() {
        let mut pressure = CompanyPressure::new();
        pressure.note_supplies(15, 40, 20);
        pressure.supply_pulse_sent = true;
        pressure.note_supplies(25, 40, 20);
        assert!(!pressure.supply_pulse_sent);
    }

    #[test]
    fn test_sickness_counter() {
        let mut pressure = CompanyPressure::new();
        pressure.note_sickness(0.2, 0.15);
        pressure.note_sickness(0.18, 0.15);
        assert_eq!(pressure.days_high_sickness, 2);
        pressure.note_sickness(0.1, 0.15);
        assert_eq!(pressure.days_high_sickness, 0);
    }

    #[test]
    fn test_desertions_accumulate_and_decay_on_victory() {
        let mut pressure = CompanyPressure::new();
        pressure.note_desertions(3);
        pressure.note_desertions(2);
        assert_eq!(pressure.recent_desertions, 5);
        pressure.note_victory();
        assert_eq!(pressure.recent_desertions, 3);
    }

    #[test]
    fn test_desertion_crisis_flag_rearms_below_threshold() {
        let mut pressure = CompanyPressure::new();
        pressure.note_desertions(5);
        pressure.desertion_crisis_sent = true;
        pressure.note_victory();
        assert!(!pressure.desertion_crisis_sent);
    }

    #[test]
    fn test_decay_over_skip() {
        let mut pressure = CompanyPressure::new();
        pressure.note_desertions(6);
        pressure.decay_over_skip(10);
        assert_eq!(pressure.recent_desertions, 1);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut pressure = CompanyPressure::new();
        pressure.note_supplies(10, 40, 20);
        pressure.note_desertions(2);
        let json = serde_json::to_string(&pressure).unwrap();
        let parsed: CompanyPressure = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, pressure);
    }
}
