//! Company Roster
//!
//! Counts of fit, sick, wounded, missing, and dead soldiers. All
//! transitions clamp so counts never go negative and the afflicted never
//! outnumber the company. Mutated only inside the daily simulation tick.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A batch of soldiers who went missing on the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct MissingBatch {
    since_day: u32,
    count: u32,
}

/// Roster of the player's company.
///
/// Invariant: `sick + wounded + missing <= total_soldiers`, every count
/// >= 0, and `fit_for_duty` is always derived, never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyRoster {
    /// Soldiers currently on the rolls
    pub total_soldiers: u32,
    /// Down with sickness
    pub sick_count: u32,
    /// Recovering from wounds
    pub wounded_count: u32,
    /// Unaccounted for; converts to desertion after the grace period
    pub missing_count: u32,
    /// Confirmed dead since enlistment
    pub dead_this_campaign: u32,
    /// Missing soldiers grouped by the day they vanished
    #[serde(default, skip_serializing_if = "VecDeque::is_empty")]
    missing_queue: VecDeque<MissingBatch>,
}

impl CompanyRoster {
    /// Creates a roster of the given strength, everyone fit.
    pub fn new(total_soldiers: u32) -> Self {
        Self {
            total_soldiers,
            ..Self::default()
        }
    }

    /// Empties the roster. Used when the enlistment ends or the lord changes.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Soldiers available for duty: total minus sick, wounded, and missing,
    /// clamped at zero.
    pub fn fit_for_duty(&self) -> u32 {
        self.total_soldiers
            .saturating_sub(self.sick_count)
            .saturating_sub(self.wounded_count)
            .saturating_sub(self.missing_count)
    }

    /// Fraction of the company that is sick, wounded, or dead.
    pub fn casualty_rate(&self) -> f32 {
        let strength = self.total_soldiers + self.dead_this_campaign;
        if strength == 0 {
            return 0.0;
        }
        (self.sick_count + self.wounded_count + self.dead_this_campaign) as f32 / strength as f32
    }

    /// Fraction of living soldiers currently sick.
    pub fn sick_ratio(&self) -> f32 {
        if self.total_soldiers == 0 {
            return 0.0;
        }
        self.sick_count as f32 / self.total_soldiers as f32
    }

    /// Moves up to `count` fit soldiers to the sick list. Returns how many
    /// actually fell sick.
    pub fn add_sick(&mut self, count: u32) -> u32 {
        let taken = count.min(self.fit_for_duty());
        self.sick_count += taken;
        taken
    }

    /// Moves up to `count` fit soldiers to the wounded list.
    pub fn add_wounded(&mut self, count: u32) -> u32 {
        let taken = count.min(self.fit_for_duty());
        self.wounded_count += taken;
        taken
    }

    /// Marks up to `count` fit soldiers missing as of `day`.
    pub fn add_missing(&mut self, count: u32, day: u32) -> u32 {
        let taken = count.min(self.fit_for_duty());
        if taken > 0 {
            self.missing_count += taken;
            self.missing_queue.push_back(MissingBatch {
                since_day: day,
                count: taken,
            });
        }
        taken
    }

    /// Returns up to `count` sick soldiers to duty.
    pub fn recover_sick(&mut self, count: u32) -> u32 {
        let taken = count.min(self.sick_count);
        self.sick_count -= taken;
        taken
    }

    /// Returns up to `count` wounded soldiers to duty.
    pub fn recover_wounded(&mut self, count: u32) -> u32 {
        let taken = count.min(self.wounded_count);
        self.wounded_count -= taken;
        taken
    }

    /// Removes up to `count` sick soldiers as deaths.
    pub fn sick_deaths(&mut self, count: u32) -> u32 {
        let taken = count.min(self.sick_count);
        self.sick_count -= taken;
        self.total_soldiers = self.total_soldiers.saturating_sub(taken);
        self.dead_this_campaign += taken;
        taken
    }

    /// Converts missing soldiers older than `grace_days` into confirmed
    /// desertions, removing them from the rolls. Returns the number
    /// confirmed.
    pub fn confirm_desertions(&mut self, current_day: u32, grace_days: u32) -> u32 {
        let mut confirmed = 0;
        while let Some(batch) = self.missing_queue.front() {
            if current_day.saturating_sub(batch.since_day) < grace_days {
                break;
            }
            confirmed += batch.count;
            self.missing_queue.pop_front();
        }
        self.missing_count = self.missing_count.saturating_sub(confirmed);
        self.total_soldiers = self.total_soldiers.saturating_sub(confirmed);
        confirmed
    }

    /// True when the invariants hold; asserted by tests after every tick.
    pub fn is_consistent(&self) -> bool {
        let afflicted = self.sick_count + self.wounded_count + self.missing_count;
        afflicted <= self.total_soldiers
            && self.missing_count == self.missing_queue.iter().map(|b| b.count).sum::<u32>()
    }
}
