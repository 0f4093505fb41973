//! Commitment Scheduler
//!
//! Tracks the player's advance choices to perform opportunities at
//! future phases, and fires them at the matching phase boundary. A
//! commitment is removed from the active list before any side effect,
//! so duplicate ticks can never fire it twice.

use serde::{Deserialize, Serialize};

use camp_events::{CampClock, CommitmentNote, DayPhase};

/// A player's advance choice to perform an opportunity later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledCommitment {
    /// Opportunity this commitment targets
    pub opportunity_id: String,
    /// Decision delivered when the commitment fires
    pub target_decision_id: String,
    /// Player-facing title
    pub title: String,
    /// Phase the commitment lands in
    pub scheduled_phase: DayPhase,
    /// Day the commitment lands on
    pub scheduled_day: u32,
    /// Total hours at the moment the player committed
    pub commit_time_hours: u64,
    /// Display text carried into the delivered event
    pub display_text: String,
}

impl ScheduledCommitment {
    /// The lightweight view the schedule manager consumes.
    pub fn note(&self) -> CommitmentNote {
        CommitmentNote {
            day: self.scheduled_day,
            phase: self.scheduled_phase,
            title: self.title.clone(),
        }
    }

    fn is_due(&self, clock: CampClock) -> bool {
        self.scheduled_day == clock.day
            && self.scheduled_phase == clock.phase()
            && clock.hour == self.scheduled_phase.start_hour()
    }
}

/// Holds active commitments, one per opportunity id.
#[derive(Debug, Clone, Default)]
pub struct CommitmentScheduler {
    active: Vec<ScheduledCommitment>,
}

impl CommitmentScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a commitment; a duplicate opportunity id replaces the old
    /// entry rather than appending.
    pub fn add(&mut self, commitment: ScheduledCommitment) {
        self.active
            .retain(|c| c.opportunity_id != commitment.opportunity_id);
        self.active.push(commitment);
    }

    /// Removes and returns the commitment for an opportunity, if any.
    pub fn cancel(&mut self, opportunity_id: &str) -> Option<ScheduledCommitment> {
        let index = self
            .active
            .iter()
            .position(|c| c.opportunity_id == opportunity_id)?;
        Some(self.active.remove(index))
    }

    /// Active commitments in insertion order.
    pub fn active(&self) -> &[ScheduledCommitment] {
        &self.active
    }

    /// True when an active commitment targets the opportunity.
    pub fn contains(&self, opportunity_id: &str) -> bool {
        self.active
            .iter()
            .any(|c| c.opportunity_id == opportunity_id)
    }

    /// Lightweight notes for the schedule manager.
    pub fn notes(&self) -> Vec<CommitmentNote> {
        self.active.iter().map(ScheduledCommitment::note).collect()
    }

    /// Removes and returns every commitment due at this clock reading.
    ///
    /// Only fires at the four phase-boundary hours. Removal happens here,
    /// before the caller delivers anything, so firing is exactly-once
    /// even under duplicate ticks.
    pub fn fire_due(&mut self, clock: CampClock) -> Vec<ScheduledCommitment> {
        if !clock.is_phase_boundary() {
            return Vec::new();
        }
        let (due, rest): (Vec<_>, Vec<_>) =
            self.active.drain(..).partition(|c| c.is_due(clock));
        self.active = rest;
        due
    }

    /// Exports the active list for persistence.
    pub fn snapshot(&self) -> Vec<ScheduledCommitment> {
        self.active.clone()
    }

    /// Restores a persisted list; an absent save restores to empty.
    pub fn restore(&mut self, commitments: Vec<ScheduledCommitment>) {
        self.active = commitments;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_commitment(id: &str, day: u32, phase: DayPhase) -> ScheduledCommitment {
        ScheduledCommitment {
            opportunity_id: id.to_string(),
            target_decision_id: format!("dec_{}", id),
            title: format!("Commitment {}", id),
            scheduled_phase: phase,
            scheduled_day: day,
            commit_time_hours: 0,
            display_text: "Something planned.".to_string(),
        }
    }

    #[test]
    fn test_add_and_contains() {
        let mut scheduler = CommitmentScheduler::new();
        scheduler.add(make_commitment("op_dice", 3, DayPhase::Dusk));
        assert!(scheduler.contains("op_dice"));
        assert!(!scheduler.contains("op_fireside"));
        assert_eq!(scheduler.active().len(), 1);
    }

    #[test]
    fn test_duplicate_id_replaces() {
        let mut scheduler = CommitmentScheduler::new();
        scheduler.add(make_commitment("op_dice", 3, DayPhase::Dusk));
        scheduler.add(make_commitment("op_dice", 5, DayPhase::Dawn));

        assert_eq!(scheduler.active().len(), 1);
        assert_eq!(scheduler.active()[0].scheduled_day, 5);
    }

    #[test]
    fn test_multiple_distinct_commitments() {
        let mut scheduler = CommitmentScheduler::new();
        scheduler.add(make_commitment("op_dice", 3, DayPhase::Dusk));
        scheduler.add(make_commitment("op_fireside", 3, DayPhase::Night));
        assert_eq!(scheduler.active().len(), 2);
    }

    #[test]
    fn test_cancel_removes_once() {
        let mut scheduler = CommitmentScheduler::new();
        scheduler.add(make_commitment("op_dice", 3, DayPhase::Dusk));

        assert!(scheduler.cancel("op_dice").is_some());
        assert!(scheduler.cancel("op_dice").is_none());
        assert!(scheduler.active().is_empty());
    }

    #[test]
    fn test_fire_due_at_boundary() {
        let mut scheduler = CommitmentScheduler::new();
        scheduler.add(make_commitment("op_dice", 3, DayPhase::Dusk));

        // Wrong day, right hour
        assert!(scheduler.fire_due(CampClock::new(2, 18)).is_empty());
        // Right day, non-boundary hour inside the phase
        assert!(scheduler.fire_due(CampClock::new(3, 19)).is_empty());
        // Right day, boundary hour
        let fired = scheduler.fire_due(CampClock::new(3, 18));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].opportunity_id, "op_dice");
        assert!(scheduler.active().is_empty());
    }

    #[test]
    fn test_fire_due_exactly_once_under_duplicate_ticks() {
        let mut scheduler = CommitmentScheduler::new();
        scheduler.add(make_commitment("op_dice", 3, DayPhase::Dusk));

        let first = scheduler.fire_due(CampClock::new(3, 18));
        let second = scheduler.fire_due(CampClock::new(3, 18));

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn test_night_commitment_fires_at_midnight() {
        let mut scheduler = CommitmentScheduler::new();
        scheduler.add(make_commitment("op_fireside", 4, DayPhase::Night));

        // Night of day 4 begins at hour 0 of day 4
        assert!(scheduler.fire_due(CampClock::new(3, 18)).is_empty());
        let fired = scheduler.fire_due(CampClock::new(4, 0));
        assert_eq!(fired.len(), 1);
    }

    #[test]
    fn test_fire_due_only_takes_matching() {
        let mut scheduler = CommitmentScheduler::new();
        scheduler.add(make_commitment("op_dice", 3, DayPhase::Dusk));
        scheduler.add(make_commitment("op_fireside", 4, DayPhase::Dusk));

        let fired = scheduler.fire_due(CampClock::new(3, 18));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].opportunity_id, "op_dice");
        assert!(scheduler.contains("op_fireside"));
    }

    #[test]
    fn test_notes_view() {
        let mut scheduler = CommitmentScheduler::new();
        scheduler.add(make_commitment("op_dice", 3, DayPhase::Dusk));
        let notes = scheduler.notes();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].day, 3);
        assert_eq!(notes[0].phase, DayPhase::Dusk);
    }

    #[test]
    fn test_snapshot_restore_roundtrip() {
        let mut scheduler = CommitmentScheduler::new();
        scheduler.add(make_commitment("op_dice", 3, DayPhase::Dusk));

        let json = serde_json::to_string(&scheduler.snapshot()).unwrap();
        let restored_list: Vec<ScheduledCommitment> = serde_json::from_str(&json).unwrap();

        let mut restored = CommitmentScheduler::new();
        restored.restore(restored_list);
        assert!(restored.contains("op_dice"));
    }
}
