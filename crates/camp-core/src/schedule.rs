//! Schedule Manager
//!
//! Produces the per-phase activity plan: a configured baseline deformed,
//! in order, by activity multipliers, the lord's situation, pressure
//! effects, and any player commitment. Planning is a pure function of
//! its inputs; a generation-counter cache keeps recomputation to one per
//! phase transition.

use serde::{Deserialize, Serialize};

use camp_events::{
    ActivityCategory, ActivitySlot, CommitmentMarker, CommitmentNote, DayPhase, LordSituation,
    NeedResource, ScheduledPhase, WorldSituation,
};

use crate::components::CompanyPressure;
use crate::config::{ScheduleConfig, SimulationConfig};
use crate::sinks::CompanyNeedsStore;

/// A named deformation applied to the baseline plan under pressure.
///
/// A tagged enum rather than effect-name strings: content maps pressure
/// conditions to variants, and one dispatch function owns the mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureEffect {
    /// Exhausted companies skip drill
    SkipFormations,
    /// Short supplies put more hands on foraging
    BoostForaging,
    /// Poor discipline curtails free time
    RestrictLeisure,
    /// Sickness pushes the plan toward rest
    BoostRecovery,
    /// Critical supplies override everything but food and sleep
    SurvivalMode,
    /// A demoralized camp does the minimum
    MinimalSchedule,
}

impl PressureEffect {
    /// Applies this effect's slot mutations to the plan.
    pub fn apply(self, plan: &mut ScheduledPhase) {
        match self {
            PressureEffect::SkipFormations => {
                for slot in plan
                    .slots
                    .iter_mut()
                    .filter(|s| s.category == ActivityCategory::Drill)
                {
                    slot.skip();
                }
            }
            PressureEffect::BoostForaging => {
                for slot in plan
                    .slots
                    .iter_mut()
                    .filter(|s| s.category == ActivityCategory::Foraging)
                {
                    slot.weight *= 1.5;
                }
            }
            PressureEffect::RestrictLeisure => {
                for slot in plan
                    .slots
                    .iter_mut()
                    .filter(|s| s.category == ActivityCategory::Leisure)
                {
                    slot.skip();
                }
            }
            PressureEffect::BoostRecovery => {
                for slot in plan
                    .slots
                    .iter_mut()
                    .filter(|s| s.category == ActivityCategory::Rest)
                {
                    slot.weight *= 1.5;
                }
            }
            PressureEffect::SurvivalMode => {
                for slot in plan.slots.iter_mut() {
                    match slot.category {
                        ActivityCategory::Foraging | ActivityCategory::Rest => {
                            slot.weight *= 2.0;
                        }
                        _ => slot.skip(),
                    }
                }
                plan.deviation = Some("Survival takes precedence over routine.".to_string());
            }
            PressureEffect::MinimalSchedule => {
                plan.slots[1].skip();
            }
        }
    }
}

/// Derives the active pressure effects from current camp state, in
/// application order.
pub fn active_pressure_effects(
    pressure: &CompanyPressure,
    needs: &dyn CompanyNeedsStore,
    config: &SimulationConfig,
) -> Vec<PressureEffect> {
    let supplies = needs.get(NeedResource::Supplies);
    let rest = needs.get(NeedResource::Rest);
    let morale = needs.get(NeedResource::Morale);

    let mut effects = Vec::new();
    if rest < 30 {
        effects.push(PressureEffect::SkipFormations);
    }
    if supplies < config.low_supply_threshold {
        effects.push(PressureEffect::BoostForaging);
    }
    if pressure.days_low_discipline >= 3 {
        effects.push(PressureEffect::RestrictLeisure);
    }
    if pressure.days_high_sickness >= 2 {
        effects.push(PressureEffect::BoostRecovery);
    }
    if supplies < config.critical_supply_threshold {
        effects.push(PressureEffect::SurvivalMode);
    }
    if morale < 25 {
        effects.push(PressureEffect::MinimalSchedule);
    }
    effects
}

/// Categories a lord's situation leans on.
fn boosted_categories(situation: LordSituation) -> &'static [ActivityCategory] {
    match situation {
        LordSituation::PeacetimeGarrison => &[ActivityCategory::Leisure],
        LordSituation::Patrolling => &[ActivityCategory::Watch],
        LordSituation::Campaigning => &[ActivityCategory::Foraging],
        LordSituation::SiegeAttacker | LordSituation::SiegeDefender => {
            &[ActivityCategory::Drill, ActivityCategory::Watch]
        }
        LordSituation::ForcedMarch | LordSituation::BattleImminent => &[],
    }
}

/// Situations that blank the plan entirely, with the stated reason.
fn blanking_reason(situation: LordSituation) -> Option<&'static str> {
    match situation {
        LordSituation::BattleImminent => Some("The company stands to arms."),
        LordSituation::ForcedMarch => Some("The column pushes on; there is no camp routine."),
        _ => None,
    }
}

#[derive(Debug, Clone)]
struct CachedPlan {
    day: u32,
    phase: DayPhase,
    generation: u64,
    plan: ScheduledPhase,
}

/// Computes and caches the per-phase plan.
#[derive(Debug)]
pub struct ScheduleManager {
    config: ScheduleConfig,
    generation: u64,
    cache: Option<CachedPlan>,
}

impl ScheduleManager {
    pub fn new(config: ScheduleConfig) -> Self {
        Self {
            config,
            generation: 0,
            cache: None,
        }
    }

    /// Current cache generation; bumped by [`Self::invalidate`].
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Forces the next request to recompute.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Returns the plan for the given phase, recomputing only when the
    /// day, phase, or generation changed since the last request.
    pub fn schedule_for_phase(
        &mut self,
        day: u32,
        phase: DayPhase,
        world: &WorldSituation,
        effects: &[PressureEffect],
        commitments: &[CommitmentNote],
    ) -> ScheduledPhase {
        if let Some(cached) = &self.cache {
            if cached.day == day && cached.phase == phase && cached.generation == self.generation {
                return cached.plan.clone();
            }
        }
        let plan = self.plan_phase(day, phase, world, effects, commitments);
        self.cache = Some(CachedPlan {
            day,
            phase,
            generation: self.generation,
            plan: plan.clone(),
        });
        plan
    }

    /// Recomputes the cache at a phase transition.
    pub fn on_phase_changed(
        &mut self,
        day: u32,
        phase: DayPhase,
        world: &WorldSituation,
        effects: &[PressureEffect],
        commitments: &[CommitmentNote],
    ) -> ScheduledPhase {
        self.cache = None;
        self.schedule_for_phase(day, phase, world, effects, commitments)
    }

    /// Pure plan computation: baseline, then (a) activity multipliers,
    /// (b) lord-situation modifiers, (c) pressure effects, (d) the
    /// commitment marker.
    pub fn plan_phase(
        &self,
        day: u32,
        phase: DayPhase,
        world: &WorldSituation,
        effects: &[PressureEffect],
        commitments: &[CommitmentNote],
    ) -> ScheduledPhase {
        let baseline = self.config.baseline.get(&phase);
        let mut slots: [ActivitySlot; 2] = match baseline {
            Some(plan) => [
                ActivitySlot::new(
                    plan.slots[0].category,
                    plan.slots[0].description.clone(),
                    plan.slots[0].weight,
                ),
                ActivitySlot::new(
                    plan.slots[1].category,
                    plan.slots[1].description.clone(),
                    plan.slots[1].weight,
                ),
            ],
            None => [
                ActivitySlot::new(ActivityCategory::Rest, "Stand down", 1.0),
                ActivitySlot::new(ActivityCategory::Watch, "Hold the pickets", 0.5),
            ],
        };

        // (a) activity-level multipliers; exactly 0 marks the slot skipped
        for slot in slots.iter_mut() {
            if let Some(multiplier) = self.config.activity_multipliers.get(&slot.category) {
                if *multiplier == 0.0 {
                    slot.skip();
                } else {
                    slot.weight *= multiplier;
                }
            }
        }

        let mut plan = ScheduledPhase {
            phase,
            slots,
            deviation: None,
            flavor: self.flavor_for(phase, day),
            commitment: None,
        };

        // (b) lord-situation modifiers
        if let Some(reason) = blanking_reason(world.lord_situation) {
            for slot in plan.slots.iter_mut() {
                slot.skip();
            }
            plan.deviation = Some(reason.to_string());
        } else {
            let boosted = boosted_categories(world.lord_situation);
            for slot in plan.slots.iter_mut() {
                if boosted.contains(&slot.category) {
                    slot.weight *= self.config.situation_boost;
                }
            }
        }

        // (c) pressure overrides, in order
        for effect in effects {
            effect.apply(&mut plan);
        }

        // (d) player commitment marks the phase off-limits for routine
        if let Some(note) = commitments
            .iter()
            .find(|c| c.day == day && c.phase == phase)
        {
            plan.commitment = Some(CommitmentMarker {
                title: note.title.clone(),
            });
        }

        plan
    }

    fn flavor_for(&self, phase: DayPhase, day: u32) -> String {
        match self.config.flavor.get(&phase) {
            Some(lines) if !lines.is_empty() => lines[day as usize % lines.len()].clone(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::InMemoryNeeds;

    fn manager() -> ScheduleManager {
        ScheduleManager::new(ScheduleConfig::default())
    }

    fn garrison() -> WorldSituation {
        WorldSituation::calm(DayPhase::Dawn)
    }

    #[test]
    fn test_baseline_dawn_plan() {
        let mgr = manager();
        let plan = mgr.plan_phase(1, DayPhase::Dawn, &garrison(), &[], &[]);
        assert_eq!(plan.slots[0].category, ActivityCategory::Drill);
        assert_eq!(plan.slots[1].category, ActivityCategory::Labor);
        assert!(!plan.slots[0].skipped);
        assert!(plan.commitment.is_none());
        assert!(!plan.flavor.is_empty());
    }

    #[test]
    fn test_zero_multiplier_skips_slot() {
        let mut config = ScheduleConfig::default();
        config
            .activity_multipliers
            .insert(ActivityCategory::Drill, 0.0);
        let mgr = ScheduleManager::new(config);
        let plan = mgr.plan_phase(1, DayPhase::Dawn, &garrison(), &[], &[]);
        assert!(plan.slots[0].skipped);
        assert!(!plan.slots[1].skipped);
    }

    #[test]
    fn test_multiplier_scales_weight() {
        let mut config = ScheduleConfig::default();
        config
            .activity_multipliers
            .insert(ActivityCategory::Drill, 2.0);
        let mgr = ScheduleManager::new(config);
        let plan = mgr.plan_phase(1, DayPhase::Dawn, &garrison(), &[], &[]);
        assert!((plan.slots[0].weight - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_battle_imminent_blanks_phase() {
        let mgr = manager();
        let mut world = garrison();
        world.lord_situation = LordSituation::BattleImminent;
        let plan = mgr.plan_phase(1, DayPhase::Dawn, &world, &[], &[]);
        assert!(plan.slots.iter().all(|s| s.skipped));
        assert!(plan.deviation.is_some());
    }

    #[test]
    fn test_situation_boost_applies_to_matching_category() {
        let mgr = manager();
        let mut world = garrison();
        world.lord_situation = LordSituation::Campaigning;
        // Midday baseline carries a foraging slot at 0.8
        let plan = mgr.plan_phase(1, DayPhase::Midday, &world, &[], &[]);
        let foraging = plan
            .slots
            .iter()
            .find(|s| s.category == ActivityCategory::Foraging)
            .unwrap();
        assert!((foraging.weight - 0.8 * 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_survival_mode_keeps_only_foraging_and_rest() {
        let mgr = manager();
        let plan = mgr.plan_phase(
            1,
            DayPhase::Dawn,
            &garrison(),
            &[PressureEffect::SurvivalMode],
            &[],
        );
        for slot in &plan.slots {
            match slot.category {
                ActivityCategory::Foraging | ActivityCategory::Rest => assert!(!slot.skipped),
                _ => assert!(slot.skipped),
            }
        }
        assert!(plan.deviation.is_some());
    }

    #[test]
    fn test_skip_formations_effect() {
        let mgr = manager();
        let plan = mgr.plan_phase(
            1,
            DayPhase::Dawn,
            &garrison(),
            &[PressureEffect::SkipFormations],
            &[],
        );
        assert!(plan.slots[0].skipped);
    }

    #[test]
    fn test_restrict_leisure_effect() {
        let mgr = manager();
        let plan = mgr.plan_phase(
            1,
            DayPhase::Dusk,
            &garrison(),
            &[PressureEffect::RestrictLeisure],
            &[],
        );
        let leisure = plan
            .slots
            .iter()
            .find(|s| s.category == ActivityCategory::Leisure)
            .unwrap();
        assert!(leisure.skipped);
    }

    #[test]
    fn test_minimal_schedule_drops_second_slot() {
        let mgr = manager();
        let plan = mgr.plan_phase(
            1,
            DayPhase::Midday,
            &garrison(),
            &[PressureEffect::MinimalSchedule],
            &[],
        );
        assert!(!plan.slots[0].skipped);
        assert!(plan.slots[1].skipped);
    }

    #[test]
    fn test_commitment_marks_phase() {
        let mgr = manager();
        let note = CommitmentNote {
            day: 4,
            phase: DayPhase::Dusk,
            title: "Dice behind the wagons".to_string(),
        };
        let plan = mgr.plan_phase(4, DayPhase::Dusk, &garrison(), &[], &[note.clone()]);
        assert!(plan.is_player_committed());

        // A commitment for another day leaves the phase alone
        let plan = mgr.plan_phase(5, DayPhase::Dusk, &garrison(), &[], &[note]);
        assert!(!plan.is_player_committed());
    }

    #[test]
    fn test_active_pressure_effects_derivation() {
        let config = SimulationConfig::default();
        let pressure = CompanyPressure::new();
        let needs = InMemoryNeeds::with_values(&[(NeedResource::Supplies, 15)]);

        let effects = active_pressure_effects(&pressure, &needs, &config);
        assert!(effects.contains(&PressureEffect::BoostForaging));
        assert!(effects.contains(&PressureEffect::SurvivalMode));
        assert!(!effects.contains(&PressureEffect::SkipFormations));
    }

    #[test]
    fn test_pressure_effects_from_counters() {
        let config = SimulationConfig::default();
        let mut pressure = CompanyPressure::new();
        pressure.days_low_discipline = 3;
        pressure.days_high_sickness = 2;
        let needs = InMemoryNeeds::new();

        let effects = active_pressure_effects(&pressure, &needs, &config);
        assert_eq!(
            effects,
            vec![
                PressureEffect::RestrictLeisure,
                PressureEffect::BoostRecovery
            ]
        );
    }

    #[test]
    fn test_cache_returns_identical_plan() {
        let mut mgr = manager();
        let world = garrison();
        let first = mgr.schedule_for_phase(1, DayPhase::Dawn, &world, &[], &[]);
        let second = mgr.schedule_for_phase(1, DayPhase::Dawn, &world, &[], &[]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalidate_bumps_generation() {
        let mut mgr = manager();
        let before = mgr.generation();
        mgr.invalidate();
        assert_eq!(mgr.generation(), before + 1);
    }

    #[test]
    fn test_cache_invalidation_picks_up_new_commitments() {
        let mut mgr = manager();
        let world = garrison();
        let first = mgr.schedule_for_phase(2, DayPhase::Dusk, &world, &[], &[]);
        assert!(!first.is_player_committed());

        mgr.invalidate();
        let note = CommitmentNote {
            day: 2,
            phase: DayPhase::Dusk,
            title: "Fireside company".to_string(),
        };
        let second = mgr.schedule_for_phase(2, DayPhase::Dusk, &world, &[], &[note]);
        assert!(second.is_player_committed());
    }

    #[test]
    fn test_plan_is_pure() {
        let mgr = manager();
        let world = garrison();
        let a = mgr.plan_phase(3, DayPhase::Night, &world, &[], &[]);
        let b = mgr.plan_phase(3, DayPhase::Night, &world, &[], &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_baseline_synthesizes_rest() {
        let config = ScheduleConfig {
            baseline: Default::default(),
            ..ScheduleConfig::default()
        };
        let mgr = ScheduleManager::new(config);
        let plan = mgr.plan_phase(1, DayPhase::Dawn, &garrison(), &[], &[]);
        assert_eq!(plan.slots[0].category, ActivityCategory::Rest);
    }
}
