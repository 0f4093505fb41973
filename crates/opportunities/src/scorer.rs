//! Fitness scoring with configurable weights.
//!
//! Scores opportunity candidates for desirability in the current
//! context: world state, camp conditions, player state, and history all
//! layer additively over the definition's base fitness, a schedule match
//! multiplies, and the result clamps to [0, 100].

use std::collections::HashSet;

use camp_events::{
    ActivityCategory, CampClock, CampMood, CampSnapshot, ExpectedActivity, OpportunityDefinition,
    OpportunityType, PlayerSnapshot, WorldSituation,
};

use crate::config::ScoringWeights;

/// Context for scoring and eligibility, snapshotted once per generation.
#[derive(Debug, Clone)]
pub struct OpportunityContext {
    /// Current camp time
    pub clock: CampClock,
    /// World situation snapshot
    pub world: WorldSituation,
    /// Camp conditions snapshot
    pub camp: CampSnapshot,
    /// Player state snapshot
    pub player: PlayerSnapshot,
    /// Category of the currently scheduled activity, if any
    pub scheduled_category: Option<ActivityCategory>,
    /// Boolean flags currently set by incidents and content hooks
    pub active_flags: HashSet<String>,
}

impl OpportunityContext {
    /// Builds a context from its snapshots with no schedule or flags.
    pub fn new(
        clock: CampClock,
        world: WorldSituation,
        camp: CampSnapshot,
        player: PlayerSnapshot,
    ) -> Self {
        Self {
            clock,
            world,
            camp,
            player,
            scheduled_category: None,
            active_flags: HashSet::new(),
        }
    }

    /// Sets the scheduled category.
    pub fn with_scheduled_category(mut self, category: ActivityCategory) -> Self {
        self.scheduled_category = Some(category);
        self
    }
}

/// An offerable opportunity with its computed runtime score.
///
/// A shallow copy of the immutable definition plus mutable runtime state.
#[derive(Debug, Clone)]
pub struct OpportunityCandidate {
    /// The definition this candidate was generated from
    pub definition: OpportunityDefinition,
    /// Computed desirability, 0-100
    pub fitness_score: f32,
    /// True when an active commitment targets this opportunity
    pub is_scheduled: bool,
}

impl OpportunityCandidate {
    pub fn new(definition: OpportunityDefinition, fitness_score: f32) -> Self {
        Self {
            definition,
            fitness_score,
            is_scheduled: false,
        }
    }
}

/// Scores candidates for desirability in context.
#[derive(Debug, Clone)]
pub struct FitnessScorer {
    weights: ScoringWeights,
    schedule_boost: f32,
}

impl FitnessScorer {
    pub fn new(weights: ScoringWeights, schedule_boost: f32) -> Self {
        Self {
            weights,
            schedule_boost,
        }
    }

    /// Scores a single definition.
    ///
    /// `history_modifier` is computed separately by the history tracker
    /// and folded in with the other additive layers before the schedule
    /// boost and the final clamp.
    pub fn score(
        &self,
        definition: &OpportunityDefinition,
        context: &OpportunityContext,
        history_modifier: f32,
    ) -> f32 {
        let kind = definition.opportunity_type;
        let mut score = definition.base_fitness
            + self.world_state_modifier(kind, context)
            + self.camp_context_modifier(kind, context)
            + self.player_state_modifier(kind, context)
            + history_modifier;

        // A matching scheduled activity reinforces the opportunity
        let scheduled_type = context
            .scheduled_category
            .and_then(ActivityCategory::opportunity_type);
        if scheduled_type == Some(kind) {
            score *= self.schedule_boost;
        }

        score.clamp(0.0, 100.0)
    }

    /// World-state layer: what the lord's party is doing.
    fn world_state_modifier(&self, kind: OpportunityType, context: &OpportunityContext) -> f32 {
        let mut modifier = 0.0;
        if kind == OpportunityType::Training
            && context.world.lord_situation
                == camp_events::LordSituation::PeacetimeGarrison
        {
            modifier += self.weights.peacetime_training_bonus;
        }
        if kind == OpportunityType::Social && context.world.lord_situation.is_siege() {
            modifier += self.weights.siege_social_penalty;
        }
        if kind == OpportunityType::Recovery
            && context.world.expected_activity == ExpectedActivity::Intense
        {
            modifier += self.weights.intense_recovery_bonus;
        }
        modifier
    }

    /// Camp-context layer: time of day, mood, and the muster cycle.
    fn camp_context_modifier(&self, kind: OpportunityType, context: &OpportunityContext) -> f32 {
        let mut modifier = 0.0;
        match (kind, context.world.day_phase) {
            (OpportunityType::Training, camp_events::DayPhase::Dawn) => {
                modifier += self.weights.dawn_training_bonus;
            }
            (OpportunityType::Social, camp_events::DayPhase::Dusk) => {
                modifier += self.weights.dusk_social_bonus;
            }
            (OpportunityType::Economic, camp_events::DayPhase::Night) => {
                modifier += self.weights.night_economic_penalty;
            }
            _ => {}
        }

        match (kind, context.camp.mood) {
            (OpportunityType::Social, CampMood::Lively) => {
                modifier += self.weights.mood_social_swing;
            }
            (OpportunityType::Social, CampMood::Grim) => {
                modifier -= self.weights.mood_social_swing;
            }
            (OpportunityType::Recovery, CampMood::Grim) => {
                modifier += self.weights.mood_recovery_bonus;
            }
            _ => {}
        }

        if kind == OpportunityType::Economic
            && context.camp.days_since_muster >= self.weights.muster_near_days
        {
            modifier += self.weights.muster_economic_bonus;
        }
        modifier
    }

    /// Player-state layer: stamina, injury, purse, and learned leaning.
    fn player_state_modifier(&self, kind: OpportunityType, context: &OpportunityContext) -> f32 {
        let mut modifier = 0.0;
        if kind == OpportunityType::Training
            && context.player.fatigue < self.weights.fatigue_threshold
        {
            modifier += self.weights.low_fatigue_training_penalty;
        }
        if kind == OpportunityType::Recovery && context.player.is_injured {
            modifier += self.weights.injured_recovery_bonus;
        }
        if kind == OpportunityType::Economic
            && context.player.gold < self.weights.low_gold_threshold
        {
            modifier += self.weights.low_gold_economic_bonus;
        }

        // Preference runs -1 (combat-leaning) to 1 (social-leaning)
        let preference = context.player.combat_social_preference;
        match kind {
            OpportunityType::Social => modifier += preference * self.weights.preference_swing,
            OpportunityType::Training => modifier -= preference * self.weights.preference_swing,
            _ => {}
        }
        modifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camp_events::{fixtures, DayPhase, LordSituation};

    fn make_context(phase: DayPhase) -> OpportunityContext {
        OpportunityContext::new(
            CampClock::new(3, phase.start_hour()),
            fixtures::sample_world(phase),
            fixtures::sample_camp(),
            fixtures::sample_player(),
        )
    }

    fn scorer() -> FitnessScorer {
        FitnessScorer::new(ScoringWeights::default(), 1.3)
    }

    #[test]
    fn test_peacetime_training_bonus() {
        let scorer = scorer();
        let training = fixtures::make_opportunity("op_t", OpportunityType::Training);
        let context = make_context(DayPhase::Midday);

        // Base 50 + 15 peacetime
        let score = scorer.score(&training, &context, 0.0);
        assert_eq!(score, 65.0);
    }

    #[test]
    fn test_dawn_training_stacks_with_peacetime() {
        let scorer = scorer();
        let training = fixtures::make_opportunity("op_t", OpportunityType::Training);
        let context = make_context(DayPhase::Dawn);

        // Base 50 + 15 peacetime + 10 dawn
        let score = scorer.score(&training, &context, 0.0);
        assert_eq!(score, 75.0);
    }

    #[test]
    fn test_siege_social_penalty() {
        let scorer = scorer();
        let social = fixtures::make_opportunity("op_s", OpportunityType::Social);
        let mut context = make_context(DayPhase::Midday);
        context.world.lord_situation = LordSituation::SiegeDefender;

        // Base 50 - 20 siege
        let score = scorer.score(&social, &context, 0.0);
        assert_eq!(score, 30.0);
    }

    #[test]
    fn test_intense_activity_boosts_recovery() {
        let scorer = scorer();
        let recovery = fixtures::make_opportunity("op_r", OpportunityType::Recovery);
        let mut context = make_context(DayPhase::Midday);
        context.world.expected_activity = ExpectedActivity::Intense;

        // Base 50 + 25 intense
        let score = scorer.score(&recovery, &context, 0.0);
        assert_eq!(score, 75.0);
    }

    #[test]
    fn test_night_economic_penalty() {
        let scorer = scorer();
        let economic = fixtures::make_opportunity("op_e", OpportunityType::Economic);
        let context = make_context(DayPhase::Night);

        // Base 50 - 30 night
        let score = scorer.score(&economic, &context, 0.0);
        assert_eq!(score, 20.0);
    }

    #[test]
    fn test_mood_swings_social() {
        let scorer = scorer();
        let social = fixtures::make_opportunity("op_s", OpportunityType::Social);

        let mut lively = make_context(DayPhase::Midday);
        lively.camp.mood = CampMood::Lively;
        assert_eq!(scorer.score(&social, &lively, 0.0), 65.0);

        let mut grim = make_context(DayPhase::Midday);
        grim.camp.mood = CampMood::Grim;
        assert_eq!(scorer.score(&social, &grim, 0.0), 35.0);
    }

    #[test]
    fn test_muster_approach_boosts_economic() {
        let scorer = scorer();
        let economic = fixtures::make_opportunity("op_e", OpportunityType::Economic);
        let mut context = make_context(DayPhase::Midday);
        context.camp.days_since_muster = 10;

        // Base 50 + 10 muster
        assert_eq!(scorer.score(&economic, &context, 0.0), 60.0);
    }

    #[test]
    fn test_spent_player_avoids_training() {
        let scorer = scorer();
        let training = fixtures::make_opportunity("op_t", OpportunityType::Training);
        let mut context = make_context(DayPhase::Midday);
        context.player.fatigue = 3.0;

        // Base 50 + 15 peacetime - 25 fatigue
        assert_eq!(scorer.score(&training, &context, 0.0), 40.0);
    }

    #[test]
    fn test_injury_boosts_recovery() {
        let scorer = scorer();
        let recovery = fixtures::make_opportunity("op_r", OpportunityType::Recovery);
        let mut context = make_context(DayPhase::Midday);
        context.player.is_injured = true;

        assert_eq!(scorer.score(&recovery, &context, 0.0), 80.0);
    }

    #[test]
    fn test_empty_purse_boosts_economic() {
        let scorer = scorer();
        let economic = fixtures::make_opportunity("op_e", OpportunityType::Economic);
        let mut context = make_context(DayPhase::Midday);
        context.player.gold = 30;

        assert_eq!(scorer.score(&economic, &context, 0.0), 70.0);
    }

    #[test]
    fn test_preference_swings_both_ways() {
        let scorer = scorer();
        let social = fixtures::make_opportunity("op_s", OpportunityType::Social);
        let training = fixtures::make_opportunity("op_t", OpportunityType::Training);

        let mut context = make_context(DayPhase::Midday);
        context.player.combat_social_preference = 1.0;
        assert_eq!(scorer.score(&social, &context, 0.0), 60.0);
        // Training loses both ways: peacetime +15 but preference -10
        assert_eq!(scorer.score(&training, &context, 0.0), 55.0);

        context.player.combat_social_preference = -1.0;
        assert_eq!(scorer.score(&social, &context, 0.0), 40.0);
        assert_eq!(scorer.score(&training, &context, 0.0), 75.0);
    }

    #[test]
    fn test_schedule_match_multiplies() {
        let scorer = scorer();
        let training = fixtures::make_opportunity("op_t", OpportunityType::Training);
        let mut context = make_context(DayPhase::Midday);
        context.scheduled_category = Some(ActivityCategory::Drill);

        // (50 + 15) * 1.3
        let score = scorer.score(&training, &context, 0.0);
        assert!((score - 84.5).abs() < 1e-4);
    }

    #[test]
    fn test_schedule_mismatch_does_not_multiply() {
        let scorer = scorer();
        let training = fixtures::make_opportunity("op_t", OpportunityType::Training);
        let mut context = make_context(DayPhase::Midday);
        context.scheduled_category = Some(ActivityCategory::Leisure);

        assert_eq!(scorer.score(&training, &context, 0.0), 65.0);
    }

    #[test]
    fn test_score_clamped_to_bounds() {
        let scorer = scorer();
        let mut training = fixtures::make_opportunity("op_t", OpportunityType::Training);

        training.base_fitness = 95.0;
        let mut context = make_context(DayPhase::Dawn);
        context.scheduled_category = Some(ActivityCategory::Drill);
        let high = scorer.score(&training, &context, 50.0);
        assert_eq!(high, 100.0);

        training.base_fitness = 5.0;
        let low = scorer.score(&training, &context, -200.0);
        assert_eq!(low, 0.0);
    }

    #[test]
    fn test_history_modifier_folds_in_before_boost() {
        let scorer = scorer();
        let training = fixtures::make_opportunity("op_t", OpportunityType::Training);
        let mut context = make_context(DayPhase::Midday);
        context.scheduled_category = Some(ActivityCategory::Drill);

        // (50 + 15 - 40) * 1.3 = 32.5: the penalty is boosted too
        let score = scorer.score(&training, &context, -40.0);
        assert!((score - 32.5).abs() < 1e-4);
    }
}
