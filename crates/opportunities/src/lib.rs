//! Opportunity generation: context-aware candidates, scored and budgeted.
//!
//! The generator watches the camp and offers the player a handful of
//! situational choices each phase. Definitions are filtered for
//! eligibility, scored through layered fitness modifiers, and the top
//! few within a situational budget are offered. Commitments to future
//! opportunities fire at phase boundaries; risky behavior on duty runs
//! through the detection mechanic.
//!
//! # Modules
//!
//! - [`scorer`]: fitness scoring and the generation context
//! - [`history`]: adaptive memory and the behavior-tracker seam
//! - [`commitments`]: the commit/cancel/fire lifecycle
//! - [`detection`]: risk rolls for off-duty behavior on duty
//! - [`config`]: TOML-backed generator settings

pub mod commitments;
pub mod config;
pub mod detection;
pub mod history;
pub mod scorer;

pub use commitments::{CommitmentScheduler, ScheduledCommitment};
pub use config::{
    default_config_toml, BudgetConfig, ConfigError, HistoryConfig, OpportunityConfig,
    PhaseBudgets, ScoringWeights,
};
pub use detection::{attempt_risky, detection_chance, RiskOutcome};
pub use history::{BehaviorTracker, HistoryRecord, NullBehaviorTracker, OpportunityHistory};
pub use scorer::{FitnessScorer, OpportunityCandidate, OpportunityContext};

use camp_events::{
    CampClock, CommitmentNote, DayPhase, DeliveredEvent, OpportunityDefinition, OpportunityType,
};
use rand::Rng;

/// Supplies below this trim the budget by one.
const LOW_SUPPLY_BUDGET_THRESHOLD: i32 = 30;
/// Supplies below this force the budget to exactly one.
const CRITICAL_SUPPLY_BUDGET_THRESHOLD: i32 = 20;
/// Gambling opportunities need at least this much gold in the purse.
const GAMBLING_MIN_GOLD: i32 = 20;

/// Errors that can occur in generator operations.
#[derive(Debug)]
pub enum GeneratorError {
    /// Error loading configuration
    Config(ConfigError),
    /// The opportunity id is not in the loaded definitions
    UnknownOpportunity(String),
}

impl std::fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorError::Config(e) => write!(f, "Config error: {}", e),
            GeneratorError::UnknownOpportunity(id) => {
                write!(f, "Unknown opportunity: {}", id)
            }
        }
    }
}

impl std::error::Error for GeneratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeneratorError::Config(e) => Some(e),
            GeneratorError::UnknownOpportunity(_) => None,
        }
    }
}

impl From<ConfigError> for GeneratorError {
    fn from(e: ConfigError) -> Self {
        GeneratorError::Config(e)
    }
}

/// Penalty applied when the player backs out of a commitment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CancelPenalty {
    /// Stamina cost of the restlessness
    pub fatigue_cost: f32,
}

#[derive(Debug, Clone)]
struct CachedSelection {
    day: u32,
    phase: DayPhase,
    generation: u64,
    candidates: Vec<OpportunityCandidate>,
}

/// The opportunity generation engine.
///
/// Owns the scoring pipeline, the adaptive history, and the commitment
/// scheduler. Constructed once at session start and driven by the host's
/// phase clock; all randomness for risk rolls is injected per call.
pub struct OpportunityGenerator {
    config: OpportunityConfig,
    definitions: Vec<OpportunityDefinition>,
    scorer: FitnessScorer,
    history: OpportunityHistory,
    tracker: Box<dyn BehaviorTracker>,
    commitments: CommitmentScheduler,
    generation: u64,
    cache: Option<CachedSelection>,
}

impl std::fmt::Debug for OpportunityGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpportunityGenerator")
            .field("definitions", &self.definitions.len())
            .field("generation", &self.generation)
            .field("commitments", &self.commitments.active().len())
            .finish()
    }
}

impl OpportunityGenerator {
    /// Creates a generator with no external learning.
    pub fn new(config: OpportunityConfig, definitions: Vec<OpportunityDefinition>) -> Self {
        Self::with_tracker(config, definitions, Box::new(NullBehaviorTracker))
    }

    /// Creates a generator wired to an external behavior tracker.
    pub fn with_tracker(
        config: OpportunityConfig,
        definitions: Vec<OpportunityDefinition>,
        tracker: Box<dyn BehaviorTracker>,
    ) -> Self {
        let scorer = FitnessScorer::new(config.scoring, config.schedule_boost);
        Self {
            config,
            definitions,
            scorer,
            history: OpportunityHistory::new(),
            tracker,
            commitments: CommitmentScheduler::new(),
            generation: 0,
            cache: None,
        }
    }

    /// Invalidates the memoized selection.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Phase transitions always invalidate.
    pub fn on_phase_changed(&mut self) {
        self.invalidate();
    }

    /// The primary entry point: the current phase's offered opportunities.
    ///
    /// Memoized per (day, phase) until invalidated; repeated calls within
    /// a phase return the identical list without touching history.
    pub fn generate_camp_life(&mut self, context: &OpportunityContext) -> Vec<OpportunityCandidate> {
        let day = context.clock.day;
        let phase = context.world.day_phase;

        if let Some(cached) = &self.cache {
            if cached.day == day && cached.phase == phase && cached.generation == self.generation {
                return cached.candidates.clone();
            }
        }

        let candidates = self.build_selection(context);

        let now = context.clock.total_hours();
        for candidate in &candidates {
            self.history.record_presented(
                &candidate.definition.id,
                candidate.definition.opportunity_type,
                now,
            );
            self.tracker.note_presented(
                &candidate.definition.id,
                candidate.definition.opportunity_type,
            );
        }

        self.cache = Some(CachedSelection {
            day,
            phase,
            generation: self.generation,
            candidates: candidates.clone(),
        });
        candidates
    }

    /// Uncached generation: block checks, budget, eligibility, scoring,
    /// and top-N selection.
    fn build_selection(&self, context: &OpportunityContext) -> Vec<OpportunityCandidate> {
        // Hard blocks: settling in, or the whole camp is at muster
        if context.player.in_enlistment_grace {
            tracing::debug!("enlistment grace period; no opportunities");
            return Vec::new();
        }
        if context.camp.is_muster_day {
            tracing::debug!("muster day; no opportunities");
            return Vec::new();
        }

        let budget = self.compute_budget(context);
        if budget == 0 {
            return Vec::new();
        }

        let now = context.clock.total_hours();
        let mut candidates: Vec<OpportunityCandidate> = self
            .definitions
            .iter()
            .filter(|def| self.is_eligible(def, context))
            .map(|def| {
                let history_modifier =
                    self.history
                        .modifier(def, now, &self.config.history, self.tracker.as_ref());
                let score = self.scorer.score(def, context, history_modifier);
                OpportunityCandidate::new(def.clone(), score)
            })
            .filter(|candidate| candidate.fitness_score >= self.config.score_threshold)
            .collect();

        candidates.sort_by(|a, b| {
            b.fitness_score
                .total_cmp(&a.fitness_score)
                .then_with(|| a.definition.id.cmp(&b.definition.id))
        });
        candidates.truncate(budget as usize);

        for candidate in &mut candidates {
            candidate.is_scheduled = self.commitments.contains(&candidate.definition.id);
        }
        candidates
    }

    /// The integer opportunity budget for this phase.
    ///
    /// Table lookup, then modifiers in order: probation, low supplies,
    /// the survival-mode override, the on-duty halving, and the final
    /// clamp.
    pub fn compute_budget(&self, context: &OpportunityContext) -> u32 {
        let mut budget = self
            .config
            .budget
            .base(context.world.lord_situation, context.world.day_phase)
            as i32;

        if context.player.on_probation {
            budget -= 1;
        }
        if context.camp.supplies < LOW_SUPPLY_BUDGET_THRESHOLD {
            budget -= 1;
        }
        if context.camp.supplies < CRITICAL_SUPPLY_BUDGET_THRESHOLD {
            // Survival mode: exactly one modest option, whatever came before
            budget = 1;
        }
        if context.player.on_duty && budget > 0 {
            budget = (budget / 2).max(1);
        }

        budget.clamp(0, self.config.budget.max_per_phase as i32) as u32
    }

    /// Eligibility filter over a single definition.
    fn is_eligible(&self, def: &OpportunityDefinition, context: &OpportunityContext) -> bool {
        if !def.tier_range.contains(context.player.tier) {
            return false;
        }
        if let Some(last) = self.history.last_presented_id(&def.id) {
            let age = context.clock.total_hours().saturating_sub(last);
            if age < def.cooldown_hours {
                return false;
            }
        }
        if !def.valid_in_phase(context.world.day_phase) {
            return false;
        }
        let afloat = context.world.travel_mode == camp_events::TravelMode::Sea;
        if afloat && !def.allowed_at_sea {
            return false;
        }
        if !afloat && !def.allowed_on_land {
            return false;
        }
        if context.player.on_duty
            && def.compatibility_for(context.player.current_order.as_deref())
                == camp_events::OrderCompatibility::Blocked
        {
            return false;
        }
        if def.opportunity_type == OpportunityType::Training && context.player.is_injured {
            return false;
        }
        if def.opportunity_type == OpportunityType::Economic
            && def.has_tag("gambling")
            && context.player.gold < GAMBLING_MIN_GOLD
        {
            return false;
        }
        if def.has_tag("baggage") && !context.player.baggage_window_open {
            return false;
        }
        if let Some(flag) = &def.requires_flag {
            if !context.active_flags.contains(flag) {
                return false;
            }
        }
        if let Some(flag) = &def.blocked_by_flag {
            if context.active_flags.contains(flag) {
                return false;
            }
        }
        true
    }

    /// Commits the player to an opportunity at its effective future slot.
    pub fn commit_to_opportunity(
        &mut self,
        opportunity_id: &str,
        context: &OpportunityContext,
    ) -> Result<ScheduledCommitment, GeneratorError> {
        let def = self
            .definitions
            .iter()
            .find(|d| d.id == opportunity_id)
            .ok_or_else(|| GeneratorError::UnknownOpportunity(opportunity_id.to_string()))?
            .clone();

        let (scheduled_day, scheduled_phase) = effective_schedule(&def, context.clock);
        let commitment = ScheduledCommitment {
            opportunity_id: def.id.clone(),
            target_decision_id: def.decision_id.clone(),
            title: def.title.clone(),
            scheduled_phase,
            scheduled_day,
            commit_time_hours: context.clock.total_hours(),
            display_text: def.description.clone(),
        };

        self.commitments.add(commitment.clone());
        self.history.record_engaged(&def.id, def.opportunity_type);
        self.tracker.note_engaged(&def.id, def.opportunity_type);
        self.invalidate();

        tracing::debug!(
            opportunity = %def.id,
            day = scheduled_day,
            phase = %scheduled_phase,
            "commitment scheduled"
        );
        Ok(commitment)
    }

    /// Cancels a commitment, returning the restlessness penalty when one
    /// was actually removed.
    pub fn cancel_commitment(&mut self, opportunity_id: &str) -> Option<CancelPenalty> {
        let removed = self.commitments.cancel(opportunity_id)?;
        if let Some(def) = self.definitions.iter().find(|d| d.id == removed.opportunity_id) {
            self.history.record_ignored(&def.id, def.opportunity_type);
        }
        self.invalidate();
        Some(CancelPenalty {
            fatigue_cost: self.config.cancel_fatigue_cost,
        })
    }

    /// Hourly boundary check: fires due commitments into delivered
    /// events, exactly once each.
    pub fn hourly_tick(&mut self, clock: CampClock) -> Vec<DeliveredEvent> {
        let fired = self.commitments.fire_due(clock);
        if fired.is_empty() {
            return Vec::new();
        }
        self.invalidate();
        fired
            .into_iter()
            .map(|c| DeliveredEvent {
                decision_id: c.target_decision_id,
                title: c.title,
                text: c.display_text,
                source_opportunity: Some(c.opportunity_id),
            })
            .collect()
    }

    /// Rolls the risk of performing an opportunity right now.
    pub fn attempt_risky_opportunity<R: Rng>(
        &self,
        opportunity_id: &str,
        context: &OpportunityContext,
        rng: &mut R,
    ) -> Result<RiskOutcome, GeneratorError> {
        let def = self
            .definitions
            .iter()
            .find(|d| d.id == opportunity_id)
            .ok_or_else(|| GeneratorError::UnknownOpportunity(opportunity_id.to_string()))?;
        Ok(detection::attempt_risky(def, context, rng))
    }

    /// Lightweight commitment notes for the schedule manager.
    pub fn commitment_notes(&self) -> Vec<CommitmentNote> {
        self.commitments.notes()
    }

    /// Active commitments.
    pub fn commitments(&self) -> &[ScheduledCommitment] {
        self.commitments.active()
    }

    /// The adaptive history, for persistence.
    pub fn history(&self) -> &OpportunityHistory {
        &self.history
    }

    /// Restores persisted history.
    pub fn restore_history(&mut self, history: OpportunityHistory) {
        self.history = history;
        self.invalidate();
    }

    /// Exports commitments for persistence.
    pub fn commitments_snapshot(&self) -> Vec<ScheduledCommitment> {
        self.commitments.snapshot()
    }

    /// Restores persisted commitments.
    pub fn restore_commitments(&mut self, commitments: Vec<ScheduledCommitment>) {
        self.commitments.restore(commitments);
        self.invalidate();
    }
}

/// The effective future slot for a commitment.
///
/// A fixed scheduled hour lands at that hour's phase, today if the phase
/// has not started yet, tomorrow otherwise. Phase-restricted
/// opportunities land at the soonest valid phase; unrestricted ones at
/// the next phase boundary.
fn effective_schedule(def: &OpportunityDefinition, clock: CampClock) -> (u32, DayPhase) {
    if let Some(hour) = def.scheduled_hour {
        let phase = DayPhase::of_hour(hour);
        let day = if phase.start_hour() > clock.hour {
            clock.day
        } else {
            clock.day + 1
        };
        return (day, phase);
    }

    if !def.valid_phases.is_empty() {
        let soonest = def
            .valid_phases
            .iter()
            .map(|phase| next_phase_start(clock, *phase))
            .min_by_key(CampClock::total_hours)
            .expect("valid_phases is non-empty");
        return (soonest.day, soonest.phase());
    }

    let next = next_phase_start(clock, clock.phase().next());
    (next.day, next.phase())
}

/// The next clock reading at which `target` begins.
fn next_phase_start(clock: CampClock, target: DayPhase) -> CampClock {
    let mut candidate = clock;
    loop {
        candidate.advance_hour();
        if candidate.phase() == target && candidate.hour == target.start_hour() {
            return candidate;
        }
    }
}
