//! Camp Session
//!
//! Wires the four engines together with explicit dependency injection:
//! the daily simulation, the schedule manager, the opportunity
//! generator, and the routine resolver are constructed once and driven
//! by the session's clock. No globals anywhere; everything the engines
//! need is passed in.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use camp_core::persistence::{keys, load_json, save_json, PersistenceStore};
use camp_core::schedule::active_pressure_effects;
use camp_core::sinks::{
    CollectingDelivery, CompanyNeedsStore, EffectSinks, EventDeliveryQueue, Externals,
    InMemoryNeeds, RecordingNews, RecordingNotifications, RecordingSinks,
};
use camp_core::{
    CampConfig, CompanyRoster, DailyCompanySim, DefinitionRepository, RoutineOutcomeResolver,
    ScheduleManager, SimulationConfig, WorldSituationProvider,
};
use camp_events::{
    CampClock, CampMood, CampSnapshot, DayPhase, DeliveredEvent, NeedResource, NewsEntry,
};
use opportunities::{
    OpportunityCandidate, OpportunityConfig, OpportunityContext, OpportunityGenerator, RiskOutcome,
};

/// One running camp-life session.
pub struct CampSession {
    clock: CampClock,
    world_provider: Box<dyn WorldSituationProvider>,
    sim_config: SimulationConfig,
    /// The daily company simulation
    pub sim: DailyCompanySim,
    /// The schedule manager
    pub schedule: ScheduleManager,
    /// The opportunity generator
    pub generator: OpportunityGenerator,
    /// The routine resolver
    pub resolver: RoutineOutcomeResolver,
    /// The company needs ledger
    pub needs: InMemoryNeeds,
    /// Player state owned by the session host
    pub player: camp_events::PlayerSnapshot,
    rng: SmallRng,
    current_plan: Option<camp_events::ScheduledPhase>,
    // Collected outputs, drained by the runner
    effects: RecordingSinks,
    notifications: RecordingNotifications,
    news: RecordingNews,
    delivery: CollectingDelivery,
}

impl CampSession {
    /// Builds a session from configuration and a definition repository.
    pub fn new(
        seed: u64,
        config: CampConfig,
        opportunity_config: OpportunityConfig,
        repository: &dyn DefinitionRepository,
        soldiers: u32,
        player: camp_events::PlayerSnapshot,
        world_provider: Box<dyn WorldSituationProvider>,
    ) -> Self {
        let sim = DailyCompanySim::new(
            config.simulation.clone(),
            CompanyRoster::new(soldiers),
            repository.load_incidents(),
        );
        let schedule = ScheduleManager::new(repository.load_schedule_config());
        let generator =
            OpportunityGenerator::new(opportunity_config, repository.load_opportunities());
        let resolver = RoutineOutcomeResolver::new(repository.load_outcome_config());

        Self {
            clock: CampClock::start(),
            world_provider,
            sim_config: config.simulation,
            sim,
            schedule,
            generator,
            resolver,
            needs: InMemoryNeeds::new(),
            player,
            rng: SmallRng::seed_from_u64(seed),
            current_plan: None,
            effects: RecordingSinks::new(),
            notifications: RecordingNotifications::new(),
            news: RecordingNews::new(),
            delivery: CollectingDelivery::new(),
        }
    }

    /// The session clock.
    pub fn clock(&self) -> CampClock {
        self.clock
    }

    /// The world snapshot with the day phase pinned to the clock.
    fn world(&self) -> camp_events::WorldSituation {
        let mut world = self.world_provider.analyze_situation();
        world.day_phase = self.clock.phase();
        world
    }

    /// The camp snapshot derived from needs and the muster cycle.
    pub fn camp_snapshot(&self) -> CampSnapshot {
        CampSnapshot {
            supplies: self.needs.get(NeedResource::Supplies),
            mood: CampMood::from_morale(self.needs.get(NeedResource::Morale)),
            days_since_muster: self.sim.days_since_muster(),
            is_muster_day: self.sim.is_muster_day(),
        }
    }

    /// The full generation context for the current clock reading.
    pub fn opportunity_context(&self) -> OpportunityContext {
        let mut context = OpportunityContext::new(
            self.clock,
            self.world(),
            self.camp_snapshot(),
            self.player.clone(),
        );
        context.active_flags = self.sim.incidents.flags().iter().cloned().collect();
        if let Some(plan) = &self.current_plan {
            context.scheduled_category = plan.dominant_category();
        }
        context
    }

    /// Advances the session by one hour, running phase-boundary work and
    /// the daily tick when due.
    pub fn advance_hour(&mut self) {
        self.clock.advance_hour();

        if self.clock.is_phase_boundary() {
            self.handle_phase_boundary();
        }

        // The simulated day turns over with the dawn boundary
        if self.clock.hour == DayPhase::Dawn.start_hour() {
            self.daily_tick();
        }
    }

    /// Jumps the clock forward by whole days and delivers a single daily
    /// tick, exercising the replay or bulk-approximation paths.
    pub fn skip_days(&mut self, days: u32) {
        self.clock.advance_days(days);
        self.daily_tick();
        self.current_plan = None;
        self.generator.on_phase_changed();
        self.schedule.invalidate();
    }

    /// Runs the daily simulation for the clock's current day.
    pub fn daily_tick(&mut self) {
        let world = self.world();
        let mut ext = Externals {
            needs: &mut self.needs,
            effects: &mut self.effects,
            notifications: &mut self.notifications,
            news: &mut self.news,
            delivery: &mut self.delivery,
        };
        self.sim
            .daily_tick(self.clock.day, &world, self.player.tier, &mut self.rng, &mut ext);
    }

    /// Phase-boundary sequencing: recompute the schedule, invalidate the
    /// generator, fire due commitments, then resolve the phase that just
    /// ended against its finalized plan.
    fn handle_phase_boundary(&mut self) {
        let ended_plan = self.current_plan.take();
        let world = self.world();

        // Recompute the new phase's plan
        let effects = active_pressure_effects(&self.sim.pressure, &self.needs, &self.sim_config);
        let notes = self.generator.commitment_notes();
        let plan = self.schedule.on_phase_changed(
            self.clock.day,
            self.clock.phase(),
            &world,
            &effects,
            &notes,
        );
        self.current_plan = Some(plan);

        // Fresh opportunities next time anyone asks
        self.generator.on_phase_changed();

        // Fire commitments due at this boundary
        for event in self.generator.hourly_tick(self.clock) {
            self.delivery.queue(event);
        }

        // Resolve the routine of the phase that just ended
        if let Some(plan) = ended_plan {
            let outcomes = self.resolver.resolve_phase(
                &plan,
                world.travel_mode,
                &self.needs,
                &mut self.rng,
                None,
            );
            for outcome in &outcomes {
                let mut ext = Externals {
                    needs: &mut self.needs,
                    effects: &mut self.effects,
                    notifications: &mut self.notifications,
                    news: &mut self.news,
                    delivery: &mut self.delivery,
                };
                self.resolver.apply_outcome(outcome, self.clock.day, &mut ext);
            }
        }
    }

    /// The current phase's offered opportunities.
    pub fn opportunities(&mut self) -> Vec<OpportunityCandidate> {
        let context = self.opportunity_context();
        self.generator.generate_camp_life(&context)
    }

    /// Commits the player to an opportunity and refreshes the schedule.
    pub fn commit(&mut self, opportunity_id: &str) -> Result<(), opportunities::GeneratorError> {
        let context = self.opportunity_context();
        self.generator
            .commit_to_opportunity(opportunity_id, &context)?;
        self.schedule.invalidate();
        self.refresh_current_plan();
        Ok(())
    }

    /// Cancels a commitment, charging the restlessness cost.
    pub fn cancel(&mut self, opportunity_id: &str) -> bool {
        match self.generator.cancel_commitment(opportunity_id) {
            Some(penalty) => {
                self.player.fatigue = (self.player.fatigue - penalty.fatigue_cost).max(0.0);
                self.schedule.invalidate();
                self.refresh_current_plan();
                true
            }
            None => false,
        }
    }

    /// Rolls the risk of acting on an opportunity right now, applying any
    /// caught consequences.
    pub fn attempt_risky(
        &mut self,
        opportunity_id: &str,
    ) -> Result<RiskOutcome, opportunities::GeneratorError> {
        let context = self.opportunity_context();
        let outcome =
            self.generator
                .attempt_risky_opportunity(opportunity_id, &context, &mut self.rng)?;
        if let RiskOutcome::Caught {
            reputation_delta,
            discipline_delta,
            order_compromised,
        } = outcome
        {
            self.effects.apply_reputation(reputation_delta);
            self.needs.modify(NeedResource::Discipline, discipline_delta);
            if order_compromised {
                self.needs.modify(NeedResource::Discipline, discipline_delta);
            }
            self.player.officer_reputation += reputation_delta;
        }
        Ok(outcome)
    }

    fn refresh_current_plan(&mut self) {
        let world = self.world();
        let effects = active_pressure_effects(&self.sim.pressure, &self.needs, &self.sim_config);
        let notes = self.generator.commitment_notes();
        let plan = self.schedule.schedule_for_phase(
            self.clock.day,
            self.clock.phase(),
            &world,
            &effects,
            &notes,
        );
        self.current_plan = Some(plan);
    }

    /// The plan for the phase in progress.
    pub fn current_plan(&mut self) -> camp_events::ScheduledPhase {
        if self.current_plan.is_none() {
            self.refresh_current_plan();
        }
        self.current_plan.clone().expect("plan just refreshed")
    }

    /// Drains collected news entries.
    pub fn drain_news(&mut self) -> Vec<NewsEntry> {
        std::mem::take(&mut self.news.entries)
    }

    /// Drains delivered decision events.
    pub fn drain_delivered(&mut self) -> Vec<DeliveredEvent> {
        std::mem::take(&mut self.delivery.events)
    }

    /// Drains one-line notifications.
    pub fn drain_notifications(&mut self) -> Vec<(String, camp_events::MessageColor)> {
        std::mem::take(&mut self.notifications.lines)
    }

    /// Saves the whole session state into the store.
    pub fn save(&self, store: &mut dyn PersistenceStore) {
        self.sim.save(store);
        save_json(store, keys::HISTORY, self.generator.history());
        save_json(store, keys::COMMITMENTS, &self.generator.commitments_snapshot());
    }

    /// Restores session state; absent keys default safely.
    pub fn restore(&mut self, store: &dyn PersistenceStore) {
        self.sim.restore(store);
        self.generator.restore_history(load_json(store, keys::HISTORY));
        self.generator
            .restore_commitments(load_json(store, keys::COMMITMENTS));
        self.current_plan = None;
    }
}
