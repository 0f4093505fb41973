//! Daily Company Simulation
//!
//! Runs once per simulated day behind a last-processed-day watermark:
//! roster recovery, new conditions, incidents, pressure pulses, and
//! crisis checks, in that order. Short gaps replay day by day; long
//! time-skips collapse into a bulk approximation that trades fidelity
//! for speed.

use rand::rngs::SmallRng;
use rand::Rng;

use camp_events::{
    IncidentSeverity, MessageColor, NeedResource, NewsCategory, NewsEntry, NewsSeverity,
    WorldSituation,
};

use crate::components::{CompanyPressure, CompanyRoster};
use crate::config::SimulationConfig;
use crate::persistence::{keys, load_json, save_json, PersistenceStore};
use crate::sinks::{Externals, NewsSink};
use crate::systems::crisis;
use crate::systems::incidents::{IncidentEngine, IncidentEngineState};
use crate::CoreError;

/// News adapter enforcing the shared per-day cap.
struct CappedNews<'a> {
    inner: &'a mut dyn NewsSink,
    sent: &'a mut usize,
    cap: usize,
}

impl NewsSink for CappedNews<'_> {
    fn push_news(&mut self, entry: NewsEntry) {
        if *self.sent >= self.cap {
            return;
        }
        *self.sent += 1;
        self.inner.push_news(entry);
    }
}

/// Serializable muster-cycle state.
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
struct MusterState {
    days_since_muster: u32,
    mustered_today: bool,
}

/// Serializable watermark state.
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
struct Watermark {
    last_processed_day: u32,
}

/// The once-per-day company simulation.
#[derive(Debug)]
pub struct DailyCompanySim {
    config: SimulationConfig,
    /// Company roster; mutated only here
    pub roster: CompanyRoster,
    /// Pressure counters; mutated only here
    pub pressure: CompanyPressure,
    /// Incident draws and flags
    pub incidents: IncidentEngine,
    last_processed_day: u32,
    days_since_muster: u32,
    mustered_today: bool,
    news_sent_today: usize,
}

impl DailyCompanySim {
    /// Builds the simulation over a roster and incident table.
    pub fn new(
        config: SimulationConfig,
        roster: CompanyRoster,
        incident_definitions: Vec<camp_events::IncidentDefinition>,
    ) -> Self {
        let incidents = IncidentEngine::new(incident_definitions, &config);
        Self {
            config,
            roster,
            pressure: CompanyPressure::new(),
            incidents,
            last_processed_day: 0,
            days_since_muster: 0,
            mustered_today: false,
            news_sent_today: 0,
        }
    }

    /// Days since the company last mustered.
    pub fn days_since_muster(&self) -> u32 {
        self.days_since_muster
    }

    /// True on the day a muster was held.
    pub fn is_muster_day(&self) -> bool {
        self.mustered_today
    }

    /// The most recent day the simulation has processed.
    pub fn last_processed_day(&self) -> u32 {
        self.last_processed_day
    }

    /// A victory steadies the company.
    pub fn note_victory(&mut self) {
        self.pressure.note_victory();
    }

    /// Advances the simulation to `day`.
    ///
    /// Idempotent under duplicate ticks: a day is simulated at most once.
    /// Gaps up to the replay limit run day by day; longer skips collapse
    /// into [`Self::bulk_advance`]. A day that fails is logged and
    /// abandoned; the watermark still advances so the failure cannot
    /// double-apply.
    pub fn daily_tick(
        &mut self,
        day: u32,
        world: &WorldSituation,
        player_tier: u8,
        rng: &mut SmallRng,
        ext: &mut Externals<'_>,
    ) {
        if self.roster.total_soldiers == 0 {
            tracing::debug!(day, "no company to simulate");
            return;
        }
        if day <= self.last_processed_day {
            return;
        }

        let elapsed = if self.last_processed_day == 0 {
            1
        } else {
            day - self.last_processed_day
        };

        if elapsed > self.config.replay_limit_days {
            self.bulk_advance(elapsed, day);
        } else {
            for d in (day + 1 - elapsed)..=day {
                if let Err(e) = self.run_single_day(d, world, player_tier, rng, ext) {
                    tracing::error!(day = d, error = %e, "daily simulation abandoned");
                }
            }
        }

        self.last_processed_day = day;
    }

    /// One full six-phase day.
    fn run_single_day(
        &mut self,
        day: u32,
        world: &WorldSituation,
        player_tier: u8,
        rng: &mut SmallRng,
        ext: &mut Externals<'_>,
    ) -> Result<(), CoreError> {
        self.news_sent_today = 0;
        self.mustered_today = false;

        // Phase 1: consumption. Needs degradation is owned by the external
        // needs manager; this phase only observes.
        let supplies = ext.needs.get(NeedResource::Supplies);
        tracing::debug!(day, supplies, "daily tick");

        // Phase 2: roster recovery
        self.recovery_phase(day, supplies, rng, ext);

        // Phase 3: new conditions
        self.new_conditions_phase(day, world, rng, ext);

        // Phase 4: incidents
        let applied = self.incidents.run_day(supplies, ext.needs, rng);
        for incident in &applied {
            let severity = match incident.severity {
                IncidentSeverity::Minor => NewsSeverity::Info,
                IncidentSeverity::Moderate => NewsSeverity::Notice,
                IncidentSeverity::Serious => NewsSeverity::Warning,
            };
            self.push_news(
                ext,
                NewsEntry::new(day, severity, NewsCategory::Incident, incident.headline.clone()),
            );
            ext.notifications
                .notify(&incident.headline, MessageColor::Neutral);
        }

        // Phase 5: pulse evaluation
        self.pulse_phase(day, ext);

        // Phase 6: pressure arcs and crisis checks, news behind the same
        // daily cap
        let mut capped = CappedNews {
            inner: &mut *ext.news,
            sent: &mut self.news_sent_today,
            cap: self.config.news_per_day_cap,
        };
        crisis::run_checks(
            &self.config,
            &mut self.pressure,
            &self.roster,
            player_tier,
            day,
            &mut capped,
            ext.delivery,
        );

        // End of day bookkeeping
        self.incidents.end_of_day();
        self.advance_muster(1, ext, day);

        if !self.roster.is_consistent() {
            return Err(CoreError::DayFailed {
                day,
                reason: "roster counts diverged".to_string(),
            });
        }
        Ok(())
    }

    /// Per-sick-soldier recovery and death rolls, plus the missing-soldier
    /// grace conversion. Wounded recovery is driven by the external
    /// medicine system.
    fn recovery_phase(
        &mut self,
        day: u32,
        supplies: i32,
        rng: &mut SmallRng,
        ext: &mut Externals<'_>,
    ) {
        let mut recovery = self.config.recovery_chance;
        if supplies > self.config.high_supply_threshold {
            recovery += self.config.supply_recovery_bonus;
        } else if supplies < self.config.low_supply_threshold {
            recovery -= self.config.supply_recovery_penalty;
        }
        let recovery = recovery.clamp(0.0, 1.0);

        let mut death = self.config.death_chance;
        if supplies < self.config.critical_supply_threshold {
            death += self.config.supply_death_penalty;
        }

        let mut recoveries = 0u32;
        let mut deaths = 0u32;
        for _ in 0..self.roster.sick_count {
            let roll: f32 = rng.gen();
            if roll < recovery {
                recoveries += 1;
            } else if roll < recovery + death {
                deaths += 1;
            }
        }
        self.roster.recover_sick(recoveries);
        self.roster.sick_deaths(deaths);

        if recoveries > 0 {
            self.push_news(
                ext,
                NewsEntry::new(
                    day,
                    NewsSeverity::Info,
                    NewsCategory::Health,
                    format!("{} back on their feet from the sick rows.", recoveries),
                ),
            );
        }
        if deaths > 0 {
            self.push_news(
                ext,
                NewsEntry::new(
                    day,
                    NewsSeverity::Warning,
                    NewsCategory::Health,
                    format!("{} lost to fever in the night.", deaths),
                ),
            );
        }

        let confirmed = self
            .roster
            .confirm_desertions(day, self.config.missing_grace_days);
        if confirmed > 0 {
            self.pressure.note_desertions(confirmed);
            self.push_news(
                ext,
                NewsEntry::new(
                    day,
                    NewsSeverity::Notice,
                    NewsCategory::Company,
                    format!("{} now confirmed as deserters.", confirmed),
                ),
            );
        }
    }

    /// Uniform draws for new sickness, injury, and desertion, skipped
    /// entirely for tiny companies.
    fn new_conditions_phase(
        &mut self,
        day: u32,
        world: &WorldSituation,
        rng: &mut SmallRng,
        ext: &mut Externals<'_>,
    ) {
        let total = self.roster.total_soldiers;
        if total <= self.config.min_company_for_conditions {
            return;
        }

        let new_sick = draw_condition(rng, self.config.sickness_rate, total);
        let injury_rate = if world.is_marching {
            self.config.injury_rate * self.config.march_injury_multiplier
        } else {
            self.config.injury_rate
        };
        let new_wounded = draw_condition(rng, injury_rate, total);
        let new_missing = draw_condition(rng, self.config.desertion_rate, total);

        let new_sick = self.roster.add_sick(new_sick);
        self.roster.add_wounded(new_wounded);
        let new_missing = self.roster.add_missing(new_missing, day);

        if new_sick > 0 {
            self.push_news(
                ext,
                NewsEntry::new(
                    day,
                    NewsSeverity::Notice,
                    NewsCategory::Health,
                    format!("{} report sick at morning muster.", new_sick),
                ),
            );
        }
        if new_missing > 0 {
            self.push_news(
                ext,
                NewsEntry::new(
                    day,
                    NewsSeverity::Notice,
                    NewsCategory::Company,
                    format!("{} unaccounted for at roll call.", new_missing),
                ),
            );
        }
    }

    /// Steps the pressure counters and emits the one-shot critical pulse.
    fn pulse_phase(&mut self, day: u32, ext: &mut Externals<'_>) {
        let supplies = ext.needs.get(NeedResource::Supplies);
        let discipline = ext.needs.get(NeedResource::Discipline);

        self.pressure.note_supplies(
            supplies,
            self.config.pressure_supply_threshold,
            self.config.critical_supply_threshold,
        );
        self.pressure
            .note_discipline(discipline, self.config.pressure_discipline_threshold);
        self.pressure
            .note_sickness(self.roster.sick_ratio(), self.config.high_sickness_ratio);

        if supplies < self.config.critical_supply_threshold && !self.pressure.supply_pulse_sent {
            self.pressure.supply_pulse_sent = true;
            ext.notifications.notify(
                "The company is nearly out of supplies.",
                MessageColor::Negative,
            );
            self.push_news(
                ext,
                NewsEntry::new(
                    day,
                    NewsSeverity::Critical,
                    NewsCategory::Supply,
                    "The quartermaster reports the stores nearly empty.",
                ),
            );
        }
    }

    /// Collapses a long time-skip into one approximate step: expected
    /// recoveries and deaths applied in bulk, desertion pressure decayed,
    /// no incidents or news.
    fn bulk_advance(&mut self, days_skipped: u32, day: u32) {
        tracing::info!(days_skipped, "collapsing time-skip into bulk approximation");

        let sick = self.roster.sick_count as f32;
        let recoveries =
            (sick * self.config.recovery_chance * days_skipped as f32).round() as u32;
        let recovered = self.roster.recover_sick(recoveries);
        let remaining = self.roster.sick_count as f32;
        let deaths = (remaining * self.config.death_chance * days_skipped as f32).round() as u32;
        self.roster.sick_deaths(deaths);

        let confirmed = self
            .roster
            .confirm_desertions(day, self.config.missing_grace_days);
        self.pressure.note_desertions(confirmed);
        self.pressure.decay_over_skip(days_skipped);

        self.days_since_muster =
            (self.days_since_muster + days_skipped) % self.config.muster_period_days;
        self.mustered_today = false;

        tracing::debug!(recovered, deaths, confirmed, "bulk approximation applied");
    }

    fn advance_muster(&mut self, days: u32, ext: &mut Externals<'_>, day: u32) {
        self.days_since_muster += days;
        if self.days_since_muster >= self.config.muster_period_days {
            self.days_since_muster = 0;
            self.mustered_today = true;
            self.push_news(
                ext,
                NewsEntry::new(
                    day,
                    NewsSeverity::Notice,
                    NewsCategory::Company,
                    "The company musters for pay and inspection.",
                ),
            );
        }
    }

    /// News emission behind the per-day cap.
    fn push_news(&mut self, ext: &mut Externals<'_>, entry: NewsEntry) {
        if self.news_sent_today >= self.config.news_per_day_cap {
            return;
        }
        self.news_sent_today += 1;
        ext.news.push_news(entry);
    }

    /// Saves roster, pressure, incident state, and the watermark.
    pub fn save(&self, store: &mut dyn PersistenceStore) {
        save_json(store, keys::ROSTER, &self.roster);
        save_json(store, keys::PRESSURE, &self.pressure);
        save_json(store, keys::INCIDENT_STATE, &self.incidents.state());
        save_json(
            store,
            keys::WATERMARK,
            &Watermark {
                last_processed_day: self.last_processed_day,
            },
        );
        save_json(
            store,
            keys::MUSTER,
            &MusterState {
                days_since_muster: self.days_since_muster,
                mustered_today: self.mustered_today,
            },
        );
    }

    /// Restores state saved by [`Self::save`]; absent keys default safely.
    pub fn restore(&mut self, store: &dyn PersistenceStore) {
        self.roster = load_json(store, keys::ROSTER);
        self.pressure = load_json(store, keys::PRESSURE);
        let incident_state: IncidentEngineState = load_json(store, keys::INCIDENT_STATE);
        self.incidents.restore(incident_state);
        let watermark: Watermark = load_json(store, keys::WATERMARK);
        self.last_processed_day = watermark.last_processed_day;
        let muster: MusterState = load_json(store, keys::MUSTER);
        self.days_since_muster = muster.days_since_muster;
        self.mustered_today = muster.mustered_today;
    }
}

/// Uniform draw in `[0, rate * total]` for new daily conditions.
fn draw_condition<R: Rng>(rng: &mut R, rate: f32, total: u32) -> u32 {
    let max = (rate * total as f32).floor() as u32;
    if max == 0 {
        0
    } else {
        rng.gen_range(0..=max)
    }
}
