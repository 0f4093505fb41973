//! Definition Repository
//!
//! Loads opportunity, incident, schedule, and outcome definitions from
//! configuration files. Missing or malformed files degrade to the
//! built-in defaults below, logged as warnings, never fatal.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use camp_events::{
    CaughtConsequences, DayPhase, DetectionSettings, IncidentCategory, IncidentDefinition,
    IncidentId, IncidentSeverity, NeedResource, OpportunityDefinition, OpportunityType,
    OrderCompatibility, TierRange,
};

use crate::config::{OutcomeConfig, ScheduleConfig};

/// Source of immutable content definitions.
///
/// Consumed, never owned, by the core; implementations decide where the
/// data actually lives.
pub trait DefinitionRepository {
    fn load_opportunities(&self) -> Vec<OpportunityDefinition>;
    fn load_incidents(&self) -> Vec<IncidentDefinition>;
    fn load_schedule_config(&self) -> ScheduleConfig;
    fn load_outcome_config(&self) -> OutcomeConfig;
}

/// Repository backed entirely by the built-in default tables.
#[derive(Debug, Clone, Default)]
pub struct BuiltinRepository;

impl DefinitionRepository for BuiltinRepository {
    fn load_opportunities(&self) -> Vec<OpportunityDefinition> {
        default_opportunities()
    }

    fn load_incidents(&self) -> Vec<IncidentDefinition> {
        default_incidents()
    }

    fn load_schedule_config(&self) -> ScheduleConfig {
        ScheduleConfig::default()
    }

    fn load_outcome_config(&self) -> OutcomeConfig {
        OutcomeConfig::default()
    }
}

/// On-disk TOML file listing opportunity definitions.
#[derive(Debug, Serialize, Deserialize)]
struct OpportunitiesFile {
    #[serde(default)]
    opportunity: Vec<OpportunityDefinition>,
}

/// On-disk TOML file listing incident definitions.
#[derive(Debug, Serialize, Deserialize)]
struct IncidentsFile {
    #[serde(default)]
    incident: Vec<IncidentDefinition>,
}

/// Repository reading TOML files from a directory, with per-file fallback
/// to the built-in defaults.
///
/// Expected files: `opportunities.toml`, `incidents.toml`,
/// `schedule.toml`, `outcomes.toml`.
#[derive(Debug, Clone)]
pub struct TomlRepository {
    dir: PathBuf,
}

impl TomlRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read_toml<T: serde::de::DeserializeOwned>(&self, file: &str) -> Option<T> {
        let path = self.dir.join(file);
        if !path.exists() {
            tracing::warn!("{} not found, using built-in defaults", path.display());
            return None;
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    tracing::warn!(
                        "{} is malformed ({}), using built-in defaults",
                        path.display(),
                        e
                    );
                    None
                }
            },
            Err(e) => {
                tracing::warn!(
                    "could not read {} ({}), using built-in defaults",
                    path.display(),
                    e
                );
                None
            }
        }
    }
}

impl DefinitionRepository for TomlRepository {
    fn load_opportunities(&self) -> Vec<OpportunityDefinition> {
        self.read_toml::<OpportunitiesFile>("opportunities.toml")
            .map(|f| f.opportunity)
            .filter(|defs| !defs.is_empty())
            .unwrap_or_else(default_opportunities)
    }

    fn load_incidents(&self) -> Vec<IncidentDefinition> {
        self.read_toml::<IncidentsFile>("incidents.toml")
            .map(|f| f.incident)
            .filter(|defs| !defs.is_empty())
            .unwrap_or_else(default_incidents)
    }

    fn load_schedule_config(&self) -> ScheduleConfig {
        self.read_toml("schedule.toml").unwrap_or_default()
    }

    fn load_outcome_config(&self) -> OutcomeConfig {
        self.read_toml("outcomes.toml").unwrap_or_default()
    }
}

fn opportunity(
    id: &str,
    title: &str,
    description: &str,
    opportunity_type: OpportunityType,
    base_fitness: f32,
    cooldown_hours: u64,
) -> OpportunityDefinition {
    OpportunityDefinition {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        decision_id: format!("dec_{}", id.trim_start_matches("op_")),
        opportunity_type,
        tier_range: TierRange::any(),
        cooldown_hours,
        base_fitness,
        valid_phases: Vec::new(),
        allowed_at_sea: false,
        allowed_on_land: true,
        order_compatibility: HashMap::new(),
        default_compatibility: OrderCompatibility::Free,
        detection: None,
        caught: CaughtConsequences::default(),
        requires_flag: None,
        blocked_by_flag: None,
        tags: Vec::new(),
        scheduled_hour: None,
    }
}

/// The minimal built-in opportunity table used when no content pack loads.
pub fn default_opportunities() -> Vec<OpportunityDefinition> {
    let mut sparring = opportunity(
        "op_sparring",
        "Sparring circle",
        "Veterans trade practice blows behind the armory wagon.",
        OpportunityType::Training,
        55.0,
        18,
    );
    sparring.valid_phases = vec![DayPhase::Dawn, DayPhase::Midday];

    let mut archery = opportunity(
        "op_archery_butts",
        "Hour at the butts",
        "The archery butts stand free for anyone who wants the practice.",
        OpportunityType::Training,
        50.0,
        24,
    );
    archery.valid_phases = vec![DayPhase::Midday];

    let mut fireside = opportunity(
        "op_fireside",
        "Fireside company",
        "There is room at the fire and a story half-told.",
        OpportunityType::Social,
        50.0,
        12,
    );
    fireside.valid_phases = vec![DayPhase::Dusk, DayPhase::Night];
    fireside.allowed_at_sea = true;

    let mut dice = opportunity(
        "op_dice",
        "Dice behind the wagons",
        "A quiet circle, a pair of dice, and money changing hands.",
        OpportunityType::Economic,
        45.0,
        24,
    );
    dice.tags = vec!["gambling".to_string()];
    dice.default_compatibility = OrderCompatibility::Risky;
    dice.detection = Some(DetectionSettings {
        base_chance: 0.2,
        night_modifier: 0.1,
        high_rep_modifier: 0.15,
    });
    dice.caught = CaughtConsequences {
        reputation_delta: -5,
        discipline_delta: -3,
        order_failure_risk: 0.25,
    };

    let mut peddler = opportunity(
        "op_peddler",
        "Camp peddler's stall",
        "A peddler has set up near the horse lines with odds and ends.",
        OpportunityType::Economic,
        42.0,
        36,
    );
    peddler.valid_phases = vec![DayPhase::Midday, DayPhase::Dusk];

    let mut cot_rest = opportunity(
        "op_cot_rest",
        "Claim a quiet cot",
        "The surgeon's tent has a spare cot and nobody asking questions.",
        OpportunityType::Recovery,
        40.0,
        12,
    );
    cot_rest.allowed_at_sea = true;

    let mut springs = opportunity(
        "op_cold_spring",
        "Wash at the spring",
        "A cold spring a short walk from the pickets. It helps more than it sounds.",
        OpportunityType::Recovery,
        38.0,
        24,
    );
    springs.valid_phases = vec![DayPhase::Dawn, DayPhase::Midday];

    let mut errand = opportunity(
        "op_qm_errand",
        "Quartermaster's errand",
        "The quartermaster wants a discreet pair of hands for an hour.",
        OpportunityType::Special,
        48.0,
        48,
    );
    errand.tier_range = TierRange::new(3, 10);
    errand.scheduled_hour = Some(12);

    vec![
        sparring, archery, fireside, dice, peddler, cot_rest, springs, errand,
    ]
}

fn incident(
    id: &str,
    category: IncidentCategory,
    severity: IncidentSeverity,
    weight: f32,
    headline: &str,
) -> IncidentDefinition {
    IncidentDefinition {
        id: IncidentId::new(id),
        category,
        severity,
        weight,
        cooldown_days: None,
        requires_flag: None,
        sets_flag: None,
        effects: HashMap::new(),
        headline: headline.to_string(),
    }
}

/// The minimal built-in incident table used when no content pack loads.
pub fn default_incidents() -> Vec<IncidentDefinition> {
    let mut rats = incident(
        "rats_in_stores",
        IncidentCategory::Problems,
        IncidentSeverity::Moderate,
        1.5,
        "Rats have gotten into the grain sacks.",
    );
    rats.effects.insert(NeedResource::Supplies, -4);
    rats.sets_flag = Some("vermin_seen".to_string());

    let mut wagon = incident(
        "broken_axle",
        IncidentCategory::Problems,
        IncidentSeverity::Minor,
        1.0,
        "A supply wagon cracks an axle on the picket line.",
    );
    wagon.effects.insert(NeedResource::Supplies, -2);

    let mut quarrel = incident(
        "mess_quarrel",
        IncidentCategory::Problems,
        IncidentSeverity::Minor,
        1.0,
        "A quarrel over mess portions nearly comes to blows.",
    );
    quarrel.effects.insert(NeedResource::Discipline, -3);
    quarrel.cooldown_days = Some(3);

    let mut song = incident(
        "song_by_the_fire",
        IncidentCategory::Morale,
        IncidentSeverity::Minor,
        1.2,
        "Someone starts a marching song; half the camp joins in.",
    );
    song.effects.insert(NeedResource::Morale, 3);

    let mut veteran_tale = incident(
        "veteran_tale",
        IncidentCategory::Morale,
        IncidentSeverity::Minor,
        1.0,
        "An old sweat holds the fire circle with a story of the last war.",
    );
    veteran_tale.effects.insert(NeedResource::Morale, 2);

    let mut cart = incident(
        "abandoned_cart",
        IncidentCategory::Fortune,
        IncidentSeverity::Minor,
        0.8,
        "Foragers find an abandoned cart with sound barrels.",
    );
    cart.effects.insert(NeedResource::Supplies, 5);
    cart.cooldown_days = Some(6);

    let mut cat = incident(
        "ratting_cat",
        IncidentCategory::Fortune,
        IncidentSeverity::Minor,
        0.8,
        "A stray cat takes up residence near the stores.",
    );
    cat.requires_flag = Some("vermin_seen".to_string());
    cat.effects.insert(NeedResource::Morale, 2);

    let mut pay_rumor = incident(
        "pay_rumor",
        IncidentCategory::Rumor,
        IncidentSeverity::Minor,
        1.0,
        "A rumor about delayed pay makes the rounds.",
    );
    pay_rumor.effects.insert(NeedResource::Discipline, -2);

    let mut letters = incident(
        "letters_arrive",
        IncidentCategory::Rumor,
        IncidentSeverity::Minor,
        0.9,
        "A courier brings a bundle of letters from home.",
    );
    letters.effects.insert(NeedResource::Morale, 2);

    vec![
        rats,
        wagon,
        quarrel,
        song,
        veteran_tale,
        cart,
        cat,
        pay_rumor,
        letters,
    ]
}
