//! Configuration loading for the camp simulation.
//!
//! All tunable rates, schedules, and outcome tables load from TOML.
//! Partial files work: every section and field has a literal default, so
//! a missing key never fails a load.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use camp_events::{ActivityCategory, DayPhase};

use crate::outcome::OutcomeQuality;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading a config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error parsing TOML
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Complete camp configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CampConfig {
    /// Daily simulation rates and thresholds
    pub simulation: SimulationConfig,
    /// Baseline activity plan and modifiers
    pub schedule: ScheduleConfig,
    /// Routine outcome tables
    pub outcome: OutcomeConfig,
}

impl CampConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Rates and thresholds for the daily company simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Daily chance-of-new-sickness rate, as a fraction of the company
    pub sickness_rate: f32,
    /// Daily injury rate
    pub injury_rate: f32,
    /// Daily desertion rate
    pub desertion_rate: f32,
    /// Per-sick-soldier daily recovery chance
    pub recovery_chance: f32,
    /// Per-sick-soldier daily death chance
    pub death_chance: f32,
    /// Recovery bonus when supplies are plentiful
    pub supply_recovery_bonus: f32,
    /// Recovery penalty when supplies run low
    pub supply_recovery_penalty: f32,
    /// Death-chance penalty when supplies are critical
    pub supply_death_penalty: f32,
    /// Supplies above this improve recovery
    pub high_supply_threshold: i32,
    /// Supplies below this hurt recovery and halve problem incidents
    pub low_supply_threshold: i32,
    /// Supplies below this add to the death chance and trigger the pulse
    pub critical_supply_threshold: i32,
    /// Supplies below this start the low-supply pressure counter
    pub pressure_supply_threshold: i32,
    /// Discipline below this starts the low-discipline counter
    pub pressure_discipline_threshold: i32,
    /// Sick ratio above this starts the high-sickness counter
    pub high_sickness_ratio: f32,
    /// Days a soldier stays missing before the desertion is confirmed
    pub missing_grace_days: u32,
    /// Injury-rate multiplier while the column is marching
    pub march_injury_multiplier: f32,
    /// Companies at or below this size skip new-condition draws
    pub min_company_for_conditions: u32,
    /// Fewest incidents drawn per day
    pub incidents_per_day_min: u32,
    /// Most incidents drawn per day
    pub incidents_per_day_max: u32,
    /// Cooldown for incidents that do not set their own
    pub default_incident_cooldown_days: u32,
    /// Weight factor for problem incidents while supplies are already low
    pub problems_weight_factor: f32,
    /// Time-skips longer than this collapse into the bulk approximation
    pub replay_limit_days: u32,
    /// Most news entries pushed per simulated day
    pub news_per_day_cap: usize,
    /// Days between company musters
    pub muster_period_days: u32,
    /// Pressure-arc stages fire at these exact low-supply day counts
    pub arc_days: Vec<u32>,
    /// Critical-supply days required for a supply crisis
    pub crisis_supply_days: u32,
    /// High-sickness days required for a sickness crisis
    pub crisis_sickness_days: u32,
    /// Casualty rate required alongside sustained sickness
    pub crisis_casualty_rate: f32,
    /// Recent desertions required for a desertion crisis
    pub crisis_desertions: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sickness_rate: 0.03,
            injury_rate: 0.02,
            desertion_rate: 0.01,
            recovery_chance: 0.15,
            death_chance: 0.02,
            supply_recovery_bonus: 0.05,
            supply_recovery_penalty: 0.10,
            supply_death_penalty: 0.02,
            high_supply_threshold: 70,
            low_supply_threshold: 30,
            critical_supply_threshold: 20,
            pressure_supply_threshold: 40,
            pressure_discipline_threshold: 40,
            high_sickness_ratio: 0.15,
            missing_grace_days: 3,
            march_injury_multiplier: 1.3,
            min_company_for_conditions: 5,
            incidents_per_day_min: 0,
            incidents_per_day_max: 2,
            default_incident_cooldown_days: 4,
            problems_weight_factor: 0.5,
            replay_limit_days: 7,
            news_per_day_cap: 5,
            muster_period_days: 12,
            arc_days: vec![3, 5, 7],
            crisis_supply_days: 3,
            crisis_sickness_days: 2,
            crisis_casualty_rate: 0.2,
            crisis_desertions: 5,
        }
    }
}

/// One baseline activity slot in the schedule config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotConfig {
    pub category: ActivityCategory,
    pub description: String,
    pub weight: f32,
}

impl SlotConfig {
    fn new(category: ActivityCategory, description: &str, weight: f32) -> Self {
        Self {
            category,
            description: description.to_string(),
            weight,
        }
    }
}

/// Baseline plan for one day phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhasePlan {
    pub slots: [SlotConfig; 2],
}

/// Baseline schedule and its modifier knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Baseline two-slot plan per phase
    pub baseline: HashMap<DayPhase, PhasePlan>,
    /// Per-category weight multipliers; exactly 0 marks the slot skipped
    pub activity_multipliers: HashMap<ActivityCategory, f32>,
    /// Boost applied to categories favored by the lord's situation
    pub situation_boost: f32,
    /// Flavor lines per phase, rotated by day
    pub flavor: HashMap<DayPhase, Vec<String>>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        let mut baseline = HashMap::new();
        baseline.insert(
            DayPhase::Dawn,
            PhasePlan {
                slots: [
                    SlotConfig::new(ActivityCategory::Drill, "Morning drill", 1.0),
                    SlotConfig::new(ActivityCategory::Labor, "Camp chores", 0.6),
                ],
            },
        );
        baseline.insert(
            DayPhase::Midday,
            PhasePlan {
                slots: [
                    SlotConfig::new(ActivityCategory::Labor, "Working parties", 1.0),
                    SlotConfig::new(ActivityCategory::Foraging, "Foraging detail", 0.8),
                ],
            },
        );
        baseline.insert(
            DayPhase::Dusk,
            PhasePlan {
                slots: [
                    SlotConfig::new(ActivityCategory::Leisure, "Evening fires", 1.0),
                    SlotConfig::new(ActivityCategory::Watch, "First watch", 0.6),
                ],
            },
        );
        baseline.insert(
            DayPhase::Night,
            PhasePlan {
                slots: [
                    SlotConfig::new(ActivityCategory::Rest, "Lights out", 1.0),
                    SlotConfig::new(ActivityCategory::Watch, "Night pickets", 0.4),
                ],
            },
        );

        let mut flavor = HashMap::new();
        flavor.insert(
            DayPhase::Dawn,
            vec![
                "The camp stirs before the sun clears the hills.".to_string(),
                "Sergeants are already shouting somewhere.".to_string(),
            ],
        );
        flavor.insert(
            DayPhase::Midday,
            vec![
                "The day's work settles into its rhythm.".to_string(),
                "Dust and hammering from the wagon lines.".to_string(),
            ],
        );
        flavor.insert(
            DayPhase::Dusk,
            vec![
                "Cookfires are lit down the company street.".to_string(),
                "The day's duties wind down with the light.".to_string(),
            ],
        );
        flavor.insert(
            DayPhase::Night,
            vec![
                "The camp quiets under the pickets' slow rounds.".to_string(),
                "Low voices at the fires, then silence.".to_string(),
            ],
        );

        Self {
            baseline,
            activity_multipliers: HashMap::new(),
            situation_boost: 1.3,
            flavor,
        }
    }
}

/// Weighted quality buckets for outcome rolls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityWeights {
    pub excellent: f32,
    pub good: f32,
    pub normal: f32,
    pub poor: f32,
    pub mishap: f32,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            excellent: 10.0,
            good: 25.0,
            normal: 45.0,
            poor: 15.0,
            mishap: 5.0,
        }
    }
}

impl QualityWeights {
    /// Weights in quality order: excellent, good, normal, poor, mishap.
    pub fn as_array(&self) -> [f32; 5] {
        [self.excellent, self.good, self.normal, self.poor, self.mishap]
    }
}

/// An inclusive integer range drawn per outcome quality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityRange {
    pub min: i32,
    pub max: i32,
}

impl QualityRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }
}

/// Outcome parameters for one activity category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityOutcomeConfig {
    /// Skill credited with the XP, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    /// XP draw bounds before the quality multiplier
    pub xp_min: u32,
    pub xp_max: u32,
    /// Rest delta; negative costs rest, multiplied 1.5x on a mishap
    pub fatigue_delta: f32,
    /// Chance of a gold gain on any non-mishap outcome
    pub gold_chance: f32,
    pub gold_min: i32,
    pub gold_max: i32,
    /// Chance of a gold loss on a mishap
    pub gold_loss_chance: f32,
    pub gold_loss_min: i32,
    pub gold_loss_max: i32,
    /// Supply delta range per quality
    pub supply_delta: HashMap<OutcomeQuality, QualityRange>,
    /// Morale delta range per quality
    pub morale_delta: HashMap<OutcomeQuality, QualityRange>,
    /// Chance a mishap leaves a lingering condition
    pub mishap_chance: f32,
    /// Condition applied when the mishap roll lands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mishap_condition: Option<String>,
    /// Flavor lines per quality while on land
    pub flavor_land: HashMap<OutcomeQuality, Vec<String>>,
    /// Flavor lines per quality while at sea
    pub flavor_sea: HashMap<OutcomeQuality, Vec<String>>,
}

impl Default for ActivityOutcomeConfig {
    fn default() -> Self {
        Self {
            skill: None,
            xp_min: 0,
            xp_max: 0,
            fatigue_delta: 0.0,
            gold_chance: 0.0,
            gold_min: 0,
            gold_max: 0,
            gold_loss_chance: 0.0,
            gold_loss_min: 0,
            gold_loss_max: 0,
            supply_delta: HashMap::new(),
            morale_delta: HashMap::new(),
            mishap_chance: 0.0,
            mishap_condition: None,
            flavor_land: HashMap::new(),
            flavor_sea: HashMap::new(),
        }
    }
}

impl ActivityOutcomeConfig {
    /// A cautious stand-in for categories missing from configuration:
    /// a little XP, no money, no lasting harm.
    pub fn conservative() -> Self {
        Self {
            skill: Some("soldiering".to_string()),
            xp_min: 3,
            xp_max: 8,
            fatigue_delta: -0.5,
            mishap_chance: 0.0,
            ..Self::default()
        }
    }
}

/// Routine outcome tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeConfig {
    /// Per-category outcome parameters
    pub activities: HashMap<ActivityCategory, ActivityOutcomeConfig>,
    /// Named quality-weight sets: "default", "fatigued", "low_morale"
    pub weight_sets: HashMap<String, QualityWeights>,
    /// Rest below this selects the "fatigued" weight set
    pub fatigued_rest_threshold: i32,
    /// Morale below this selects the "low_morale" weight set
    pub low_morale_threshold: i32,
}

impl Default for OutcomeConfig {
    fn default() -> Self {
        let mut activities = HashMap::new();

        let mut drill = ActivityOutcomeConfig {
            skill: Some("weapon_practice".to_string()),
            xp_min: 10,
            xp_max: 25,
            fatigue_delta: -1.0,
            mishap_chance: 0.3,
            mishap_condition: Some("training_strain".to_string()),
            ..ActivityOutcomeConfig::default()
        };
        drill
            .morale_delta
            .insert(OutcomeQuality::Excellent, QualityRange::new(1, 2));
        drill
            .flavor_land
            .insert(OutcomeQuality::Excellent, vec![
                "The drill sergeant has no corrections to offer. A first.".to_string(),
            ]);
        drill.flavor_land.insert(OutcomeQuality::Mishap, vec![
            "A practice blade turns; someone limps off the field.".to_string(),
        ]);
        activities.insert(ActivityCategory::Drill, drill);

        let mut labor = ActivityOutcomeConfig {
            skill: Some("athletics".to_string()),
            xp_min: 5,
            xp_max: 15,
            fatigue_delta: -1.5,
            gold_chance: 0.2,
            gold_min: 2,
            gold_max: 6,
            ..ActivityOutcomeConfig::default()
        };
        labor
            .supply_delta
            .insert(OutcomeQuality::Excellent, QualityRange::new(1, 2));
        activities.insert(ActivityCategory::Labor, labor);

        let mut foraging = ActivityOutcomeConfig {
            skill: Some("scouting".to_string()),
            xp_min: 8,
            xp_max: 18,
            fatigue_delta: -1.0,
            gold_chance: 0.1,
            gold_min: 1,
            gold_max: 4,
            mishap_chance: 0.2,
            mishap_condition: Some("twisted_ankle".to_string()),
            ..ActivityOutcomeConfig::default()
        };
        foraging
            .supply_delta
            .insert(OutcomeQuality::Excellent, QualityRange::new(3, 6));
        foraging
            .supply_delta
            .insert(OutcomeQuality::Good, QualityRange::new(2, 4));
        foraging
            .supply_delta
            .insert(OutcomeQuality::Normal, QualityRange::new(1, 2));
        foraging
            .supply_delta
            .insert(OutcomeQuality::Mishap, QualityRange::new(-2, 0));
        foraging.flavor_sea.insert(OutcomeQuality::Normal, vec![
            "Lines over the rail bring in a modest catch.".to_string(),
        ]);
        activities.insert(ActivityCategory::Foraging, foraging);

        let watch = ActivityOutcomeConfig {
            skill: Some("vigilance".to_string()),
            xp_min: 5,
            xp_max: 12,
            fatigue_delta: -1.0,
            ..ActivityOutcomeConfig::default()
        };
        activities.insert(ActivityCategory::Watch, watch);

        let mut rest = ActivityOutcomeConfig {
            fatigue_delta: 8.0,
            ..ActivityOutcomeConfig::default()
        };
        rest.morale_delta
            .insert(OutcomeQuality::Excellent, QualityRange::new(1, 1));
        rest.flavor_land.insert(OutcomeQuality::Excellent, vec![
            "A full night's sleep, undisturbed. Rare enough to mention.".to_string(),
        ]);
        activities.insert(ActivityCategory::Rest, rest);

        let mut leisure = ActivityOutcomeConfig {
            skill: Some("charm".to_string()),
            xp_min: 4,
            xp_max: 10,
            fatigue_delta: 1.0,
            gold_loss_chance: 0.25,
            gold_loss_min: 2,
            gold_loss_max: 8,
            ..ActivityOutcomeConfig::default()
        };
        leisure
            .morale_delta
            .insert(OutcomeQuality::Excellent, QualityRange::new(2, 3));
        leisure
            .morale_delta
            .insert(OutcomeQuality::Good, QualityRange::new(1, 2));
        leisure
            .morale_delta
            .insert(OutcomeQuality::Mishap, QualityRange::new(-2, -1));
        activities.insert(ActivityCategory::Leisure, leisure);

        let mut weight_sets = HashMap::new();
        weight_sets.insert("default".to_string(), QualityWeights::default());
        weight_sets.insert(
            "fatigued".to_string(),
            QualityWeights {
                excellent: 4.0,
                good: 16.0,
                normal: 40.0,
                poor: 28.0,
                mishap: 12.0,
            },
        );
        weight_sets.insert(
            "low_morale".to_string(),
            QualityWeights {
                excellent: 5.0,
                good: 18.0,
                normal: 42.0,
                poor: 24.0,
                mishap: 11.0,
            },
        );

        Self {
            activities,
            weight_sets,
            fatigued_rest_threshold: 30,
            low_morale_threshold: 30,
        }
    }
}

impl ScheduleConfig {
    /// Loads a schedule config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

impl OutcomeConfig {
    /// Loads an outcome config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
