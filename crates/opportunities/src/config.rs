//! Configuration loading for the opportunity generator.
//!
//! All generator settings are loaded from a TOML configuration file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use camp_events::{DayPhase, LordSituation};

/// Complete generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpportunityConfig {
    /// Budget table and cap
    pub budget: BudgetConfig,
    /// Fitness scoring weights
    pub scoring: ScoringWeights,
    /// History and variety settings
    pub history: HistoryConfig,
    /// Multiplier when an opportunity matches the scheduled activity
    pub schedule_boost: f32,
    /// Minimum fitness score a candidate needs to be offered
    pub score_threshold: f32,
    /// Stamina cost of backing out of a commitment
    pub cancel_fatigue_cost: f32,
}

impl Default for OpportunityConfig {
    fn default() -> Self {
        Self {
            budget: BudgetConfig::default(),
            scoring: ScoringWeights::default(),
            history: HistoryConfig::default(),
            schedule_boost: 1.3,
            score_threshold: 40.0,
            cancel_fatigue_cost: 0.5,
        }
    }
}

impl OpportunityConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::IoError)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::TomlError)
    }
}

/// Per-phase opportunity budgets for one lord situation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseBudgets {
    pub dawn: u32,
    pub midday: u32,
    pub dusk: u32,
    pub night: u32,
}

impl Default for PhaseBudgets {
    fn default() -> Self {
        Self {
            dawn: 2,
            midday: 2,
            dusk: 2,
            night: 1,
        }
    }
}

impl PhaseBudgets {
    pub fn get(&self, phase: DayPhase) -> u32 {
        match phase {
            DayPhase::Dawn => self.dawn,
            DayPhase::Midday => self.midday,
            DayPhase::Dusk => self.dusk,
            DayPhase::Night => self.night,
        }
    }
}

/// The (lord situation x day phase) budget table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Base budgets per lord situation
    pub table: HashMap<LordSituation, PhaseBudgets>,
    /// Hard cap on offered opportunities per phase
    pub max_per_phase: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        let mut table = HashMap::new();
        table.insert(
            LordSituation::PeacetimeGarrison,
            PhaseBudgets {
                dawn: 3,
                midday: 2,
                dusk: 3,
                night: 2,
            },
        );
        table.insert(
            LordSituation::Patrolling,
            PhaseBudgets {
                dawn: 2,
                midday: 2,
                dusk: 2,
                night: 1,
            },
        );
        table.insert(
            LordSituation::Campaigning,
            PhaseBudgets {
                dawn: 2,
                midday: 1,
                dusk: 2,
                night: 1,
            },
        );
        table.insert(
            LordSituation::SiegeAttacker,
            PhaseBudgets {
                dawn: 1,
                midday: 1,
                dusk: 2,
                night: 1,
            },
        );
        table.insert(
            LordSituation::SiegeDefender,
            PhaseBudgets {
                dawn: 1,
                midday: 1,
                dusk: 2,
                night: 1,
            },
        );
        table.insert(
            LordSituation::ForcedMarch,
            PhaseBudgets {
                dawn: 1,
                midday: 0,
                dusk: 1,
                night: 1,
            },
        );
        table.insert(
            LordSituation::BattleImminent,
            PhaseBudgets {
                dawn: 0,
                midday: 0,
                dusk: 1,
                night: 0,
            },
        );
        Self {
            table,
            max_per_phase: 3,
        }
    }
}

impl BudgetConfig {
    /// Base budget before modifiers; unknown situations fall back to the
    /// default per-phase row.
    pub fn base(&self, situation: LordSituation, phase: DayPhase) -> u32 {
        self.table
            .get(&situation)
            .copied()
            .unwrap_or_default()
            .get(phase)
    }
}

/// Additive fitness modifiers layered over a definition's base fitness.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Training bonus in a peacetime garrison
    pub peacetime_training_bonus: f32,
    /// Social penalty during either siege stance
    pub siege_social_penalty: f32,
    /// Recovery bonus when the company is being worked hard
    pub intense_recovery_bonus: f32,
    /// Training bonus at dawn
    pub dawn_training_bonus: f32,
    /// Social bonus at dusk
    pub dusk_social_bonus: f32,
    /// Economic penalty at night
    pub night_economic_penalty: f32,
    /// Social swing with camp mood (added when lively, subtracted when grim)
    pub mood_social_swing: f32,
    /// Recovery bonus when the mood turns grim
    pub mood_recovery_bonus: f32,
    /// Economic bonus as muster day approaches
    pub muster_economic_bonus: f32,
    /// Days since muster at which the muster bonus starts
    pub muster_near_days: u32,
    /// Training penalty when the player is spent
    pub low_fatigue_training_penalty: f32,
    /// Stamina below which the training penalty applies
    pub fatigue_threshold: f32,
    /// Recovery bonus while injured
    pub injured_recovery_bonus: f32,
    /// Economic bonus when gold runs short
    pub low_gold_economic_bonus: f32,
    /// Gold below which the economic bonus applies
    pub low_gold_threshold: i32,
    /// Swing from the learned combat-vs-social preference
    pub preference_swing: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            peacetime_training_bonus: 15.0,
            siege_social_penalty: -20.0,
            intense_recovery_bonus: 25.0,
            dawn_training_bonus: 10.0,
            dusk_social_bonus: 15.0,
            night_economic_penalty: -30.0,
            mood_social_swing: 15.0,
            mood_recovery_bonus: 20.0,
            muster_economic_bonus: 10.0,
            muster_near_days: 9,
            low_fatigue_training_penalty: -25.0,
            fatigue_threshold: 5.0,
            injured_recovery_bonus: 30.0,
            low_gold_economic_bonus: 20.0,
            low_gold_threshold: 50,
            preference_swing: 10.0,
        }
    }
}

/// Recency, novelty, and variety settings for the history modifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Penalty when the type was shown within the strong window
    pub recent_penalty_strong: f32,
    /// Strong recency window in hours
    pub strong_window_hours: u64,
    /// Penalty when the type was shown within the mild window
    pub recent_penalty_mild: f32,
    /// Mild recency window in hours
    pub mild_window_hours: u64,
    /// Blend weight for the external learned-preference delta
    pub learned_weight: f32,
    /// Bonus for types never shown before
    pub novelty_bonus: f32,
    /// Bounded correction that resurfaces disliked types now and then
    pub variety_bonus: f32,
    /// Engagement rate below which the variety correction may fire
    pub variety_engagement_threshold: f32,
    /// Width of the variety gate's time bucket, in hours
    pub time_bucket_hours: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            recent_penalty_strong: -40.0,
            strong_window_hours: 12,
            recent_penalty_mild: -20.0,
            mild_window_hours: 24,
            learned_weight: 0.7,
            novelty_bonus: 8.0,
            variety_bonus: 5.0,
            variety_engagement_threshold: 0.25,
            time_bucket_hours: 12,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file
    IoError(std::io::Error),
    /// Error parsing TOML config
    TomlError(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            ConfigError::TomlError(e) => Some(e),
        }
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Opportunity Generator Configuration

schedule_boost = 1.3
score_threshold = 40.0
cancel_fatigue_cost = 0.5

[budget]
max_per_phase = 3

[budget.table.peacetime_garrison]
dawn = 3
midday = 2
dusk = 3
night = 2

[budget.table.forced_march]
dawn = 1
midday = 0
dusk = 1
night = 1

[scoring]
peacetime_training_bonus = 15.0
siege_social_penalty = -20.0
intense_recovery_bonus = 25.0
dawn_training_bonus = 10.0
dusk_social_bonus = 15.0
night_economic_penalty = -30.0
mood_social_swing = 15.0
mood_recovery_bonus = 20.0
muster_economic_bonus = 10.0
muster_near_days = 9
low_fatigue_training_penalty = -25.0
fatigue_threshold = 5.0
injured_recovery_bonus = 30.0
low_gold_economic_bonus = 20.0
low_gold_threshold = 50
preference_swing = 10.0

[history]
recent_penalty_strong = -40.0
strong_window_hours = 12
recent_penalty_mild = -20.0
mild_window_hours = 24
learned_weight = 0.7
novelty_bonus = 8.0
variety_bonus = 5.0
variety_engagement_threshold = 0.25
time_bucket_hours = 12
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OpportunityConfig::default();
        assert_eq!(config.schedule_boost, 1.3);
        assert_eq!(config.score_threshold, 40.0);
        assert_eq!(config.budget.max_per_phase, 3);
        assert_eq!(config.history.novelty_bonus, 8.0);
    }

    #[test]
    fn test_budget_table_scenario_a() {
        let config = BudgetConfig::default();
        assert_eq!(
            config.base(LordSituation::PeacetimeGarrison, DayPhase::Dawn),
            3
        );
    }

    #[test]
    fn test_budget_unknown_situation_falls_back() {
        let config = BudgetConfig {
            table: HashMap::new(),
            max_per_phase: 3,
        };
        assert_eq!(config.base(LordSituation::Campaigning, DayPhase::Dawn), 2);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
            score_threshold = 55.0

            [scoring]
            dawn_training_bonus = 12.0
        "#;
        let config = OpportunityConfig::from_str(toml).unwrap();
        assert_eq!(config.score_threshold, 55.0);
        assert_eq!(config.scoring.dawn_training_bonus, 12.0);
        // Untouched scoring fields keep defaults
        assert_eq!(config.scoring.injured_recovery_bonus, 30.0);
    }

    #[test]
    fn test_default_config_toml_parses() {
        let toml = default_config_toml();
        let config = OpportunityConfig::from_str(&toml).unwrap();
        assert_eq!(config.schedule_boost, 1.3);
        assert_eq!(config.score_threshold, 40.0);
        assert_eq!(
            config
                .budget
                .base(LordSituation::PeacetimeGarrison, DayPhase::Dawn),
            3
        );
    }

    #[test]
    fn test_config_error_from_bad_toml() {
        let result = OpportunityConfig::from_str("budget = 3");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }
}
