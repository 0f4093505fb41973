//! Snapshot Types
//!
//! Read-only context records describing the world, the camp, and the
//! player at a moment in time. Producers poll these together at the top
//! of a tick; consumers never mutate them.

use serde::{Deserialize, Serialize};

use crate::clock::DayPhase;

/// What the lord's party is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LordSituation {
    /// Garrisoned in peacetime; the calmest posture
    PeacetimeGarrison,
    /// Riding a patrol circuit near friendly territory
    Patrolling,
    /// On campaign, moving with purpose
    Campaigning,
    /// Pressing a siege
    SiegeAttacker,
    /// Holding walls under siege
    SiegeDefender,
    /// Driving the column hard to make distance
    ForcedMarch,
    /// Battle expected within the day
    BattleImminent,
}

impl LordSituation {
    /// Returns true for either siege stance.
    pub fn is_siege(self) -> bool {
        matches!(self, LordSituation::SiegeAttacker | LordSituation::SiegeDefender)
    }
}

/// How much is being asked of the company right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedActivity {
    Calm,
    #[default]
    Routine,
    Intense,
}

/// Whether the party currently travels over land or water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    #[default]
    Land,
    Sea,
}

/// Read-only snapshot of the wider world, polled from the situation provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldSituation {
    /// Current day phase
    pub day_phase: DayPhase,
    /// What the lord's party is doing
    pub lord_situation: LordSituation,
    /// Demand level on the company
    pub expected_activity: ExpectedActivity,
    /// Land or sea travel
    #[serde(default)]
    pub travel_mode: TravelMode,
    /// True while the column is actively on the move
    #[serde(default)]
    pub is_marching: bool,
}

impl WorldSituation {
    /// A quiet garrison morning; the usual baseline for tests.
    pub fn calm(day_phase: DayPhase) -> Self {
        Self {
            day_phase,
            lord_situation: LordSituation::PeacetimeGarrison,
            expected_activity: ExpectedActivity::Calm,
            travel_mode: TravelMode::Land,
            is_marching: false,
        }
    }
}

/// Overall mood of the camp, derived from company morale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampMood {
    Grim,
    Uneasy,
    Steady,
    Lively,
}

impl CampMood {
    /// Derives the mood from a 0-100 morale value.
    pub fn from_morale(morale: i32) -> Self {
        match morale {
            i32::MIN..=24 => CampMood::Grim,
            25..=44 => CampMood::Uneasy,
            45..=69 => CampMood::Steady,
            _ => CampMood::Lively,
        }
    }
}

/// Read-only snapshot of camp conditions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CampSnapshot {
    /// Supply level, 0-100
    pub supplies: i32,
    /// Derived camp mood
    pub mood: CampMood,
    /// Days since the company last mustered for pay and inspection
    pub days_since_muster: u32,
    /// True on the muster day itself
    #[serde(default)]
    pub is_muster_day: bool,
}

impl CampSnapshot {
    /// A well-supplied camp in steady spirits.
    pub fn comfortable() -> Self {
        Self {
            supplies: 80,
            mood: CampMood::Steady,
            days_since_muster: 3,
            is_muster_day: false,
        }
    }
}

/// Read-only snapshot of the player's condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Service tier
    pub tier: u8,
    /// Stamina reserve, 0 (spent) to 10 (fresh)
    pub fatigue: f32,
    /// Pocket gold
    pub gold: i32,
    /// Carrying an untreated injury
    #[serde(default)]
    pub is_injured: bool,
    /// Currently holding an order
    #[serde(default)]
    pub on_duty: bool,
    /// Name of the held order, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_order: Option<String>,
    /// Under disciplinary probation
    #[serde(default)]
    pub on_probation: bool,
    /// Within the new-enlistment grace period
    #[serde(default)]
    pub in_enlistment_grace: bool,
    /// The baggage train is accessible right now
    #[serde(default)]
    pub baggage_window_open: bool,
    /// Standing with the officers, 0-100
    pub officer_reputation: i32,
    /// Learned preference signal: -1.0 (combat-leaning) to 1.0 (social-leaning)
    #[serde(default)]
    pub combat_social_preference: f32,
}

impl PlayerSnapshot {
    /// A mid-tier soldier in good order.
    pub fn veteran() -> Self {
        Self {
            tier: 5,
            fatigue: 8.0,
            gold: 120,
            is_injured: false,
            on_duty: false,
            current_order: None,
            on_probation: false,
            in_enlistment_grace: false,
            baggage_window_open: false,
            officer_reputation: 50,
            combat_social_preference: 0.0,
        }
    }
}
