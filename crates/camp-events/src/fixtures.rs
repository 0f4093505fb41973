//! Sample data fixtures for testing.
//!
//! Ready-made definitions and snapshots for other crates to use.
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // camp-events = { path = "../camp-events", features = ["test-fixtures"] }
//!
//! use camp_events::fixtures;
//!
//! let opportunities = fixtures::sample_opportunities();
//! let incidents = fixtures::sample_incidents();
//! ```

use std::collections::HashMap;

use crate::clock::DayPhase;
use crate::definitions::{
    CaughtConsequences, DetectionSettings, IncidentCategory, IncidentDefinition, IncidentId,
    IncidentSeverity, NeedResource, OpportunityDefinition, OpportunityType, OrderCompatibility,
    TierRange,
};
use crate::snapshot::{CampMood, CampSnapshot, PlayerSnapshot, WorldSituation};

/// Builds a minimal opportunity definition with sensible defaults.
pub fn make_opportunity(id: &str, opportunity_type: OpportunityType) -> OpportunityDefinition {
    OpportunityDefinition {
        id: id.to_string(),
        title: format!("Opportunity {}", id),
        description: format!("Test opportunity {}", id),
        decision_id: format!("dec_{}", id),
        opportunity_type,
        tier_range: TierRange::any(),
        cooldown_hours: 24,
        base_fitness: 50.0,
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

/// Builds a minimal incident definition with weight 1.0 and no effects.
pub fn make_incident(id: &str, category: IncidentCategory) -> IncidentDefinition {
    IncidentDefinition {
        id: IncidentId::new(id),
        category,
        severity: IncidentSeverity::Minor,
        weight: 1.0,
        cooldown_days: None,
        requires_flag: None,
        sets_flag: None,
        effects: HashMap::new(),
        headline: format!("Incident {}", id),
    }
}

/// Returns a varied set of opportunity definitions covering every type,
/// including a gambling-tagged economic opportunity with detection settings
/// and a night-restricted social one.
pub fn sample_opportunities() -> Vec<OpportunityDefinition> {
    let mut sparring = make_opportunity("op_sparring", OpportunityType::Training);
    sparring.title = "Sparring circle".to_string();
    sparring.base_fitness = 55.0;

    let mut fireside = make_opportunity("op_fireside", OpportunityType::Social);
    fireside.title = "Fireside company".to_string();
    fireside.valid_phases = vec![DayPhase::Dusk, DayPhase::Night];
    fireside.allowed_at_sea = true;
    fireside.base_fitness = 50.0;

    let mut dice = make_opportunity("op_dice", OpportunityType::Economic);
    dice.title = "Dice behind the wagons".to_string();
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
    dice.base_fitness = 45.0;

    let mut rest = make_opportunity("op_cot_rest", OpportunityType::Recovery);
    rest.title = "Claim a quiet cot".to_string();
    rest.allowed_at_sea = true;
    rest.base_fitness = 40.0;

    let mut errand = make_opportunity("op_errand", OpportunityType::Special);
    errand.title = "Quartermaster's errand".to_string();
    errand.tier_range = TierRange::new(3, 10);
    errand.base_fitness = 48.0;
    errand.scheduled_hour = Some(12);

    vec![sparring, fireside, dice, rest, errand]
}

/// Returns a small set of incidents: one per category, plus a flag-gated
/// follow-up.
pub fn sample_incidents() -> Vec<IncidentDefinition> {
    let mut rats = make_incident("rats_in_stores", IncidentCategory::Problems);
    rats.severity = IncidentSeverity::Moderate;
    rats.weight = 1.5;
    rats.effects.insert(NeedResource::Supplies, -4);
    rats.sets_flag = Some("vermin_seen".to_string());
    rats.headline = "Rats have gotten into the grain sacks.".to_string();

    let mut song = make_incident("song_by_the_fire", IncidentCategory::Morale);
    song.effects.insert(NeedResource::Morale, 3);
    song.headline = "Someone starts a marching song; half the camp joins in.".to_string();

    let mut cart = make_incident("abandoned_cart", IncidentCategory::Fortune);
    cart.effects.insert(NeedResource::Supplies, 5);
    cart.cooldown_days = Some(6);
    cart.headline = "Foragers find an abandoned cart with sound barrels.".to_string();

    let mut pay_rumor = make_incident("pay_rumor", IncidentCategory::Rumor);
    pay_rumor.effects.insert(NeedResource::Discipline, -2);
    pay_rumor.headline = "A rumor about delayed pay makes the rounds.".to_string();

    let mut cat = make_incident("ratting_cat", IncidentCategory::Fortune);
    cat.requires_flag = Some("vermin_seen".to_string());
    cat.effects.insert(NeedResource::Morale, 2);
    cat.headline = "A stray cat takes up residence near the stores.".to_string();

    vec![rats, song, cart, pay_rumor, cat]
}

/// A quiet garrison world at the given phase.
pub fn sample_world(day_phase: DayPhase) -> WorldSituation {
    WorldSituation::calm(day_phase)
}

/// A comfortable camp snapshot.
pub fn sample_camp() -> CampSnapshot {
    CampSnapshot::comfortable()
}

/// A camp snapshot with the given supply level, mood derived from 50 morale.
pub fn camp_with_supplies(supplies: i32) -> CampSnapshot {
    CampSnapshot {
        supplies,
        mood: CampMood::Steady,
        days_since_muster: 3,
        is_muster_day: false,
    }
}

/// A mid-tier player in good order.
pub fn sample_player() -> PlayerSnapshot {
    PlayerSnapshot::veteran()
}
