//! Risk and Detection
//!
//! Off-duty behavior performed while on duty can be noticed. Detection
//! chance builds from the definition's settings, clamps to [0, 1], and a
//! caught attempt applies the configured consequences, sometimes
//! compromising the held order as well.

use rand::Rng;

use camp_events::{DayPhase, DetectionSettings, OpportunityDefinition};

use crate::scorer::OpportunityContext;

/// Officer reputation above which the high-reputation modifier applies.
const HIGH_REPUTATION_THRESHOLD: i32 = 70;

/// Result of attempting a risky opportunity.
#[derive(Debug, Clone, PartialEq)]
pub enum RiskOutcome {
    /// No risk applied: off duty, or the definition has no detection
    /// settings
    NotRisky,
    /// The attempt went unnoticed
    Undetected,
    /// Caught in the act
    Caught {
        reputation_delta: i32,
        discipline_delta: i32,
        /// The held order was compromised too
        order_compromised: bool,
    },
}

/// Computes the clamped detection chance for the given circumstances.
pub fn detection_chance(
    settings: &DetectionSettings,
    is_night: bool,
    officer_reputation: i32,
) -> f32 {
    let mut chance = settings.base_chance;
    if is_night {
        chance += settings.night_modifier;
    }
    if officer_reputation > HIGH_REPUTATION_THRESHOLD {
        chance += settings.high_rep_modifier;
    }
    chance.clamp(0.0, 1.0)
}

/// Rolls the risk of performing an opportunity in context.
///
/// Risk only applies while on duty; a definition without detection
/// settings always succeeds.
pub fn attempt_risky<R: Rng>(
    definition: &OpportunityDefinition,
    context: &OpportunityContext,
    rng: &mut R,
) -> RiskOutcome {
    if !context.player.on_duty {
        return RiskOutcome::NotRisky;
    }
    let Some(settings) = &definition.detection else {
        return RiskOutcome::NotRisky;
    };

    let is_night = context.world.day_phase == DayPhase::Night;
    let chance = detection_chance(settings, is_night, context.player.officer_reputation);

    if rng.gen::<f32>() >= chance {
        return RiskOutcome::Undetected;
    }

    let order_compromised = definition.caught.order_failure_risk > 0.0
        && rng.gen::<f32>() < definition.caught.order_failure_risk;

    RiskOutcome::Caught {
        reputation_delta: definition.caught.reputation_delta,
        discipline_delta: definition.caught.discipline_delta,
        order_compromised,
    }
}
