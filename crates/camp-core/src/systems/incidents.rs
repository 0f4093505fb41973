//! Incident Engine
//!
//! Draws a handful of small camp events per day from the eligible
//! definitions, applies their effects, and manages per-incident cooldowns
//! and boolean flags.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use camp_events::{IncidentCategory, IncidentDefinition, IncidentId, IncidentSeverity};

use crate::config::SimulationConfig;
use crate::sinks::CompanyNeedsStore;

/// An incident that fired today, ready for news emission.
#[derive(Debug, Clone)]
pub struct AppliedIncident {
    pub id: IncidentId,
    pub severity: IncidentSeverity,
    pub headline: String,
}

/// Serializable runtime state of the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncidentEngineState {
    #[serde(default)]
    pub cooldowns: HashMap<IncidentId, u32>,
    #[serde(default)]
    pub flags: Vec<String>,
}

/// Draws and applies daily incidents.
#[derive(Debug, Clone)]
pub struct IncidentEngine {
    definitions: Vec<IncidentDefinition>,
    cooldowns: HashMap<IncidentId, u32>,
    flags: HashSet<String>,
    min_per_day: u32,
    max_per_day: u32,
    default_cooldown_days: u32,
    problems_weight_factor: f32,
    low_supply_threshold: i32,
}

impl IncidentEngine {
    /// Creates an engine over the given definitions.
    pub fn new(definitions: Vec<IncidentDefinition>, config: &SimulationConfig) -> Self {
        Self {
            definitions,
            cooldowns: HashMap::new(),
            flags: HashSet::new(),
            min_per_day: config.incidents_per_day_min,
            max_per_day: config.incidents_per_day_max,
            default_cooldown_days: config.default_incident_cooldown_days,
            problems_weight_factor: config.problems_weight_factor,
            low_supply_threshold: config.low_supply_threshold,
        }
    }

    /// Currently set boolean flags.
    pub fn flags(&self) -> &HashSet<String> {
        &self.flags
    }

    /// Sets a flag directly (used by external content hooks).
    pub fn set_flag(&mut self, flag: impl Into<String>) {
        self.flags.insert(flag.into());
    }

    /// Runs one day's incident draws and applies their effects.
    pub fn run_day<R: Rng>(
        &mut self,
        supplies: i32,
        needs: &mut dyn CompanyNeedsStore,
        rng: &mut R,
    ) -> Vec<AppliedIncident> {
        let count = if self.max_per_day > self.min_per_day {
            rng.gen_range(self.min_per_day..=self.max_per_day)
        } else {
            self.min_per_day
        };

        let mut applied = Vec::new();
        let mut used: HashSet<IncidentId> = HashSet::new();

        for _ in 0..count {
            let pool: Vec<(usize, f32)> = self
                .definitions
                .iter()
                .enumerate()
                .filter(|(_, def)| !used.contains(&def.id) && self.is_eligible(def))
                .map(|(i, def)| (i, self.effective_weight(def, supplies)))
                .collect();

            let Some(index) = weighted_pick(rng, &pool) else {
                break;
            };

            let def = self.definitions[index].clone();
            used.insert(def.id.clone());
            self.apply(&def, needs);
            applied.push(AppliedIncident {
                id: def.id.clone(),
                severity: def.severity,
                headline: def.headline.clone(),
            });
        }

        applied
    }

    /// Eligibility: cooldown expired and the required flag (if any) set.
    fn is_eligible(&self, def: &IncidentDefinition) -> bool {
        if self.cooldowns.get(&def.id).copied().unwrap_or(0) > 0 {
            return false;
        }
        match &def.requires_flag {
            Some(flag) => self.flags.contains(flag),
            None => true,
        }
    }

    /// Problem incidents are halved once supplies are already low; piling
    /// on reads as unfair.
    fn effective_weight(&self, def: &IncidentDefinition, supplies: i32) -> f32 {
        let mut weight = def.weight;
        if def.category == IncidentCategory::Problems && supplies < self.low_supply_threshold {
            weight *= self.problems_weight_factor;
        }
        weight
    }

    fn apply(&mut self, def: &IncidentDefinition, needs: &mut dyn CompanyNeedsStore) {
        for (resource, delta) in &def.effects {
            needs.modify(*resource, *delta);
        }
        if let Some(flag) = &def.sets_flag {
            self.flags.insert(flag.clone());
        }
        let cooldown = def.cooldown_days.unwrap_or(self.default_cooldown_days);
        self.cooldowns.insert(def.id.clone(), cooldown);
    }

    /// Decrements every active cooldown by one day.
    pub fn end_of_day(&mut self) {
        for value in self.cooldowns.values_mut() {
            *value = value.saturating_sub(1);
        }
        self.cooldowns.retain(|_, v| *v > 0);
    }

    /// Exports cooldowns and flags for persistence.
    pub fn state(&self) -> IncidentEngineState {
        let mut flags: Vec<String> = self.flags.iter().cloned().collect();
        flags.sort();
        IncidentEngineState {
            cooldowns: self.cooldowns.clone(),
            flags,
        }
    }

    /// Restores cooldowns and flags from persistence.
    pub fn restore(&mut self, state: IncidentEngineState) {
        self.cooldowns = state.cooldowns;
        self.flags = state.flags.into_iter().collect();
    }
}

/// Weighted random selection over (index, weight) pairs.
///
/// Returns None when the pool is empty or all weights are non-positive.
fn weighted_pick<R: Rng>(rng: &mut R, pool: &[(usize, f32)]) -> Option<usize> {
    if pool.is_empty() {
        return None;
    }
    let total_weight: f32 = pool.iter().map(|(_, w)| w.max(0.0)).sum();
    if total_weight <= 0.0 {
        return None;
    }

    let mut roll: f32 = rng.gen::<f32>() * total_weight;
    for (index, weight) in pool {
        roll -= weight.max(0.0);
        if roll <= 0.0 {
            return Some(*index);
        }
    }
    pool.last().map(|(index, _)| *index)
}
