//! Outbound Interfaces
//!
//! Traits the simulation talks through: the company needs ledger, effect
//! application, notifications, news, and decision delivery. Host
//! integrations implement these; the in-memory versions here back tests
//! and the headless runner.

use std::collections::HashMap;

use camp_events::{DeliveredEvent, MessageColor, NeedResource, NewsEntry};

/// External ledger of company resources, each clamped to 0-100.
pub trait CompanyNeedsStore {
    fn get(&self, resource: NeedResource) -> i32;
    fn modify(&mut self, resource: NeedResource, delta: i32);
    fn set(&mut self, resource: NeedResource, value: i32);
}

/// One-way effect application into the host's systems.
pub trait EffectSinks {
    /// Credits XP toward a skill.
    fn apply_xp(&mut self, skill: &str, amount: i32);
    /// Adjusts the player's gold.
    fn apply_gold(&mut self, delta: i32);
    /// Applies a lingering condition.
    fn apply_condition(&mut self, condition_id: &str);
    /// Adjusts officer reputation.
    fn apply_reputation(&mut self, delta: i32);
}

/// Single-line colored message emission.
pub trait NotificationSink {
    fn notify(&mut self, text: &str, color: MessageColor);
}

/// Structured news feed.
pub trait NewsSink {
    fn push_news(&mut self, entry: NewsEntry);
}

/// Queue for decision events fired by commitments and crises.
pub trait EventDeliveryQueue {
    fn queue(&mut self, event: DeliveredEvent);
}

/// Bundle of mutable external interfaces handed to a tick.
pub struct Externals<'a> {
    pub needs: &'a mut dyn CompanyNeedsStore,
    pub effects: &'a mut dyn EffectSinks,
    pub notifications: &'a mut dyn NotificationSink,
    pub news: &'a mut dyn NewsSink,
    pub delivery: &'a mut dyn EventDeliveryQueue,
}

/// In-memory needs ledger.
#[derive(Debug, Clone)]
pub struct InMemoryNeeds {
    values: HashMap<NeedResource, i32>,
}

impl InMemoryNeeds {
    /// All resources at a serviceable 70.
    pub fn new() -> Self {
        let mut values = HashMap::new();
        for resource in NeedResource::all() {
            values.insert(*resource, 70);
        }
        Self { values }
    }

    /// Builds a ledger with explicit starting values.
    pub fn with_values(pairs: &[(NeedResource, i32)]) -> Self {
        let mut needs = Self::new();
        for (resource, value) in pairs {
            needs.set(*resource, *value);
        }
        needs
    }
}

impl Default for InMemoryNeeds {
    fn default() -> Self {
        Self::new()
    }
}

impl CompanyNeedsStore for InMemoryNeeds {
    fn get(&self, resource: NeedResource) -> i32 {
        self.values.get(&resource).copied().unwrap_or(0)
    }

    fn modify(&mut self, resource: NeedResource, delta: i32) {
        let value = self.get(resource) + delta;
        self.set(resource, value);
    }

    fn set(&mut self, resource: NeedResource, value: i32) {
        self.values.insert(resource, value.clamp(0, 100));
    }
}

/// Recording effect sink for tests and the headless runner.
#[derive(Debug, Default)]
pub struct RecordingSinks {
    pub xp: Vec<(String, i32)>,
    pub gold: Vec<i32>,
    pub conditions: Vec<String>,
    pub reputation: Vec<i32>,
}

impl RecordingSinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Net gold across all recorded deltas.
    pub fn total_gold(&self) -> i32 {
        self.gold.iter().sum()
    }
}

impl EffectSinks for RecordingSinks {
    fn apply_xp(&mut self, skill: &str, amount: i32) {
        self.xp.push((skill.to_string(), amount));
    }

    fn apply_gold(&mut self, delta: i32) {
        self.gold.push(delta);
    }

    fn apply_condition(&mut self, condition_id: &str) {
        self.conditions.push(condition_id.to_string());
    }

    fn apply_reputation(&mut self, delta: i32) {
        self.reputation.push(delta);
    }
}

/// Recording notification sink.
#[derive(Debug, Default)]
pub struct RecordingNotifications {
    pub lines: Vec<(String, MessageColor)>,
}

impl RecordingNotifications {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationSink for RecordingNotifications {
    fn notify(&mut self, text: &str, color: MessageColor) {
        self.lines.push((text.to_string(), color));
    }
}

/// Recording news sink.
#[derive(Debug, Default)]
pub struct RecordingNews {
    pub entries: Vec<NewsEntry>,
}

impl RecordingNews {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NewsSink for RecordingNews {
    fn push_news(&mut self, entry: NewsEntry) {
        self.entries.push(entry);
    }
}

/// Collecting delivery queue.
#[derive(Debug, Default)]
pub struct CollectingDelivery {
    pub events: Vec<DeliveredEvent>,
}

impl CollectingDelivery {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventDeliveryQueue for CollectingDelivery {
    fn queue(&mut self, event: DeliveredEvent) {
        self.events.push(event);
    }
}
