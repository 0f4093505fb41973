//! Persistence Helpers
//!
//! A narrow key/value interface plus JSON load/save helpers. Absent keys
//! always fall back to defaults; a corrupt value is logged and treated as
//! absent rather than surfaced.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

/// Key/value store the host exposes for save games.
pub trait PersistenceStore {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: &str);
}

/// Well-known persistence keys.
pub mod keys {
    pub const ROSTER: &str = "camp.roster";
    pub const PRESSURE: &str = "camp.pressure";
    pub const INCIDENT_STATE: &str = "camp.incident_state";
    pub const WATERMARK: &str = "camp.watermark";
    pub const MUSTER: &str = "camp.muster";
    pub const HISTORY: &str = "camp.opportunity_history";
    pub const COMMITMENTS: &str = "camp.commitments";
}

/// Serializes a value under the given key, logging on failure.
pub fn save_json<T: Serialize>(store: &mut dyn PersistenceStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => store.write(key, &json),
        Err(e) => tracing::warn!("failed to serialize {}: {}", key, e),
    }
}

/// Reads a value by key, defaulting when the key is absent or corrupt.
pub fn load_json<T: DeserializeOwned + Default>(store: &dyn PersistenceStore, key: &str) -> T {
    match store.read(key) {
        Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
            tracing::warn!("discarding corrupt value for {}: {}", key, e);
            T::default()
        }),
        None => T::default(),
    }
}

/// In-memory store for tests and the headless runner.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PersistenceStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::CompanyPressure;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        store.write("key", "value");
        assert_eq!(store.read("key").as_deref(), Some("value"));
        assert_eq!(store.read("other"), None);
    }

    #[test]
    fn test_save_and_load_json() {
        let mut store = MemoryStore::new();
        let mut pressure = CompanyPressure::new();
        pressure.note_desertions(3);

        save_json(&mut store, keys::PRESSURE, &pressure);
        let loaded: CompanyPressure = load_json(&store, keys::PRESSURE);
        assert_eq!(loaded, pressure);
    }

    #[test]
    fn test_load_absent_key_defaults() {
        let store = MemoryStore::new();
        let loaded: CompanyPressure = load_json(&store, keys::PRESSURE);
        assert_eq!(loaded, CompanyPressure::default());
    }

    #[test]
    fn test_load_corrupt_value_defaults() {
        let mut store = MemoryStore::new();
        store.write(keys::PRESSURE, "{not json");
        let loaded: CompanyPressure = load_json(&store, keys::PRESSURE);
        assert_eq!(loaded, CompanyPressure::default());
    }
}
