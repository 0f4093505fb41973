//! News and Delivery Types
//!
//! Structured records the core pushes outward: camp-feed news entries,
//! one-line colored notifications, and decision events delivered when a
//! commitment fires.

use serde::{Deserialize, Serialize};

/// Severity of a news entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsSeverity {
    Info,
    Notice,
    Warning,
    Critical,
}

/// Broad grouping for news filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsCategory {
    Company,
    Health,
    Discipline,
    Supply,
    Incident,
    Routine,
}

/// A structured entry for the camp news feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsEntry {
    /// Day the entry was produced
    pub day: u32,
    pub severity: NewsSeverity,
    pub category: NewsCategory,
    pub text: String,
}

impl NewsEntry {
    pub fn new(
        day: u32,
        severity: NewsSeverity,
        category: NewsCategory,
        text: impl Into<String>,
    ) -> Self {
        Self {
            day,
            severity,
            category,
            text: text.into(),
        }
    }
}

/// Color hint for single-line notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageColor {
    #[default]
    Neutral,
    Positive,
    Negative,
    Highlight,
}

/// A decision event handed to the external delivery queue.
///
/// Produced exactly once per fired commitment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveredEvent {
    /// Target decision the host should present
    pub decision_id: String,
    /// Title carried over from the commitment
    pub title: String,
    /// Display text carried over from the commitment
    pub text: String,
    /// Opportunity that produced this event, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_opportunity: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(NewsSeverity::Info < NewsSeverity::Notice);
        assert!(NewsSeverity::Warning < NewsSeverity::Critical);
    }

    #[test]
    fn test_news_entry_roundtrip() {
        let entry = NewsEntry::new(
            4,
            NewsSeverity::Warning,
            NewsCategory::Supply,
            "Rations are running thin.",
        );
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: NewsEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_severity_serialization() {
        assert_eq!(
            serde_json::to_string(&NewsSeverity::Critical).unwrap(),
            r#""critical""#
        );
    }

    #[test]
    fn test_delivered_event_optional_source() {
        let json = r#"{"decision_id": "dec_dice", "title": "Dice", "text": "The game is on."}"#;
        let event: DeliveredEvent = serde_json::from_str(json).unwrap();
        assert!(event.source_opportunity.is_none());
    }
}
