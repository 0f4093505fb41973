//! Pressure Arcs and Crisis Checks
//!
//! Converts sustained pressure counters into narrative events. Staged
//! arcs fire at exact low-supply day counts, varied by the player's tier
//! band; sustained crises enqueue decision events for the host's content
//! queue.

use camp_events::{DeliveredEvent, NewsCategory, NewsEntry, NewsSeverity};

use crate::components::{CompanyPressure, CompanyRoster};
use crate::config::SimulationConfig;
use crate::sinks::{EventDeliveryQueue, NewsSink};

/// Tier band used to pick arc variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierBand {
    /// Tier 4 and below
    Green,
    /// Tiers 5-6
    Seasoned,
    /// Tier 7 and above
    Veteran,
}

impl TierBand {
    pub fn of_tier(tier: u8) -> Self {
        match tier {
            0..=4 => TierBand::Green,
            5..=6 => TierBand::Seasoned,
            _ => TierBand::Veteran,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            TierBand::Green => "green",
            TierBand::Seasoned => "seasoned",
            TierBand::Veteran => "veteran",
        }
    }
}

/// Runs the pressure-arc and crisis checks for one simulated day.
///
/// Arc events fire at the exact counter values in `config.arc_days`;
/// because counters step once per day, each stage fires at most once per
/// low-supply episode. Crisis events fire once when their condition is
/// first sustained.
pub fn run_checks(
    config: &SimulationConfig,
    pressure: &mut CompanyPressure,
    roster: &CompanyRoster,
    player_tier: u8,
    day: u32,
    news: &mut dyn NewsSink,
    delivery: &mut dyn EventDeliveryQueue,
) {
    let band = TierBand::of_tier(player_tier);

    // Staged supply arcs at exact day counts
    if config.arc_days.contains(&pressure.days_low_supplies) {
        let stage = pressure.days_low_supplies;
        delivery.queue(DeliveredEvent {
            decision_id: format!("arc_low_supplies_{}_{}", stage, band.suffix()),
            title: "Short rations".to_string(),
            text: format!(
                "The company has been on short rations for {} days.",
                stage
            ),
            source_opportunity: None,
        });
        news.push_news(NewsEntry::new(
            day,
            NewsSeverity::Warning,
            NewsCategory::Supply,
            format!("Day {} on short rations; the grumbling grows.", stage),
        ));
    }

    // Sustained supply crisis
    if pressure.days_critical_supplies == config.crisis_supply_days {
        delivery.queue(DeliveredEvent {
            decision_id: "crisis_supplies".to_string(),
            title: "Empty wagons".to_string(),
            text: "The supply situation has become untenable.".to_string(),
            source_opportunity: None,
        });
        news.push_news(NewsEntry::new(
            day,
            NewsSeverity::Critical,
            NewsCategory::Supply,
            "The wagons are all but empty.",
        ));
    }

    // Sustained sickness crisis, only once losses actually mount
    if pressure.days_high_sickness == config.crisis_sickness_days
        && roster.casualty_rate() > config.crisis_casualty_rate
    {
        delivery.queue(DeliveredEvent {
            decision_id: "crisis_sickness".to_string(),
            title: "Camp fever".to_string(),
            text: "Fever is moving through the tents faster than the surgeon can.".to_string(),
            source_opportunity: None,
        });
        news.push_news(NewsEntry::new(
            day,
            NewsSeverity::Critical,
            NewsCategory::Health,
            "The sick rows grow; the surgeon is out of cots.",
        ));
    }

    // Desertion crisis, guarded so it fires once per episode
    if pressure.recent_desertions >= config.crisis_desertions && !pressure.desertion_crisis_sent {
        pressure.desertion_crisis_sent = true;
        delivery.queue(DeliveredEvent {
            decision_id: "crisis_desertion".to_string(),
            title: "Empty bedrolls".to_string(),
            text: "Too many bedrolls are empty at morning muster.".to_string(),
            source_opportunity: None,
        });
        news.push_news(NewsEntry::new(
            day,
            NewsSeverity::Critical,
            NewsCategory::Company,
            "Desertion is no longer a whisper; it is a count.",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::{CollectingDelivery, RecordingNews};

    fn setup() -> (
        SimulationConfig,
        CompanyPressure,
        CompanyRoster,
        RecordingNews,
        CollectingDelivery,
    ) {
        (
            SimulationConfig::default(),
            CompanyPressure::new(),
            CompanyRoster::new(40),
            RecordingNews::new(),
            CollectingDelivery::new(),
        )
    }

    #[test]
    fn test_tier_bands() {
        assert_eq!(TierBand::of_tier(1), TierBand::Green);
        assert_eq!(TierBand::of_tier(4), TierBand::Green);
        assert_eq!(TierBand::of_tier(5), TierBand::Seasoned);
        assert_eq!(TierBand::of_tier(6), TierBand::Seasoned);
        assert_eq!(TierBand::of_tier(7), TierBand::Veteran);
        assert_eq!(TierBand::of_tier(10), TierBand::Veteran);
    }

    #[test]
    fn test_arc_fires_at_exact_day_counts() {
        let (config, mut pressure, roster, mut sinks, mut delivery) = setup();

        pressure.days_low_supplies = 2;
        run_checks(&config, &mut pressure, &roster, 3, 10, &mut sinks, &mut delivery);
        assert!(delivery.events.is_empty());

        pressure.days_low_supplies = 3;
        run_checks(&config, &mut pressure, &roster, 3, 11, &mut sinks, &mut delivery);
        assert_eq!(delivery.events.len(), 1);
        assert_eq!(delivery.events[0].decision_id, "arc_low_supplies_3_green");

        pressure.days_low_supplies = 4;
        run_checks(&config, &mut pressure, &roster, 3, 12, &mut sinks, &mut delivery);
        assert_eq!(delivery.events.len(), 1);

        pressure.days_low_supplies = 5;
        run_checks(&config, &mut pressure, &roster, 3, 13, &mut sinks, &mut delivery);
        assert_eq!(delivery.events.len(), 2);
        assert_eq!(delivery.events[1].decision_id, "arc_low_supplies_5_green");
    }

    #[test]
    fn test_arc_variant_by_tier_band() {
        let (config, mut pressure, roster, mut sinks, mut delivery) = setup();
        pressure.days_low_supplies = 7;

        run_checks(&config, &mut pressure, &roster, 8, 10, &mut sinks, &mut delivery);
        assert_eq!(delivery.events[0].decision_id, "arc_low_supplies_7_veteran");
    }

    #[test]
    fn test_supply_crisis_fires_once() {
        let (config, mut pressure, roster, mut sinks, mut delivery) = setup();

        pressure.days_critical_supplies = 3;
        run_checks(&config, &mut pressure, &roster, 3, 10, &mut sinks, &mut delivery);
        let count = delivery
            .events
            .iter()
            .filter(|e| e.decision_id == "crisis_supplies")
            .count();
        assert_eq!(count, 1);

        // The next sustained day does not re-fire
        pressure.days_critical_supplies = 4;
        run_checks(&config, &mut pressure, &roster, 3, 11, &mut sinks, &mut delivery);
        let count = delivery
            .events
            .iter()
            .filter(|e| e.decision_id == "crisis_supplies")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_sickness_crisis_requires_casualty_rate() {
        let (config, mut pressure, mut roster, mut sinks, mut delivery) = setup();
        pressure.days_high_sickness = 2;

        // Healthy roster: no crisis despite the counter
        run_checks(&config, &mut pressure, &roster, 3, 10, &mut sinks, &mut delivery);
        assert!(delivery.events.is_empty());

        // A quarter of the company down: crisis
        roster.add_sick(10);
        run_checks(&config, &mut pressure, &roster, 3, 10, &mut sinks, &mut delivery);
        assert_eq!(delivery.events.len(), 1);
        assert_eq!(delivery.events[0].decision_id, "crisis_sickness");
    }

    #[test]
    fn test_desertion_crisis_fires_once_per_episode() {
        let (config, mut pressure, roster, mut sinks, mut delivery) = setup();

        pressure.note_desertions(5);
        run_checks(&config, &mut pressure, &roster, 3, 10, &mut sinks, &mut delivery);
        run_checks(&config, &mut pressure, &roster, 3, 11, &mut sinks, &mut delivery);
        let count = delivery
            .events
            .iter()
            .filter(|e| e.decision_id == "crisis_desertion")
            .count();
        assert_eq!(count, 1);

        // Recovery below threshold re-arms the crisis
        pressure.note_victory();
        pressure.note_victory();
        pressure.note_victory();
        pressure.note_desertions(5);
        run_checks(&config, &mut pressure, &roster, 3, 20, &mut sinks, &mut delivery);
        let count = delivery
            .events
            .iter()
            .filter(|e| e.decision_id == "crisis_desertion")
            .count();
        assert_eq!(count, 2);
    }
}
