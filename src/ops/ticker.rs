//! Impact metrics ticker
//!
//! Each tick flips two independent weighted coins: one for bumping the
//! impact counters, one for surfacing a notification.

use crate::config::TickerConfig;
use crate::data::ImpactMetrics;
use rand::seq::SliceRandom;
use rand::Rng;

/// Messages the ticker picks from
pub const TICKER_MESSAGES: &[&str] = &[
    "New donation received: 500 water purification tablets",
    "Shipment SHP-1042 cleared checkpoint at Dhaka bypass",
    "Volunteer team checked in at Kathmandu hub",
    "Partner WFP confirmed 2 tonnes of rice for Sylhet",
    "Medical kits restocked at Sacramento staging area",
    "Road access restored on Araniko Highway",
    "Cold chain verified for vaccine consignment",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// (people, waste kg, cost) added this tick
    pub bumped: Option<(u64, u64, u64)>,
    pub notification: Option<&'static str>,
}

/// Run one tick against `metrics`
pub fn tick<R: Rng>(metrics: &mut ImpactMetrics, config: &TickerConfig, rng: &mut R) -> TickOutcome {
    let mut outcome = TickOutcome::default();

    if rng.gen_bool(config.metrics_chance) {
        let people = rng.gen_range(10..60);
        let waste = rng.gen_range(5..30);
        let cost = rng.gen_range(100..600);
        metrics.bump(people, waste, cost);
        outcome.bumped = Some((people, waste, cost));
    }

    if rng.gen_bool(config.notification_chance) {
        outcome.notification = TICKER_MESSAGES.choose(rng).copied();
    }

    outcome
}
