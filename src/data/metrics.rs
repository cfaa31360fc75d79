//! Aggregate impact counters shown on the dashboard

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetrics {
    pub people_helped: u64,
    pub waste_prevented_kg: u64,
    pub cost_saved: u64,
}

impl ImpactMetrics {
    pub fn bump(&mut self, people: u64, waste_kg: u64, cost: u64) {
        self.people_helped += people;
        self.waste_prevented_kg += waste_kg;
        self.cost_saved += cost;
    }
}
