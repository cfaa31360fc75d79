//! Disasters and the needs raised against them

use super::{Id, Location, Priority, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Disaster categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisasterType {
    Earthquake,
    Flood,
    Hurricane,
    Typhoon,
    Wildfire,
    Drought,
}

impl DisasterType {
    pub const ALL: [DisasterType; 6] = [
        DisasterType::Earthquake,
        DisasterType::Flood,
        DisasterType::Hurricane,
        DisasterType::Typhoon,
        DisasterType::Wildfire,
        DisasterType::Drought,
    ];

    pub fn icon(&self) -> &'static str {
        match self {
            DisasterType::Earthquake => "≋",
            DisasterType::Flood => "≈",
            DisasterType::Hurricane | DisasterType::Typhoon => "@",
            DisasterType::Wildfire => "^",
            DisasterType::Drought => "○",
        }
    }
}

impl std::fmt::Display for DisasterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DisasterType::Earthquake => "Earthquake",
            DisasterType::Flood => "Flood",
            DisasterType::Hurricane => "Hurricane",
            DisasterType::Typhoon => "Typhoon",
            DisasterType::Wildfire => "Wildfire",
            DisasterType::Drought => "Drought",
        };
        f.write_str(name)
    }
}

/// A requested quantity of relief items with its matched progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NeedRecord")]
pub struct Need {
    pub category: String,
    pub item: String,
    pub requested: u32,
    matched: u32,
    pub priority: Priority,
    pub source: String,
}

/// Wire shape of a need; `matched` is clamped on the way in
#[derive(Deserialize)]
struct NeedRecord {
    category: String,
    item: String,
    requested: u32,
    #[serde(default)]
    matched: u32,
    priority: Priority,
    source: String,
}

impl From<NeedRecord> for Need {
    fn from(r: NeedRecord) -> Self {
        Need::new(&r.category, &r.item, r.requested, r.priority, &r.source).with_matched(r.matched)
    }
}

impl Need {
    pub fn new(category: &str, item: &str, requested: u32, priority: Priority, source: &str) -> Self {
        Self {
            category: category.to_string(),
            item: item.to_string(),
            requested,
            matched: 0,
            priority,
            source: source.to_string(),
        }
    }

    /// Builder for fixtures that start partially matched
    pub fn with_matched(mut self, matched: u32) -> Self {
        self.matched = matched.min(self.requested);
        self
    }

    pub fn matched(&self) -> u32 {
        self.matched
    }

    /// Quantity still missing
    pub fn gap(&self) -> u32 {
        self.requested - self.matched
    }

    pub fn is_fully_matched(&self) -> bool {
        self.matched >= self.requested
    }

    /// Increase the matched quantity, never past `requested`.
    ///
    /// Returns the amount actually applied.
    pub fn add_matched(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.gap());
        self.matched += applied;
        applied
    }

    /// Fraction matched in percent
    pub fn percent(&self) -> f64 {
        if self.requested == 0 {
            return 100.0;
        }
        self.matched as f64 / self.requested as f64 * 100.0
    }
}

/// A disaster and the needs it has raised
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disaster {
    pub id: Id,
    pub name: String,
    pub disaster_type: DisasterType,
    pub location: Location,
    pub severity: Severity,
    pub affected_population: u64,
    pub timestamp: DateTime<Utc>,
    pub needs: Vec<Need>,
}

impl Disaster {
    /// Overall match rate across all needs, in percent
    pub fn match_rate(&self) -> f64 {
        let requested: u64 = self.needs.iter().map(|n| n.requested as u64).sum();
        if requested == 0 {
            return 100.0;
        }
        let matched: u64 = self.needs.iter().map(|n| n.matched() as u64).sum();
        matched as f64 / requested as f64 * 100.0
    }

    pub fn unmet_needs(&self) -> impl Iterator<Item = (usize, &Need)> {
        self.needs
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.is_fully_matched())
    }

    pub fn total_requested(&self) -> u64 {
        self.needs.iter().map(|n| n.requested as u64).sum()
    }

    pub fn total_matched(&self) -> u64 {
        self.needs.iter().map(|n| n.matched() as u64).sum()
    }
}
