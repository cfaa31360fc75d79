//! Operational centers and their inventory

use super::{Id, Location};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Total unit count at or below which a center is flagged critical
pub const CRITICAL_STOCK: u64 = 500;
/// Total unit count at or below which a center is flagged low
pub const LOW_STOCK: u64 = 2_000;

/// Stock level tier for a center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InventoryStatus {
    Adequate,
    Low,
    Critical,
}

impl InventoryStatus {
    pub fn from_total(total: u64) -> Self {
        match total {
            t if t <= CRITICAL_STOCK => InventoryStatus::Critical,
            t if t <= LOW_STOCK => InventoryStatus::Low,
            _ => InventoryStatus::Adequate,
        }
    }
}

impl std::fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InventoryStatus::Adequate => write!(f, "adequate"),
            InventoryStatus::Low => write!(f, "low"),
            InventoryStatus::Critical => write!(f, "critical"),
        }
    }
}

/// Physical condition of stored goods
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemCondition {
    New,
    Good,
    Fair,
    Damaged,
}

impl ItemCondition {
    pub const ALL: [ItemCondition; 4] = [
        ItemCondition::New,
        ItemCondition::Good,
        ItemCondition::Fair,
        ItemCondition::Damaged,
    ];
}

impl std::fmt::Display for ItemCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemCondition::New => write!(f, "new"),
            ItemCondition::Good => write!(f, "good"),
            ItemCondition::Fair => write!(f, "fair"),
            ItemCondition::Damaged => write!(f, "damaged"),
        }
    }
}

/// A stock line held at a center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Id,
    pub category: String,
    pub item: String,
    pub quantity: u32,
    pub partner: String,
    pub received: NaiveDate,
    pub storage: String,
    pub condition: ItemCondition,
}

/// A warehouse or distribution node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationalCenter {
    pub id: Id,
    pub name: String,
    pub location: Location,
    pub status: InventoryStatus,
    pub total_items: u64,
    pub categories: usize,
    pub inventory: Vec<InventoryItem>,
}

impl OperationalCenter {
    pub fn new(id: &str, name: &str, location: Location, inventory: Vec<InventoryItem>) -> Self {
        let mut center = Self {
            id: Id::from(id),
            name: name.to_string(),
            location,
            status: InventoryStatus::Adequate,
            total_items: 0,
            categories: 0,
            inventory,
        };
        center.recompute();
        center
    }

    /// Add a stock line and refresh the aggregates
    pub fn add_item(&mut self, item: InventoryItem) {
        self.inventory.push(item);
        self.recompute();
    }

    fn recompute(&mut self) {
        self.total_items = self.inventory.iter().map(|i| i.quantity as u64).sum();
        self.categories = self
            .inventory
            .iter()
            .map(|i| i.category.as_str())
            .collect::<HashSet<_>>()
            .len();
        self.status = InventoryStatus::from_total(self.total_items);
    }
}
