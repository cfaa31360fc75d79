//! Transport routes between centers and destinations

use super::{Id, Location, Priority};
use serde::{Deserialize, Serialize};

/// A resource carried along a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLine {
    pub resource_type: String,
    pub quantity: u32,
    pub unit: String,
}

/// Model-generated assessment of a proposed route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInsight {
    /// 0.0 - 1.0
    pub confidence: f32,
    pub advantages: Vec<String>,
    pub risks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: Id,
    pub origin: Location,
    pub destination: Location,
    pub confirmed: bool,
    pub resources: Vec<ResourceLine>,
    pub estimated_hours: f32,
    pub priority: Priority,
    pub insight: Option<RouteInsight>,
}

impl Route {
    pub fn confidence_percent(&self) -> Option<u8> {
        self.insight
            .as_ref()
            .map(|i| (i.confidence.clamp(0.0, 1.0) * 100.0).round() as u8)
    }
}
