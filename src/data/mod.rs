//! Data structures for the relief operation
//!
//! Defines disasters, centers, shipments, routes, alerts and the shared
//! tiers they are classified by.

pub mod alert;
pub mod center;
pub mod disaster;
pub mod metrics;
pub mod route;
pub mod shipment;

pub use alert::*;
pub use center::*;
pub use disaster::*;
pub use metrics::*;
pub use route::*;
pub use shipment::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity tiers for disasters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Low => "◆",
            Severity::Medium => "▲",
            Severity::High => "●",
            Severity::Critical => "⬤",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "LOW"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::High => write!(f, "HIGH"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Priority tier shared by needs and routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Share of the remaining gap a completed matching step closes, before
    /// the random bonus is added.
    pub fn base_efficiency(&self) -> f64 {
        match self {
            Priority::High => 0.7,
            Priority::Medium => 0.5,
            Priority::Low => 0.3,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// A geographic point with a display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
}

impl Location {
    pub fn new(lat: f64, lng: f64, name: &str) -> Self {
        Self {
            lat,
            lng,
            name: name.to_string(),
        }
    }
}

/// Entity identifier.
///
/// Fixtures use readable codes (`DIS-001`); entities created at runtime
/// get a prefixed code derived from a fresh UUID.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Id(pub String);

impl Id {
    pub fn new(prefix: &str) -> Self {
        let uuid = Uuid::new_v4().simple().to_string();
        Self(format!("{}-{}", prefix, &uuid[..8].to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
