//! Shipments in motion and their event history

use super::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a shipment is in its journey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipmentStatus {
    Loading,
    InTransit,
    Delayed,
    Delivered,
    Exception,
}

impl ShipmentStatus {
    pub const ALL: [ShipmentStatus; 5] = [
        ShipmentStatus::Loading,
        ShipmentStatus::InTransit,
        ShipmentStatus::Delayed,
        ShipmentStatus::Delivered,
        ShipmentStatus::Exception,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ShipmentStatus::Loading => "loading",
            ShipmentStatus::InTransit => "in_transit",
            ShipmentStatus::Delayed => "delayed",
            ShipmentStatus::Delivered => "delivered",
            ShipmentStatus::Exception => "exception",
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One line of a shipment manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestLine {
    pub item: String,
    pub quantity: u32,
    pub unit: String,
    pub donor: String,
}

/// A timestamped event in a shipment's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentEvent {
    pub timestamp: DateTime<Utc>,
    pub status: ShipmentStatus,
    pub location: String,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: Id,
    pub origin: String,
    pub destination: String,
    pub status: ShipmentStatus,
    pub eta: DateTime<Utc>,
    pub current_location: Option<String>,
    pub manifest: Vec<ManifestLine>,
    /// Newest first
    pub timeline: Vec<ShipmentEvent>,
}

impl Shipment {
    /// Record a new event; it becomes the head of the timeline and sets
    /// the current status.
    pub fn record_event(&mut self, event: ShipmentEvent) {
        self.status = event.status;
        self.current_location = Some(event.location.clone());
        self.timeline.insert(0, event);
    }

    pub fn total_units(&self) -> u64 {
        self.manifest.iter().map(|l| l.quantity as u64).sum()
    }

    pub fn latest_event(&self) -> Option<&ShipmentEvent> {
        self.timeline.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn record_event_prepends_and_updates_status() {
        let now = Utc::now();
        let mut shipment = Shipment {
            id: Id::from("SHP-T"),
            origin: "Hub".to_string(),
            destination: "Camp".to_string(),
            status: ShipmentStatus::Loading,
            eta: now + Duration::hours(5),
            current_location: None,
            manifest: vec![],
            timeline: vec![ShipmentEvent {
                timestamp: now,
                status: ShipmentStatus::Loading,
                location: "Hub".to_string(),
                note: "Loading started".to_string(),
            }],
        };

        shipment.record_event(ShipmentEvent {
            timestamp: now + Duration::minutes(30),
            status: ShipmentStatus::InTransit,
            location: "Highway 9".to_string(),
            note: "Departed".to_string(),
        });

        assert_eq!(shipment.status, ShipmentStatus::InTransit);
        assert_eq!(shipment.timeline.len(), 2);
        assert_eq!(shipment.latest_event().map(|e| e.note.as_str()), Some("Departed"));
        assert_eq!(shipment.current_location.as_deref(), Some("Highway 9"));
    }
}
