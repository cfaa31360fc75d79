//! Alerts raised to the operations desk
//!
//! An alert may carry recommendations, each offering a set of actions the
//! operator can take. Alert status only ever moves forward.

use super::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertUrgency {
    Urgent,
    Info,
}

impl std::fmt::Display for AlertUrgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertUrgency::Urgent => write!(f, "URGENT"),
            AlertUrgency::Info => write!(f, "INFO"),
        }
    }
}

/// Alert lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertStatus {
    Active,
    AwaitingResolution,
    Resolved,
}

impl AlertStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::AwaitingResolution => "awaiting_resolution",
            AlertStatus::Resolved => "resolved",
        }
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What an alert is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertLink {
    Disaster(Id),
    Shipment(Id),
    Inventory(Id),
}

/// Actions an operator can take on a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Approve,
    ViewRoute,
    Contact,
    ReportIssue,
}

impl ActionKind {
    /// Wire label used in action dispatch logs
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Approve => "approve",
            ActionKind::ViewRoute => "view_route",
            ActionKind::Contact => "contact",
            ActionKind::ReportIssue => "report_issue",
        }
    }
}

/// A candidate action attached to a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub kind: ActionKind,
    pub label: String,
}

/// A human-reviewable suggestion attached to an alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub summary: String,
    /// Route the recommendation proposes, if any
    pub route: Option<Id>,
    /// Partner to reach for `Contact`
    pub contact: Option<String>,
    pub actions: Vec<RecommendedAction>,
}

impl Recommendation {
    pub fn offers(&self, kind: ActionKind) -> bool {
        self.actions.iter().any(|a| a.kind == kind)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Id,
    pub urgency: AlertUrgency,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub link: Option<AlertLink>,
    pub status: AlertStatus,
    pub recommendations: Vec<Recommendation>,
}

impl Alert {
    /// Move the alert forward to `next`.
    ///
    /// Returns `false` and leaves the alert untouched if `next` is not
    /// strictly later in the lifecycle.
    pub fn advance_to(&mut self, next: AlertStatus) -> bool {
        if next <= self.status {
            return false;
        }
        self.status = next;
        true
    }

    pub fn is_open(&self) -> bool {
        self.status != AlertStatus::Resolved
    }
}
