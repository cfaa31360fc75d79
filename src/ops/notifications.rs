//! Transient notification popups

use chrono::{DateTime, Utc};

pub type NotificationId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub message: String,
    /// Removed by a timer when set; otherwise stays until dismissed
    pub auto_close: bool,
    pub created: DateTime<Utc>,
}

/// Visible notifications in insertion order
#[derive(Debug, Default)]
pub struct NotificationQueue {
    next_id: NotificationId,
    items: Vec<Notification>,
}

impl NotificationQueue {
    pub fn push(&mut self, kind: NotificationKind, message: &str, auto_close: bool) -> NotificationId {
        self.next_id += 1;
        self.items.push(Notification {
            id: self.next_id,
            kind,
            message: message.to_string(),
            auto_close,
            created: Utc::now(),
        });
        self.next_id
    }

    /// Remove a notification; `false` if it was already gone
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }

    pub fn contains(&self, id: NotificationId) -> bool {
        self.items.iter().any(|n| n.id == id)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
