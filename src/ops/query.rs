//! Filter, search and sort projections behind the list views

use crate::data::*;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// Case-insensitive substring match across several fields.
/// An empty needle matches everything.
pub fn matches_search(needle: &str, fields: &[&str]) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InventorySort {
    #[default]
    Item,
    Quantity,
    Received,
}

impl InventorySort {
    pub fn next(self) -> Self {
        match self {
            InventorySort::Item => InventorySort::Quantity,
            InventorySort::Quantity => InventorySort::Received,
            InventorySort::Received => InventorySort::Item,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InventorySort::Item => "item",
            InventorySort::Quantity => "quantity",
            InventorySort::Received => "received",
        }
    }
}

/// View-local state of the inventory table
#[derive(Debug, Clone, Default)]
pub struct InventoryQuery {
    pub search: String,
    pub category: Option<String>,
    pub condition: Option<ItemCondition>,
    pub sort: InventorySort,
    pub direction: SortDirection,
}

impl InventoryQuery {
    /// Clicking the active sort column flips direction; another column
    /// becomes active ascending.
    pub fn sort_by(&mut self, sort: InventorySort) {
        if self.sort == sort {
            self.direction = self.direction.toggle();
        } else {
            self.sort = sort;
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn apply<'a>(&self, items: &'a [InventoryItem]) -> Vec<&'a InventoryItem> {
        let mut rows: Vec<&InventoryItem> = items
            .iter()
            .filter(|i| matches_search(&self.search, &[&i.item, &i.category, &i.partner]))
            .filter(|i| self.category.as_ref().map_or(true, |c| &i.category == c))
            .filter(|i| self.condition.map_or(true, |c| i.condition == c))
            .collect();

        rows.sort_by(|a, b| {
            let ord = match self.sort {
                InventorySort::Item => a.item.to_lowercase().cmp(&b.item.to_lowercase()),
                InventorySort::Quantity => a.quantity.cmp(&b.quantity),
                InventorySort::Received => a.received.cmp(&b.received),
            };
            self.direction.apply(ord)
        });
        rows
    }
}

/// View-local state of the alerts panel
#[derive(Debug, Clone, Default)]
pub struct AlertQuery {
    pub search: String,
    pub urgency: Option<AlertUrgency>,
    pub status: Option<AlertStatus>,
}

impl AlertQuery {
    /// Matching alerts, urgent first then newest first
    pub fn apply<'a>(&self, alerts: &'a [Alert]) -> Vec<&'a Alert> {
        let mut rows: Vec<&Alert> = alerts
            .iter()
            .filter(|a| matches_search(&self.search, &[&a.message]))
            .filter(|a| self.urgency.map_or(true, |u| a.urgency == u))
            .filter(|a| self.status.map_or(true, |s| a.status == s))
            .collect();
        rows.sort_by(|a, b| {
            let rank = |x: &Alert| (x.urgency != AlertUrgency::Urgent, x.status);
            rank(a)
                .cmp(&rank(b))
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        });
        rows
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShipmentQuery {
    pub search: String,
    pub status: Option<ShipmentStatus>,
    pub direction: SortDirection,
}

impl ShipmentQuery {
    /// Matching shipments ordered by ETA
    pub fn apply<'a>(&self, shipments: &'a [Shipment]) -> Vec<&'a Shipment> {
        let mut rows: Vec<&Shipment> = shipments
            .iter()
            .filter(|s| matches_search(&self.search, &[s.id.as_str(), &s.origin, &s.destination]))
            .filter(|s| self.status.map_or(true, |st| s.status == st))
            .collect();
        rows.sort_by(|a, b| self.direction.apply(a.eta.cmp(&b.eta)));
        rows
    }
}

#[derive(Debug, Clone, Default)]
pub struct DisasterQuery {
    pub search: String,
    pub disaster_type: Option<DisasterType>,
    pub severity: Option<Severity>,
}

impl DisasterQuery {
    /// Matching disasters, most severe first
    pub fn apply<'a>(&self, disasters: &'a [Disaster]) -> Vec<&'a Disaster> {
        let mut rows: Vec<&Disaster> = disasters
            .iter()
            .filter(|d| matches_search(&self.search, &[&d.name, &d.location.name]))
            .filter(|d| self.disaster_type.map_or(true, |t| d.disaster_type == t))
            .filter(|d| self.severity.map_or(true, |s| d.severity == s))
            .collect();
        rows.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| b.timestamp.cmp(&a.timestamp)));
        rows
    }
}

/// Cycle an optional filter through `values`, passing through `None`
pub fn cycle_filter<T: Copy + PartialEq>(current: Option<T>, values: &[T]) -> Option<T> {
    match current {
        None => values.first().copied(),
        Some(v) => {
            let pos = values.iter().position(|x| *x == v)?;
            values.get(pos + 1).copied()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::fixtures::Fixtures;

    #[test]
    fn search_is_case_insensitive_and_multi_field() {
        assert!(matches_search("", &["anything"]));
        assert!(matches_search("  WHO ", &["Trauma kits", "Medical", "who"]));
        assert!(!matches_search("tents", &["Trauma kits", "Medical"]));
    }

    #[test]
    fn inventory_filters_and_sorts() {
        let f = Fixtures::standard();
        let items = &f.centers[0].inventory;

        let mut q = InventoryQuery {
            sort: InventorySort::Quantity,
            ..Default::default()
        };
        let rows = q.apply(items);
        let quantities: Vec<u32> = rows.iter().map(|i| i.quantity).collect();
        let mut sorted = quantities.clone();
        sorted.sort();
        assert_eq!(quantities, sorted);

        q.sort_by(InventorySort::Quantity);
        assert_eq!(q.direction, SortDirection::Descending);
        assert_eq!(q.apply(items)[0].quantity, *sorted.last().unwrap());

        q.search = "unicef".to_string();
        let rows = q.apply(items);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item, "Purification tablets");

        q.search.clear();
        q.condition = Some(ItemCondition::New);
        assert!(q.apply(items).iter().all(|i| i.condition == ItemCondition::New));

        q.sort_by(InventorySort::Item);
        assert_eq!(q.direction, SortDirection::Ascending);
    }

    #[test]
    fn alerts_put_urgent_active_first() {
        let f = Fixtures::standard();
        let rows = AlertQuery::default().apply(&f.alerts);
        assert_eq!(rows[0].urgency, AlertUrgency::Urgent);
        assert_eq!(rows.last().map(|a| a.urgency), Some(AlertUrgency::Info));

        let q = AlertQuery {
            status: Some(AlertStatus::AwaitingResolution),
            ..Default::default()
        };
        assert_eq!(q.apply(&f.alerts).len(), 1);
    }

    #[test]
    fn shipments_filter_by_status_and_search() {
        let f = Fixtures::standard();
        let q = ShipmentQuery {
            status: Some(ShipmentStatus::Delayed),
            ..Default::default()
        };
        let rows = q.apply(&f.shipments);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id.as_str(), "SHP-1043");

        let q = ShipmentQuery {
            search: "sylhet".to_string(),
            ..Default::default()
        };
        assert_eq!(q.apply(&f.shipments).len(), 1);

        let all = ShipmentQuery::default().apply(&f.shipments);
        assert!(all.windows(2).all(|w| w[0].eta <= w[1].eta));
    }

    #[test]
    fn disasters_most_severe_first() {
        let f = Fixtures::standard();
        let rows = DisasterQuery::default().apply(&f.disasters);
        assert_eq!(rows[0].severity, Severity::Critical);

        let q = DisasterQuery {
            search: "bangladesh".to_string(),
            ..Default::default()
        };
        assert_eq!(q.apply(&f.disasters)[0].id.as_str(), "DIS-002");
    }

    #[test]
    fn cycle_filter_wraps_through_none() {
        let values = [ShipmentStatus::Loading, ShipmentStatus::Delayed];
        let a = cycle_filter(None, &values);
        assert_eq!(a, Some(ShipmentStatus::Loading));
        let b = cycle_filter(a, &values);
        assert_eq!(b, Some(ShipmentStatus::Delayed));
        assert_eq!(cycle_filter(b, &values), None);
    }
}
