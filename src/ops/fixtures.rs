//! Static operation data loaded at startup, plus the scripted typhoon
//! that the demo timer injects.

use crate::data::*;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Everything the console starts with
#[derive(Debug, Clone)]
pub struct Fixtures {
    pub disasters: Vec<Disaster>,
    pub centers: Vec<OperationalCenter>,
    pub shipments: Vec<Shipment>,
    pub alerts: Vec<Alert>,
    pub routes: Vec<Route>,
    pub metrics: ImpactMetrics,
}

impl Fixtures {
    /// An empty world, for callers that build their own entities
    pub fn empty() -> Self {
        Self {
            disasters: Vec::new(),
            centers: Vec::new(),
            shipments: Vec::new(),
            alerts: Vec::new(),
            routes: Vec::new(),
            metrics: ImpactMetrics::default(),
        }
    }

    /// The standard operations picture
    pub fn standard() -> Self {
        let now = Utc::now();
        Self {
            disasters: disasters(now),
            centers: centers(),
            shipments: shipments(now),
            alerts: alerts(now),
            routes: routes(),
            metrics: ImpactMetrics {
                people_helped: 12_480,
                waste_prevented_kg: 3_215,
                cost_saved: 184_000,
            },
        }
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

fn stock(
    id: &str,
    category: &str,
    item: &str,
    quantity: u32,
    partner: &str,
    received: NaiveDate,
    storage: &str,
    condition: ItemCondition,
) -> InventoryItem {
    InventoryItem {
        id: Id::from(id),
        category: category.to_string(),
        item: item.to_string(),
        quantity,
        partner: partner.to_string(),
        received,
        storage: storage.to_string(),
        condition,
    }
}

fn disasters(now: DateTime<Utc>) -> Vec<Disaster> {
    vec![
        Disaster {
            id: Id::from("DIS-001"),
            name: "Central Nepal Earthquake".to_string(),
            disaster_type: DisasterType::Earthquake,
            location: Location::new(27.7172, 85.3240, "Kathmandu, Nepal"),
            severity: Severity::Critical,
            affected_population: 850_000,
            timestamp: now - Duration::hours(36),
            needs: vec![
                Need::new("Medical", "Trauma kits", 1_200, Priority::High, "WHO field assessment")
                    .with_matched(420),
                Need::new("Shelter", "Family tents", 5_000, Priority::High, "UNHCR")
                    .with_matched(1_800),
                Need::new("Water", "Purification tablets", 40_000, Priority::Medium, "District office")
                    .with_matched(22_000),
                Need::new("Food", "Ready-to-eat meals", 60_000, Priority::Medium, "WFP")
                    .with_matched(18_500),
                Need::new("Hygiene", "Hygiene kits", 8_000, Priority::Low, "Local NGO")
                    .with_matched(900),
                Need::new("Power", "Solar lanterns", 3_000, Priority::Low, "Field team"),
            ],
        },
        Disaster {
            id: Id::from("DIS-002"),
            name: "Sylhet Monsoon Floods".to_string(),
            disaster_type: DisasterType::Flood,
            location: Location::new(24.8949, 91.8687, "Sylhet, Bangladesh"),
            severity: Severity::High,
            affected_population: 1_200_000,
            timestamp: now - Duration::days(4),
            needs: vec![
                Need::new("Water", "Jerry cans", 15_000, Priority::High, "BDRCS")
                    .with_matched(9_000),
                Need::new("Food", "Rice (kg)", 120_000, Priority::High, "WFP")
                    .with_matched(70_000),
                Need::new("Medical", "ORS sachets", 50_000, Priority::Medium, "UNICEF")
                    .with_matched(31_000),
                Need::new("Shelter", "Tarpaulins", 10_000, Priority::Medium, "IFRC")
                    .with_matched(4_000),
            ],
        },
        Disaster {
            id: Id::from("DIS-003"),
            name: "Sierra Foothills Wildfire".to_string(),
            disaster_type: DisasterType::Wildfire,
            location: Location::new(38.5816, -121.4944, "Sacramento County, USA"),
            severity: Severity::Medium,
            affected_population: 42_000,
            timestamp: now - Duration::hours(12),
            needs: vec![
                Need::new("Medical", "N95 respirators", 20_000, Priority::High, "County EMS")
                    .with_matched(19_000),
                Need::new("Shelter", "Cots", 2_500, Priority::Medium, "Red Cross")
                    .with_matched(2_400),
                Need::new("Food", "Meal kits", 9_000, Priority::Low, "Food bank")
                    .with_matched(8_800),
            ],
        },
    ]
}

fn centers() -> Vec<OperationalCenter> {
    vec![
        OperationalCenter::new(
            "CTR-001",
            "Kathmandu Logistics Hub",
            Location::new(27.6966, 85.3591, "Tribhuvan Airport, Kathmandu"),
            vec![
                stock("INV-101", "Medical", "Trauma kits", 350, "WHO", date(2024, 4, 27), "Bay A1", ItemCondition::New),
                stock("INV-102", "Shelter", "Family tents", 900, "UNHCR", date(2024, 4, 28), "Yard 2", ItemCondition::Good),
                stock("INV-103", "Water", "Purification tablets", 12_000, "UNICEF", date(2024, 4, 26), "Bay B3", ItemCondition::New),
                stock("INV-104", "Food", "Ready-to-eat meals", 6_500, "WFP", date(2024, 4, 29), "Cold room", ItemCondition::Good),
            ],
        ),
        OperationalCenter::new(
            "CTR-002",
            "Dhaka Relief Warehouse",
            Location::new(23.8103, 90.4125, "Tejgaon, Dhaka"),
            vec![
                stock("INV-201", "Food", "Rice (kg)", 1_100, "WFP", date(2024, 6, 18), "Silo 1", ItemCondition::Good),
                stock("INV-202", "Medical", "ORS sachets", 450, "UNICEF", date(2024, 6, 20), "Bay C2", ItemCondition::Fair),
                stock("INV-203", "Shelter", "Tarpaulins", 300, "IFRC", date(2024, 6, 15), "Yard 1", ItemCondition::Damaged),
            ],
        ),
        OperationalCenter::new(
            "CTR-003",
            "Sacramento Staging Area",
            Location::new(38.5556, -121.4689, "Cal Expo, Sacramento"),
            vec![
                stock("INV-301", "Medical", "N95 respirators", 180, "County EMS", date(2024, 8, 2), "Hall 4", ItemCondition::New),
                stock("INV-302", "Shelter", "Cots", 120, "Red Cross", date(2024, 8, 1), "Hall 2", ItemCondition::Good),
            ],
        ),
    ]
}

fn shipments(now: DateTime<Utc>) -> Vec<Shipment> {
    let event = |offset_h: i64, status, location: &str, note: &str| ShipmentEvent {
        timestamp: now - Duration::hours(offset_h),
        status,
        location: location.to_string(),
        note: note.to_string(),
    };
    let line = |item: &str, quantity, unit: &str, donor: &str| ManifestLine {
        item: item.to_string(),
        quantity,
        unit: unit.to_string(),
        donor: donor.to_string(),
    };

    vec![
        Shipment {
            id: Id::from("SHP-1042"),
            origin: "Dhaka Relief Warehouse".to_string(),
            destination: "Sylhet Sadar Camp".to_string(),
            status: ShipmentStatus::InTransit,
            eta: now + Duration::hours(6),
            current_location: Some("Bhairab Bridge".to_string()),
            manifest: vec![
                line("Rice", 20_000, "kg", "WFP"),
                line("Jerry cans", 3_000, "units", "BDRCS"),
            ],
            timeline: vec![
                event(2, ShipmentStatus::InTransit, "Bhairab Bridge", "Checkpoint cleared"),
                event(7, ShipmentStatus::InTransit, "Tejgaon, Dhaka", "Departed warehouse"),
                event(9, ShipmentStatus::Loading, "Tejgaon, Dhaka", "Loading started"),
            ],
        },
        Shipment {
            id: Id::from("SHP-1043"),
            origin: "Kathmandu Logistics Hub".to_string(),
            destination: "Gorkha District Hospital".to_string(),
            status: ShipmentStatus::Delayed,
            eta: now + Duration::hours(14),
            current_location: Some("Prithvi Highway km 48".to_string()),
            manifest: vec![
                line("Trauma kits", 200, "kits", "WHO"),
                line("Family tents", 400, "units", "UNHCR"),
            ],
            timeline: vec![
                event(1, ShipmentStatus::Delayed, "Prithvi Highway km 48", "Landslide blocking road"),
                event(5, ShipmentStatus::InTransit, "Kathmandu", "Departed hub"),
            ],
        },
        Shipment {
            id: Id::from("SHP-1044"),
            origin: "Sacramento Staging Area".to_string(),
            destination: "Placerville Evacuation Center".to_string(),
            status: ShipmentStatus::Delivered,
            eta: now - Duration::hours(3),
            current_location: Some("Placerville".to_string()),
            manifest: vec![line("N95 respirators", 5_000, "units", "County EMS")],
            timeline: vec![
                event(3, ShipmentStatus::Delivered, "Placerville", "Signed for by shelter lead"),
                event(6, ShipmentStatus::InTransit, "Sacramento", "Departed staging area"),
            ],
        },
        Shipment {
            id: Id::from("SHP-1045"),
            origin: "Kathmandu Logistics Hub".to_string(),
            destination: "Sindhupalchok Camp".to_string(),
            status: ShipmentStatus::Loading,
            eta: now + Duration::hours(20),
            current_location: Some("Tribhuvan Airport".to_string()),
            manifest: vec![line("Purification tablets", 8_000, "tablets", "UNICEF")],
            timeline: vec![event(0, ShipmentStatus::Loading, "Tribhuvan Airport", "Loading started")],
        },
    ]
}

fn alerts(now: DateTime<Utc>) -> Vec<Alert> {
    vec![
        Alert {
            id: Id::from("ALT-001"),
            urgency: AlertUrgency::Urgent,
            message: "SHP-1043 delayed by landslide on Prithvi Highway".to_string(),
            timestamp: now - Duration::minutes(50),
            link: Some(AlertLink::Shipment(Id::from("SHP-1043"))),
            status: AlertStatus::Active,
            recommendations: vec![Recommendation {
                summary: "Reroute via Dhading with a 3h longer drive".to_string(),
                route: Some(Id::from("RTE-002")),
                contact: Some("Nepal Army logistics cell".to_string()),
                actions: vec![
                    RecommendedAction { kind: ActionKind::Approve, label: "Approve reroute".to_string() },
                    RecommendedAction { kind: ActionKind::ViewRoute, label: "View route".to_string() },
                    RecommendedAction { kind: ActionKind::ReportIssue, label: "Report issue".to_string() },
                ],
            }],
        },
        Alert {
            id: Id::from("ALT-002"),
            urgency: AlertUrgency::Urgent,
            message: "Dhaka Relief Warehouse below safe stock for tarpaulins".to_string(),
            timestamp: now - Duration::hours(3),
            link: Some(AlertLink::Inventory(Id::from("CTR-002"))),
            status: AlertStatus::Active,
            recommendations: vec![Recommendation {
                summary: "Request 5,000 tarpaulins from IFRC regional stock".to_string(),
                route: None,
                contact: Some("IFRC Kuala Lumpur hub".to_string()),
                actions: vec![RecommendedAction { kind: ActionKind::Contact, label: "Contact IFRC".to_string() }],
            }],
        },
        Alert {
            id: Id::from("ALT-003"),
            urgency: AlertUrgency::Info,
            message: "Sierra Foothills needs 95% matched".to_string(),
            timestamp: now - Duration::hours(5),
            link: Some(AlertLink::Disaster(Id::from("DIS-003"))),
            status: AlertStatus::AwaitingResolution,
            recommendations: Vec::new(),
        },
    ]
}

fn routes() -> Vec<Route> {
    let res = |t: &str, quantity, unit: &str| ResourceLine {
        resource_type: t.to_string(),
        quantity,
        unit: unit.to_string(),
    };
    vec![
        Route {
            id: Id::from("RTE-001"),
            origin: Location::new(23.8103, 90.4125, "Dhaka Relief Warehouse"),
            destination: Location::new(24.8949, 91.8687, "Sylhet Sadar Camp"),
            confirmed: true,
            resources: vec![res("Food", 20_000, "kg"), res("Water", 3_000, "units")],
            estimated_hours: 9.5,
            priority: Priority::High,
            insight: None,
        },
        Route {
            id: Id::from("RTE-002"),
            origin: Location::new(27.6966, 85.3591, "Kathmandu Logistics Hub"),
            destination: Location::new(28.0000, 84.6333, "Gorkha District Hospital"),
            confirmed: false,
            resources: vec![res("Medical", 200, "kits"), res("Shelter", 400, "units")],
            estimated_hours: 8.0,
            priority: Priority::High,
            insight: Some(RouteInsight {
                confidence: 0.82,
                advantages: vec![
                    "Avoids active landslide zone".to_string(),
                    "Paved for 85% of distance".to_string(),
                ],
                risks: vec!["Single-lane bridge at Dhading Besi".to_string()],
            }),
        },
        Route {
            id: Id::from("RTE-003"),
            origin: Location::new(38.5556, -121.4689, "Sacramento Staging Area"),
            destination: Location::new(38.7296, -120.7985, "Placerville Evacuation Center"),
            confirmed: true,
            resources: vec![res("Medical", 5_000, "units")],
            estimated_hours: 1.2,
            priority: Priority::Medium,
            insight: None,
        },
    ]
}

/// The typhoon the demo timer appends, with its alert and proposed route
pub fn demo_typhoon(now: DateTime<Utc>) -> (Disaster, Alert, Route) {
    let disaster = Disaster {
        id: Id::from("DIS-004"),
        name: "Typhoon Haima Landfall".to_string(),
        disaster_type: DisasterType::Typhoon,
        location: Location::new(11.2433, 125.0048, "Tacloban, Philippines"),
        severity: Severity::Critical,
        affected_population: 640_000,
        timestamp: now,
        needs: vec![
            Need::new("Shelter", "Emergency shelter kits", 12_000, Priority::High, "Philippine Red Cross"),
            Need::new("Water", "Water bladders", 400, Priority::High, "UNICEF"),
            Need::new("Food", "Family food packs", 30_000, Priority::Medium, "DSWD"),
            Need::new("Medical", "First aid kits", 6_000, Priority::Medium, "WHO"),
            Need::new("Power", "Generators", 150, Priority::Low, "Field team"),
        ],
    };
    let route = Route {
        id: Id::from("RTE-004"),
        origin: Location::new(14.5995, 120.9842, "Manila Prepositioned Stock"),
        destination: Location::new(11.2433, 125.0048, "Tacloban"),
        confirmed: false,
        resources: vec![
            ResourceLine { resource_type: "Shelter".to_string(), quantity: 4_000, unit: "kits".to_string() },
            ResourceLine { resource_type: "Water".to_string(), quantity: 120, unit: "bladders".to_string() },
        ],
        estimated_hours: 18.0,
        priority: Priority::High,
        insight: Some(RouteInsight {
            confidence: 0.74,
            advantages: vec!["Sea lift avoids flooded coastal roads".to_string()],
            risks: vec!["Port of Tacloban operating at reduced capacity".to_string()],
        }),
    };
    let alert = Alert {
        id: Id::new("ALT"),
        urgency: AlertUrgency::Urgent,
        message: "Typhoon Haima made landfall near Tacloban: 640,000 affected".to_string(),
        timestamp: now,
        link: Some(AlertLink::Disaster(disaster.id.clone())),
        status: AlertStatus::Active,
        recommendations: vec![Recommendation {
            summary: "Dispatch prepositioned shelter stock from Manila by sea".to_string(),
            route: Some(route.id.clone()),
            contact: Some("Philippine Coast Guard".to_string()),
            actions: vec![
                RecommendedAction { kind: ActionKind::Approve, label: "Approve dispatch".to_string() },
                RecommendedAction { kind: ActionKind::ViewRoute, label: "View route".to_string() },
            ],
        }],
    };
    (disaster, alert, route)
}
