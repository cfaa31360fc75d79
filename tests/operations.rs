//! End-to-end behaviour of the orchestrator, driven in virtual time

use chrono::Utc;
use relief_ops::config::{Config, DemoConfig, MatchingConfig, TickerConfig};
use relief_ops::ops::fixtures::Fixtures;
use relief_ops::ops::matching::{RunPhase, COMPLETE_MESSAGE, STAGES};
use relief_ops::ops::notifications::NotificationKind;
use relief_ops::ops::{Operations, Selection, ViewMode};
use relief_ops::*;
use std::time::Duration;

fn quiet_config(seed: u64) -> Config {
    Config {
        seed: Some(seed),
        ticker: TickerConfig {
            metrics_chance: 0.0,
            notification_chance: 0.0,
            ..TickerConfig::default()
        },
        matching: MatchingConfig {
            nudge_chance: 0.0,
            ..MatchingConfig::default()
        },
        demo: DemoConfig {
            enabled: false,
            ..DemoConfig::default()
        },
        ..Config::default()
    }
}

fn disaster(id: &str, needs: Vec<Need>) -> Disaster {
    Disaster {
        id: Id::from(id),
        name: format!("Test disaster {}", id),
        disaster_type: DisasterType::Flood,
        location: Location::new(24.9, 91.9, "Sylhet"),
        severity: Severity::High,
        affected_population: 50_000,
        timestamp: Utc::now(),
        needs,
    }
}

fn ops_with(config: Config, disasters: Vec<Disaster>) -> Operations {
    let mut fixtures = Fixtures::empty();
    fixtures.disasters = disasters;
    Operations::with_fixtures(config, fixtures)
}

#[test]
fn select_then_back_returns_to_clean_dashboard() {
    let mut ops = Operations::new(quiet_config(1));
    ops.select_disaster(&Id::from("DIS-001")).unwrap();
    assert_eq!(ops.store().view, ViewMode::DisasterDetail);
    assert_eq!(ops.store().selection.disaster, Some(Id::from("DIS-001")));

    ops.back();
    assert_eq!(ops.store().view, ViewMode::Dashboard);
    assert_eq!(ops.store().selection, Selection::default());

    // back on the dashboard changes nothing
    ops.back();
    assert_eq!(ops.store().view, ViewMode::Dashboard);
}

#[test]
fn high_priority_need_lands_in_seventy_to_full() {
    for seed in 0..20 {
        let d = disaster("DIS-T", vec![Need::new("Water", "Bottled water", 100, Priority::High, "WFP")]);
        let mut ops = ops_with(quiet_config(seed), vec![d]);
        ops.select_disaster(&Id::from("DIS-T")).unwrap();
        ops.start_matching().unwrap();
        ops.advance(Duration::from_secs(30));

        let matched = ops.store().disasters[0].needs[0].matched();
        assert!((70..=100).contains(&matched), "seed {} matched {}", seed, matched);
        assert!(!ops.is_matching());
    }
}

#[test]
fn matching_walks_stages_then_clears() {
    let needs = vec![
        Need::new("Shelter", "Tents", 400, Priority::High, "UNHCR"),
        Need::new("Food", "Rice (kg)", 2_000, Priority::Medium, "WFP"),
        Need::new("Medical", "Trauma kits", 120, Priority::High, "WHO"),
        Need::new("Water", "Jerry cans", 600, Priority::Low, "UNICEF"),
        Need::new("Hygiene", "Hygiene kits", 800, Priority::Medium, "IFRC"),
    ];
    let mut ops = ops_with(quiet_config(9), vec![disaster("DIS-T", needs)]);
    ops.select_disaster(&Id::from("DIS-T")).unwrap();
    ops.start_matching().unwrap();

    let mut seen = Vec::new();
    for _ in 0..400 {
        ops.advance(Duration::from_millis(50));
        let Some(run) = ops.matching() else { break };
        let entry = (run.progress().round() as u32, run.stage_label());
        if run.phase() != RunPhase::Matching && seen.last() != Some(&entry) {
            seen.push(entry);
        }
    }

    assert_eq!(
        seen,
        vec![(33, STAGES[1]), (67, STAGES[2]), (100, COMPLETE_MESSAGE)]
    );
    assert!(!ops.is_matching());
    assert!(ops.store().disasters[0].needs.iter().all(|n| n.matched() > 0));
}

#[test]
fn matching_is_refused_near_full_disasters() {
    let mut ops = Operations::new(quiet_config(2));
    ops.select_disaster(&Id::from("DIS-003")).unwrap();
    let before: Vec<u32> = ops.store().selected_disaster().unwrap().needs.iter().map(|n| n.matched()).collect();

    let err = ops.start_matching().unwrap_err();
    assert!(matches!(err, OpsError::MatchingRefused(_)));
    assert!(!ops.is_matching());

    let after: Vec<u32> = ops.store().selected_disaster().unwrap().needs.iter().map(|n| n.matched()).collect();
    assert_eq!(before, after);
}

#[test]
fn second_start_during_a_run_is_refused() {
    let mut ops = Operations::new(quiet_config(4));
    ops.select_disaster(&Id::from("DIS-001")).unwrap();
    ops.start_matching().unwrap();
    assert!(matches!(ops.start_matching(), Err(OpsError::MatchingRefused(_))));
}

#[test]
fn leaving_disaster_screen_cancels_its_timers() {
    let mut ops = Operations::new(quiet_config(5));
    let baseline = ops.pending_timers();

    ops.select_disaster(&Id::from("DIS-001")).unwrap();
    assert_eq!(ops.pending_timers(), baseline + 1);
    ops.start_matching().unwrap();
    assert!(ops.pending_timers() > baseline + 1);

    ops.back();
    assert_eq!(ops.pending_timers(), baseline);

    let snapshot: Vec<u32> = ops.store().disasters[0].needs.iter().map(|n| n.matched()).collect();
    ops.advance(Duration::from_secs(60));
    let later: Vec<u32> = ops.store().disasters[0].needs.iter().map(|n| n.matched()).collect();
    assert_eq!(snapshot, later);
}

#[test]
fn nudger_only_runs_while_disaster_is_viewed() {
    let mut config = quiet_config(6);
    config.matching.nudge_chance = 1.0;
    let needs = vec![Need::new("Food", "Rice (kg)", 10_000, Priority::Medium, "WFP")];
    let mut ops = ops_with(config, vec![disaster("DIS-T", needs)]);

    ops.advance(Duration::from_secs(10));
    assert_eq!(ops.store().disasters[0].needs[0].matched(), 0);

    ops.select_disaster(&Id::from("DIS-T")).unwrap();
    ops.advance(Duration::from_millis(2_600));
    let after_one = ops.store().disasters[0].needs[0].matched();
    assert!(after_one >= 1);

    ops.back();
    ops.advance(Duration::from_secs(10));
    assert_eq!(ops.store().disasters[0].needs[0].matched(), after_one);
}

#[test]
fn auto_close_notifications_expire_others_stay() {
    let mut ops = ops_with(quiet_config(7), Vec::new());
    let transient = ops.notify(NotificationKind::Info, "Truck departed", true);
    let pinned = ops.notify(NotificationKind::Warning, "Check customs paperwork", false);

    ops.advance(Duration::from_millis(4_999));
    assert!(ops.store().notifications.contains(transient));

    ops.advance(Duration::from_millis(1));
    assert!(!ops.store().notifications.contains(transient));
    assert!(ops.store().notifications.contains(pinned));

    ops.advance(Duration::from_secs(120));
    assert!(ops.store().notifications.contains(pinned));
    assert!(ops.dismiss_notification(pinned));
    assert!(ops.store().notifications.is_empty());
}

#[test]
fn demo_typhoon_arrives_after_delay() {
    let mut config = quiet_config(8);
    config.demo.enabled = true;
    let mut ops = Operations::new(config);
    let disasters = ops.store().disasters.len();
    let alerts = ops.store().alerts.len();
    let revision = ops.store().revision();

    ops.advance(Duration::from_secs(29));
    assert_eq!(ops.store().disasters.len(), disasters);

    ops.advance(Duration::from_secs(1));
    assert_eq!(ops.store().disasters.len(), disasters + 1);
    assert_eq!(ops.store().alerts.len(), alerts + 1);
    assert!(ops.store().revision() > revision);
    assert!(ops.store().disaster(&Id::from("DIS-004")).is_some());
    let latest = ops.store().notifications.latest().unwrap();
    assert_eq!(latest.kind, NotificationKind::Warning);

    // one-shot
    ops.advance(Duration::from_secs(120));
    assert_eq!(ops.store().disasters.len(), disasters + 1);
}

#[test]
fn ticker_bumps_metrics_over_time() {
    let mut config = quiet_config(10);
    config.ticker.metrics_chance = 1.0;
    let mut ops = ops_with(config, Vec::new());

    ops.advance(Duration::from_secs(35));
    let m = &ops.store().metrics;
    assert!(m.people_helped >= 30);
    assert!(m.waste_prevented_kg >= 15);
    assert!(m.cost_saved >= 300);
}

#[test]
fn approve_confirms_route_and_awaits_resolution() {
    let mut ops = Operations::new(quiet_config(11));
    let alert = Id::from("ALT-001");
    ops.perform_action(&alert, 0, ActionKind::Approve).unwrap();

    assert!(ops.store().route(&Id::from("RTE-002")).unwrap().confirmed);
    assert_eq!(ops.store().alert(&alert).unwrap().status, AlertStatus::AwaitingResolution);
    assert_eq!(
        ops.store().notifications.latest().map(|n| n.kind),
        Some(NotificationKind::Success)
    );

    ops.resolve_alert(&alert).unwrap();
    let err = ops.acknowledge_alert(&alert).unwrap_err();
    assert!(matches!(err, OpsError::InvalidTransition { .. }));
}

#[test]
fn approve_and_contact_respect_the_alert_lifecycle() {
    let mut ops = Operations::new(quiet_config(17));
    let alert = Id::from("ALT-001");
    let route = Id::from("RTE-002");

    ops.resolve_alert(&alert).unwrap();
    let revision = ops.store().revision();
    let notifications = ops.store().notifications.len();
    let err = ops.perform_action(&alert, 0, ActionKind::Approve).unwrap_err();
    assert!(matches!(err, OpsError::InvalidTransition { .. }));
    assert!(!ops.store().route(&route).unwrap().confirmed);
    assert_eq!(ops.store().alert(&alert).unwrap().status, AlertStatus::Resolved);
    assert_eq!(ops.store().revision(), revision);
    assert_eq!(ops.store().notifications.len(), notifications);

    let mut ops = Operations::new(quiet_config(18));
    ops.acknowledge_alert(&alert).unwrap();
    let err = ops.perform_action(&alert, 0, ActionKind::Approve).unwrap_err();
    assert!(matches!(err, OpsError::InvalidTransition { .. }));
    assert!(!ops.store().route(&route).unwrap().confirmed);

    let contact = Id::from("ALT-002");
    ops.perform_action(&contact, 0, ActionKind::Contact).unwrap();
    let err = ops.perform_action(&contact, 0, ActionKind::Contact).unwrap_err();
    assert!(matches!(err, OpsError::InvalidTransition { .. }));
}

#[test]
fn view_route_opens_route_detail() {
    let mut ops = Operations::new(quiet_config(12));
    ops.perform_action(&Id::from("ALT-001"), 0, ActionKind::ViewRoute).unwrap();
    assert_eq!(ops.store().view, ViewMode::RouteDetail);
    assert_eq!(ops.store().selection.route, Some(Id::from("RTE-002")));
}

#[test]
fn report_issue_flags_the_linked_shipment() {
    let mut ops = Operations::new(quiet_config(13));
    ops.perform_action(&Id::from("ALT-001"), 0, ActionKind::ReportIssue).unwrap();

    let shipment = ops.store().shipment(&Id::from("SHP-1043")).unwrap();
    assert_eq!(shipment.status, ShipmentStatus::Exception);
    assert_eq!(shipment.latest_event().map(|e| e.status), Some(ShipmentStatus::Exception));
}

#[test]
fn actions_not_offered_are_rejected() {
    let mut ops = Operations::new(quiet_config(14));
    let err = ops
        .perform_action(&Id::from("ALT-002"), 0, ActionKind::ReportIssue)
        .unwrap_err();
    assert!(matches!(err, OpsError::MissingLink(_)));

    ops.perform_action(&Id::from("ALT-002"), 0, ActionKind::Contact).unwrap();
    assert_eq!(
        ops.store().alert(&Id::from("ALT-002")).unwrap().status,
        AlertStatus::AwaitingResolution
    );
}

#[test]
fn received_donation_updates_center_aggregates() {
    let mut ops = Operations::new(quiet_config(15));
    let id = Id::from("CTR-002");
    let before = ops.store().center(&id).unwrap().total_items;

    let item = InventoryItem {
        id: Id::new("INV"),
        category: "Shelter".to_string(),
        item: "Tarpaulins".to_string(),
        quantity: 3_000,
        partner: "IFRC".to_string(),
        received: Utc::now().date_naive(),
        storage: "Bay 4".to_string(),
        condition: ItemCondition::New,
    };
    ops.add_inventory(&id, item).unwrap();

    let center = ops.store().center(&id).unwrap();
    assert_eq!(center.total_items, before + 3_000);
    assert_eq!(center.status, InventoryStatus::from_total(center.total_items));
}

#[test]
fn unknown_ids_are_reported() {
    let mut ops = Operations::new(quiet_config(16));
    assert!(matches!(
        ops.select_center(&Id::from("CTR-999")),
        Err(OpsError::UnknownEntity { kind: "center", .. })
    ));
    assert!(matches!(
        ops.report_shipment_issue(&Id::from("SHP-0"), "lost"),
        Err(OpsError::UnknownEntity { kind: "shipment", .. })
    ));
    assert!(matches!(
        ops.resolve_alert(&Id::from("ALT-999")),
        Err(OpsError::UnknownEntity { kind: "alert", .. })
    ));
}
