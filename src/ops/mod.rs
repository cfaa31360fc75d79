//! Core operations state and the timers that drive it
//!
//! [`Operations`] owns the only copy of the store. Views read it and call
//! back into the update functions here; timers yield [`OpsEvent`]s that
//! are dispatched to the same functions.

pub mod fixtures;
pub mod matching;
pub mod notifications;
pub mod query;
pub mod scheduler;
pub mod ticker;

use crate::config::Config;
use crate::data::*;
use crate::{OpsError, OpsResult};
use chrono::Utc;
use fixtures::Fixtures;
use matching::{MatchingRun, RunPhase};
use notifications::{NotificationId, NotificationKind, NotificationQueue};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scheduler::{Scheduler, TimerScope};
use std::time::Duration;
use tracing::{debug, info, warn};

/// What a timer yields when it fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpsEvent {
    MetricsTick,
    DismissNotification(NotificationId),
    DemoScript,
    MatchStep { need: usize },
    MatchNextBatch,
    MatchFinish,
    Nudge,
}

/// Which screen the console is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Dashboard,
    DisasterDetail,
    CenterDetail,
    ShipmentDetail,
    RouteDetail,
}

/// Entity shown by the current detail screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub disaster: Option<Id>,
    pub center: Option<Id>,
    pub shipment: Option<Id>,
    pub route: Option<Id>,
}

/// Collapsible dashboard panels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Sidebar,
    Alerts,
}

/// Shared operations state
#[derive(Debug)]
pub struct Store {
    pub disasters: Vec<Disaster>,
    pub centers: Vec<OperationalCenter>,
    pub shipments: Vec<Shipment>,
    pub alerts: Vec<Alert>,
    pub routes: Vec<Route>,
    pub metrics: ImpactMetrics,
    pub notifications: NotificationQueue,
    pub view: ViewMode,
    pub selection: Selection,
    pub sidebar_collapsed: bool,
    pub alerts_collapsed: bool,
    revision: u64,
}

impl Store {
    fn from_fixtures(f: Fixtures) -> Self {
        Self {
            disasters: f.disasters,
            centers: f.centers,
            shipments: f.shipments,
            alerts: f.alerts,
            routes: f.routes,
            metrics: f.metrics,
            notifications: NotificationQueue::default(),
            view: ViewMode::Dashboard,
            selection: Selection::default(),
            sidebar_collapsed: false,
            alerts_collapsed: false,
            revision: 0,
        }
    }

    /// Bumped whenever an entity collection changes
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn disaster(&self, id: &Id) -> Option<&Disaster> {
        self.disasters.iter().find(|d| &d.id == id)
    }

    pub fn center(&self, id: &Id) -> Option<&OperationalCenter> {
        self.centers.iter().find(|c| &c.id == id)
    }

    pub fn shipment(&self, id: &Id) -> Option<&Shipment> {
        self.shipments.iter().find(|s| &s.id == id)
    }

    pub fn route(&self, id: &Id) -> Option<&Route> {
        self.routes.iter().find(|r| &r.id == id)
    }

    pub fn alert(&self, id: &Id) -> Option<&Alert> {
        self.alerts.iter().find(|a| &a.id == id)
    }

    pub fn selected_disaster(&self) -> Option<&Disaster> {
        self.selection.disaster.as_ref().and_then(|id| self.disaster(id))
    }

    pub fn selected_center(&self) -> Option<&OperationalCenter> {
        self.selection.center.as_ref().and_then(|id| self.center(id))
    }

    pub fn selected_shipment(&self) -> Option<&Shipment> {
        self.selection.shipment.as_ref().and_then(|id| self.shipment(id))
    }

    pub fn selected_route(&self) -> Option<&Route> {
        self.selection.route.as_ref().and_then(|id| self.route(id))
    }

    pub fn open_alerts(&self) -> usize {
        self.alerts.iter().filter(|a| a.is_open()).count()
    }

    fn alert_mut(&mut self, id: &Id) -> OpsResult<&mut Alert> {
        self.alerts
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| unknown("alert", id))
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

fn unknown(kind: &'static str, id: &Id) -> OpsError {
    OpsError::UnknownEntity {
        kind,
        id: id.clone(),
    }
}

/// Timers and run state that live while the disaster detail screen is up
#[derive(Debug)]
struct DisasterView {
    disaster: Id,
    _nudger: TimerScope<OpsEvent>,
    run: Option<MatchingRun>,
}

/// The orchestrator
pub struct Operations {
    store: Store,
    config: Config,
    rng: StdRng,
    scheduler: Scheduler<OpsEvent>,
    app_timers: TimerScope<OpsEvent>,
    disaster_view: Option<DisasterView>,
}

impl Operations {
    /// Start with the standard fixtures
    pub fn new(config: Config) -> Self {
        Self::with_fixtures(config, Fixtures::standard())
    }

    pub fn with_fixtures(config: Config, fixtures: Fixtures) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let scheduler = Scheduler::new();
        let app_timers = scheduler.scope();

        app_timers.every(config.ticker.interval(), OpsEvent::MetricsTick);
        if config.demo.enabled {
            app_timers.after(config.demo.delay(), OpsEvent::DemoScript);
        }

        info!(
            disasters = fixtures.disasters.len(),
            centers = fixtures.centers.len(),
            shipments = fixtures.shipments.len(),
            seed = ?config.seed,
            "operations started"
        );

        Self {
            store: Store::from_fixtures(fixtures),
            config,
            rng,
            scheduler,
            app_timers,
            disaster_view: None,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Virtual time since start
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Armed timers across every scope
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// The matching run on the current disaster screen, if any
    pub fn matching(&self) -> Option<&MatchingRun> {
        self.disaster_view.as_ref().and_then(|v| v.run.as_ref())
    }

    pub fn is_matching(&self) -> bool {
        self.matching().is_some()
    }

    /// Move virtual time forward, firing every timer that comes due in
    /// order.
    pub fn advance(&mut self, elapsed: Duration) {
        let deadline = self.scheduler.now() + elapsed;
        while let Some(event) = self.scheduler.pop_due(deadline) {
            self.dispatch(event);
        }
        self.scheduler.settle(deadline);
    }

    fn dispatch(&mut self, event: OpsEvent) {
        match event {
            OpsEvent::MetricsTick => self.on_metrics_tick(),
            OpsEvent::DismissNotification(id) => {
                self.store.notifications.dismiss(id);
            }
            OpsEvent::DemoScript => self.on_demo_script(),
            OpsEvent::MatchStep { need } => self.on_match_step(need),
            OpsEvent::MatchNextBatch => self.on_match_next_batch(),
            OpsEvent::MatchFinish => {
                if let Some(view) = self.disaster_view.as_mut() {
                    if view.run.take().is_some() {
                        debug!(disaster = %view.disaster, "matching run cleared");
                    }
                }
            }
            OpsEvent::Nudge => self.on_nudge(),
        }
    }

    fn on_metrics_tick(&mut self) {
        let outcome = ticker::tick(&mut self.store.metrics, &self.config.ticker, &mut self.rng);
        debug!(?outcome, "metrics tick");
        if let Some(message) = outcome.notification {
            self.notify(NotificationKind::Info, message, true);
        }
    }

    fn on_demo_script(&mut self) {
        let (disaster, alert, route) = fixtures::demo_typhoon(Utc::now());
        info!(disaster = %disaster.id, alert = %alert.id, "demo disaster injected");
        let message = format!("New disaster reported: {}", disaster.name);

        self.store.disasters.push(disaster);
        self.store.alerts.push(alert);
        self.store.routes.push(route);
        self.store.touch();
        self.notify(NotificationKind::Warning, &message, true);
    }

    fn on_match_step(&mut self, need: usize) {
        let Some(view) = self.disaster_view.as_mut() else { return };
        let Some(run) = view.run.as_mut() else { return };
        let Some(disaster) = self.store.disasters.iter_mut().find(|d| d.id == view.disaster) else {
            return;
        };

        if let Some(applied) = run.on_step(need, disaster, &self.config.matching, &mut self.rng) {
            debug!(disaster = %view.disaster, need, applied, "need matched");
            if run.phase() == RunPhase::Complete {
                info!(disaster = %view.disaster, rate = disaster.match_rate(), "matching complete");
            }
            self.store.revision += 1;
        }
    }

    fn on_match_next_batch(&mut self) {
        let Some(view) = self.disaster_view.as_mut() else { return };
        let Some(run) = view.run.as_mut() else { return };
        let Some(disaster) = self.store.disasters.iter().find(|d| d.id == view.disaster) else {
            return;
        };
        run.on_next_batch(disaster, &self.config.matching, &mut self.rng);
        debug!(disaster = %view.disaster, batch = run.batch(), "matching batch started");
    }

    fn on_nudge(&mut self) {
        let Some(view) = self.disaster_view.as_ref() else { return };
        if view.run.is_some() {
            return;
        }
        let Some(disaster) = self.store.disasters.iter_mut().find(|d| d.id == view.disaster) else {
            return;
        };
        if let Some((need, applied)) = matching::nudge(disaster, &self.config.matching, &mut self.rng) {
            debug!(disaster = %view.disaster, need, applied, "background nudge");
            self.store.revision += 1;
        }
    }

    // ---- navigation ----

    fn enter(&mut self, mode: ViewMode, selection: Selection) {
        if mode != ViewMode::DisasterDetail {
            // Unmounting the disaster screen cancels its nudger and any run
            self.disaster_view = None;
        }
        self.store.view = mode;
        self.store.selection = selection;
    }

    pub fn select_disaster(&mut self, id: &Id) -> OpsResult<()> {
        if self.store.disaster(id).is_none() {
            return Err(unknown("disaster", id));
        }
        let already_mounted = self
            .disaster_view
            .as_ref()
            .is_some_and(|v| &v.disaster == id);
        if !already_mounted {
            let nudger = self.scheduler.scope();
            nudger.every(self.config.matching.nudge_interval(), OpsEvent::Nudge);
            self.disaster_view = Some(DisasterView {
                disaster: id.clone(),
                _nudger: nudger,
                run: None,
            });
        }
        self.enter(
            ViewMode::DisasterDetail,
            Selection {
                disaster: Some(id.clone()),
                ..Selection::default()
            },
        );
        Ok(())
    }

    pub fn select_center(&mut self, id: &Id) -> OpsResult<()> {
        if self.store.center(id).is_none() {
            return Err(unknown("center", id));
        }
        self.enter(
            ViewMode::CenterDetail,
            Selection {
                center: Some(id.clone()),
                ..Selection::default()
            },
        );
        Ok(())
    }

    pub fn select_shipment(&mut self, id: &Id) -> OpsResult<()> {
        if self.store.shipment(id).is_none() {
            return Err(unknown("shipment", id));
        }
        self.enter(
            ViewMode::ShipmentDetail,
            Selection {
                shipment: Some(id.clone()),
                ..Selection::default()
            },
        );
        Ok(())
    }

    pub fn select_route(&mut self, id: &Id) -> OpsResult<()> {
        if self.store.route(id).is_none() {
            return Err(unknown("route", id));
        }
        self.enter(
            ViewMode::RouteDetail,
            Selection {
                route: Some(id.clone()),
                ..Selection::default()
            },
        );
        Ok(())
    }

    /// Return to the dashboard, clearing the detail selection
    pub fn back(&mut self) {
        if self.store.view == ViewMode::Dashboard {
            return;
        }
        self.enter(ViewMode::Dashboard, Selection::default());
    }

    pub fn toggle_panel(&mut self, panel: Panel) {
        match panel {
            Panel::Sidebar => self.store.sidebar_collapsed = !self.store.sidebar_collapsed,
            Panel::Alerts => self.store.alerts_collapsed = !self.store.alerts_collapsed,
        }
    }

    // ---- matching ----

    /// Start the staged matching run on the disaster being viewed
    pub fn start_matching(&mut self) -> OpsResult<()> {
        let Some(view) = self.disaster_view.as_mut() else {
            return Err(OpsError::NoSelection("disaster"));
        };
        if view.run.is_some() {
            return Err(OpsError::MatchingRefused("a run is already in progress".to_string()));
        }
        let disaster = self
            .store
            .disasters
            .iter()
            .find(|d| d.id == view.disaster)
            .ok_or_else(|| unknown("disaster", &view.disaster))?;

        match MatchingRun::start(disaster, &self.config.matching, self.scheduler.scope(), &mut self.rng) {
            Ok(run) => {
                info!(disaster = %view.disaster, rate = disaster.match_rate(), "matching started");
                view.run = Some(run);
                Ok(())
            }
            Err(e) => {
                warn!(disaster = %view.disaster, error = %e, "matching refused");
                Err(e)
            }
        }
    }

    // ---- notifications ----

    /// Show a notification; auto-closing ones are removed after the
    /// configured delay.
    pub fn notify(&mut self, kind: NotificationKind, message: &str, auto_close: bool) -> NotificationId {
        let id = self.store.notifications.push(kind, message, auto_close);
        if auto_close {
            self.app_timers
                .after(self.config.ticker.notification_ttl(), OpsEvent::DismissNotification(id));
        }
        id
    }

    pub fn dismiss_notification(&mut self, id: NotificationId) -> bool {
        self.store.notifications.dismiss(id)
    }

    // ---- alerts ----

    pub fn acknowledge_alert(&mut self, id: &Id) -> OpsResult<()> {
        self.transition_alert(id, AlertStatus::AwaitingResolution)
    }

    pub fn resolve_alert(&mut self, id: &Id) -> OpsResult<()> {
        self.transition_alert(id, AlertStatus::Resolved)
    }

    fn transition_alert(&mut self, id: &Id, next: AlertStatus) -> OpsResult<()> {
        let alert = self.store.alert_mut(id)?;
        let from = alert.status;
        if !alert.advance_to(next) {
            return Err(OpsError::InvalidTransition {
                id: id.clone(),
                from: from.to_string(),
                to: next.to_string(),
            });
        }
        info!(alert = %id, %from, to = %next, "alert status changed");
        self.store.touch();
        Ok(())
    }

    /// Dispatch one of the actions a recommendation offers
    pub fn perform_action(&mut self, alert_id: &Id, recommendation: usize, kind: ActionKind) -> OpsResult<()> {
        let alert = self
            .store
            .alert(alert_id)
            .ok_or_else(|| unknown("alert", alert_id))?;
        let rec = alert
            .recommendations
            .get(recommendation)
            .cloned()
            .ok_or_else(|| OpsError::MissingLink(format!("{} has no recommendation {}", alert_id, recommendation)))?;
        if !rec.offers(kind) {
            return Err(OpsError::MissingLink(format!(
                "{} is not offered on {}",
                kind.label(),
                alert_id
            )));
        }
        let link = alert.link.clone();
        let message = alert.message.clone();

        let next = AlertStatus::AwaitingResolution;
        if matches!(kind, ActionKind::Approve | ActionKind::Contact) && alert.status >= next {
            return Err(OpsError::InvalidTransition {
                id: alert_id.clone(),
                from: alert.status.to_string(),
                to: next.to_string(),
            });
        }

        info!(alert = %alert_id, action = kind.label(), "alert action dispatched");

        match kind {
            ActionKind::Approve => {
                if let Some(route_id) = &rec.route {
                    let route = self
                        .store
                        .routes
                        .iter_mut()
                        .find(|r| &r.id == route_id)
                        .ok_or_else(|| unknown("route", route_id))?;
                    route.confirmed = true;
                }
                self.store.alert_mut(alert_id)?.advance_to(next);
                self.store.touch();
                self.notify(NotificationKind::Success, &format!("Approved: {}", rec.summary), true);
            }
            ActionKind::ViewRoute => {
                let route_id = rec
                    .route
                    .ok_or_else(|| OpsError::MissingLink(format!("{} proposes no route", alert_id)))?;
                self.select_route(&route_id)?;
            }
            ActionKind::Contact => {
                let who = rec.contact.as_deref().unwrap_or("partner");
                self.store.alert_mut(alert_id)?.advance_to(next);
                self.store.touch();
                self.notify(NotificationKind::Info, &format!("Contacting {}", who), true);
            }
            ActionKind::ReportIssue => {
                let Some(AlertLink::Shipment(shipment_id)) = link else {
                    return Err(OpsError::MissingLink(format!("{} is not about a shipment", alert_id)));
                };
                self.report_shipment_issue(&shipment_id, &message)?;
            }
        }
        Ok(())
    }

    // ---- inventory and shipments ----

    pub fn add_inventory(&mut self, center_id: &Id, item: InventoryItem) -> OpsResult<()> {
        let center = self
            .store
            .centers
            .iter_mut()
            .find(|c| &c.id == center_id)
            .ok_or_else(|| unknown("center", center_id))?;
        info!(center = %center_id, item = %item.item, quantity = item.quantity, "inventory added");
        let message = format!("{} x {} received at {}", item.quantity, item.item, center.name);
        center.add_item(item);
        self.store.touch();
        self.notify(NotificationKind::Success, &message, true);
        Ok(())
    }

    /// Flag a shipment as an exception and log the issue on its timeline
    pub fn report_shipment_issue(&mut self, shipment_id: &Id, description: &str) -> OpsResult<()> {
        let shipment = self
            .store
            .shipments
            .iter_mut()
            .find(|s| &s.id == shipment_id)
            .ok_or_else(|| unknown("shipment", shipment_id))?;
        let location = shipment
            .current_location
            .clone()
            .unwrap_or_else(|| shipment.origin.clone());
        shipment.record_event(ShipmentEvent {
            timestamp: Utc::now(),
            status: ShipmentStatus::Exception,
            location,
            note: format!("Issue reported: {}", description),
        });
        warn!(shipment = %shipment_id, "shipment issue reported");
        self.store.touch();
        self.notify(
            NotificationKind::Warning,
            &format!("Issue reported on {}", shipment_id),
            true,
        );
        Ok(())
    }
}
