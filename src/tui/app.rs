//! Main application state and rendering

use crate::data::*;
use crate::ops::matching::RunPhase;
use crate::ops::notifications::NotificationKind;
use crate::ops::query::{
    cycle_filter, AlertQuery, DisasterQuery, InventoryQuery, InventorySort, ShipmentQuery,
};
use crate::ops::{Operations, Panel, ViewMode};
use crate::tui::map::MapLayer;
use crate::tui::widgets::{DramaticBox, NotificationLine, ProgressBar};
use crate::tui::{
    centered_rect, create_center_layout, create_dashboard_layout, create_detail_layout,
    create_main_layout, priority_color, severity_color, shipment_color, stock_color,
    styled_block, urgency_color, Theme, HELP_TEXT, SMALL_LOGO,
};
use crate::OpsError;
use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
    Frame,
};
use std::time::{Duration, Instant};
use tracing::warn;

/// Application state
pub struct App {
    pub ops: Operations,
    pub theme: Theme,
    pub running: bool,
    pub show_help: bool,
    pub focus: Focus,
    pub list_state: ListState,
    pub detail_state: ListState,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub disaster_query: DisasterQuery,
    pub alert_query: AlertQuery,
    pub shipment_query: ShipmentQuery,
    pub inventory_query: InventoryQuery,
    map: Option<MapLayer>,
    mounted_view: ViewMode,
    last_tick: Instant,
}

/// Which dashboard list has the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Disasters,
    Centers,
    Shipments,
    Alerts,
}

impl Focus {
    fn title(&self) -> &'static str {
        match self {
            Focus::Disasters => "Disasters",
            Focus::Centers => "Centers",
            Focus::Shipments => "Shipments",
            Focus::Alerts => "Alerts",
        }
    }
}

/// What typed text is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    /// `category, item, quantity, partner`
    Donation,
    IssueReport,
}

impl App {
    pub fn new(ops: Operations) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        let mut detail_state = ListState::default();
        detail_state.select(Some(0));
        let map = Some(MapLayer::mount(ops.store()));

        Self {
            ops,
            theme: Theme::default(),
            running: true,
            show_help: false,
            focus: Focus::Disasters,
            list_state,
            detail_state,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            disaster_query: DisasterQuery::default(),
            alert_query: AlertQuery::default(),
            shipment_query: ShipmentQuery::default(),
            inventory_query: InventoryQuery::default(),
            map,
            mounted_view: ViewMode::Dashboard,
            last_tick: Instant::now(),
        }
    }

    /// Advance the simulation by wall-clock time since the last call
    pub fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.ops.advance(elapsed);
        self.sync_view();
    }

    /// Mount or unmount view-owned resources after the view mode changed,
    /// and keep the map layer in step with the store.
    fn sync_view(&mut self) {
        let view = self.ops.store().view;
        if view != self.mounted_view {
            self.map = match view {
                ViewMode::Dashboard => Some(MapLayer::mount(self.ops.store())),
                _ => None,
            };
            self.detail_state.select(Some(0));
            self.inventory_query = InventoryQuery::default();
            self.mounted_view = view;
        }
        if let Some(map) = self.map.as_mut() {
            map.sync(self.ops.store());
        }
    }

    fn report(&mut self, err: OpsError) {
        warn!(error = %err, "intent rejected");
        self.ops.notify(NotificationKind::Warning, &err.to_string(), true);
    }

    fn run_intent(&mut self, result: Result<(), OpsError>) {
        if let Err(e) = result {
            self.report(e);
        }
        self.sync_view();
    }

    /// Handle keyboard input
    pub fn handle_input(&mut self) -> std::io::Result<bool> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(true);
                }

                if self.input_mode != InputMode::Normal {
                    match key.code {
                        KeyCode::Enter => {
                            self.submit_input();
                            self.input_mode = InputMode::Normal;
                        }
                        KeyCode::Esc => {
                            self.input_buffer.clear();
                            self.input_mode = InputMode::Normal;
                        }
                        KeyCode::Backspace => {
                            self.input_buffer.pop();
                        }
                        KeyCode::Char(c) => {
                            self.input_buffer.push(c);
                        }
                        _ => {}
                    }
                    return Ok(true);
                }

                let view = self.ops.store().view;
                match key.code {
                    KeyCode::Char('q') => {
                        self.running = false;
                        return Ok(false);
                    }
                    KeyCode::Char('?') => {
                        self.show_help = !self.show_help;
                    }
                    KeyCode::Esc | KeyCode::Backspace => {
                        if self.show_help {
                            self.show_help = false;
                        } else {
                            self.ops.back();
                            self.sync_view();
                        }
                    }
                    KeyCode::Up => self.navigate_up(),
                    KeyCode::Down => self.navigate_down(),
                    KeyCode::Enter => self.handle_enter(),
                    KeyCode::Tab if view == ViewMode::Dashboard => self.cycle_focus(),
                    KeyCode::Char('[') => self.ops.toggle_panel(Panel::Sidebar),
                    KeyCode::Char(']') => self.ops.toggle_panel(Panel::Alerts),
                    KeyCode::Char('d') => {
                        if let Some(id) = self.ops.store().notifications.latest().map(|n| n.id) {
                            self.ops.dismiss_notification(id);
                        }
                    }
                    KeyCode::Char('/') => {
                        self.input_mode = InputMode::Search;
                        self.input_buffer.clear();
                    }
                    KeyCode::Char('f') => self.cycle_filter(),
                    KeyCode::Char('g') => self.cycle_secondary_filter(),
                    KeyCode::Char('o') if view == ViewMode::Dashboard && self.focus == Focus::Shipments => {
                        self.shipment_query.direction = self.shipment_query.direction.toggle();
                    }

                    // Alert actions on the dashboard
                    KeyCode::Char('a') if view == ViewMode::Dashboard => self.alert_action(ActionKind::Approve),
                    KeyCode::Char('v') if view == ViewMode::Dashboard => self.alert_action(ActionKind::ViewRoute),
                    KeyCode::Char('c') if view == ViewMode::Dashboard => self.alert_action(ActionKind::Contact),
                    KeyCode::Char('x') if view == ViewMode::Dashboard => self.alert_action(ActionKind::ReportIssue),
                    KeyCode::Char('k') if view == ViewMode::Dashboard => {
                        if let Some(id) = self.selected_alert_id() {
                            let result = self.ops.acknowledge_alert(&id);
                            self.run_intent(result);
                        }
                    }
                    KeyCode::Char('r') if view == ViewMode::Dashboard => {
                        if let Some(id) = self.selected_alert_id() {
                            let result = self.ops.resolve_alert(&id);
                            self.run_intent(result);
                        }
                    }

                    // Detail screens
                    KeyCode::Char('m') if view == ViewMode::DisasterDetail => {
                        let result = self.ops.start_matching();
                        self.run_intent(result);
                    }
                    KeyCode::Char('s') if view == ViewMode::CenterDetail => {
                        let next = self.inventory_query.sort.next();
                        self.inventory_query.sort_by(next);
                    }
                    KeyCode::Char('o') if view == ViewMode::CenterDetail => {
                        let current = self.inventory_query.sort;
                        self.inventory_query.sort_by(current);
                    }
                    KeyCode::Char('i') if view == ViewMode::CenterDetail => {
                        self.input_mode = InputMode::Donation;
                        self.input_buffer.clear();
                    }
                    KeyCode::Char('x') if view == ViewMode::ShipmentDetail => {
                        self.input_mode = InputMode::IssueReport;
                        self.input_buffer.clear();
                    }
                    _ => {}
                }
            }
        }
        Ok(true)
    }

    fn submit_input(&mut self) {
        let text = std::mem::take(&mut self.input_buffer);
        match self.input_mode {
            InputMode::Search => self.apply_search(text),
            InputMode::Donation => {
                let Some(center) = self.ops.store().selection.center.clone() else { return };
                match parse_donation(&text) {
                    Some(item) => {
                        let result = self.ops.add_inventory(&center, item);
                        self.run_intent(result);
                    }
                    None => {
                        self.ops.notify(
                            NotificationKind::Warning,
                            "Expected: category, item, quantity, partner",
                            true,
                        );
                    }
                }
            }
            InputMode::IssueReport => {
                let Some(shipment) = self.ops.store().selection.shipment.clone() else { return };
                let description = if text.trim().is_empty() { "unspecified" } else { text.trim() };
                let result = self.ops.report_shipment_issue(&shipment, description);
                self.run_intent(result);
            }
            InputMode::Normal => {}
        }
    }

    fn apply_search(&mut self, text: String) {
        match self.ops.store().view {
            ViewMode::CenterDetail => self.inventory_query.search = text,
            ViewMode::Dashboard => match self.focus {
                Focus::Disasters => self.disaster_query.search = text,
                Focus::Shipments => self.shipment_query.search = text,
                Focus::Alerts => self.alert_query.search = text,
                Focus::Centers => {}
            },
            _ => {}
        }
        self.list_state.select(Some(0));
        self.detail_state.select(Some(0));
    }

    fn cycle_filter(&mut self) {
        match self.ops.store().view {
            ViewMode::CenterDetail => {
                self.inventory_query.condition =
                    cycle_filter(self.inventory_query.condition, &ItemCondition::ALL);
            }
            ViewMode::Dashboard => match self.focus {
                Focus::Disasters => {
                    self.disaster_query.severity =
                        cycle_filter(self.disaster_query.severity, &Severity::ALL);
                }
                Focus::Shipments => {
                    self.shipment_query.status =
                        cycle_filter(self.shipment_query.status, &ShipmentStatus::ALL);
                }
                Focus::Alerts => {
                    self.alert_query.urgency = cycle_filter(
                        self.alert_query.urgency,
                        &[AlertUrgency::Urgent, AlertUrgency::Info],
                    );
                }
                Focus::Centers => {}
            },
            _ => {}
        }
        self.list_state.select(Some(0));
    }

    fn cycle_secondary_filter(&mut self) {
        match self.ops.store().view {
            ViewMode::CenterDetail => {
                let Some(center) = self.ops.store().selected_center() else { return };
                let mut categories: Vec<&str> = center.inventory.iter().map(|i| i.category.as_str()).collect();
                categories.sort_unstable();
                categories.dedup();
                let next = match &self.inventory_query.category {
                    None => categories.first().map(|c| c.to_string()),
                    Some(current) => categories
                        .iter()
                        .position(|c| *c == current.as_str())
                        .and_then(|pos| categories.get(pos + 1))
                        .map(|c| c.to_string()),
                };
                self.inventory_query.category = next;
            }
            ViewMode::Dashboard => match self.focus {
                Focus::Disasters => {
                    self.disaster_query.disaster_type =
                        cycle_filter(self.disaster_query.disaster_type, &DisasterType::ALL);
                }
                Focus::Alerts => {
                    self.alert_query.status = cycle_filter(
                        self.alert_query.status,
                        &[AlertStatus::Active, AlertStatus::AwaitingResolution, AlertStatus::Resolved],
                    );
                }
                Focus::Centers | Focus::Shipments => {}
            },
            _ => {}
        }
        self.list_state.select(Some(0));
        self.detail_state.select(Some(0));
    }

    fn selected_alert_id(&self) -> Option<Id> {
        if self.focus != Focus::Alerts {
            return None;
        }
        let idx = self.list_state.selected()?;
        self.alert_query
            .apply(&self.ops.store().alerts)
            .get(idx)
            .map(|a| a.id.clone())
    }

    fn alert_action(&mut self, kind: ActionKind) {
        let Some(id) = self.selected_alert_id() else { return };
        let rec = self
            .ops
            .store()
            .alert(&id)
            .and_then(|a| a.recommendations.iter().position(|r| r.offers(kind)));
        let result = match rec {
            Some(idx) => self.ops.perform_action(&id, idx, kind),
            None => Err(OpsError::MissingLink(format!("{} is not offered on {}", kind.label(), id))),
        };
        self.run_intent(result);
    }

    fn list_len(&self) -> usize {
        let store = self.ops.store();
        match store.view {
            ViewMode::Dashboard => match self.focus {
                Focus::Disasters => self.disaster_query.apply(&store.disasters).len(),
                Focus::Centers => store.centers.len(),
                Focus::Shipments => self.shipment_query.apply(&store.shipments).len(),
                Focus::Alerts => self.alert_query.apply(&store.alerts).len(),
            },
            ViewMode::DisasterDetail => store.selected_disaster().map_or(0, |d| d.needs.len()),
            ViewMode::CenterDetail => store
                .selected_center()
                .map_or(0, |c| self.inventory_query.apply(&c.inventory).len()),
            ViewMode::ShipmentDetail => store.selected_shipment().map_or(0, |s| s.timeline.len()),
            ViewMode::RouteDetail => 0,
        }
    }

    fn active_state(&mut self) -> &mut ListState {
        if self.ops.store().view == ViewMode::Dashboard {
            &mut self.list_state
        } else {
            &mut self.detail_state
        }
    }

    fn navigate_up(&mut self) {
        let state = self.active_state();
        let i = state.selected().unwrap_or(0);
        state.select(Some(i.saturating_sub(1)));
    }

    fn navigate_down(&mut self) {
        let max = self.list_len().saturating_sub(1);
        let state = self.active_state();
        let i = state.selected().unwrap_or(0);
        if i < max {
            state.select(Some(i + 1));
        }
    }

    fn handle_enter(&mut self) {
        if self.ops.store().view != ViewMode::Dashboard {
            return;
        }
        let Some(idx) = self.list_state.selected() else { return };
        let store = self.ops.store();

        let result = match self.focus {
            Focus::Disasters => {
                let Some(id) = self.disaster_query.apply(&store.disasters).get(idx).map(|d| d.id.clone()) else {
                    return;
                };
                self.ops.select_disaster(&id)
            }
            Focus::Centers => {
                let Some(id) = store.centers.get(idx).map(|c| c.id.clone()) else { return };
                self.ops.select_center(&id)
            }
            Focus::Shipments => {
                let Some(id) = self.shipment_query.apply(&store.shipments).get(idx).map(|s| s.id.clone()) else {
                    return;
                };
                self.ops.select_shipment(&id)
            }
            Focus::Alerts => {
                let Some(link) = self.alert_query.apply(&store.alerts).get(idx).and_then(|a| a.link.clone()) else {
                    return;
                };
                match link {
                    AlertLink::Disaster(id) => self.ops.select_disaster(&id),
                    AlertLink::Shipment(id) => self.ops.select_shipment(&id),
                    AlertLink::Inventory(id) => self.ops.select_center(&id),
                }
            }
        };
        self.run_intent(result);
    }

    fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Disasters => Focus::Centers,
            Focus::Centers => Focus::Shipments,
            Focus::Shipments => Focus::Alerts,
            Focus::Alerts => Focus::Disasters,
        };
        self.list_state.select(Some(0));
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = create_main_layout(frame.area());
        self.render_header(frame, chunks[0]);

        match self.ops.store().view {
            ViewMode::Dashboard => self.render_dashboard(frame, chunks[1]),
            ViewMode::DisasterDetail => self.render_disaster(frame, chunks[1]),
            ViewMode::CenterDetail => self.render_center(frame, chunks[1]),
            ViewMode::ShipmentDetail => self.render_shipment(frame, chunks[1]),
            ViewMode::RouteDetail => self.render_route(frame, chunks[1]),
        }

        self.render_status_bar(frame, chunks[2]);
        self.render_notifications(frame, chunks[1]);

        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let store = self.ops.store();
        let elapsed = self.ops.now().as_secs();
        let header = Line::from(vec![
            Span::styled(SMALL_LOGO, Style::default().fg(Color::Black).bg(self.theme.accent).add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("{} disasters", store.disasters.len()),
                Style::default().fg(self.theme.alert),
            ),
            Span::raw(" │ "),
            Span::styled(
                format!("{} open alerts", store.open_alerts()),
                Style::default().fg(self.theme.warning),
            ),
            Span::raw(" │ "),
            Span::styled(
                format!("{} shipments", store.shipments.len()),
                Style::default().fg(self.theme.success),
            ),
            Span::raw(" │ "),
            Span::styled(
                format!("{} UTC  +{:02}:{:02}", Utc::now().format("%H:%M"), elapsed / 60, elapsed % 60),
                Style::default().fg(self.theme.fg),
            ),
        ]);
        let paragraph = Paragraph::new(header).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.border)),
        );
        frame.render_widget(paragraph, area);
    }

    fn render_dashboard(&mut self, frame: &mut Frame, area: Rect) {
        let sidebar = !self.ops.store().sidebar_collapsed;
        let alerts = !self.ops.store().alerts_collapsed;
        let columns = create_dashboard_layout(area, sidebar, alerts);

        if sidebar {
            self.render_sidebar(frame, columns[0]);
        }

        let center = create_center_layout(columns[1]);
        if let Some(map) = &self.map {
            map.render(frame, center[0], &self.theme, "Operations Map");
        }
        self.render_metrics(frame, center[1]);

        if alerts {
            self.render_alerts(frame, columns[2]);
        }
    }

    fn render_sidebar(&mut self, frame: &mut Frame, area: Rect) {
        let store = self.ops.store();
        let focus = if self.focus == Focus::Alerts { Focus::Disasters } else { self.focus };
        let items: Vec<ListItem> = match focus {
            Focus::Disasters => self
                .disaster_query
                .apply(&store.disasters)
                .into_iter()
                .map(|d| {
                    ListItem::new(vec![
                        Line::from(vec![
                            Span::styled(
                                format!("{} ", d.severity.symbol()),
                                Style::default().fg(severity_color(&d.severity)),
                            ),
                            Span::styled(d.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                        ]),
                        Line::from(Span::styled(
                            format!("   {} · {:.0}% matched", d.location.name, d.match_rate()),
                            Style::default().fg(Color::Gray),
                        )),
                    ])
                })
                .collect(),
            Focus::Centers => store
                .centers
                .iter()
                .map(|c| {
                    ListItem::new(vec![
                        Line::from(Span::styled(c.name.clone(), Style::default().add_modifier(Modifier::BOLD))),
                        Line::from(Span::styled(
                            format!("   {} units · {}", c.total_items, c.status),
                            Style::default().fg(stock_color(&c.status)),
                        )),
                    ])
                })
                .collect(),
            Focus::Shipments | Focus::Alerts => self
                .shipment_query
                .apply(&store.shipments)
                .into_iter()
                .map(|s| {
                    ListItem::new(vec![
                        Line::from(vec![
                            Span::styled(s.id.to_string(), Style::default().add_modifier(Modifier::BOLD)),
                            Span::raw(" "),
                            Span::styled(s.status.label(), Style::default().fg(shipment_color(&s.status))),
                        ]),
                        Line::from(Span::styled(
                            format!("   → {}", s.destination),
                            Style::default().fg(Color::Gray),
                        )),
                    ])
                })
                .collect(),
        };

        let title = format!("{} ({})", focus.title(), self.filter_hint(focus));
        let highlight = if self.focus == focus {
            Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let list = List::new(items)
            .block(styled_block(&title, &self.theme))
            .highlight_style(highlight)
            .highlight_symbol("▶ ");

        if self.focus == focus {
            frame.render_stateful_widget(list, area, &mut self.list_state);
        } else {
            frame.render_widget(list, area);
        }
    }

    fn filter_hint(&self, focus: Focus) -> String {
        let (search, filter) = match focus {
            Focus::Disasters => {
                let q = &self.disaster_query;
                let parts: Vec<String> = q
                    .disaster_type
                    .map(|t| t.to_string())
                    .into_iter()
                    .chain(q.severity.map(|s| s.to_string()))
                    .collect();
                (&q.search, (!parts.is_empty()).then(|| parts.join(" ")))
            }
            Focus::Shipments => (
                &self.shipment_query.search,
                self.shipment_query.status.map(|s| s.to_string()),
            ),
            Focus::Alerts => {
                let q = &self.alert_query;
                let parts: Vec<String> = q
                    .urgency
                    .map(|u| u.to_string())
                    .into_iter()
                    .chain(q.status.map(|s| s.to_string()))
                    .collect();
                (&q.search, (!parts.is_empty()).then(|| parts.join(" ")))
            }
            Focus::Centers => return "all".to_string(),
        };
        match (search.is_empty(), filter) {
            (true, None) => "all".to_string(),
            (true, Some(f)) => f,
            (false, None) => format!("\"{}\"", search),
            (false, Some(f)) => format!("{} \"{}\"", f, search),
        }
    }

    fn render_metrics(&self, frame: &mut Frame, area: Rect) {
        let m = &self.ops.store().metrics;
        let text = vec![
            Line::from(vec![
                Span::styled("People helped    ", Style::default().fg(Color::Gray)),
                Span::styled(m.people_helped.to_string(), Style::default().fg(self.theme.success).add_modifier(Modifier::BOLD)),
            ]),
            Line::from(vec![
                Span::styled("Waste prevented  ", Style::default().fg(Color::Gray)),
                Span::styled(format!("{} kg", m.waste_prevented_kg), Style::default().fg(self.theme.accent)),
            ]),
            Line::from(vec![
                Span::styled("Cost saved       ", Style::default().fg(Color::Gray)),
                Span::styled(format!("${}", m.cost_saved), Style::default().fg(self.theme.warning)),
            ]),
        ];
        frame.render_widget(Paragraph::new(text).block(styled_block("Impact", &self.theme)), area);
    }

    fn render_alerts(&mut self, frame: &mut Frame, area: Rect) {
        let store = self.ops.store();
        let items: Vec<ListItem> = self
            .alert_query
            .apply(&store.alerts)
            .into_iter()
            .map(|a| {
                let mut lines = vec![
                    Line::from(vec![
                        Span::styled(
                            format!("{} ", a.urgency),
                            Style::default().fg(urgency_color(&a.urgency)).add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(a.status.label(), Style::default().fg(Color::Gray)),
                    ]),
                    Line::from(a.message.clone()),
                ];
                for rec in &a.recommendations {
                    let keys: Vec<&str> = rec
                        .actions
                        .iter()
                        .map(|act| match act.kind {
                            ActionKind::Approve => "[a]pprove",
                            ActionKind::ViewRoute => "[v]iew",
                            ActionKind::Contact => "[c]ontact",
                            ActionKind::ReportIssue => "[x]issue",
                        })
                        .collect();
                    lines.push(Line::from(Span::styled(
                        format!("  ↳ {}", rec.summary),
                        Style::default().fg(self.theme.accent),
                    )));
                    lines.push(Line::from(Span::styled(
                        format!("    {}", keys.join(" ")),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
                ListItem::new(lines)
            })
            .collect();

        let title = format!("Alerts ({})", self.filter_hint(Focus::Alerts));
        let list = List::new(items)
            .block(styled_block(&title, &self.theme))
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("▶ ");

        if self.focus == Focus::Alerts {
            frame.render_stateful_widget(list, area, &mut self.list_state);
        } else {
            frame.render_widget(list, area);
        }
    }

    fn render_disaster(&mut self, frame: &mut Frame, area: Rect) {
        let Some(d) = self.ops.store().selected_disaster() else { return };
        let chunks = create_detail_layout(area);

        let summary = vec![
            Line::from(vec![
                Span::styled(
                    format!("{} {} ", d.disaster_type.icon(), d.name),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(d.severity.to_string(), Style::default().fg(severity_color(&d.severity))),
            ]),
            Line::from(format!("{} · {} · {} affected", d.disaster_type, d.location.name, d.affected_population)),
            Line::from(format!(
                "Matched {} of {} units ({:.1}%)",
                d.total_matched(),
                d.total_requested(),
                d.match_rate()
            )),
            Line::from(Span::styled("[m] run auto-matching  [Esc] back", Style::default().fg(Color::DarkGray))),
        ];
        frame.render_widget(
            Paragraph::new(summary).block(styled_block("Disaster", &self.theme)),
            chunks[0],
        );

        let block = styled_block("Needs", &self.theme);
        let inner = block.inner(chunks[1]);
        frame.render_widget(block, chunks[1]);

        let selected = self.detail_state.selected().unwrap_or(0);
        let per_row = 3u16;
        let visible = (inner.height / per_row).max(1) as usize;
        let start = selected.saturating_sub(visible - 1);
        for (row, (i, need)) in d.needs.iter().enumerate().skip(start).take(visible).enumerate() {
            let y = inner.y + row as u16 * per_row;
            let label = format!(
                "{}{} · {} ({}/{}) [{}]",
                if i == selected { "▶ " } else { "  " },
                need.item,
                need.category,
                need.matched(),
                need.requested,
                need.priority
            );
            let bar_area = Rect::new(inner.x, y, inner.width, 2u16.min(inner.height.saturating_sub(row as u16 * per_row)));
            frame.render_widget(
                ProgressBar::new(&label, need.percent()).color(priority_color(&need.priority)),
                bar_area,
            );
        }

        if let Some(run) = self.ops.matching() {
            let popup = centered_rect(60, 40, area);
            let mut lines = vec![
                format!("Stage: {}", run.stage_label()),
                format!("Batch {} · overall {:.0}%", run.batch() + 1, run.progress()),
                String::new(),
            ];
            for item in run.items() {
                if let Some(need) = d.needs.get(item.need) {
                    let mark = if item.done { "✔" } else { "…" };
                    lines.push(format!("{} {:<24} {:>3.0}%", mark, need.item, item.percent));
                }
            }
            let color = if run.phase() == RunPhase::Complete {
                self.theme.success
            } else {
                self.theme.accent
            };
            frame.render_widget(Clear, popup);
            frame.render_widget(
                DramaticBox::new("AUTO-MATCHING").content(lines).border_color(color),
                popup,
            );
        }
    }

    fn render_center(&mut self, frame: &mut Frame, area: Rect) {
        let Some(c) = self.ops.store().selected_center() else { return };
        let chunks = create_detail_layout(area);

        let summary = vec![
            Line::from(Span::styled(c.name.clone(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(c.location.name.clone()),
            Line::from(vec![
                Span::raw(format!("{} units in {} categories · ", c.total_items, c.categories)),
                Span::styled(c.status.to_string(), Style::default().fg(stock_color(&c.status))),
            ]),
            Line::from(Span::styled(
                "[s] sort  [o] order  [f] condition  [g] category  [/] search  [i] receive donation",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        frame.render_widget(
            Paragraph::new(summary).block(styled_block("Operational Center", &self.theme)),
            chunks[0],
        );

        let q = &self.inventory_query;
        let rows: Vec<Row> = q
            .apply(&c.inventory)
            .into_iter()
            .map(|i| {
                Row::new(vec![
                    Cell::from(i.item.clone()),
                    Cell::from(i.category.clone()),
                    Cell::from(i.quantity.to_string()),
                    Cell::from(i.partner.clone()),
                    Cell::from(i.received.to_string()),
                    Cell::from(i.storage.clone()),
                    Cell::from(i.condition.to_string()),
                ])
            })
            .collect();
        let header_cell = |name: &'static str, col: InventorySort| {
            if q.sort == col {
                format!("{} {}", name, q.direction.arrow())
            } else {
                name.to_string()
            }
        };
        let header = Row::new(vec![
            header_cell("Item", InventorySort::Item),
            "Category".to_string(),
            header_cell("Qty", InventorySort::Quantity),
            "Partner".to_string(),
            header_cell("Received", InventorySort::Received),
            "Storage".to_string(),
            "Condition".to_string(),
        ])
        .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD));

        let filters: Vec<String> = q
            .category
            .clone()
            .into_iter()
            .chain(q.condition.map(|c| c.to_string()))
            .chain((!q.search.is_empty()).then(|| format!("\"{}\"", q.search)))
            .collect();
        let title = if filters.is_empty() {
            "Inventory".to_string()
        } else {
            format!("Inventory ({})", filters.join(" "))
        };
        let table = Table::new(
            rows,
            [
                Constraint::Percentage(22),
                Constraint::Percentage(12),
                Constraint::Percentage(9),
                Constraint::Percentage(15),
                Constraint::Percentage(14),
                Constraint::Percentage(14),
                Constraint::Percentage(14),
            ],
        )
        .header(header)
        .block(styled_block(&title, &self.theme))
        .row_highlight_style(Style::default().bg(Color::DarkGray));

        let mut state = ratatui::widgets::TableState::default();
        state.select(self.detail_state.selected());
        frame.render_stateful_widget(table, chunks[1], &mut state);
    }

    fn render_shipment(&mut self, frame: &mut Frame, area: Rect) {
        let Some(s) = self.ops.store().selected_shipment() else { return };
        let chunks = create_detail_layout(area);

        let summary = vec![
            Line::from(vec![
                Span::styled(format!("{} ", s.id), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(s.status.label(), Style::default().fg(shipment_color(&s.status))),
            ]),
            Line::from(format!("{} → {}", s.origin, s.destination)),
            Line::from(format!(
                "ETA {} · now at {} · {} units",
                s.eta.format("%d %b %H:%M"),
                s.current_location.as_deref().unwrap_or("unknown"),
                s.total_units()
            )),
            Line::from(Span::styled("[x] report issue  [Esc] back", Style::default().fg(Color::DarkGray))),
        ];
        frame.render_widget(
            Paragraph::new(summary).block(styled_block("Shipment", &self.theme)),
            chunks[0],
        );

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[1]);

        let manifest: Vec<ListItem> = s
            .manifest
            .iter()
            .map(|l| ListItem::new(format!("{} {} {} · {}", l.quantity, l.unit, l.item, l.donor)))
            .collect();
        frame.render_widget(List::new(manifest).block(styled_block("Manifest", &self.theme)), body[0]);

        let timeline: Vec<ListItem> = s
            .timeline
            .iter()
            .map(|e| {
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(e.timestamp.format("%d %b %H:%M ").to_string(), Style::default().fg(Color::Gray)),
                        Span::styled(e.status.label(), Style::default().fg(shipment_color(&e.status))),
                    ]),
                    Line::from(format!("  {} · {}", e.location, e.note)),
                ])
            })
            .collect();
        let list = List::new(timeline)
            .block(styled_block("Timeline", &self.theme))
            .highlight_style(Style::default().bg(Color::DarkGray));
        frame.render_stateful_widget(list, body[1], &mut self.detail_state);
    }

    fn render_route(&self, frame: &mut Frame, area: Rect) {
        let Some(r) = self.ops.store().selected_route() else { return };
        let chunks = create_detail_layout(area);

        let state = if r.confirmed {
            Span::styled("CONFIRMED", Style::default().fg(self.theme.success))
        } else {
            Span::styled("PROPOSED", Style::default().fg(self.theme.warning))
        };
        let summary = vec![
            Line::from(vec![
                Span::styled(format!("{} ", r.id), Style::default().add_modifier(Modifier::BOLD)),
                state,
            ]),
            Line::from(format!("{} → {}", r.origin.name, r.destination.name)),
            Line::from(format!("~{:.1} h · {} priority", r.estimated_hours, r.priority)),
        ];
        frame.render_widget(
            Paragraph::new(summary).block(styled_block("Route", &self.theme)),
            chunks[0],
        );

        let mut lines: Vec<Line> = r
            .resources
            .iter()
            .map(|l| Line::from(format!("• {} {} {}", l.quantity, l.unit, l.resource_type)))
            .collect();
        if let Some(insight) = &r.insight {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Model confidence: {}%", r.confidence_percent().unwrap_or(0)),
                Style::default().fg(self.theme.accent),
            )));
            for a in &insight.advantages {
                lines.push(Line::from(Span::styled(format!("  + {}", a), Style::default().fg(self.theme.success))));
            }
            for risk in &insight.risks {
                lines.push(Line::from(Span::styled(format!("  ! {}", risk), Style::default().fg(self.theme.alert))));
            }
        }
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(styled_block("Resources", &self.theme)),
            chunks[1],
        );
    }

    fn render_notifications(&self, frame: &mut Frame, area: Rect) {
        let notes: Vec<_> = self.ops.store().notifications.iter().rev().take(3).collect();
        if notes.is_empty() {
            return;
        }
        let width = (area.width / 2).max(20).min(area.width);
        let height = notes.len() as u16 + 2;
        let popup = Rect::new(area.x + area.width - width, area.y, width, height.min(area.height));
        frame.render_widget(Clear, popup);
        let block = styled_block("Notifications", &self.theme);
        let inner = block.inner(popup);
        frame.render_widget(block, popup);
        for (i, n) in notes.into_iter().enumerate() {
            if (i as u16) < inner.height {
                let line = Rect::new(inner.x, inner.y + i as u16, inner.width, 1);
                frame.render_widget(NotificationLine::new(n), line);
            }
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let text = match self.input_mode {
            InputMode::Normal => {
                let view = match self.ops.store().view {
                    ViewMode::Dashboard => format!("Dashboard · {}", self.focus.title()),
                    ViewMode::DisasterDetail => "Disaster".to_string(),
                    ViewMode::CenterDetail => "Center".to_string(),
                    ViewMode::ShipmentDetail => "Shipment".to_string(),
                    ViewMode::RouteDetail => "Route".to_string(),
                };
                format!(" {} │ ?: help │ Tab: switch │ Enter: open │ Esc: back │ q: quit", view)
            }
            InputMode::Search => format!(" Search: {}█", self.input_buffer),
            InputMode::Donation => format!(" Donation (category, item, quantity, partner): {}█", self.input_buffer),
            InputMode::IssueReport => format!(" Issue description: {}█", self.input_buffer),
        };
        let status = Paragraph::new(text)
            .style(Style::default().fg(self.theme.fg))
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(self.theme.border)));
        frame.render_widget(status, area);
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        let area = centered_rect(70, 80, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(HELP_TEXT)
            .style(Style::default().fg(self.theme.accent))
            .alignment(Alignment::Center);
        frame.render_widget(help, area);
    }
}

/// Parse `category, item, quantity, partner` into a fresh stock line
pub fn parse_donation(text: &str) -> Option<InventoryItem> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    let [category, item, quantity, partner] = parts.as_slice() else {
        return None;
    };
    if category.is_empty() || item.is_empty() || partner.is_empty() {
        return None;
    }
    let quantity: u32 = quantity.parse().ok().filter(|q| *q > 0)?;
    Some(InventoryItem {
        id: Id::new("INV"),
        category: category.to_string(),
        item: item.to_string(),
        quantity,
        partner: partner.to_string(),
        received: Utc::now().date_naive(),
        storage: "Receiving dock".to_string(),
        condition: ItemCondition::New,
    })
}
