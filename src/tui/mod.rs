//! Terminal User Interface
//!
//! Operations console for the relief desk using ratatui

pub mod app;
pub mod map;
pub mod widgets;

pub use app::App;

use crate::data::{AlertUrgency, InventoryStatus, Priority, Severity, ShipmentStatus};
use crate::ops::notifications::NotificationKind;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
};

/// Color scheme for the console
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub alert: Color,
    pub success: Color,
    pub warning: Color,
    pub info: Color,
    pub border: Color,
    pub header: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            accent: Color::Cyan,
            alert: Color::Red,
            success: Color::Green,
            warning: Color::Yellow,
            info: Color::Blue,
            border: Color::DarkGray,
            header: Color::Magenta,
        }
    }
}

pub fn severity_color(severity: &Severity) -> Color {
    match severity {
        Severity::Low => Color::Blue,
        Severity::Medium => Color::Yellow,
        Severity::High => Color::Red,
        Severity::Critical => Color::Magenta,
    }
}

pub fn priority_color(priority: &Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Gray,
    }
}

pub fn stock_color(status: &InventoryStatus) -> Color {
    match status {
        InventoryStatus::Adequate => Color::Green,
        InventoryStatus::Low => Color::Yellow,
        InventoryStatus::Critical => Color::Red,
    }
}

pub fn shipment_color(status: &ShipmentStatus) -> Color {
    match status {
        ShipmentStatus::Loading => Color::Blue,
        ShipmentStatus::InTransit => Color::Cyan,
        ShipmentStatus::Delayed => Color::Yellow,
        ShipmentStatus::Delivered => Color::Green,
        ShipmentStatus::Exception => Color::Red,
    }
}

pub fn urgency_color(urgency: &AlertUrgency) -> Color {
    match urgency {
        AlertUrgency::Urgent => Color::Red,
        AlertUrgency::Info => Color::Blue,
    }
}

pub fn notification_color(kind: &NotificationKind) -> Color {
    match kind {
        NotificationKind::Info => Color::Cyan,
        NotificationKind::Success => Color::Green,
        NotificationKind::Warning => Color::Yellow,
    }
}

/// Create a styled border block
pub fn styled_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
}

/// Header title
pub const SMALL_LOGO: &str = " RELIEF OPS ";

/// Help text
pub const HELP_TEXT: &str = r#"
╔═══════════════════════════════════════════════════════════════╗
║                       CONTROLS                                ║
╠═══════════════════════════════════════════════════════════════╣
║  ↑/↓   Navigate lists                                         ║
║  Tab   Switch dashboard list                                  ║
║  Enter Open selected item                                     ║
║  Esc   Back to dashboard / cancel input                       ║
║  /     Search the focused list                                ║
║  f     Cycle filter (severity, status, urgency, condition)    ║
║  g     Cycle filter (type, alert status, category)            ║
║  o     Flip order (shipments by ETA, inventory)               ║
║  [ ]   Collapse sidebar / alerts panel                        ║
║  d     Dismiss newest notification                            ║
║  ?     Toggle this help                                       ║
║  q     Quit                                                   ║
╠═══════════════════════════════════════════════════════════════╣
║                      ALERT ACTIONS                            ║
╠═══════════════════════════════════════════════════════════════╣
║  a     Approve recommendation                                 ║
║  v     View proposed route                                    ║
║  c     Contact partner                                        ║
║  x     Report issue                                           ║
║  k     Acknowledge        r  Resolve                          ║
╠═══════════════════════════════════════════════════════════════╣
║                      DETAIL SCREENS                           ║
╠═══════════════════════════════════════════════════════════════╣
║  m     Run auto-matching (disaster)                           ║
║  s     Sort column (center inventory)                         ║
║  i     Receive donation (center inventory)                    ║
║  x     Report issue (shipment)                                ║
╚═══════════════════════════════════════════════════════════════╝
"#;

/// Header, content, status bar
pub fn create_main_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),   // Header
            Constraint::Min(10),     // Main content
            Constraint::Length(3),   // Status bar
        ])
        .split(area)
        .to_vec()
}

/// Sidebar + map + alerts; collapsed panels get no width
pub fn create_dashboard_layout(area: Rect, sidebar: bool, alerts: bool) -> Vec<Rect> {
    let side = if sidebar { Constraint::Percentage(28) } else { Constraint::Length(0) };
    let right = if alerts { Constraint::Percentage(30) } else { Constraint::Length(0) };
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([side, Constraint::Min(20), right])
        .split(area)
        .to_vec()
}

/// Map on top, metrics strip below
pub fn create_center_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),      // Map
            Constraint::Length(5),   // Impact metrics
        ])
        .split(area)
        .to_vec()
}

/// Detail screens: summary above, body below
pub fn create_detail_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Min(6),
        ])
        .split(area)
        .to_vec()
}

/// Centered popup area taking the given percentages
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
