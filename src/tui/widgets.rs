//! Custom widgets for the console

use crate::ops::notifications::{Notification, NotificationKind};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Labelled fill bar for match progress. Low fill is the alarming end.
pub struct ProgressBar {
    percent: f64,
    label: String,
    color: Color,
    warning_below: f64,
    danger_below: f64,
}

impl ProgressBar {
    pub fn new(label: &str, percent: f64) -> Self {
        Self {
            percent: percent.clamp(0.0, 100.0),
            label: label.to_string(),
            color: Color::Green,
            warning_below: 60.0,
            danger_below: 30.0,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn warning_below(mut self, threshold: f64) -> Self {
        self.warning_below = threshold;
        self
    }

    pub fn danger_below(mut self, threshold: f64) -> Self {
        self.danger_below = threshold;
        self
    }

    fn bar_color(&self) -> Color {
        if self.percent < self.danger_below {
            Color::Red
        } else if self.percent < self.warning_below {
            Color::Yellow
        } else {
            self.color
        }
    }
}

/// Cells filled for `percent` on a bar `width` cells wide
pub fn filled_cells(percent: f64, width: u16) -> u16 {
    ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as u16
}

impl Widget for ProgressBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 1 {
            return;
        }
        let color = self.bar_color();

        let label = format!("{}: {:.0}%", self.label, self.percent);
        buf.set_stringn(area.x, area.y, &label, area.width as usize, Style::default().fg(color));

        if area.height > 1 {
            let bar_y = area.y + 1;
            let inner = area.width - 2;
            let filled = filled_cells(self.percent, inner);
            buf.set_string(area.x, bar_y, "[", Style::default());
            buf.set_string(area.x + area.width - 1, bar_y, "]", Style::default());

            for x in 0..filled {
                buf.set_string(area.x + 1 + x, bar_y, "█", Style::default().fg(color));
            }
            for x in filled..inner {
                buf.set_string(area.x + 1 + x, bar_y, "░", Style::default().fg(Color::DarkGray));
            }
        }
    }
}

/// One-line notification popup
pub struct NotificationLine<'a> {
    notification: &'a Notification,
}

impl<'a> NotificationLine<'a> {
    pub fn new(notification: &'a Notification) -> Self {
        Self { notification }
    }
}

impl Widget for NotificationLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let n = self.notification;
        let color = crate::tui::notification_color(&n.kind);
        let symbol = match n.kind {
            NotificationKind::Info => "ℹ",
            NotificationKind::Success => "✔",
            NotificationKind::Warning => "⚠",
        };
        let pin = if n.auto_close { "" } else { " [pinned]" };
        let text = format!("{} {}{}", symbol, n.message, pin);
        buf.set_stringn(area.x, area.y, &text, area.width as usize, Style::default().fg(color));
    }
}

/// Double-line framed box for the matching overlay
pub struct DramaticBox {
    title: String,
    content: Vec<String>,
    border_color: Color,
}

impl DramaticBox {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            content: Vec::new(),
            border_color: Color::Cyan,
        }
    }

    pub fn content(mut self, lines: Vec<String>) -> Self {
        self.content = lines;
        self
    }

    pub fn border_color(mut self, color: Color) -> Self {
        self.border_color = color;
        self
    }
}

impl Widget for DramaticBox {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height < 3 {
            return;
        }
        let style = Style::default().fg(self.border_color);

        buf.set_string(area.x, area.y, "╔", style);
        for x in 1..area.width - 1 {
            buf.set_string(area.x + x, area.y, "═", style);
        }
        buf.set_string(area.x + area.width - 1, area.y, "╗", style);

        let title = format!(" {} ", self.title);
        let title_start = (area.width as usize).saturating_sub(title.chars().count()) / 2;
        buf.set_stringn(
            area.x + title_start as u16,
            area.y,
            &title,
            area.width as usize - title_start,
            style,
        );

        for y in 1..area.height - 1 {
            buf.set_string(area.x, area.y + y, "║", style);
            buf.set_string(area.x + area.width - 1, area.y + y, "║", style);
        }

        buf.set_string(area.x, area.y + area.height - 1, "╚", style);
        for x in 1..area.width - 1 {
            buf.set_string(area.x + x, area.y + area.height - 1, "═", style);
        }
        buf.set_string(area.x + area.width - 1, area.y + area.height - 1, "╝", style);

        for (i, line) in self.content.iter().enumerate() {
            if i as u16 + 1 < area.height - 1 {
                buf.set_stringn(
                    area.x + 2,
                    area.y + 1 + i as u16,
                    line,
                    area.width as usize - 4,
                    Style::default().fg(Color::White),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_cells_scales_and_clamps() {
        assert_eq!(filled_cells(0.0, 20), 0);
        assert_eq!(filled_cells(50.0, 20), 10);
        assert_eq!(filled_cells(100.0, 20), 20);
        assert_eq!(filled_cells(140.0, 20), 20);
    }

    #[test]
    fn progress_bar_renders_label_and_fill() {
        let area = Rect::new(0, 0, 12, 2);
        let mut buf = Buffer::empty(area);
        ProgressBar::new("Water", 50.0).render(area, &mut buf);

        let top: String = (0..area.width).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert!(top.starts_with("Water: 50%"));
        assert_eq!(buf[(0, 1)].symbol(), "[");
        assert_eq!(buf[(1, 1)].symbol(), "█");
        assert_eq!(buf[(10, 1)].symbol(), "░");
    }

    #[test]
    fn dramatic_box_survives_tiny_area() {
        let area = Rect::new(0, 0, 3, 2);
        let mut buf = Buffer::empty(area);
        DramaticBox::new("MATCHING").content(vec!["x".into()]).render(area, &mut buf);
    }
}
