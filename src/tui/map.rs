//! World map view
//!
//! Markers and route lines are derived from the store and cached; the
//! cache is rebuilt only when the store revision moves.

use crate::ops::Store;
use crate::tui::{severity_color, stock_color, Theme};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Span,
    widgets::canvas::{Canvas, Line as CanvasLine, Map, MapResolution},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Disaster,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub lng: f64,
    pub lat: f64,
    pub symbol: &'static str,
    pub color: Color,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub color: Color,
}

/// Marker layer mounted while the dashboard is on screen
#[derive(Debug)]
pub struct MapLayer {
    revision: u64,
    markers: Vec<Marker>,
    polylines: Vec<Polyline>,
    rebuilds: u32,
    pub show_labels: bool,
}

impl MapLayer {
    pub fn mount(store: &Store) -> Self {
        let mut layer = Self {
            revision: store.revision(),
            markers: Vec::new(),
            polylines: Vec::new(),
            rebuilds: 0,
            show_labels: true,
        };
        layer.rebuild(store);
        layer
    }

    /// Rebuild if the store changed since the last sync. Returns whether
    /// a rebuild happened.
    pub fn sync(&mut self, store: &Store) -> bool {
        if store.revision() == self.revision {
            return false;
        }
        self.revision = store.revision();
        self.rebuild(store);
        true
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn polylines(&self) -> &[Polyline] {
        &self.polylines
    }

    /// How many times markers were rebuilt since mount (the mount counts)
    pub fn rebuilds(&self) -> u32 {
        self.rebuilds
    }

    fn rebuild(&mut self, store: &Store) {
        self.rebuilds += 1;
        self.markers.clear();
        self.polylines.clear();

        for d in &store.disasters {
            self.markers.push(Marker {
                kind: MarkerKind::Disaster,
                lng: d.location.lng,
                lat: d.location.lat,
                symbol: d.disaster_type.icon(),
                color: severity_color(&d.severity),
                label: format!("{} {:.0}%", d.name, d.match_rate()),
            });
        }
        for c in &store.centers {
            self.markers.push(Marker {
                kind: MarkerKind::Center,
                lng: c.location.lng,
                lat: c.location.lat,
                symbol: "■",
                color: stock_color(&c.status),
                label: c.name.clone(),
            });
        }
        for r in &store.routes {
            self.polylines.push(Polyline {
                from: (r.origin.lng, r.origin.lat),
                to: (r.destination.lng, r.destination.lat),
                color: if r.confirmed { Color::Green } else { Color::Yellow },
            });
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme, title: &str) {
        let block = crate::tui::styled_block(title, theme);
        let show_labels = self.show_labels;
        let canvas = Canvas::default()
            .block(block)
            .x_bounds([-180.0, 180.0])
            .y_bounds([-90.0, 90.0])
            .paint(|ctx| {
                ctx.draw(&Map {
                    resolution: MapResolution::High,
                    color: Color::DarkGray,
                });
                ctx.layer();
                for line in &self.polylines {
                    ctx.draw(&CanvasLine::new(line.from.0, line.from.1, line.to.0, line.to.1, line.color));
                }
                for m in &self.markers {
                    ctx.print(m.lng, m.lat, Span::styled(m.symbol, Style::default().fg(m.color)));
                    if show_labels && m.kind == MarkerKind::Disaster {
                        ctx.print(
                            m.lng + 2.0,
                            m.lat,
                            Span::styled(m.label.clone(), Style::default().fg(m.color)),
                        );
                    }
                }
            });
        frame.render_widget(canvas, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::data::Id;
    use crate::ops::Operations;

    #[test]
    fn mount_builds_markers_for_every_entity() {
        let ops = Operations::new(Config {
            seed: Some(1),
            ..Config::default()
        });
        let layer = MapLayer::mount(ops.store());
        let store = ops.store();
        assert_eq!(layer.markers().len(), store.disasters.len() + store.centers.len());
        assert_eq!(layer.polylines().len(), store.routes.len());
        assert_eq!(layer.rebuilds(), 1);
    }

    #[test]
    fn sync_only_rebuilds_after_store_changes() {
        let mut ops = Operations::new(Config {
            seed: Some(1),
            ..Config::default()
        });
        let mut layer = MapLayer::mount(ops.store());
        assert!(!layer.sync(ops.store()));

        ops.report_shipment_issue(&Id::from("SHP-1045"), "forklift down").unwrap();
        assert!(layer.sync(ops.store()));
        assert!(!layer.sync(ops.store()));
        assert_eq!(layer.rebuilds(), 2);
    }
}
