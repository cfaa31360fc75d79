//! Relief Ops: a terminal operations console for disaster-relief logistics
//!
//! Tracks disasters, operational centers, shipments, routes and alerts,
//! with timers that simulate live updates on top of static fixtures.
//!
//! # Architecture
//!
//! - `data` - Entities: disasters and needs, centers, shipments, alerts, routes
//! - `ops` - The orchestrator, its timer queue and the simulations it hosts
//! - `tui` - Terminal user interface with ratatui
//! - `config` - TOML configuration with defaults

pub mod config;
pub mod data;
pub mod ops;
pub mod tui;

pub use config::Config;
pub use data::*;
pub use ops::Operations;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for application-level code
pub type Result<T> = anyhow::Result<T>;

/// Result type for orchestrator operations
pub type OpsResult<T> = std::result::Result<T, OpsError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum OpsError {
    #[error("{kind} not found: {id}")]
    UnknownEntity { kind: &'static str, id: Id },

    #[error("Matching refused: {0}")]
    MatchingRefused(String),

    #[error("Invalid transition for {id}: {from} -> {to}")]
    InvalidTransition { id: Id, from: String, to: String },

    #[error("Nothing linked: {0}")]
    MissingLink(String),

    #[error("No {0} selected")]
    NoSelection(&'static str),

    #[error("Invalid config: {0}")]
    Config(String),
}
