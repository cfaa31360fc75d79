//! Runtime configuration
//!
//! Every field has a default, so a config file only needs the values it
//! wants to change.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fixed RNG seed; a random one is drawn when absent
    pub seed: Option<u64>,
    pub ticker: TickerConfig,
    pub matching: MatchingConfig,
    pub demo: DemoConfig,
    pub logging: LoggingConfig,
}

/// Impact metrics and notification ticker
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    pub interval_ms: u64,
    pub metrics_chance: f64,
    pub notification_chance: f64,
    pub notification_ttl_ms: u64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 10_000,
            metrics_chance: 0.7,
            notification_chance: 0.3,
            notification_ttl_ms: 5_000,
        }
    }
}

impl TickerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }
}

/// Staged needs matching and the background nudger
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Runs are refused once a disaster is matched to this percentage
    pub ceiling_percent: f64,
    pub batches: usize,
    pub step_min: f64,
    pub step_max: f64,
    pub step_interval_min_ms: u64,
    pub step_interval_max_ms: u64,
    pub batch_pause_ms: u64,
    pub finish_delay_ms: u64,
    pub nudge_interval_ms: u64,
    pub nudge_chance: f64,
    /// Chance the nudger restricts itself to high-priority needs when any
    /// are still open
    pub high_priority_bias: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            ceiling_percent: 95.0,
            batches: 3,
            step_min: 10.0,
            step_max: 25.0,
            step_interval_min_ms: 100,
            step_interval_max_ms: 300,
            batch_pause_ms: 500,
            finish_delay_ms: 2_000,
            nudge_interval_ms: 2_500,
            nudge_chance: 0.6,
            high_priority_bias: 0.7,
        }
    }
}

impl MatchingConfig {
    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }

    pub fn finish_delay(&self) -> Duration {
        Duration::from_millis(self.finish_delay_ms)
    }

    pub fn nudge_interval(&self) -> Duration {
        Duration::from_millis(self.nudge_interval_ms)
    }
}

/// Scripted demo event
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub enabled: bool,
    pub delay_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: 30_000,
        }
    }
}

impl DemoConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: PathBuf,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("relief-ops.log"),
            filter: "relief_ops=info".to_string(),
        }
    }
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml(text: &str) -> Result<Self, crate::OpsError> {
        let config: Config =
            toml::from_str(text).map_err(|e| crate::OpsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading {}: {}", path.display(), e))?;
        Ok(Self::from_toml(&text)?)
    }

    fn validate(&self) -> Result<(), crate::OpsError> {
        let m = &self.matching;
        let bad = |msg: &str| Err(crate::OpsError::Config(msg.to_string()));

        if m.batches == 0 {
            return bad("matching.batches must be at least 1");
        }
        if !(m.step_min > 0.0 && m.step_min < m.step_max && m.step_max.is_finite()) {
            return bad("matching.step_min must be positive and below a finite step_max");
        }
        if !(0.0..=100.0).contains(&m.ceiling_percent) {
            return bad("matching.ceiling_percent must be within 0..=100");
        }
        if m.step_interval_min_ms >= m.step_interval_max_ms {
            return bad("matching.step_interval_min_ms must be below step_interval_max_ms");
        }
        for (name, p) in [
            ("ticker.metrics_chance", self.ticker.metrics_chance),
            ("ticker.notification_chance", self.ticker.notification_chance),
            ("matching.nudge_chance", m.nudge_chance),
            ("matching.high_priority_bias", m.high_priority_bias),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(crate::OpsError::Config(format!("{} must be within 0..=1", name)));
            }
        }
        if self.ticker.interval_ms == 0 || m.nudge_interval_ms == 0 {
            return bad("timer intervals must be non-zero");
        }
        Ok(())
    }
}
