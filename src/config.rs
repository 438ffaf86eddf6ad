//! Console settings.
//!
//! Settings layer as defaults <- optional TOML file <- CLI flags. The file
//! is optional; every field has a default so a bare `fleetwatch` run works
//! against a local backend.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::stream::{ReconnectPolicy, StreamConfig};

/// Runtime settings for the console.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the telemetry backend.
    pub base_url: String,
    /// Rolling window age bound, in seconds.
    pub window_secs: f64,
    /// Rolling window point cap.
    pub max_points: usize,
    /// Event log cap.
    pub max_events: usize,
    /// Delay between a stream close and the reconnect attempt.
    pub reconnect_ms: u64,
    /// UI tick interval in milliseconds.
    pub tick_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            window_secs: 30.0,
            max_points: 300,
            max_events: 10,
            reconnect_ms: 800,
            tick_ms: 100,
        }
    }
}

impl Settings {
    /// Load settings, merging an optional TOML file over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .with_context(|| match path {
                Some(p) => format!("failed to load settings from {}", p.display()),
                None => "failed to assemble settings".to_string(),
            })?;

        Ok(settings)
    }

    /// Stream tuning derived from these settings.
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            window_age: Duration::from_secs_f64(self.window_secs),
            window_points: self.max_points,
            max_events: self.max_events,
            reconnect: ReconnectPolicy::fixed(Duration::from_millis(self.reconnect_ms)),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
