//! # fleetwatch
//!
//! A terminal console and library for monitoring live device fleet
//! telemetry.
//!
//! The console lists a fleet of devices from an HTTP inventory endpoint and
//! streams telemetry for one selected device at a time over a persistent
//! NDJSON connection, keeping a bounded rolling window of samples, a log of
//! discrete device events, and a health score derived from the latest
//! sample.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐  │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal │  │
//! │  │ (state) │    │(buffers) │    │(render) │    │          │  │
//! │  └────┬────┘    └──────────┘    └─────────┘    └──────────┘  │
//! │       │                                                      │
//! │       ▼                                                      │
//! │  ┌─────────┐                     ┌─────────┐                 │
//! │  │ stream  │◀── HTTP NDJSON      │  fetch  │◀── HTTP JSON    │
//! │  │(client) │    per device       │ (fleet) │    inventory    │
//! │  └─────────┘                     └─────────┘                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation, and user interaction
//! - **[`stream`]**: The per-device stream client - connection lifecycle,
//!   reconnect policy, and the generation guard against stale connections
//! - **[`data`]**: Telemetry wire types, rolling window, event log, and
//!   health scoring
//! - **[`fetch`]**: Device inventory over plain HTTP
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the fleet served by a local backend
//! fleetwatch --url http://127.0.0.1:8000
//!
//! # Jump straight into one device's stream
//! fleetwatch --device rb-001
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use fleetwatch::stream::{HttpStreamTransport, StreamConfig, StreamManager};
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let transport = Arc::new(HttpStreamTransport::new(
//!     "http://127.0.0.1:8000",
//!     runtime.handle().clone(),
//! ));
//!
//! let mut manager = StreamManager::start(transport, "rb-001", StreamConfig::default());
//!
//! // Pump once per tick; render from the snapshot
//! manager.pump(std::time::Instant::now());
//! let snapshot = manager.snapshot();
//! println!("{:?}: {} samples", snapshot.status, snapshot.history.len());
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod fetch;
pub mod stream;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use config::Settings;
pub use data::{assess, EventLog, HealthAssessment, HealthLevel, RollingWindow, TelemetrySample};
pub use fetch::{fetch_devices, Device, DeviceStatus, FetchError};
pub use stream::{
    ConnectionState, HttpStreamTransport, ReconnectPolicy, StreamConfig, StreamManager,
    StreamSnapshot, Transport,
};
