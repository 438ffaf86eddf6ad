//! Data models and processing for device telemetry.
//!
//! This module holds the wire types and the bounded buffers the stream
//! client maintains, plus the health scoring applied to the latest sample.
//!
//! ## Submodules
//!
//! - [`sample`]: [`TelemetrySample`] wire type and payload parsing
//! - [`health`]: pure health scoring ([`assess`], [`HealthLevel`])
//! - [`window`]: [`RollingWindow`], the age- and count-bounded sample buffer
//! - [`events`]: [`EventLog`], the newest-first bounded event log
//!
//! ## Data Flow
//!
//! ```text
//! NDJSON line (raw stream payload)
//!        │
//!        ▼
//! TelemetrySample::parse_line()
//!        │
//!        ├──▶ RollingWindow::insert()  (for charts)
//!        ├──▶ EventLog::maybe_push()   (for the event panel)
//!        └──▶ health::assess()         (recomputed on the latest sample)
//! ```

pub mod events;
pub mod health;
pub mod sample;
pub mod window;

pub use events::EventLog;
pub use health::{assess, HealthAssessment, HealthLevel};
pub use sample::{unix_now, TelemetrySample};
pub use window::RollingWindow;
