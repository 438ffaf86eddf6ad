//! Terminal rendering using ratatui.
//!
//! Each view renders from immutable [`App`](crate::app::App) state; nothing
//! in here mutates the stream client.

pub mod common;
pub mod devices;
pub mod telemetry;
pub mod theme;

pub use theme::Theme;
