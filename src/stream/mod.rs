//! Per-device telemetry stream client.
//!
//! The stream client is split into three parts:
//!
//! - [`transport`]: opens one connection per device and delivers what it
//!   observes as an ordered, generation-tagged event stream
//! - [`manager`]: the subscription state machine that owns the buffers and
//!   applies transport events on the caller's thread
//! - [`policy`]: reconnect scheduling, kept separate so it is testable
//!   without real time passing

pub mod manager;
pub mod policy;
pub mod transport;

pub use manager::{StreamConfig, StreamManager, StreamSnapshot};
pub use policy::ReconnectPolicy;
pub use transport::{
    ConnectionHandle, Envelope, HttpStreamTransport, Transport, TransportEvent,
};

/// State of the underlying transport connection.
///
/// Describes the transport only, independent of data content. `Error` and
/// `Closed` are both recoverable; the manager keeps reconnecting for as
/// long as the subscription lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
    Error,
}

impl ConnectionState {
    /// Returns a short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
            ConnectionState::Error => "error",
        }
    }
}
