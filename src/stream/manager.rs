//! Per-device stream subscription management.
//!
//! [`StreamManager`] owns one logical subscription to a device's telemetry
//! stream: it opens connections, applies everything the transport observes
//! to its buffers, and reconnects after a close. All mutation happens on
//! the caller's thread inside [`StreamManager::pump`], in arrival order, so
//! no locking is involved anywhere.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::data::{unix_now, EventLog, RollingWindow, TelemetrySample};

use super::policy::ReconnectPolicy;
use super::transport::{ConnectionHandle, Envelope, Transport, TransportEvent};
use super::ConnectionState;

/// Tuning for a stream subscription.
#[derive(Debug, Clone, Copy)]
pub struct StreamConfig {
    /// Maximum age of samples kept for charting.
    pub window_age: Duration,
    /// Maximum number of samples kept for charting.
    pub window_points: usize,
    /// Maximum number of retained event entries.
    pub max_events: usize,
    /// Reconnect scheduling after a close.
    pub reconnect: ReconnectPolicy,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            window_age: Duration::from_secs(30),
            window_points: 300,
            max_events: 10,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

/// Read-only view of a subscription's current state.
#[derive(Debug, Clone)]
pub struct StreamSnapshot {
    pub status: ConnectionState,
    pub latest: Option<TelemetrySample>,
    /// Recent samples, oldest first.
    pub history: Vec<TelemetrySample>,
    /// Event-tagged samples, newest first.
    pub events: Vec<TelemetrySample>,
}

/// One logical subscription to a device's telemetry stream.
///
/// A manager is created per device id and never re-targeted: switching
/// devices means dropping the manager and starting a fresh one, which is
/// what resets the buffers. Reconnects within one manager's lifetime keep
/// the buffers, distinguishing transient network loss from an intentional
/// new subscription.
///
/// Every connection attempt carries a generation tag. Events from a
/// superseded attempt (an earlier connection still winding down, or
/// anything after [`StreamManager::stop`]) are dropped without touching
/// state.
pub struct StreamManager {
    device_id: String,
    status: ConnectionState,
    latest: Option<TelemetrySample>,
    window: RollingWindow,
    events: EventLog,

    generation: u64,
    stopped: bool,
    reconnect_due: Option<Instant>,
    policy: ReconnectPolicy,

    transport: Arc<dyn Transport>,
    conn: Option<ConnectionHandle>,
    sender: mpsc::UnboundedSender<Envelope>,
    receiver: mpsc::UnboundedReceiver<Envelope>,
}

impl StreamManager {
    /// Begin a new logical subscription for `device_id`.
    ///
    /// Buffers start empty, status starts at `Connecting`, and the first
    /// connection attempt is opened immediately.
    pub fn start(
        transport: Arc<dyn Transport>,
        device_id: impl Into<String>,
        config: StreamConfig,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let device_id = device_id.into();

        let conn = transport.open(&device_id, 1, sender.clone());

        Self {
            device_id,
            status: ConnectionState::Connecting,
            latest: None,
            window: RollingWindow::new(config.window_age, config.window_points),
            events: EventLog::new(config.max_events),
            generation: 1,
            stopped: false,
            reconnect_due: None,
            policy: config.reconnect,
            transport,
            conn: Some(conn),
            sender,
            receiver,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn status(&self) -> ConnectionState {
        self.status
    }

    /// The most recently accepted sample for this subscription, if any.
    pub fn latest(&self) -> Option<&TelemetrySample> {
        self.latest.as_ref()
    }

    /// Recent samples oldest-first, for charting.
    pub fn history(&self) -> impl Iterator<Item = &TelemetrySample> {
        self.window.iter()
    }

    /// Event-tagged samples newest-first.
    pub fn events(&self) -> impl Iterator<Item = &TelemetrySample> {
        self.events.iter()
    }

    /// Clone the full read surface for consumers that outlive a borrow.
    pub fn snapshot(&self) -> StreamSnapshot {
        StreamSnapshot {
            status: self.status,
            latest: self.latest.clone(),
            history: self.window.snapshot(),
            events: self.events.snapshot(),
        }
    }

    /// Drain pending transport events and fire a due reconnect.
    ///
    /// Call once per UI tick. Returns whether any observable state changed.
    pub fn pump(&mut self, now: Instant) -> bool {
        let mut changed = false;

        while let Ok(envelope) = self.receiver.try_recv() {
            changed |= self.apply(envelope, now);
        }

        if !self.stopped {
            if let Some(due) = self.reconnect_due {
                if now >= due {
                    self.reconnect_due = None;
                    self.reopen();
                    changed = true;
                }
            }
        }

        changed
    }

    /// Tear the subscription down.
    ///
    /// Bumps the generation so in-flight events from any connection become
    /// no-ops, cancels a pending reconnect, and aborts the reader task.
    /// Safe to call repeatedly, and safe on a manager whose connection
    /// never opened.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.generation += 1;
        self.reconnect_due = None;
        if let Some(mut conn) = self.conn.take() {
            conn.close();
        }
    }

    fn apply(&mut self, envelope: Envelope, now: Instant) -> bool {
        if envelope.generation != self.generation {
            // A superseded connection attempt; ignore entirely
            return false;
        }

        match envelope.event {
            TransportEvent::Opened => {
                debug!(device = %self.device_id, "telemetry stream open");
                self.status = ConnectionState::Open;
                true
            }
            TransportEvent::Message(payload) => self.accept(&payload),
            TransportEvent::Error(reason) => {
                // Informational; the close that follows drives reconnection
                debug!(device = %self.device_id, %reason, "telemetry stream error");
                self.status = ConnectionState::Error;
                true
            }
            TransportEvent::Closed => {
                debug!(device = %self.device_id, "telemetry stream closed");
                self.status = ConnectionState::Closed;
                self.reconnect_due = Some(self.policy.next_attempt(now));
                true
            }
        }
    }

    fn accept(&mut self, payload: &str) -> bool {
        let Some(sample) = TelemetrySample::parse_line(payload) else {
            trace!(device = %self.device_id, "discarding malformed telemetry payload");
            return false;
        };

        self.window.insert(sample.clone(), unix_now());
        self.events.maybe_push(&sample);
        self.latest = Some(sample);
        true
    }

    /// Open the next connection attempt for the same subscription.
    fn reopen(&mut self) {
        self.generation += 1;
        self.status = ConnectionState::Connecting;
        if let Some(mut conn) = self.conn.take() {
            conn.close();
        }
        self.conn = Some(self.transport.open(&self.device_id, self.generation, self.sender.clone()));
    }
}

impl Drop for StreamManager {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Transport that records every open and hands the test its senders,
    /// so events can be injected for any generation, stale ones included.
    #[derive(Default)]
    struct ScriptedTransport {
        opens: Mutex<Vec<(String, u64, mpsc::UnboundedSender<Envelope>)>>,
    }

    impl ScriptedTransport {
        fn open_count(&self) -> usize {
            self.opens.lock().unwrap().len()
        }

        fn emit(&self, attempt: usize, event: TransportEvent) {
            let opens = self.opens.lock().unwrap();
            let (_, generation, sender) = &opens[attempt];
            sender
                .send(Envelope {
                    generation: *generation,
                    event,
                })
                .unwrap();
        }
    }

    impl Transport for ScriptedTransport {
        fn open(
            &self,
            device_id: &str,
            generation: u64,
            sender: mpsc::UnboundedSender<Envelope>,
        ) -> ConnectionHandle {
            self.opens.lock().unwrap().push((device_id.to_string(), generation, sender));
            ConnectionHandle::detached()
        }
    }

    fn payload(ts_offset: f64, event: &str) -> String {
        let event_field = if event.is_empty() {
            String::new()
        } else {
            format!(",\"event\":\"{}\"", event)
        };
        format!(
            "{{\"deviceId\":\"rb-001\",\"ts\":{},\"battery\":80,\"tempC\":30,\"speed\":0{}}}",
            unix_now() + ts_offset,
            event_field
        )
    }

    fn start() -> (Arc<ScriptedTransport>, StreamManager) {
        let transport = Arc::new(ScriptedTransport::default());
        let manager = StreamManager::start(transport.clone(), "rb-001", StreamConfig::default());
        (transport, manager)
    }

    #[test]
    fn test_start_opens_connecting_with_empty_buffers() {
        let (transport, manager) = start();
        assert_eq!(manager.status(), ConnectionState::Connecting);
        assert!(manager.latest().is_none());
        assert_eq!(manager.history().count(), 0);
        assert_eq!(manager.events().count(), 0);
        assert_eq!(transport.open_count(), 1);

        let opens = transport.opens.lock().unwrap();
        assert_eq!(opens[0].0, "rb-001");
        assert_eq!(opens[0].1, 1);
    }

    #[test]
    fn test_open_then_messages_populate_buffers() {
        let (transport, mut manager) = start();
        let now = Instant::now();

        transport.emit(0, TransportEvent::Opened);
        transport.emit(0, TransportEvent::Message(payload(0.0, "")));
        transport.emit(0, TransportEvent::Message(payload(0.5, "Obstacle detected")));
        assert!(manager.pump(now));

        assert_eq!(manager.status(), ConnectionState::Open);
        assert_eq!(manager.history().count(), 2);
        assert_eq!(manager.events().count(), 1);
        assert_eq!(
            manager.latest().unwrap().event_tag(),
            Some("Obstacle detected")
        );

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.status, ConnectionState::Open);
        assert_eq!(snapshot.history.len(), 2);
        assert_eq!(snapshot.events.len(), 1);
    }

    #[test]
    fn test_malformed_payload_changes_nothing() {
        let (transport, mut manager) = start();
        let now = Instant::now();

        transport.emit(0, TransportEvent::Opened);
        transport.emit(0, TransportEvent::Message(payload(0.0, "")));
        manager.pump(now);
        let before = manager.snapshot();

        transport.emit(0, TransportEvent::Message("not json at all".to_string()));
        transport.emit(0, TransportEvent::Message("{\"deviceId\":\"rb-001\"}".to_string()));
        assert!(!manager.pump(now));

        let after = manager.snapshot();
        assert_eq!(after.status, before.status);
        assert_eq!(after.latest, before.latest);
        assert_eq!(after.history, before.history);
        assert_eq!(after.events, before.events);
    }

    #[test]
    fn test_error_sets_status_without_scheduling_reconnect() {
        let (transport, mut manager) = start();
        let now = Instant::now();

        transport.emit(0, TransportEvent::Error("connection reset".to_string()));
        manager.pump(now);
        assert_eq!(manager.status(), ConnectionState::Error);

        // No close yet, so no reconnect fires however long we wait
        manager.pump(now + Duration::from_secs(60));
        assert_eq!(transport.open_count(), 1);
    }

    #[test]
    fn test_close_schedules_reconnect_preserving_buffers() {
        let (transport, mut manager) = start();
        let now = Instant::now();

        transport.emit(0, TransportEvent::Opened);
        transport.emit(0, TransportEvent::Message(payload(0.0, "fault")));
        manager.pump(now);

        transport.emit(0, TransportEvent::Closed);
        manager.pump(now);
        assert_eq!(manager.status(), ConnectionState::Closed);

        // Buffers survive the close untouched
        assert_eq!(manager.history().count(), 1);
        assert_eq!(manager.events().count(), 1);
        assert!(manager.latest().is_some());

        // Not due yet
        manager.pump(now + Duration::from_millis(500));
        assert_eq!(transport.open_count(), 1);
        assert_eq!(manager.status(), ConnectionState::Closed);

        // Due: a fresh attempt for the same device, next generation
        manager.pump(now + Duration::from_millis(900));
        assert_eq!(transport.open_count(), 2);
        assert_eq!(manager.status(), ConnectionState::Connecting);
        {
            let opens = transport.opens.lock().unwrap();
            assert_eq!(opens[1].0, "rb-001");
            assert_eq!(opens[1].1, 2);
        }

        // Still the same subscription: buffers were not reset
        assert_eq!(manager.history().count(), 1);
        assert!(manager.latest().is_some());
    }

    #[test]
    fn test_stale_generation_events_are_dropped_after_reconnect() {
        let (transport, mut manager) = start();
        let now = Instant::now();

        transport.emit(0, TransportEvent::Opened);
        transport.emit(0, TransportEvent::Message(payload(0.0, "")));
        manager.pump(now);
        transport.emit(0, TransportEvent::Closed);
        manager.pump(now);
        manager.pump(now + Duration::from_secs(1));
        assert_eq!(transport.open_count(), 2);

        let before = manager.snapshot();

        // The dying first connection sputters after the reconnect
        transport.emit(0, TransportEvent::Message(payload(1.0, "stale")));
        transport.emit(0, TransportEvent::Closed);
        assert!(!manager.pump(now + Duration::from_secs(1)));

        let after = manager.snapshot();
        assert_eq!(after.history, before.history);
        assert_eq!(after.events, before.events);
        assert_eq!(after.status, ConnectionState::Connecting);

        // And no extra reconnect was scheduled by the stale close
        manager.pump(now + Duration::from_secs(10));
        assert_eq!(transport.open_count(), 2);
    }

    #[test]
    fn test_stop_invalidates_in_flight_events() {
        let (transport, mut manager) = start();
        let now = Instant::now();

        transport.emit(0, TransportEvent::Opened);
        transport.emit(0, TransportEvent::Message(payload(0.0, "")));
        manager.pump(now);

        manager.stop();
        let before = manager.snapshot();

        // Late events from the aborted connection are silent no-ops
        transport.emit(0, TransportEvent::Message(payload(1.0, "fault")));
        transport.emit(0, TransportEvent::Error("late".to_string()));
        transport.emit(0, TransportEvent::Closed);
        assert!(!manager.pump(now));

        let after = manager.snapshot();
        assert_eq!(after.history, before.history);
        assert_eq!(after.events, before.events);
        assert_eq!(after.status, before.status);

        // No reconnect ever fires on a stopped manager
        manager.pump(now + Duration::from_secs(60));
        assert_eq!(transport.open_count(), 1);

        // Idempotent
        manager.stop();
        manager.stop();
    }

    #[test]
    fn test_stop_cancels_pending_reconnect() {
        let (transport, mut manager) = start();
        let now = Instant::now();

        transport.emit(0, TransportEvent::Closed);
        manager.pump(now);
        manager.stop();

        manager.pump(now + Duration::from_secs(60));
        assert_eq!(transport.open_count(), 1);
    }

    #[test]
    fn test_fresh_manager_resets_buffers() {
        let (transport, mut manager) = start();
        transport.emit(0, TransportEvent::Opened);
        transport.emit(0, TransportEvent::Message(payload(0.0, "fault")));
        manager.pump(Instant::now());
        assert!(manager.latest().is_some());
        manager.stop();

        // A new subscription (different device) starts from nothing
        let transport2 = Arc::new(ScriptedTransport::default());
        let manager2 =
            StreamManager::start(transport2.clone(), "rb-002", StreamConfig::default());
        assert_eq!(manager2.status(), ConnectionState::Connecting);
        assert!(manager2.latest().is_none());
        assert_eq!(manager2.history().count(), 0);
        assert_eq!(manager2.events().count(), 0);
    }
}
