//! Transport layer for per-device telemetry streams.
//!
//! A [`Transport`] opens one connection per device and delivers everything
//! the connection observes as an ordered event stream over a channel. The
//! production implementation streams NDJSON over a long-lived HTTP GET;
//! tests substitute scripted transports.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use futures_util::StreamExt;
use tracing::debug;

/// Something a live connection observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection is established and the stream is live.
    Opened,
    /// One raw payload line from the stream (unparsed).
    Message(String),
    /// The transport failed; a close usually follows.
    Error(String),
    /// The connection ended (EOF, network loss, or refused outright).
    Closed,
}

/// A transport event tagged with the connection attempt that produced it.
///
/// The generation tag lets the consumer discard events from superseded
/// connection attempts without any coordination with the reader task.
#[derive(Debug)]
pub struct Envelope {
    pub generation: u64,
    pub event: TransportEvent,
}

/// Handle to an open connection attempt.
///
/// Closing aborts the reader task; any event it was about to send is simply
/// never delivered. Dropping the handle closes it.
#[derive(Debug, Default)]
pub struct ConnectionHandle {
    task: Option<JoinHandle<()>>,
}

impl ConnectionHandle {
    /// Wrap a spawned reader task.
    pub fn from_task(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }

    /// A handle with no task to abort (scripted transports).
    pub fn detached() -> Self {
        Self::default()
    }

    /// Tear the connection down. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Opens telemetry stream connections, one device at a time.
///
/// Implementations must deliver events in the order the connection observed
/// them, tagged with the generation passed to [`Transport::open`].
pub trait Transport: Send + Sync {
    /// Open a connection for `device_id` and stream its events into `sender`.
    fn open(
        &self,
        device_id: &str,
        generation: u64,
        sender: mpsc::UnboundedSender<Envelope>,
    ) -> ConnectionHandle;
}

/// NDJSON-over-HTTP telemetry transport.
///
/// Each subscription is a streaming `GET {base_url}/telemetry/{device_id}`;
/// the response body is an unbounded stream of newline-delimited JSON
/// samples. The reader runs on the provided runtime handle so connections
/// can be opened and torn down from the UI thread.
#[derive(Debug, Clone)]
pub struct HttpStreamTransport {
    client: reqwest::Client,
    base_url: String,
    runtime: tokio::runtime::Handle,
}

impl HttpStreamTransport {
    pub fn new(base_url: impl Into<String>, runtime: tokio::runtime::Handle) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            runtime,
        }
    }

    /// The stream endpoint for a device.
    pub fn stream_url(&self, device_id: &str) -> String {
        format!("{}/telemetry/{}", self.base_url, device_id)
    }
}

impl Transport for HttpStreamTransport {
    fn open(
        &self,
        device_id: &str,
        generation: u64,
        sender: mpsc::UnboundedSender<Envelope>,
    ) -> ConnectionHandle {
        let url = self.stream_url(device_id);
        let client = self.client.clone();

        let task = self.runtime.spawn(async move {
            run_connection(client, url, generation, sender).await;
        });

        ConnectionHandle::from_task(task)
    }
}

/// Drive one connection attempt to completion.
///
/// Send failures are ignored throughout: they mean the consumer is gone,
/// and the task will be aborted by its handle shortly anyway.
async fn run_connection(
    client: reqwest::Client,
    url: String,
    generation: u64,
    sender: mpsc::UnboundedSender<Envelope>,
) {
    let emit = |event: TransportEvent| {
        let _ = sender.send(Envelope { generation, event });
    };

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => {
            debug!(%url, error = %e, "telemetry stream connect failed");
            emit(TransportEvent::Error(e.to_string()));
            emit(TransportEvent::Closed);
            return;
        }
    };

    if !response.status().is_success() {
        debug!(%url, status = %response.status(), "telemetry stream refused");
        emit(TransportEvent::Error(format!(
            "server returned {}",
            response.status()
        )));
        emit(TransportEvent::Closed);
        return;
    }

    emit(TransportEvent::Opened);

    let mut body = response.bytes_stream();
    let mut buf = String::new();

    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(bytes) => {
                buf.push_str(&String::from_utf8_lossy(&bytes));
                // A chunk may carry several lines, or a fraction of one
                while let Some(pos) = buf.find('\n') {
                    let line: String = buf.drain(..=pos).collect();
                    let line = line.trim_end();
                    if !line.is_empty() {
                        emit(TransportEvent::Message(line.to_string()));
                    }
                }
            }
            Err(e) => {
                debug!(%url, error = %e, "telemetry stream read failed");
                emit(TransportEvent::Error(e.to_string()));
                break;
            }
        }
    }

    if !buf.trim().is_empty() {
        emit(TransportEvent::Message(buf.trim().to_string()));
    }

    emit(TransportEvent::Closed);
}
