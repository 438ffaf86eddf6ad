//! Application state and navigation logic.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::fetch::{Device, FetchError};
use crate::stream::{StreamManager, Transport};
use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// The fleet: all known devices with selection.
    Fleet,
    /// Live telemetry for the streamed device.
    Telemetry,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Fleet => View::Telemetry,
            View::Telemetry => View::Fleet,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        // Two views: previous and next coincide
        self.next()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Fleet => "Fleet",
            View::Telemetry => "Telemetry",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Fleet
    pub devices: Vec<Device>,
    pub device_error: Option<String>,
    pub selected_device_index: usize,
    pub refresh_requested: bool,

    // Active subscription
    pub stream: Option<StreamManager>,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,
    pub settings: Settings,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,

    transport: Arc<dyn Transport>,
}

impl App {
    /// Create a new App backed by the given transport and settings.
    pub fn new(transport: Arc<dyn Transport>, settings: Settings) -> Self {
        Self {
            running: true,
            current_view: View::Fleet,
            show_help: false,
            devices: Vec::new(),
            device_error: None,
            selected_device_index: 0,
            refresh_requested: true,
            stream: None,
            filter_text: String::new(),
            filter_active: false,
            theme: Theme::auto_detect(),
            settings,
            status_message: None,
            transport,
        }
    }

    /// Apply the result of a device inventory fetch.
    pub fn apply_devices(&mut self, result: Result<Vec<Device>, FetchError>) {
        match result {
            Ok(devices) => {
                self.devices = devices;
                self.device_error = None;
                let visible = self.visible_devices().len();
                self.selected_device_index =
                    self.selected_device_index.min(visible.saturating_sub(1));
            }
            Err(e) => {
                self.device_error = Some(e.to_string());
            }
        }
    }

    /// Advance the active subscription by one tick.
    ///
    /// Returns whether the stream state changed visibly.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.stream.as_mut() {
            Some(stream) => stream.pump(now),
            None => false,
        }
    }

    /// Start streaming the currently selected device.
    ///
    /// A no-op if that device is already streaming. Otherwise the previous
    /// subscription is torn down before the new one starts, so only one
    /// connection ever feeds the buffers.
    pub fn select_device(&mut self) {
        let Some(device) = self.selected_device().cloned() else {
            return;
        };
        self.start_stream(&device.id);
    }

    /// Start streaming `device_id`, replacing any existing subscription.
    pub fn start_stream(&mut self, device_id: &str) {
        if self.stream.as_ref().is_some_and(|s| s.device_id() == device_id) {
            self.current_view = View::Telemetry;
            return;
        }

        if let Some(mut old) = self.stream.take() {
            old.stop();
        }

        self.stream = Some(StreamManager::start(
            self.transport.clone(),
            device_id,
            self.settings.stream_config(),
        ));
        self.current_view = View::Telemetry;
    }

    /// Stop the active subscription, if any.
    pub fn stop_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            self.set_status_message(format!("Stopped streaming {}", stream.device_id()));
        }
    }

    /// Devices passing the current filter, with their raw indices.
    pub fn visible_devices(&self) -> Vec<(usize, &Device)> {
        self.devices
            .iter()
            .enumerate()
            .filter(|(_, d)| self.matches_filter(d))
            .collect()
    }

    /// The currently selected device, honoring the filter.
    pub fn selected_device(&self) -> Option<&Device> {
        self.visible_devices().get(self.selected_device_index).map(|(_, d)| *d)
    }

    /// Check if a device matches the current filter.
    pub fn matches_filter(&self, device: &Device) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        let search = self.filter_text.to_lowercase();
        device.name.to_lowercase().contains(&search) || device.id.to_lowercase().contains(&search)
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.visible_devices().len().saturating_sub(1);
        self.selected_device_index = (self.selected_device_index + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_device_index = self.selected_device_index.saturating_sub(n);
    }

    /// Jump to the first device.
    pub fn select_first(&mut self) {
        self.selected_device_index = 0;
    }

    /// Jump to the last visible device.
    pub fn select_last(&mut self) {
        self.selected_device_index = self.visible_devices().len().saturating_sub(1);
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Navigate back: Telemetry returns to the fleet list.
    pub fn go_back(&mut self) {
        if self.current_view == View::Telemetry {
            self.current_view = View::Fleet;
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.clamp_selection();
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let visible = self.visible_devices().len();
        self.selected_device_index = self.selected_device_index.min(visible.saturating_sub(1));
    }

    /// Request a device inventory re-fetch on the next loop iteration.
    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::DeviceStatus;
    use crate::stream::{ConnectionHandle, Envelope, Transport};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    /// Transport that only counts how many subscriptions were opened.
    #[derive(Default)]
    struct CountingTransport {
        opens: AtomicUsize,
    }

    impl Transport for CountingTransport {
        fn open(
            &self,
            _device_id: &str,
            _generation: u64,
            _sender: mpsc::UnboundedSender<Envelope>,
        ) -> ConnectionHandle {
            self.opens.fetch_add(1, Ordering::SeqCst);
            ConnectionHandle::detached()
        }
    }

    fn device(id: &str, name: &str) -> Device {
        Device {
            id: id.to_string(),
            name: name.to_string(),
            status: DeviceStatus::Online,
        }
    }

    fn app_with_devices() -> (Arc<CountingTransport>, App) {
        let transport = Arc::new(CountingTransport::default());
        let mut app = App::new(transport.clone(), Settings::default());
        app.apply_devices(Ok(vec![
            device("rb-001", "Rover 001"),
            device("rb-002", "Rover 002"),
            device("rb-003", "Lifter 003"),
        ]));
        (transport, app)
    }

    #[test]
    fn test_filter_narrows_and_clamps_selection() {
        let (_, mut app) = app_with_devices();
        app.selected_device_index = 2;

        app.start_filter();
        for c in "rover".chars() {
            app.filter_push(c);
        }

        assert_eq!(app.visible_devices().len(), 2);
        assert_eq!(app.selected_device_index, 1);

        app.clear_filter();
        assert_eq!(app.visible_devices().len(), 3);
    }

    #[test]
    fn test_select_device_starts_stream_and_switches_view() {
        let (transport, mut app) = app_with_devices();
        app.select_next();
        app.select_device();

        assert_eq!(app.current_view, View::Telemetry);
        assert_eq!(app.stream.as_ref().unwrap().device_id(), "rb-002");
        assert_eq!(transport.opens.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reselecting_same_device_keeps_subscription() {
        let (transport, mut app) = app_with_devices();
        app.select_device();
        assert_eq!(transport.opens.load(Ordering::SeqCst), 1);

        app.set_view(View::Fleet);
        app.select_device();

        // Same device: no new subscription was opened
        assert_eq!(transport.opens.load(Ordering::SeqCst), 1);
        assert_eq!(app.current_view, View::Telemetry);
    }

    #[test]
    fn test_changing_device_replaces_subscription() {
        let (transport, mut app) = app_with_devices();
        app.select_device();
        assert_eq!(app.stream.as_ref().unwrap().device_id(), "rb-001");

        app.select_next();
        app.select_device();
        assert_eq!(app.stream.as_ref().unwrap().device_id(), "rb-002");
        assert_eq!(transport.opens.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_fetch_error_keeps_previous_list() {
        let (_, mut app) = app_with_devices();
        app.apply_devices(Err(FetchError::Timeout));
        assert_eq!(app.devices.len(), 3);
        assert!(app.device_error.is_some());
    }
}
