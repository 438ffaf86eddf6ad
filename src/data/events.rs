//! Rolling log of discrete device events.

use std::collections::VecDeque;

use super::sample::TelemetrySample;

/// Bounded, newest-first log of samples that carry an event tag.
///
/// Samples without a usable tag (absent, empty, or whitespace-only) are
/// ignored silently.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<TelemetrySample>,
    max_events: usize,
}

impl EventLog {
    /// Create an empty log holding at most `max_events` entries.
    pub fn new(max_events: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_events,
        }
    }

    /// Record the sample if it carries a non-blank event tag.
    ///
    /// Returns whether the sample was appended.
    pub fn maybe_push(&mut self, sample: &TelemetrySample) -> bool {
        if sample.event_tag().is_none() {
            return false;
        }

        self.entries.push_front(sample.clone());
        self.entries.truncate(self.max_events);
        true
    }

    /// Iterate entries newest-first.
    pub fn iter(&self) -> impl Iterator<Item = &TelemetrySample> {
        self.entries.iter()
    }

    /// Clone the log contents newest-first.
    pub fn snapshot(&self) -> Vec<TelemetrySample> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ts: f64, event: Option<&str>) -> TelemetrySample {
        TelemetrySample {
            device_id: "rb-001".to_string(),
            ts,
            battery: 80.0,
            temp_c: 30.0,
            speed: 0.0,
            event: event.map(String::from),
        }
    }

    #[test]
    fn test_event_appended_at_front() {
        let mut log = EventLog::new(10);
        assert!(log.maybe_push(&sample(1.0, Some("fault"))));
        assert!(log.maybe_push(&sample(2.0, Some("Waypoint reached"))));

        let order: Vec<f64> = log.iter().map(|s| s.ts).collect();
        assert_eq!(order, vec![2.0, 1.0]);
    }

    #[test]
    fn test_blank_events_ignored() {
        let mut log = EventLog::new(10);
        assert!(!log.maybe_push(&sample(1.0, None)));
        assert!(!log.maybe_push(&sample(2.0, Some(""))));
        assert!(!log.maybe_push(&sample(3.0, Some("   "))));
        assert!(log.is_empty());
    }

    #[test]
    fn test_cap_enforced() {
        let mut log = EventLog::new(3);
        for i in 0..10 {
            log.maybe_push(&sample(i as f64, Some("fault")));
        }
        assert_eq!(log.len(), 3);
        // Newest survive
        let order: Vec<f64> = log.iter().map(|s| s.ts).collect();
        assert_eq!(order, vec![9.0, 8.0, 7.0]);
    }
}
