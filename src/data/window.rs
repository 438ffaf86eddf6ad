//! Rolling sample window for charting.
//!
//! Keeps recent samples in arrival order, bounded both by age and by count.

use std::collections::VecDeque;
use std::time::Duration;

use super::sample::TelemetrySample;

/// A bounded, time- and count-limited buffer of recent samples.
///
/// Samples are kept oldest-first for chart consumption. Both eviction
/// policies apply independently on every insert: entries older than
/// `max_age` relative to the wall clock at insertion are dropped, then the
/// buffer is truncated from the front down to `max_points`.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    samples: VecDeque<TelemetrySample>,
    max_age: Duration,
    max_points: usize,
}

impl RollingWindow {
    /// Create an empty window with the given bounds.
    pub fn new(max_age: Duration, max_points: usize) -> Self {
        Self {
            samples: VecDeque::new(),
            max_age,
            max_points,
        }
    }

    /// Append a sample and evict per the age and count bounds.
    ///
    /// The age test compares each entry's `ts` against `now_unix` (the wall
    /// clock at insertion), not against the newest sample's timestamp.
    pub fn insert(&mut self, sample: TelemetrySample, now_unix: f64) {
        self.samples.push_back(sample);

        let cutoff = now_unix - self.max_age.as_secs_f64();
        self.samples.retain(|s| s.ts >= cutoff);

        while self.samples.len() > self.max_points {
            self.samples.pop_front();
        }
    }

    /// Iterate the window oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &TelemetrySample> {
        self.samples.iter()
    }

    /// Clone the window contents oldest-first.
    pub fn snapshot(&self) -> Vec<TelemetrySample> {
        self.samples.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
