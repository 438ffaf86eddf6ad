//! Wire types for telemetry samples.
//!
//! These types match the JSON format emitted by the telemetry backend,
//! one object per NDJSON line on the stream endpoint.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// One telemetry reading for a device at a point in time.
///
/// Samples are immutable once received. `ts` is unix seconds (fractional
/// values allowed). `event` is an optional discrete event tag; blank or
/// whitespace-only tags are treated as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySample {
    /// Identifier of the device that produced this reading.
    pub device_id: String,
    /// Unix timestamp in seconds.
    pub ts: f64,
    /// Battery charge, 0-100.
    pub battery: f64,
    /// Temperature in degrees Celsius.
    pub temp_c: f64,
    /// Speed in m/s.
    pub speed: f64,
    /// Discrete event tag, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

impl TelemetrySample {
    /// Parse a single stream payload.
    ///
    /// Returns `None` for malformed JSON or missing required fields.
    /// Malformed payloads are discarded per-message; the next line on the
    /// stream may parse fine independently.
    pub fn parse_line(line: &str) -> Option<Self> {
        serde_json::from_str(line.trim()).ok()
    }

    /// The event tag, trimmed, or `None` if absent or blank.
    pub fn event_tag(&self) -> Option<&str> {
        self.event.as_deref().map(str::trim).filter(|tag| !tag.is_empty())
    }
}

/// Current wall-clock time as unix seconds.
pub fn unix_now() -> f64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs_f64()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_sample() {
        let json = r#"{
            "deviceId": "rb-001",
            "ts": 1723000000.5,
            "battery": 82,
            "tempC": 31.4,
            "speed": 0.85,
            "event": "Waypoint reached"
        }"#;

        let sample = TelemetrySample::parse_line(json).unwrap();
        assert_eq!(sample.device_id, "rb-001");
        assert_eq!(sample.battery, 82.0);
        assert_eq!(sample.event_tag(), Some("Waypoint reached"));
    }

    #[test]
    fn test_parse_without_event() {
        let json = r#"{"deviceId":"rb-002","ts":1.0,"battery":50,"tempC":30,"speed":0}"#;
        let sample = TelemetrySample::parse_line(json).unwrap();
        assert!(sample.event.is_none());
        assert!(sample.event_tag().is_none());
    }

    #[test]
    fn test_blank_event_is_absent() {
        let json = r#"{"deviceId":"rb-002","ts":1.0,"battery":50,"tempC":30,"speed":0,"event":"   "}"#;
        let sample = TelemetrySample::parse_line(json).unwrap();
        assert!(sample.event_tag().is_none());
    }

    #[test]
    fn test_malformed_payloads_rejected() {
        assert!(TelemetrySample::parse_line("not json").is_none());
        // Missing required numeric fields
        assert!(TelemetrySample::parse_line(r#"{"deviceId":"rb-001"}"#).is_none());
        assert!(TelemetrySample::parse_line("").is_none());
    }
}
