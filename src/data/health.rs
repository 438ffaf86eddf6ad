//! Health scoring for telemetry samples.
//!
//! Maps a single sample to a 0-100 score and a qualitative level. The
//! scoring is pure and total: malformed numeric inputs are clamped rather
//! than rejected, so every sample yields an assessment.

use super::sample::TelemetrySample;

/// Qualitative health level derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthLevel {
    Good,
    Warning,
    Critical,
}

impl HealthLevel {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthLevel::Good => "OK",
            HealthLevel::Warning => "WARN",
            HealthLevel::Critical => "CRIT",
        }
    }
}

/// A score in 0-100 plus its level.
///
/// Always recomputed from the latest sample; never cached across samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthAssessment {
    pub score: u8,
    pub level: HealthLevel,
}

/// Score a sample.
///
/// Battery dominates (weight 0.55), temperature deviation from the 30 °C
/// optimum is secondary (0.30), speed is a minor stress proxy (0.15). The
/// weighted sum is rounded half away from zero (`f64::round`). Levels:
/// score < 40 is Critical, < 70 is Warning, otherwise Good. There is no
/// hysteresis; display flicker across a boundary is accepted behavior.
pub fn assess(sample: &TelemetrySample) -> HealthAssessment {
    let battery = finite_or_zero(sample.battery).clamp(0.0, 100.0);
    let temp_c = finite_or_zero(sample.temp_c);
    let speed = finite_or_zero(sample.speed).max(0.0);

    let battery_score = battery;
    let temp_score = (100.0 - (temp_c - 30.0).abs() * 4.0).clamp(0.0, 100.0);
    let speed_score = (100.0 - speed * 10.0).clamp(0.0, 100.0);

    let score = (0.55 * battery_score + 0.30 * temp_score + 0.15 * speed_score).round() as u8;

    let level = if score < 40 {
        HealthLevel::Critical
    } else if score < 70 {
        HealthLevel::Warning
    } else {
        HealthLevel::Good
    };

    HealthAssessment { score, level }
}

fn finite_or_zero(n: f64) -> f64 {
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(battery: f64, temp_c: f64, speed: f64) -> TelemetrySample {
        TelemetrySample {
            device_id: "rb-001".to_string(),
            ts: 0.0,
            battery,
            temp_c,
            speed,
            event: None,
        }
    }

    #[test]
    fn test_healthy_sample() {
        // tempScore = 100, speedScore = 100
        // round(0.55*80 + 0.30*100 + 0.15*100) = round(44 + 30 + 15) = 89
        let assessment = assess(&sample(80.0, 30.0, 0.0));
        assert_eq!(assessment.score, 89);
        assert_eq!(assessment.level, HealthLevel::Good);
    }

    #[test]
    fn test_critical_sample() {
        // tempPenalty = 80 -> tempScore = 20; speedPenalty = 40 -> speedScore = 60
        // round(0.55*20 + 0.30*20 + 0.15*60) = round(11 + 6 + 9) = 26
        let assessment = assess(&sample(20.0, 50.0, 4.0));
        assert_eq!(assessment.score, 26);
        assert_eq!(assessment.level, HealthLevel::Critical);
    }

    #[test]
    fn test_level_thresholds() {
        // Full battery, optimal temp, no speed: perfect score
        assert_eq!(assess(&sample(100.0, 30.0, 0.0)).score, 100);

        // battery 70, temp 70C (tempScore 0), speed 10 (speedScore 0)
        // round(0.55*70) = round(38.5) = 39 -> Critical
        let low = assess(&sample(70.0, 70.0, 10.0));
        assert_eq!(low.score, 39);
        assert_eq!(low.level, HealthLevel::Critical);

        // battery 73 instead: round(40.15) = 40 -> Warning
        let boundary = assess(&sample(73.0, 70.0, 10.0));
        assert_eq!(boundary.score, 40);
        assert_eq!(boundary.level, HealthLevel::Warning);
    }

    #[test]
    fn test_non_finite_inputs_clamped() {
        let assessment = assess(&sample(f64::NAN, f64::INFINITY, f64::NEG_INFINITY));
        // battery -> 0, temp -> 0 (tempScore clamps to 0), speed -> 0 (speedScore 100)
        // round(0 + 0 + 15) = 15
        assert_eq!(assessment.score, 15);
        assert_eq!(assessment.level, HealthLevel::Critical);
    }

    #[test]
    fn test_out_of_range_inputs_clamped() {
        let over = assess(&sample(250.0, 30.0, -3.0));
        // battery clamps to 100, negative speed treated as 0
        assert_eq!(over.score, 100);
        assert_eq!(over.level, HealthLevel::Good);
    }

    #[test]
    fn test_score_always_in_range() {
        for battery in [-100.0, 0.0, 50.0, 100.0, 1e9] {
            for temp in [-200.0, 0.0, 30.0, 90.0, 1e9] {
                for speed in [-5.0, 0.0, 2.0, 50.0, 1e9] {
                    let a = assess(&sample(battery, temp, speed));
                    assert!(a.score <= 100);
                }
            }
        }
    }
}
