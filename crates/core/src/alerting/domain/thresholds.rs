use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::shared::constants::{
    DEFAULT_CLEAR_WINDOW_SECS, DEFAULT_EAR_CONSEC_FRAMES, DEFAULT_EAR_THRESHOLD,
    DEFAULT_ESCALATION_DELAY_SECS, DEFAULT_MAR_CONSEC_FRAMES, DEFAULT_MAR_THRESHOLD,
};

/// Decision thresholds for the fatigue state machine.
///
/// Frame counts are frame-rate dependent; delays are wall-clock seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Eyes count as closed below this EAR.
    pub ear_threshold: f64,
    /// Mouth counts as open above this MAR.
    pub mar_threshold: f64,
    pub ear_consec_frames: u32,
    pub mar_consec_frames: u32,
    /// Buzzer-only time before the relay engages.
    pub escalation_delay_secs: f64,
    /// Recovery within this window after onset is reported as a false alarm.
    pub clear_window_secs: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            ear_threshold: DEFAULT_EAR_THRESHOLD,
            mar_threshold: DEFAULT_MAR_THRESHOLD,
            ear_consec_frames: DEFAULT_EAR_CONSEC_FRAMES,
            mar_consec_frames: DEFAULT_MAR_CONSEC_FRAMES,
            escalation_delay_secs: DEFAULT_ESCALATION_DELAY_SECS,
            clear_window_secs: DEFAULT_CLEAR_WINDOW_SECS,
        }
    }
}

impl Thresholds {
    /// Saturates at `Duration::MAX`; `validate` rejects such values.
    pub fn escalation_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.escalation_delay_secs).unwrap_or(Duration::MAX)
    }

    pub fn clear_window(&self) -> Duration {
        Duration::try_from_secs_f64(self.clear_window_secs).unwrap_or(Duration::MAX)
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("ear_threshold", self.ear_threshold),
            ("mar_threshold", self.mar_threshold),
            ("escalation_delay_secs", self.escalation_delay_secs),
            ("clear_window_secs", self.clear_window_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a non-negative number, got {value}"));
            }
        }
        for (name, value) in [
            ("escalation_delay_secs", self.escalation_delay_secs),
            ("clear_window_secs", self.clear_window_secs),
        ] {
            if Duration::try_from_secs_f64(value).is_err() {
                return Err(format!("{name} is too large, got {value}"));
            }
        }
        if self.ear_consec_frames == 0 {
            return Err("ear_consec_frames must be at least 1".into());
        }
        if self.mar_consec_frames == 0 {
            return Err("mar_consec_frames must be at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let t = Thresholds::default();
        assert_eq!(t.ear_threshold, 0.25);
        assert_eq!(t.mar_threshold, 0.5);
        assert_eq!(t.ear_consec_frames, 48);
        assert_eq!(t.mar_consec_frames, 24);
        assert_eq!(t.escalation_delay(), Duration::from_secs(5));
        assert_eq!(t.clear_window(), Duration::from_secs(5));
        assert!(t.validate().is_ok());
    }

    #[rstest]
    #[case::negative_delay(Thresholds { escalation_delay_secs: -1.0, ..Default::default() })]
    #[case::nan_ear(Thresholds { ear_threshold: f64::NAN, ..Default::default() })]
    #[case::infinite_window(Thresholds { clear_window_secs: f64::INFINITY, ..Default::default() })]
    #[case::huge_delay(Thresholds { escalation_delay_secs: 1e20, ..Default::default() })]
    #[case::huge_window(Thresholds { clear_window_secs: 1e20, ..Default::default() })]
    #[case::zero_ear_frames(Thresholds { ear_consec_frames: 0, ..Default::default() })]
    #[case::zero_mar_frames(Thresholds { mar_consec_frames: 0, ..Default::default() })]
    fn test_validate_rejects(#[case] thresholds: Thresholds) {
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_oversized_delay_saturates_instead_of_panicking() {
        let t = Thresholds {
            escalation_delay_secs: 1e20,
            ..Default::default()
        };
        assert_eq!(t.escalation_delay(), Duration::MAX);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let t: Thresholds = serde_json::from_str(r#"{"ear_consec_frames": 30}"#).unwrap();
        assert_eq!(t.ear_consec_frames, 30);
        assert_eq!(t.mar_consec_frames, 24);
    }
}
