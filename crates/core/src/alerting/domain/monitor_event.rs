use std::fmt;
use std::time::Duration;

use crate::actuation::domain::actuator_sink::ActuatorId;
use crate::geometry::aspect_ratio::FaceMetrics;
use crate::shared::clock::Timestamp;

/// Severity bucket used when forwarding events to a log backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventSeverity {
    Frame,
    Lifecycle,
    Transition,
    Failure,
}

/// Structured record of everything the monitor observes or decides.
#[derive(Clone, Debug, PartialEq)]
pub enum MonitorEvent {
    Started {
        at: Timestamp,
    },
    Metrics {
        at: Timestamp,
        metrics: FaceMetrics,
        ear_counter: u32,
        mar_counter: u32,
    },
    AlertOn {
        at: Timestamp,
        metrics: FaceMetrics,
        ear_counter: u32,
        mar_counter: u32,
    },
    EscalateOn {
        at: Timestamp,
        metrics: FaceMetrics,
        alert_elapsed: Duration,
    },
    AlertCleared {
        at: Timestamp,
        metrics: FaceMetrics,
        alert_elapsed: Duration,
        /// Recovery came within the clear window.
        false_alarm: bool,
    },
    EscalationCleared {
        at: Timestamp,
        metrics: FaceMetrics,
        alert_elapsed: Duration,
    },
    GeometryError {
        at: Timestamp,
        frame: usize,
        message: String,
    },
    CameraError {
        at: Timestamp,
        message: String,
    },
    EndOfStream {
        at: Timestamp,
        frames: usize,
    },
    ActuatorError {
        at: Timestamp,
        output: ActuatorId,
        message: String,
    },
    Shutdown {
        at: Timestamp,
        reason: String,
    },
}

impl MonitorEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            MonitorEvent::Started { .. } => "started",
            MonitorEvent::Metrics { .. } => "metrics",
            MonitorEvent::AlertOn { .. } => "alert_on",
            MonitorEvent::EscalateOn { .. } => "escalate_on",
            MonitorEvent::AlertCleared { .. } => "alert_cleared",
            MonitorEvent::EscalationCleared { .. } => "escalation_cleared",
            MonitorEvent::GeometryError { .. } => "geometry_error",
            MonitorEvent::CameraError { .. } => "camera_error",
            MonitorEvent::EndOfStream { .. } => "end_of_stream",
            MonitorEvent::ActuatorError { .. } => "actuator_error",
            MonitorEvent::Shutdown { .. } => "shutdown",
        }
    }

    pub fn at(&self) -> Timestamp {
        match self {
            MonitorEvent::Started { at }
            | MonitorEvent::Metrics { at, .. }
            | MonitorEvent::AlertOn { at, .. }
            | MonitorEvent::EscalateOn { at, .. }
            | MonitorEvent::AlertCleared { at, .. }
            | MonitorEvent::EscalationCleared { at, .. }
            | MonitorEvent::GeometryError { at, .. }
            | MonitorEvent::CameraError { at, .. }
            | MonitorEvent::EndOfStream { at, .. }
            | MonitorEvent::ActuatorError { at, .. }
            | MonitorEvent::Shutdown { at, .. } => *at,
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            MonitorEvent::Metrics { .. } => EventSeverity::Frame,
            MonitorEvent::AlertOn { .. }
            | MonitorEvent::EscalateOn { .. }
            | MonitorEvent::AlertCleared { .. }
            | MonitorEvent::EscalationCleared { .. } => EventSeverity::Transition,
            MonitorEvent::GeometryError { .. }
            | MonitorEvent::CameraError { .. }
            | MonitorEvent::ActuatorError { .. } => EventSeverity::Failure,
            MonitorEvent::Started { .. }
            | MonitorEvent::EndOfStream { .. }
            | MonitorEvent::Shutdown { .. } => EventSeverity::Lifecycle,
        }
    }

    pub fn metrics(&self) -> Option<FaceMetrics> {
        match self {
            MonitorEvent::Metrics { metrics, .. }
            | MonitorEvent::AlertOn { metrics, .. }
            | MonitorEvent::EscalateOn { metrics, .. }
            | MonitorEvent::AlertCleared { metrics, .. }
            | MonitorEvent::EscalationCleared { metrics, .. } => Some(*metrics),
            _ => None,
        }
    }
}

/// One `key=value` line, e.g. `t=3.000 kind=alert_on ear=0.10 mar=0.30 ear_frames=48 mar_frames=0`.
impl fmt::Display for MonitorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={} kind={}", self.at(), self.kind())?;
        if let Some(m) = self.metrics() {
            write!(f, " ear={:.2} mar={:.2}", m.ear, m.mar)?;
        }
        match self {
            MonitorEvent::Metrics {
                ear_counter,
                mar_counter,
                ..
            }
            | MonitorEvent::AlertOn {
                ear_counter,
                mar_counter,
                ..
            } => write!(f, " ear_frames={ear_counter} mar_frames={mar_counter}"),
            MonitorEvent::EscalateOn { alert_elapsed, .. }
            | MonitorEvent::EscalationCleared { alert_elapsed, .. } => {
                write!(f, " alert_elapsed={:.3}", alert_elapsed.as_secs_f64())
            }
            MonitorEvent::AlertCleared {
                alert_elapsed,
                false_alarm,
                ..
            } => write!(
                f,
                " alert_elapsed={:.3} false_alarm={false_alarm}",
                alert_elapsed.as_secs_f64()
            ),
            MonitorEvent::GeometryError { frame, message, .. } => {
                write!(f, " frame={frame} error=\"{message}\"")
            }
            MonitorEvent::CameraError { message, .. } => write!(f, " error=\"{message}\""),
            MonitorEvent::EndOfStream { frames, .. } => write!(f, " frames={frames}"),
            MonitorEvent::ActuatorError {
                output, message, ..
            } => write!(f, " output={output} error=\"{message}\""),
            MonitorEvent::Shutdown { reason, .. } => write!(f, " reason={reason}"),
            MonitorEvent::Started { .. } => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(secs: f64) -> Timestamp {
        Timestamp::from_secs_f64(secs)
    }

    #[test]
    fn test_metrics_line() {
        let event = MonitorEvent::Metrics {
            at: t(1.5),
            metrics: FaceMetrics::new(0.104, 0.3),
            ear_counter: 12,
            mar_counter: 0,
        };
        assert_eq!(
            event.to_string(),
            "t=1.500 kind=metrics ear=0.10 mar=0.30 ear_frames=12 mar_frames=0"
        );
        assert_eq!(event.severity(), EventSeverity::Frame);
    }

    #[test]
    fn test_alert_cleared_line_reports_false_alarm() {
        let event = MonitorEvent::AlertCleared {
            at: t(4.0),
            metrics: FaceMetrics::new(0.4, 0.2),
            alert_elapsed: Duration::from_millis(1250),
            false_alarm: true,
        };
        assert_eq!(
            event.to_string(),
            "t=4.000 kind=alert_cleared ear=0.40 mar=0.20 alert_elapsed=1.250 false_alarm=true"
        );
        assert_eq!(event.severity(), EventSeverity::Transition);
    }

    #[test]
    fn test_failure_events_carry_context() {
        let geometry = MonitorEvent::GeometryError {
            at: t(0.0),
            frame: 7,
            message: "degenerate eye contour".into(),
        };
        assert_eq!(
            geometry.to_string(),
            "t=0.000 kind=geometry_error frame=7 error=\"degenerate eye contour\""
        );

        let actuator = MonitorEvent::ActuatorError {
            at: t(2.0),
            output: ActuatorId::Primary,
            message: "EIO".into(),
        };
        assert_eq!(actuator.kind(), "actuator_error");
        assert!(actuator.to_string().contains("output=buzzer"));
        assert_eq!(actuator.severity(), EventSeverity::Failure);
        assert_eq!(actuator.metrics(), None);
    }

    #[test]
    fn test_kinds_cover_required_names() {
        let m = FaceMetrics::new(0.2, 0.2);
        let kinds: Vec<_> = [
            MonitorEvent::Metrics {
                at: t(0.0),
                metrics: m,
                ear_counter: 0,
                mar_counter: 0,
            },
            MonitorEvent::AlertOn {
                at: t(0.0),
                metrics: m,
                ear_counter: 0,
                mar_counter: 0,
            },
            MonitorEvent::EscalateOn {
                at: t(0.0),
                metrics: m,
                alert_elapsed: Duration::ZERO,
            },
            MonitorEvent::EscalationCleared {
                at: t(0.0),
                metrics: m,
                alert_elapsed: Duration::ZERO,
            },
            MonitorEvent::CameraError {
                at: t(0.0),
                message: String::new(),
            },
        ]
        .iter()
        .map(MonitorEvent::kind)
        .collect();
        assert_eq!(
            kinds,
            ["metrics", "alert_on", "escalate_on", "escalation_cleared", "camera_error"]
        );
    }
}
