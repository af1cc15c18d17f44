//! Per-frame fatigue transition function.
//!
//! Counters are debounced with a hard reset: one frame inside the normal
//! range erases all accumulated evidence. The alert then moves through
//!
//! ```text
//! Idle --fatigued--> Alerting --fatigued, elapsed > delay--> Escalated
//!  ^                    |                                       |
//!  +----not fatigued----+---------------not fatigued------------+
//! ```
//!
//! Recovery from `Alerting` always clears the buzzer; whether it happened
//! inside the clear window only changes how the clear is reported.

use crate::actuation::domain::actuator_sink::ActuatorId;
use crate::alerting::domain::fatigue_state::{AlertPhase, FatigueState};
use crate::alerting::domain::monitor_event::MonitorEvent;
use crate::alerting::domain::thresholds::Thresholds;
use crate::geometry::aspect_ratio::FaceMetrics;
use crate::shared::clock::Timestamp;

/// Desired level for one output, in transition order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActuatorCommand {
    pub output: ActuatorId,
    pub on: bool,
}

impl ActuatorCommand {
    pub fn on(output: ActuatorId) -> Self {
        Self { output, on: true }
    }

    pub fn off(output: ActuatorId) -> Self {
        Self { output, on: false }
    }
}

/// Result of feeding one face's metrics into the state machine.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub state: FatigueState,
    pub commands: Vec<ActuatorCommand>,
    /// Always starts with the frame's `Metrics` event.
    pub events: Vec<MonitorEvent>,
}

pub fn step(
    state: &FatigueState,
    thresholds: &Thresholds,
    metrics: FaceMetrics,
    now: Timestamp,
) -> Step {
    let mut next = *state;
    next.ear_counter = if metrics.ear < thresholds.ear_threshold {
        state.ear_counter.saturating_add(1)
    } else {
        0
    };
    next.mar_counter = if metrics.mar > thresholds.mar_threshold {
        state.mar_counter.saturating_add(1)
    } else {
        0
    };

    let fatigued = next.ear_counter >= thresholds.ear_consec_frames
        || next.mar_counter >= thresholds.mar_consec_frames;

    let mut commands = Vec::new();
    let mut events = vec![MonitorEvent::Metrics {
        at: now,
        metrics,
        ear_counter: next.ear_counter,
        mar_counter: next.mar_counter,
    }];

    match (state.phase, fatigued) {
        (AlertPhase::Idle, false) | (AlertPhase::Escalated { .. }, true) => {}
        (AlertPhase::Idle, true) => {
            next.phase = AlertPhase::Alerting { since: now };
            commands.push(ActuatorCommand::on(ActuatorId::Primary));
            events.push(MonitorEvent::AlertOn {
                at: now,
                metrics,
                ear_counter: next.ear_counter,
                mar_counter: next.mar_counter,
            });
        }
        (AlertPhase::Alerting { since }, true) => {
            let alert_elapsed = now.since(since);
            if alert_elapsed > thresholds.escalation_delay() {
                next.phase = AlertPhase::Escalated { since };
                commands.push(ActuatorCommand::on(ActuatorId::Secondary));
                events.push(MonitorEvent::EscalateOn {
                    at: now,
                    metrics,
                    alert_elapsed,
                });
            }
        }
        (AlertPhase::Alerting { since }, false) => {
            let alert_elapsed = now.since(since);
            next.phase = AlertPhase::Idle;
            commands.push(ActuatorCommand::off(ActuatorId::Primary));
            events.push(MonitorEvent::AlertCleared {
                at: now,
                metrics,
                alert_elapsed,
                false_alarm: alert_elapsed <= thresholds.clear_window(),
            });
        }
        (AlertPhase::Escalated { since }, false) => {
            next.phase = AlertPhase::Idle;
            commands.push(ActuatorCommand::off(ActuatorId::Primary));
            commands.push(ActuatorCommand::off(ActuatorId::Secondary));
            events.push(MonitorEvent::EscalationCleared {
                at: now,
                metrics,
                alert_elapsed: now.since(since),
            });
        }
    }

    Step {
        state: next,
        commands,
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const FPS: f64 = 16.0;
    const DROWSY: FaceMetrics = FaceMetrics { ear: 0.10, mar: 0.30 };
    const AWAKE: FaceMetrics = FaceMetrics { ear: 0.40, mar: 0.30 };
    const YAWN: FaceMetrics = FaceMetrics { ear: 0.35, mar: 0.80 };

    /// Frame `n` (1-based) captured at `(n - 1) / FPS` seconds.
    fn frame_time(n: usize) -> Timestamp {
        Timestamp::from_secs_f64((n - 1) as f64 / FPS)
    }

    /// Drives the state machine one frame at a time at `FPS`.
    struct Run {
        state: FatigueState,
        thresholds: Thresholds,
        frame: usize,
    }

    impl Run {
        fn new() -> Self {
            Self::with(Thresholds::default())
        }

        fn with(thresholds: Thresholds) -> Self {
            Self {
                state: FatigueState::new(),
                thresholds,
                frame: 0,
            }
        }

        fn feed(&mut self, metrics: FaceMetrics) -> Step {
            self.frame += 1;
            self.feed_at(metrics, frame_time(self.frame))
        }

        fn feed_at(&mut self, metrics: FaceMetrics, now: Timestamp) -> Step {
            let s = step(&self.state, &self.thresholds, metrics, now);
            self.state = s.state;
            s
        }

        fn feed_n(&mut self, metrics: FaceMetrics, n: usize) -> Vec<Step> {
            (0..n).map(|_| self.feed(metrics)).collect()
        }
    }

    fn kinds(step: &Step) -> Vec<&'static str> {
        step.events.iter().map(MonitorEvent::kind).collect()
    }

    // ── counters ────────────────────────────────────────────────────

    #[test]
    fn test_counter_equals_trailing_run_length() {
        // Deterministic pseudo-random below/above pattern.
        let mut run = Run::new();
        let mut seed: u32 = 0x2545_f491;
        let mut expected = 0u32;
        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let below = seed % 3 != 0;
            let metrics = FaceMetrics::new(if below { 0.1 } else { 0.3 }, 0.0);
            run.feed(metrics);
            expected = if below { expected + 1 } else { 0 };
            assert_eq!(run.state.ear_counter, expected);
        }
    }

    #[test]
    fn test_threshold_comparisons_are_strict() {
        let mut run = Run::new();
        run.feed(FaceMetrics::new(0.25, 0.50));
        assert_eq!(run.state.ear_counter, 0);
        assert_eq!(run.state.mar_counter, 0);
    }

    #[test]
    fn test_every_step_logs_metrics_first() {
        let mut run = Run::new();
        let s = run.feed(AWAKE);
        assert_eq!(kinds(&s), ["metrics"]);
        assert!(s.commands.is_empty());
    }

    // ── onset ───────────────────────────────────────────────────────

    #[test]
    fn test_no_alert_before_consecutive_frames() {
        let mut run = Run::new();
        for _ in 0..10 {
            for s in run.feed_n(DROWSY, 47) {
                assert!(s.commands.is_empty());
            }
            run.feed(AWAKE);
        }
        assert!(!run.state.alert_active());
    }

    #[test]
    fn test_alert_on_at_forty_eighth_drowsy_frame() {
        let mut run = Run::new();
        let steps = run.feed_n(DROWSY, 48);

        assert!(steps[..47].iter().all(|s| s.commands.is_empty()));
        let onset = &steps[47];
        assert_eq!(onset.commands, [ActuatorCommand::on(ActuatorId::Primary)]);
        assert_eq!(kinds(onset), ["metrics", "alert_on"]);
        assert_eq!(run.state.alert_started_at(), Some(frame_time(48)));
    }

    #[test]
    fn test_yawn_alone_triggers_alert() {
        let mut run = Run::new();
        let steps = run.feed_n(YAWN, 24);

        assert!(steps[..23].iter().all(|s| s.commands.is_empty()));
        assert_eq!(steps[23].commands, [ActuatorCommand::on(ActuatorId::Primary)]);
        assert_eq!(run.state.ear_counter, 0);
        assert_eq!(run.state.mar_counter, 24);
    }

    // ── escalation ──────────────────────────────────────────────────

    #[test]
    fn test_escalates_on_first_frame_past_delay() {
        let mut run = Run::new();
        run.feed_n(DROWSY, 48);
        let onset = frame_time(48);

        // 80 frames later is exactly 5.0s: not yet past the delay.
        for s in run.feed_n(DROWSY, 80) {
            assert!(s.commands.is_empty());
        }
        assert_eq!(frame_time(run.frame).since(onset), Duration::from_secs(5));
        assert!(!run.state.escalated());

        let s = run.feed(DROWSY);
        assert_eq!(s.commands, [ActuatorCommand::on(ActuatorId::Secondary)]);
        assert_eq!(kinds(&s), ["metrics", "escalate_on"]);
        assert!(run.state.escalated());
        assert_eq!(run.state.alert_started_at(), Some(onset));
    }

    #[test]
    fn test_escalated_fatigue_is_a_no_op() {
        let mut run = Run::new();
        run.feed_n(DROWSY, 48 + 81);
        assert!(run.state.escalated());

        for s in run.feed_n(DROWSY, 200) {
            assert!(s.commands.is_empty());
            assert_eq!(kinds(&s), ["metrics"]);
        }
    }

    #[test]
    fn test_escalation_uses_time_not_frames() {
        let mut run = Run::new();
        run.feed_n(DROWSY, 48);
        // A stalled camera: next frame arrives 6s later.
        let s = run.feed_at(DROWSY, frame_time(48) + Duration::from_secs(6));
        assert_eq!(s.commands, [ActuatorCommand::on(ActuatorId::Secondary)]);
    }

    // ── recovery ────────────────────────────────────────────────────

    #[test]
    fn test_false_alarm_clears_buzzer() {
        let mut run = Run::new();
        run.feed_n(DROWSY, 48);
        run.feed_n(DROWSY, 10);

        let s = run.feed(AWAKE);
        assert_eq!(s.commands, [ActuatorCommand::off(ActuatorId::Primary)]);
        match &s.events[1] {
            MonitorEvent::AlertCleared { false_alarm, .. } => assert!(*false_alarm),
            other => panic!("expected alert_cleared, got {other:?}"),
        }
        assert_eq!(run.state, FatigueState::new());
    }

    #[test]
    fn test_clear_at_exact_window_is_false_alarm() {
        let mut run = Run::new();
        run.feed_n(DROWSY, 48);
        let s = run.feed_at(AWAKE, frame_time(48) + Duration::from_secs(5));
        match &s.events[1] {
            MonitorEvent::AlertCleared { false_alarm, .. } => assert!(*false_alarm),
            other => panic!("expected alert_cleared, got {other:?}"),
        }
    }

    #[test]
    fn test_late_recovery_without_escalation_still_clears() {
        let mut run = Run::new();
        run.feed_n(DROWSY, 48);
        // Recovery lands after the delay, before any escalating frame.
        let s = run.feed_at(AWAKE, frame_time(48) + Duration::from_millis(5_500));

        assert_eq!(s.commands, [ActuatorCommand::off(ActuatorId::Primary)]);
        match &s.events[1] {
            MonitorEvent::AlertCleared { false_alarm, .. } => assert!(!*false_alarm),
            other => panic!("expected alert_cleared, got {other:?}"),
        }
        assert!(!run.state.alert_active());
        assert_eq!(run.state.alert_started_at(), None);
    }

    #[test]
    fn test_escalation_clears_both_outputs_in_one_step() {
        let mut run = Run::new();
        run.feed_n(DROWSY, 48 + 81);

        let s = run.feed(AWAKE);
        assert_eq!(
            s.commands,
            [
                ActuatorCommand::off(ActuatorId::Primary),
                ActuatorCommand::off(ActuatorId::Secondary)
            ]
        );
        assert_eq!(kinds(&s), ["metrics", "escalation_cleared"]);
        assert_eq!(run.state, FatigueState::new());
    }

    #[test]
    fn test_realert_after_clear_restarts_episode_clock() {
        let mut run = Run::new();
        run.feed_n(DROWSY, 48);
        run.feed(AWAKE);
        run.feed_n(DROWSY, 48);

        assert!(run.state.alert_active());
        assert_eq!(run.state.alert_started_at(), Some(frame_time(run.frame)));
    }

    #[test]
    fn test_sixteen_fps_drowsy_scenario() {
        let mut run = Run::new();

        let steps = run.feed_n(DROWSY, 48);
        assert_eq!(steps[47].commands, [ActuatorCommand::on(ActuatorId::Primary)]);

        let steps = run.feed_n(DROWSY, 81);
        let escalations: Vec<_> = steps
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.commands.is_empty())
            .collect();
        assert_eq!(escalations.len(), 1);
        assert_eq!(escalations[0].0, 80);

        let s = run.feed(AWAKE);
        assert_eq!(s.commands.len(), 2);
        assert!(!run.state.alert_active());
        assert_eq!(run.state.ear_counter, 0);
        assert_eq!(run.state.mar_counter, 0);
    }

    #[test]
    fn test_custom_thresholds() {
        let mut run = Run::with(Thresholds {
            ear_consec_frames: 3,
            escalation_delay_secs: 0.1,
            ..Default::default()
        });
        let steps = run.feed_n(DROWSY, 6);
        assert_eq!(steps[2].commands, [ActuatorCommand::on(ActuatorId::Primary)]);
        // 0.125s after onset at frame 3
        assert_eq!(steps[4].commands, [ActuatorCommand::on(ActuatorId::Secondary)]);
    }
}
