use crate::shared::clock::Timestamp;

/// Where the subject is in an alert episode.
///
/// The episode start lives inside the alerting variants, so a relay can
/// never be engaged without an active alert.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlertPhase {
    #[default]
    Idle,
    /// Buzzer on.
    Alerting { since: Timestamp },
    /// Buzzer and relay on.
    Escalated { since: Timestamp },
}

/// Persistent per-subject fatigue state, mutated once per processed face.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FatigueState {
    /// Consecutive frames with EAR below threshold.
    pub ear_counter: u32,
    /// Consecutive frames with MAR above threshold.
    pub mar_counter: u32,
    pub phase: AlertPhase,
}

impl FatigueState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alert_active(&self) -> bool {
        !matches!(self.phase, AlertPhase::Idle)
    }

    pub fn escalated(&self) -> bool {
        matches!(self.phase, AlertPhase::Escalated { .. })
    }

    pub fn alert_started_at(&self) -> Option<Timestamp> {
        match self.phase {
            AlertPhase::Idle => None,
            AlertPhase::Alerting { since } | AlertPhase::Escalated { since } => Some(since),
        }
    }
}
