use std::fmt;

use thiserror::Error;

/// The two independent binary outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActuatorId {
    /// Buzzer, engaged as soon as fatigue is detected.
    Primary,
    /// Escalation relay, engaged when the alert goes unresolved.
    Secondary,
}

impl ActuatorId {
    pub const ALL: [ActuatorId; 2] = [ActuatorId::Primary, ActuatorId::Secondary];

    pub fn name(&self) -> &'static str {
        match self {
            ActuatorId::Primary => "buzzer",
            ActuatorId::Secondary => "escalation",
        }
    }
}

impl fmt::Display for ActuatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug)]
pub enum ActuatorError {
    #[error("failed to drive {output}: {source}")]
    Write {
        output: ActuatorId,
        #[source]
        source: std::io::Error,
    },
    #[error("{output} is unavailable: {reason}")]
    Unavailable { output: ActuatorId, reason: String },
}

impl ActuatorError {
    pub fn output(&self) -> ActuatorId {
        match self {
            ActuatorError::Write { output, .. } | ActuatorError::Unavailable { output, .. } => {
                *output
            }
        }
    }
}

/// Domain interface for the physical alert outputs.
///
/// Writes are idempotent: setting an output to its current level is a
/// harmless no-op for the hardware.
pub trait ActuatorSink: Send {
    fn set(&mut self, output: ActuatorId, on: bool) -> Result<(), ActuatorError>;

    /// Releases hardware handles. Called once, after both outputs were
    /// driven off. Default: no-op.
    fn release(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_stable() {
        assert_eq!(ActuatorId::Primary.to_string(), "buzzer");
        assert_eq!(ActuatorId::Secondary.to_string(), "escalation");
    }

    #[test]
    fn test_error_reports_output() {
        let err = ActuatorError::Unavailable {
            output: ActuatorId::Secondary,
            reason: "not exported".into(),
        };
        assert_eq!(err.output(), ActuatorId::Secondary);
        assert_eq!(err.to_string(), "escalation is unavailable: not exported");
    }
}
