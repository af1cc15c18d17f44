use crate::actuation::domain::actuator_sink::{ActuatorError, ActuatorId, ActuatorSink};

/// Dry-run sink: reports every write through the `log` crate and never fails.
///
/// Used when no GPIO hardware is attached, e.g. when replaying a trace.
#[derive(Debug, Default)]
pub struct LogActuatorSink {
    levels: [bool; 2],
}

impl LogActuatorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on(&self, output: ActuatorId) -> bool {
        self.levels[output as usize]
    }
}

impl ActuatorSink for LogActuatorSink {
    fn set(&mut self, output: ActuatorId, on: bool) -> Result<(), ActuatorError> {
        self.levels[output as usize] = on;
        log::info!("{output} {}", if on { "ON" } else { "OFF" });
        Ok(())
    }

    fn release(&mut self) {
        log::debug!("Log actuator sink released");
    }
}
