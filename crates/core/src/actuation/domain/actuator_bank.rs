use crate::actuation::domain::actuator_sink::{ActuatorError, ActuatorId, ActuatorSink};
use crate::alerting::domain::fatigue_state_machine::ActuatorCommand;

/// Owns the actuator sink and tracks what the hardware is believed to show.
///
/// `desired` is what the state machine last asked for. `confirmed` is the
/// last level a write succeeded with, or `None` after a failed write, when
/// the physical level is unknown. Stale outputs are rewritten on the next
/// step that carries commands, never in a tight retry loop.
pub struct ActuatorBank {
    sink: Box<dyn ActuatorSink>,
    desired: [bool; 2],
    confirmed: [Option<bool>; 2],
    released: bool,
}

fn slot(id: ActuatorId) -> usize {
    match id {
        ActuatorId::Primary => 0,
        ActuatorId::Secondary => 1,
    }
}

impl ActuatorBank {
    pub fn new(sink: Box<dyn ActuatorSink>) -> Self {
        Self {
            sink,
            desired: [false; 2],
            confirmed: [None; 2],
            released: false,
        }
    }

    /// Drives both outputs off so the hardware starts from a known level.
    pub fn initialize(&mut self) -> Vec<ActuatorError> {
        self.desired = [false; 2];
        ActuatorId::ALL
            .into_iter()
            .filter_map(|id| self.write(id, false).err())
            .collect()
    }

    /// Writes `commands` in order, then resynchronises any other output whose
    /// confirmed level differs from its desired level.
    ///
    /// An empty command list performs no writes.
    pub fn apply(&mut self, commands: &[ActuatorCommand]) -> Vec<ActuatorError> {
        if self.released || commands.is_empty() {
            return Vec::new();
        }

        let mut errors = Vec::new();
        for cmd in commands {
            self.desired[slot(cmd.output)] = cmd.on;
            if let Err(e) = self.write(cmd.output, cmd.on) {
                errors.push(e);
            }
        }

        for id in ActuatorId::ALL {
            let i = slot(id);
            let commanded = commands.iter().any(|c| c.output == id);
            if !commanded && self.confirmed[i] != Some(self.desired[i]) {
                log::debug!("Retrying {id} -> {}", level(self.desired[i]));
                if let Err(e) = self.write(id, self.desired[i]) {
                    errors.push(e);
                }
            }
        }
        errors
    }

    /// Forces both outputs off and releases the sink. Only the first call
    /// touches the hardware.
    pub fn shutdown(&mut self) -> Vec<ActuatorError> {
        if self.released {
            return Vec::new();
        }
        self.released = true;
        self.desired = [false; 2];
        let errors = ActuatorId::ALL
            .into_iter()
            .filter_map(|id| self.write(id, false).err())
            .collect();
        self.sink.release();
        errors
    }

    pub fn desired(&self, id: ActuatorId) -> bool {
        self.desired[slot(id)]
    }

    /// Last level known to be on the hardware; `None` when unknown.
    pub fn confirmed(&self, id: ActuatorId) -> Option<bool> {
        self.confirmed[slot(id)]
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn write(&mut self, id: ActuatorId, on: bool) -> Result<(), ActuatorError> {
        match self.sink.set(id, on) {
            Ok(()) => {
                self.confirmed[slot(id)] = Some(on);
                Ok(())
            }
            Err(e) => {
                self.confirmed[slot(id)] = None;
                Err(e)
            }
        }
    }
}

fn level(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}
