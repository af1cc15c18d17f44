//! Linux sysfs GPIO output driver.
//!
//! Each pin is exported through `<root>/export` if the kernel has not
//! already done so, configured as an output, and driven through
//! `<root>/gpio<N>/value`. Release drives the pins low and unexports the
//! ones this sink exported.

use std::fs;
use std::path::{Path, PathBuf};

use crate::actuation::domain::actuator_sink::{ActuatorError, ActuatorId, ActuatorSink};

pub struct SysfsGpioSink {
    root: PathBuf,
    /// BCM pin per output, indexed like [`ActuatorId::ALL`].
    pins: [u32; 2],
    exported: Vec<u32>,
}

impl SysfsGpioSink {
    pub fn open(root: &Path, primary_pin: u32, secondary_pin: u32) -> Result<Self, ActuatorError> {
        let mut sink = Self {
            root: root.to_path_buf(),
            pins: [primary_pin, secondary_pin],
            exported: Vec::new(),
        };
        for id in ActuatorId::ALL {
            if let Err(e) = sink.prepare(id) {
                sink.release();
                return Err(e);
            }
        }
        log::info!(
            "GPIO initialized ({}: pin {primary_pin}, {}: pin {secondary_pin})",
            ActuatorId::Primary,
            ActuatorId::Secondary
        );
        Ok(sink)
    }

    pub fn pin(&self, output: ActuatorId) -> u32 {
        self.pins[output as usize]
    }

    fn pin_dir(&self, pin: u32) -> PathBuf {
        self.root.join(format!("gpio{pin}"))
    }

    fn prepare(&mut self, output: ActuatorId) -> Result<(), ActuatorError> {
        let pin = self.pin(output);
        let dir = self.pin_dir(pin);
        if !dir.exists() {
            fs::write(self.root.join("export"), pin.to_string())
                .map_err(|source| ActuatorError::Write { output, source })?;
            self.exported.push(pin);
        }
        if !dir.is_dir() {
            return Err(ActuatorError::Unavailable {
                output,
                reason: format!("{} did not appear after export", dir.display()),
            });
        }
        fs::write(dir.join("direction"), "out")
            .map_err(|source| ActuatorError::Write { output, source })
    }
}

impl ActuatorSink for SysfsGpioSink {
    fn set(&mut self, output: ActuatorId, on: bool) -> Result<(), ActuatorError> {
        let value = self.pin_dir(self.pin(output)).join("value");
        fs::write(value, if on { "1" } else { "0" })
            .map_err(|source| ActuatorError::Write { output, source })
    }

    fn release(&mut self) {
        for pin in std::mem::take(&mut self.exported) {
            if let Err(e) = fs::write(self.root.join("unexport"), pin.to_string()) {
                log::warn!("Failed to unexport GPIO pin {pin}: {e}");
            }
        }
        log::info!("GPIO released");
    }
}
