use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alerting::domain::thresholds::Thresholds;
use crate::detection::domain::face_selection::FaceSelection;
use crate::shared::constants::{
    BUZZER_PIN, CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_GPIO_ROOT, RELAY_PIN,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActuatorBackend {
    /// Log every write, touch no hardware.
    #[default]
    Log,
    /// Linux sysfs GPIO.
    Gpio,
}

impl fmt::Display for ActuatorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActuatorBackend::Log => write!(f, "log"),
            ActuatorBackend::Gpio => write!(f, "gpio"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    pub backend: ActuatorBackend,
    /// BCM pin of the buzzer.
    pub primary_pin: u32,
    /// BCM pin of the escalation relay.
    pub secondary_pin: u32,
    pub gpio_root: PathBuf,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            backend: ActuatorBackend::default(),
            primary_pin: BUZZER_PIN,
            secondary_pin: RELAY_PIN,
            gpio_root: PathBuf::from(DEFAULT_GPIO_ROOT),
        }
    }
}

/// Static monitor configuration. Missing fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub thresholds: Thresholds,
    pub face_selection: FaceSelection,
    pub actuators: ActuatorConfig,
    /// Append log lines here instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl MonitorConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads `path` if given, failing on any error. Without a path, the
    /// platform config file is used when it exists, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load_from(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::load_from(&path)?,
                None => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate().map_err(ConfigError::Invalid)?;
        if self.actuators.primary_pin == self.actuators.secondary_pin {
            return Err(ConfigError::Invalid(format!(
                "buzzer and escalation share pin {}",
                self.actuators.primary_pin
            )));
        }
        Ok(())
    }
}
