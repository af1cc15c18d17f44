//! Default thresholds and hardware wiring.
//!
//! Frame counts assume a camera delivering roughly 16 frames per second.

pub const DEFAULT_EAR_THRESHOLD: f64 = 0.25;
pub const DEFAULT_MAR_THRESHOLD: f64 = 0.50;

/// ~3 seconds of closed eyes at 16 fps.
pub const DEFAULT_EAR_CONSEC_FRAMES: u32 = 48;
/// ~1.5 seconds of open mouth at 16 fps.
pub const DEFAULT_MAR_CONSEC_FRAMES: u32 = 24;

/// Seconds the buzzer sounds alone before the relay engages.
pub const DEFAULT_ESCALATION_DELAY_SECS: f64 = 5.0;
/// Seconds after alert onset within which recovery counts as a false alarm.
pub const DEFAULT_CLEAR_WINDOW_SECS: f64 = 5.0;

pub const DEFAULT_REPLAY_FPS: f64 = 16.0;

/// BCM pin numbers.
pub const BUZZER_PIN: u32 = 18;
pub const RELAY_PIN: u32 = 26;

pub const DEFAULT_GPIO_ROOT: &str = "/sys/class/gpio";

pub const CONFIG_DIR_NAME: &str = "WakeGuard";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Total points in a full facial landmark shape.
pub const SHAPE_POINT_COUNT: usize = 68;
