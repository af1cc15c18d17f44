pub mod log_actuator_sink;
pub mod sysfs_gpio_sink;
