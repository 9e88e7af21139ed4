//! Calibration configuration and logging setup

pub mod config;
pub mod logging;

pub use config::{CalibrationConfig, ConfigError, LocalizerConfig};
pub use logging::{init_logging, LogConfig};
