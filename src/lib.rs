//! RSSI Localizer
//!
//! Estimates the 2D position of a wireless node from signal strengths
//! observed at calibrated access points, using the log-distance path-loss
//! model and a linearized least-squares multilateration solve.

pub mod core;
pub mod algorithms;
pub mod validation;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{
    ApNode, Calibration, Location, Position, ReferencePoint, MIN_REFERENCE_POINTS,
};
pub use algorithms::{
    build_system, estimate_distance, resolve_all_distances, solve, solve_with,
    DistanceEstimator, LinearSystem, LocalizationSession, Solution, SolverMethod,
};
pub use validation::{LocalizationError, LocalizationResult};
pub use utils::{CalibrationConfig, ConfigError, LocalizerConfig};
