//! Localization pipeline: distance estimation, linearization, least squares

pub mod path_loss;
pub mod linear_system;
pub mod least_squares;
pub mod localizer;

pub use path_loss::{estimate_distance, resolve_all_distances, DistanceEstimator};
pub use linear_system::{build_system, LinearSystem};
pub use least_squares::{solve, solve_with, SolverMethod};
pub use localizer::{LocalizationSession, Solution};
