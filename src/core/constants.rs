//! Model constants and solver parameters

/// Fewest reference points that yield a determined 2D linear system
pub const MIN_REFERENCE_POINTS: usize = 3;

/// Decimal digits kept on estimated distances
pub const DEFAULT_DISTANCE_PRECISION: u32 = 4;

/// Relative threshold below which a normal matrix is treated as singular
pub const SINGULARITY_TOLERANCE: f64 = 1e-12;

/// Largest supported rounding precision (f64 carries ~15 significant digits)
pub const MAX_DISTANCE_PRECISION: u32 = 15;
