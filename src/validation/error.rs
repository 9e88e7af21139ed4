use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure outcomes of a localization solve.
///
/// Every variant is detected at the point of violation and returned to the
/// caller; no partial position is ever produced alongside an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocalizationError {
    /// A reference point carries an unusable calibration value
    InvalidCalibration {
        reference_point: String,
        parameter: String,
        value: f64,
    },
    /// Reading vector length differs from the reference-point count
    ArityMismatch {
        expected: usize,
        actual: usize,
    },
    /// Too few reference points to determine two unknowns
    InsufficientReferencePoints {
        available: usize,
        required: usize,
    },
    /// The system has no usable solution: the normal matrix is not
    /// invertible (colinear or coincident points), or a non-finite range
    /// left the solution undefined
    DegenerateGeometry {
        matrix: String,
        /// `None` when the matrix is exactly singular or the right-hand side
        /// is not finite
        condition_estimate: Option<f64>,
    },
}

pub type LocalizationResult<T> = Result<T, LocalizationError>;

impl LocalizationError {
    /// Short machine-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            LocalizationError::InvalidCalibration { .. } => "invalid_calibration",
            LocalizationError::ArityMismatch { .. } => "arity_mismatch",
            LocalizationError::InsufficientReferencePoints { .. } => {
                "insufficient_reference_points"
            }
            LocalizationError::DegenerateGeometry { .. } => "degenerate_geometry",
        }
    }
}

impl fmt::Display for LocalizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalizationError::InvalidCalibration { reference_point, parameter, value } => {
                write!(
                    f,
                    "Invalid calibration for reference point '{}': {} = {}",
                    reference_point, parameter, value
                )
            }
            LocalizationError::ArityMismatch { expected, actual } => {
                write!(f, "Expected {} signal readings, got {}", expected, actual)
            }
            LocalizationError::InsufficientReferencePoints { available, required } => {
                write!(
                    f,
                    "Insufficient reference points: {} available, {} required",
                    available, required
                )
            }
            LocalizationError::DegenerateGeometry { matrix, condition_estimate } => {
                match condition_estimate {
                    Some(estimate) => write!(
                        f,
                        "Degenerate reference geometry: {} is singular (condition estimate {:.3e})",
                        matrix, estimate
                    ),
                    None => write!(
                        f,
                        "Degenerate reference geometry: {} is singular or not finite",
                        matrix
                    ),
                }
            }
        }
    }
}

impl std::error::Error for LocalizationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = LocalizationError::ArityMismatch { expected: 3, actual: 2 };
        assert_eq!(error.to_string(), "Expected 3 signal readings, got 2");

        let error = LocalizationError::InsufficientReferencePoints { available: 2, required: 3 };
        assert!(error.to_string().contains("2 available"));
    }

    #[test]
    fn test_error_kind() {
        let error = LocalizationError::DegenerateGeometry {
            matrix: "AtA".to_string(),
            condition_estimate: None,
        };
        assert_eq!(error.kind(), "degenerate_geometry");
        assert!(error.to_string().contains("singular"));

        let error = LocalizationError::DegenerateGeometry {
            matrix: "A".to_string(),
            condition_estimate: Some(2.5e13),
        };
        assert!(error.to_string().contains("2.500e13"));
    }

    #[test]
    fn test_error_serialization() {
        let error = LocalizationError::InvalidCalibration {
            reference_point: "ap-1".to_string(),
            parameter: "signalAttenuation".to_string(),
            value: 0.0,
        };
        let json = serde_json::to_string(&error).unwrap();
        let back: LocalizationError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, error);
    }

    #[test]
    fn test_degenerate_geometry_serialization() {
        for condition_estimate in [None, Some(3.2e14)] {
            let error = LocalizationError::DegenerateGeometry {
                matrix: "AtA".to_string(),
                condition_estimate,
            };
            let json = serde_json::to_string(&error).unwrap();
            let back: LocalizationError = serde_json::from_str(&json).unwrap();
            assert_eq!(back, error);
        }
    }
}
