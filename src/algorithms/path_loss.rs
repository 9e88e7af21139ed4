//! Log-distance path-loss inversion
//!
//! Converts a received signal strength into a distance estimate relative to
//! a calibrated reference point:
//!
//! ```text
//! beta     = (reference.signal - rssi) / (10 * n)
//! distance = reference.distance * 10^beta
//! ```

use crate::core::{ApNode, ReferencePoint, DEFAULT_DISTANCE_PRECISION, MAX_DISTANCE_PRECISION};
use crate::utils::config::LocalizerConfig;
use crate::validation::error::{LocalizationError, LocalizationResult};

/// Estimate the distance to `point` for one reading, rounded to
/// [`DEFAULT_DISTANCE_PRECISION`] decimal digits.
pub fn estimate_distance(point: &ReferencePoint, signal_strength: f64) -> LocalizationResult<f64> {
    DistanceEstimator::default().estimate(point, signal_strength)
}

/// Pair every reference point with the distance implied by the reading at
/// the same index.
pub fn resolve_all_distances(
    points: &[ReferencePoint],
    signal_strengths: &[f64],
) -> LocalizationResult<Vec<ApNode>> {
    DistanceEstimator::default().resolve_all(points, signal_strengths)
}

/// Configurable distance estimation
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceEstimator {
    /// Decimal digits kept on each distance (`None` disables rounding),
    /// capped at [`MAX_DISTANCE_PRECISION`]
    pub precision: Option<u32>,
    /// Distances above this bound are reported as low confidence
    pub max_reliable_distance: Option<f64>,
}

impl Default for DistanceEstimator {
    fn default() -> Self {
        Self {
            precision: Some(DEFAULT_DISTANCE_PRECISION),
            max_reliable_distance: None,
        }
    }
}

impl DistanceEstimator {
    pub fn new(precision: Option<u32>, max_reliable_distance: Option<f64>) -> Self {
        Self {
            precision,
            max_reliable_distance,
        }
    }

    pub fn from_config(config: &LocalizerConfig) -> Self {
        Self::new(config.distance_precision, config.max_reliable_distance)
    }

    /// Invert the path-loss model for a single reading
    pub fn estimate(
        &self,
        point: &ReferencePoint,
        signal_strength: f64,
    ) -> LocalizationResult<f64> {
        let attenuation = point.signal_attenuation();
        if !(attenuation > 0.0) {
            return Err(LocalizationError::InvalidCalibration {
                reference_point: point.name().to_string(),
                parameter: "signalAttenuation".to_string(),
                value: attenuation,
            });
        }

        let reference = point.reference();
        let beta = (reference.signal - signal_strength) / (10.0 * attenuation);
        let distance = reference.distance * 10_f64.powf(beta);

        Ok(self.round(distance))
    }

    /// Resolve distances for a whole reading vector, strictly by position
    pub fn resolve_all(
        &self,
        points: &[ReferencePoint],
        signal_strengths: &[f64],
    ) -> LocalizationResult<Vec<ApNode>> {
        if points.len() != signal_strengths.len() {
            return Err(LocalizationError::ArityMismatch {
                expected: points.len(),
                actual: signal_strengths.len(),
            });
        }

        points
            .iter()
            .zip(signal_strengths)
            .map(|(point, &signal)| {
                let location = point.location();
                Ok(ApNode {
                    x: location.x,
                    y: location.y,
                    distance: self.estimate(point, signal)?,
                })
            })
            .collect()
    }

    /// Indices of nodes whose distance exceeds the reliable range
    pub fn low_confidence(&self, nodes: &[ApNode]) -> Vec<usize> {
        match self.max_reliable_distance {
            Some(limit) => nodes
                .iter()
                .enumerate()
                .filter(|(_, node)| !(node.distance <= limit))
                .map(|(index, _)| index)
                .collect(),
            None => Vec::new(),
        }
    }

    fn round(&self, distance: f64) -> f64 {
        match self.precision {
            Some(digits) => {
                let scale = 10_f64.powi(digits.min(MAX_DISTANCE_PRECISION) as i32);
                let scaled = distance * scale;
                if scaled.is_finite() {
                    scaled.round() / scale
                } else {
                    distance
                }
            }
            None => distance,
        }
    }
}
