//! Core data types for the localization engine

use crate::validation::error::{LocalizationError, LocalizationResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Planar coordinate of a reference point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Signal strength (dBm) measured at a known distance during calibration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub distance: f64,
    pub signal: f64,
}

impl Calibration {
    pub fn new(distance: f64, signal: f64) -> Self {
        Self { distance, signal }
    }
}

/// Calibrated access point with a known location.
///
/// Fields are read-only once constructed; every constructor (including
/// deserialization) rejects a non-positive path-loss exponent or
/// calibration distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ReferencePointRecord", into = "ReferencePointRecord")]
pub struct ReferencePoint {
    name: String,
    location: Location,
    signal_attenuation: f64,
    reference: Calibration,
}

/// On-disk shape of a reference point
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReferencePointRecord {
    name: String,
    location: Location,
    signal_attenuation: f64,
    reference: Calibration,
}

impl ReferencePoint {
    pub fn new(
        name: impl Into<String>,
        location: Location,
        signal_attenuation: f64,
        reference: Calibration,
    ) -> LocalizationResult<Self> {
        let point = Self {
            name: name.into(),
            location,
            signal_attenuation,
            reference,
        };
        point.validate()?;
        Ok(point)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Path-loss exponent of the environment around this point
    pub fn signal_attenuation(&self) -> f64 {
        self.signal_attenuation
    }

    pub fn reference(&self) -> Calibration {
        self.reference
    }

    /// Expected signal strength at `distance` under the log-distance model.
    ///
    /// Returns `None` for a non-positive or non-finite distance.
    pub fn signal_at(&self, distance: f64) -> Option<f64> {
        if !distance.is_finite() || distance <= 0.0 {
            return None;
        }
        let ratio = distance / self.reference.distance;
        Some(self.reference.signal - 10.0 * self.signal_attenuation * ratio.log10())
    }

    /// Check the calibration invariants
    pub fn validate(&self) -> LocalizationResult<()> {
        let checks = [
            ("signalAttenuation", self.signal_attenuation, true),
            ("reference.distance", self.reference.distance, true),
            ("reference.signal", self.reference.signal, false),
            ("location.x", self.location.x, false),
            ("location.y", self.location.y, false),
        ];

        for (parameter, value, must_be_positive) in checks {
            if !value.is_finite() || (must_be_positive && value <= 0.0) {
                return Err(LocalizationError::InvalidCalibration {
                    reference_point: self.name.clone(),
                    parameter: parameter.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

impl TryFrom<ReferencePointRecord> for ReferencePoint {
    type Error = LocalizationError;

    fn try_from(record: ReferencePointRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.name,
            record.location,
            record.signal_attenuation,
            record.reference,
        )
    }
}

impl From<ReferencePoint> for ReferencePointRecord {
    fn from(point: ReferencePoint) -> Self {
        Self {
            name: point.name,
            location: point.location,
            signal_attenuation: point.signal_attenuation,
            reference: point.reference,
        }
    }
}

/// Reference point coordinates paired with the distance estimated for one
/// reading vector. Lives only for the duration of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ApNode {
    pub x: f64,
    pub y: f64,
    pub distance: f64,
}

/// Estimated position, in the units of the calibration locations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, location: &Location) -> f64 {
        let dx = self.x - location.x;
        let dy = self.y - location.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.x, self.y)
    }
}
