use crate::algorithms::least_squares::SolverMethod;
use crate::algorithms::localizer::LocalizationSession;
use crate::core::{
    ReferencePoint, DEFAULT_DISTANCE_PRECISION, MAX_DISTANCE_PRECISION, MIN_REFERENCE_POINTS,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Solver tuning shared by every solve of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalizerConfig {
    /// Least-squares decomposition
    pub solver: SolverMethod,
    /// Decimal digits kept on estimated distances (`None` disables rounding)
    pub distance_precision: Option<u32>,
    /// Distances above this bound are logged and reported as low confidence
    pub max_reliable_distance: Option<f64>,
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        Self {
            solver: SolverMethod::NormalEquations,
            distance_precision: Some(DEFAULT_DISTANCE_PRECISION),
            max_reliable_distance: None,
        }
    }
}

impl LocalizerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(precision) = self.distance_precision {
            if precision > MAX_DISTANCE_PRECISION {
                return Err(ConfigError::InvalidParameter {
                    parameter: "distancePrecision".to_string(),
                    value: precision.to_string(),
                    reason: format!("must be at most {}", MAX_DISTANCE_PRECISION),
                });
            }
        }

        if let Some(limit) = self.max_reliable_distance {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(ConfigError::InvalidParameter {
                    parameter: "maxReliableDistance".to_string(),
                    value: limit.to_string(),
                    reason: "must be a positive finite distance".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Calibration set plus solver settings, as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationConfig {
    #[serde(default)]
    pub localizer: LocalizerConfig,
    /// Ordered reference points; readings must follow the same order
    pub reference_points: Vec<ReferencePoint>,
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid parameter value
    InvalidParameter { parameter: String, value: String, reason: String },
    /// Two reference points share a name
    DuplicateReferencePoint { name: String },
    /// Configuration file I/O error
    IoError { message: String },
    /// JSON serialization/deserialization error
    SerializationError { message: String },
}

impl CalibrationConfig {
    pub fn new(reference_points: Vec<ReferencePoint>) -> Self {
        Self {
            localizer: LocalizerConfig::default(),
            reference_points,
        }
    }

    pub fn with_localizer(mut self, localizer: LocalizerConfig) -> Self {
        self.localizer = localizer;
        self
    }

    /// Parse and validate a JSON calibration document
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: CalibrationConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to parse calibration: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load calibration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read calibration file '{}': {}", path_str, e),
        })?;

        let config = Self::from_json_str(&content).map_err(|e| match e {
            ConfigError::SerializationError { message } => ConfigError::SerializationError {
                message: format!("{} ({})", message, path_str),
            },
            other => other,
        })?;

        tracing::info!(
            path = %path_str,
            reference_points = config.reference_points.len(),
            "loaded calibration"
        );
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializationError {
            message: format!("Failed to serialize calibration: {}", e),
        })
    }

    /// Save calibration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let content = self.to_json_string()?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write calibration file '{}': {}", path_str, e),
        })?;

        tracing::debug!(path = %path_str, "saved calibration");
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.localizer.validate()?;

        let mut names = HashSet::new();
        for point in &self.reference_points {
            if !names.insert(point.name()) {
                return Err(ConfigError::DuplicateReferencePoint {
                    name: point.name().to_string(),
                });
            }
        }

        if self.reference_points.len() < MIN_REFERENCE_POINTS {
            tracing::warn!(
                reference_points = self.reference_points.len(),
                required = MIN_REFERENCE_POINTS,
                "calibration cannot produce a position"
            );
        }

        Ok(())
    }

    pub fn into_session(self) -> Result<LocalizationSession, ConfigError> {
        self.validate()?;
        LocalizationSession::with_config(self.reference_points, self.localizer)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidParameter { parameter, value, reason } => {
                write!(f, "Invalid parameter '{}' = '{}': {}", parameter, value, reason)
            }
            ConfigError::DuplicateReferencePoint { name } => {
                write!(f, "Duplicate reference point name: {}", name)
            }
            ConfigError::IoError { message } => {
                write!(f, "I/O error: {}", message)
            }
            ConfigError::SerializationError { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
