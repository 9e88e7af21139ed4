//! Localization session: fixed calibration, many independent solves

use crate::algorithms::least_squares::solve_with;
use crate::algorithms::linear_system::build_system;
use crate::algorithms::path_loss::DistanceEstimator;
use crate::core::{ApNode, Position, ReferencePoint, MIN_REFERENCE_POINTS};
use crate::utils::config::{ConfigError, LocalizerConfig};
use crate::validation::error::LocalizationResult;
use serde::Serialize;

/// Outcome of one solve with its working data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    pub position: Position,
    /// Per-reference-point distances, in calibration order
    pub nodes: Vec<ApNode>,
    /// RMS of `|position - point| - distance` over all nodes
    pub residual_rms: f64,
    /// Indices whose distance exceeded the configured reliable range
    pub low_confidence: Vec<usize>,
}

/// Ordered, read-only calibration set.
///
/// Solves never write back into the session, so one session can be shared
/// across threads (`&LocalizationSession` or `Arc<LocalizationSession>`).
/// With exactly three reference points the system is square and least
/// squares provides no averaging of range noise.
#[derive(Debug, Clone)]
pub struct LocalizationSession {
    reference_points: Vec<ReferencePoint>,
    config: LocalizerConfig,
    estimator: DistanceEstimator,
}

impl LocalizationSession {
    pub fn new(reference_points: Vec<ReferencePoint>) -> Self {
        let config = LocalizerConfig::default();
        Self::build(reference_points, config)
    }

    pub fn with_config(
        reference_points: Vec<ReferencePoint>,
        config: LocalizerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(reference_points, config))
    }

    fn build(reference_points: Vec<ReferencePoint>, config: LocalizerConfig) -> Self {
        let count = reference_points.len();
        if count < MIN_REFERENCE_POINTS {
            tracing::warn!(
                reference_points = count,
                required = MIN_REFERENCE_POINTS,
                "session cannot produce a position"
            );
        } else if count == MIN_REFERENCE_POINTS {
            tracing::debug!("three reference points: fully determined system, no noise averaging");
        }

        Self {
            estimator: DistanceEstimator::from_config(&config),
            reference_points,
            config,
        }
    }

    pub fn count(&self) -> usize {
        self.reference_points.len()
    }

    pub fn reference_points(&self) -> &[ReferencePoint] {
        &self.reference_points
    }

    pub fn config(&self) -> &LocalizerConfig {
        &self.config
    }

    /// Estimate the position for one reading vector (dBm, calibration order)
    pub fn estimate_position(&self, signal_strengths: &[f64]) -> LocalizationResult<Position> {
        self.estimate_solution(signal_strengths).map(|solution| solution.position)
    }

    /// Same as [`estimate_position`](Self::estimate_position), keeping the
    /// derived distances and fit diagnostics
    pub fn estimate_solution(&self, signal_strengths: &[f64]) -> LocalizationResult<Solution> {
        let span = tracing::debug_span!("estimate_position", reference_points = self.count());
        let _guard = span.enter();

        let result = self.solve(signal_strengths);
        match &result {
            Ok(solution) => tracing::debug!(
                x = solution.position.x,
                y = solution.position.y,
                residual_rms = solution.residual_rms,
                "position estimated"
            ),
            Err(error) => tracing::debug!(kind = error.kind(), %error, "solve failed"),
        }
        result
    }

    fn solve(&self, signal_strengths: &[f64]) -> LocalizationResult<Solution> {
        let nodes = self.estimator.resolve_all(&self.reference_points, signal_strengths)?;

        let low_confidence = self.estimator.low_confidence(&nodes);
        for &index in &low_confidence {
            tracing::warn!(
                reference_point = self.reference_points[index].name(),
                distance = nodes[index].distance,
                "distance estimate outside reliable range"
            );
        }

        let system = build_system(&nodes)?;
        let position = solve_with(&system, self.config.solver)?;
        let residual_rms = residual_rms(&nodes, &position);

        Ok(Solution {
            position,
            nodes,
            residual_rms,
            low_confidence,
        })
    }
}

fn residual_rms(nodes: &[ApNode], position: &Position) -> f64 {
    if nodes.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = nodes
        .iter()
        .map(|node| {
            let range = ((position.x - node.x).powi(2) + (position.y - node.y).powi(2)).sqrt();
            (range - node.distance).powi(2)
        })
        .sum();

    (sum_squares / nodes.len() as f64).sqrt()
}
