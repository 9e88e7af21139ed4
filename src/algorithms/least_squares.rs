//! Least-squares solve of the linearized system

use crate::algorithms::linear_system::LinearSystem;
use crate::core::{Position, SINGULARITY_TOLERANCE};
use crate::validation::error::{LocalizationError, LocalizationResult};
use nalgebra::SVD;
use serde::{Deserialize, Serialize};

/// Decomposition used to solve `A * X ~= B`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SolverMethod {
    /// `X = (A^T A)^-1 A^T B`
    #[default]
    NormalEquations,
    /// SVD of `A`, better behaved on ill-conditioned geometry
    Svd,
}

/// Solve with the normal equations
pub fn solve(system: &LinearSystem) -> LocalizationResult<Position> {
    solve_with(system, SolverMethod::NormalEquations)
}

pub fn solve_with(system: &LinearSystem, method: SolverMethod) -> LocalizationResult<Position> {
    let position = match method {
        SolverMethod::NormalEquations => normal_equations(system)?,
        SolverMethod::Svd => svd_least_squares(system)?,
    };

    // Overflowing or NaN ranges leave the geometry intact but poison B.
    if !(position.x.is_finite() && position.y.is_finite()) {
        return Err(LocalizationError::DegenerateGeometry {
            matrix: "B".to_string(),
            condition_estimate: None,
        });
    }
    Ok(position)
}

fn normal_equations(system: &LinearSystem) -> LocalizationResult<Position> {
    let at_a = system.a.tr_mul(&system.a);
    let at_b = system.a.tr_mul(&system.b);

    // For a 2x2 positive semi-definite matrix det / trace^2 = l1*l2 / (l1+l2)^2,
    // which tracks 1 / condition number.
    let trace = at_a.trace();
    let ratio = if trace > 0.0 {
        at_a.determinant().abs() / (trace * trace)
    } else {
        0.0
    };

    if !(ratio > SINGULARITY_TOLERANCE) {
        return Err(degenerate("AtA", ratio));
    }

    let inverse = at_a.try_inverse().ok_or_else(|| degenerate("AtA", ratio))?;
    let solution = inverse * at_b;

    Ok(Position::new(solution[0], solution[1]))
}

fn svd_least_squares(system: &LinearSystem) -> LocalizationResult<Position> {
    let svd = SVD::new(system.a.clone(), true, true);
    let largest = svd.singular_values.max();
    let smallest = svd.singular_values.min();

    let ratio = if largest > 0.0 { smallest / largest } else { 0.0 };
    if !(ratio > SINGULARITY_TOLERANCE) {
        return Err(degenerate("A", ratio));
    }

    let solution = svd
        .solve(&system.b, SINGULARITY_TOLERANCE * largest)
        .map_err(|_| degenerate("A", ratio))?;

    Ok(Position::new(solution[0], solution[1]))
}

/// `condition_estimate` is `None` when the matrix is exactly singular
fn degenerate(matrix: &str, inverse_condition: f64) -> LocalizationError {
    LocalizationError::DegenerateGeometry {
        matrix: matrix.to_string(),
        condition_estimate: if inverse_condition > 0.0 {
            Some(1.0 / inverse_condition)
        } else {
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::linear_system::build_system;
    use crate::core::ApNode;

    fn node(x: f64, y: f64, distance: f64) -> ApNode {
        ApNode { x, y, distance }
    }

    fn exact_nodes(points: &[(f64, f64)], truth: (f64, f64)) -> Vec<ApNode> {
        points
            .iter()
            .map(|&(x, y)| node(x, y, ((x - truth.0).powi(2) + (y - truth.1).powi(2)).sqrt()))
            .collect()
    }

    #[test]
    fn test_exact_three_point_solution() {
        let nodes = exact_nodes(&[(0.0, 0.0), (0.0, 10.0), (10.0, 0.0)], (5.0, 5.0));
        let position = solve(&build_system(&nodes).unwrap()).unwrap();
        assert!((position.x - 5.0).abs() < 1e-9);
        assert!((position.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_hand_computed_inconsistent_ranges() {
        // ranges 5, 5, 7.07 do not meet at a single point; the pivot at
        // (10, 0) fixes x from the first row: -20x = -100 - (25 - d^2)
        let nodes = [node(0.0, 0.0, 5.0), node(0.0, 10.0, 5.0), node(10.0, 0.0, 7.07)];
        let position = solve(&build_system(&nodes).unwrap()).unwrap();
        let range_delta: f64 = 25.0 - 7.07 * 7.07;
        let expected_x = (100.0 + range_delta) / 20.0;
        let expected_y = (20.0 * expected_x - range_delta) / 20.0;
        assert!((expected_x - 3.75).abs() < 1e-3);
        assert!((position.x - expected_x).abs() < 1e-9);
        assert!((position.y - expected_y).abs() < 1e-9);
    }

    #[test]
    fn test_overdetermined_matches_svd() {
        let corners = [(0.0, 0.0), (20.0, 0.0), (0.0, 15.0), (20.0, 15.0), (10.0, -5.0)];
        let mut nodes = exact_nodes(&corners, (6.5, 4.0));
        // perturb ranges so the system has a non-zero residual
        nodes[0].distance += 0.3;
        nodes[3].distance -= 0.2;

        let system = build_system(&nodes).unwrap();
        let normal = solve_with(&system, SolverMethod::NormalEquations).unwrap();
        let svd = solve_with(&system, SolverMethod::Svd).unwrap();

        assert!((normal.x - svd.x).abs() < 1e-8);
        assert!((normal.y - svd.y).abs() < 1e-8);
        assert!((normal.x - 6.5).abs() < 0.5);
        assert!((normal.y - 4.0).abs() < 0.5);
    }

    #[test]
    fn test_colinear_points_are_degenerate() {
        let nodes = [node(0.0, 0.0, 1.0), node(1.0, 0.0, 1.0), node(2.0, 0.0, 1.0)];
        let system = build_system(&nodes).unwrap();

        for method in [SolverMethod::NormalEquations, SolverMethod::Svd] {
            match solve_with(&system, method) {
                Err(LocalizationError::DegenerateGeometry { condition_estimate, .. }) => {
                    assert!(condition_estimate.map_or(true, |estimate| estimate > 1e12));
                }
                other => panic!("Expected DegenerateGeometry, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_diagonal_colinear_points_are_degenerate() {
        let nodes = [node(0.0, 0.0, 3.0), node(1.0, 3.0, 2.0), node(2.0, 6.0, 4.0)];
        let system = build_system(&nodes).unwrap();
        assert!(matches!(solve(&system), Err(LocalizationError::DegenerateGeometry { .. })));
    }

    #[test]
    fn test_coincident_points_are_degenerate() {
        let nodes = [node(1.0, 1.0, 2.0), node(1.0, 1.0, 2.0), node(1.0, 1.0, 2.0)];
        let system = build_system(&nodes).unwrap();
        assert!(matches!(solve(&system), Err(LocalizationError::DegenerateGeometry { .. })));
        assert!(matches!(
            solve_with(&system, SolverMethod::Svd),
            Err(LocalizationError::DegenerateGeometry { .. })
        ));
    }

    #[test]
    fn test_non_finite_ranges_rejected() {
        let overflowed = [
            node(0.0, 0.0, 5.0),
            node(0.0, 10.0, 5.0),
            node(10.0, 0.0, f64::INFINITY),
        ];
        let missing = [node(0.0, 0.0, 5.0), node(0.0, 10.0, f64::NAN), node(10.0, 0.0, 5.0)];

        for nodes in [overflowed, missing] {
            let system = build_system(&nodes).unwrap();
            for method in [SolverMethod::NormalEquations, SolverMethod::Svd] {
                assert_eq!(
                    solve_with(&system, method),
                    Err(LocalizationError::DegenerateGeometry {
                        matrix: "B".to_string(),
                        condition_estimate: None,
                    })
                );
            }
        }
    }

    #[test]
    fn test_solver_method_serde_names() {
        let name = serde_json::to_string(&SolverMethod::NormalEquations).unwrap();
        assert_eq!(name, "\"normalEquations\"");
        let method: SolverMethod = serde_json::from_str("\"svd\"").unwrap();
        assert_eq!(method, SolverMethod::Svd);
    }
}
