//! Linearization of the multilateration circle equations.
//!
//! Each node contributes `(X - x_i)^2 + (Y - y_i)^2 = d_i^2`. Subtracting the
//! pivot equation (the last node) from every other one cancels `X^2 + Y^2`:
//!
//! ```text
//! A[i] = [2(x_i - x_n), 2(y_i - y_n)]
//! B[i] = (x_i^2 + y_i^2) - (x_n^2 + y_n^2) - (d_i^2 - d_n^2)
//! ```

use crate::core::{ApNode, MIN_REFERENCE_POINTS};
use crate::validation::error::{LocalizationError, LocalizationResult};
use nalgebra::{DMatrix, DVector};

/// Over- or fully-determined system `A * X ~= B` for `X = (x, y)`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    /// (N-1) x 2 coefficient matrix
    pub a: DMatrix<f64>,
    /// (N-1) right-hand side
    pub b: DVector<f64>,
}

impl LinearSystem {
    pub fn equation_count(&self) -> usize {
        self.b.len()
    }
}

/// Build the differenced system with the last node as pivot
pub fn build_system(nodes: &[ApNode]) -> LocalizationResult<LinearSystem> {
    let (pivot, others) = match nodes.split_last() {
        Some(split) if nodes.len() >= MIN_REFERENCE_POINTS => split,
        _ => {
            return Err(LocalizationError::InsufficientReferencePoints {
                available: nodes.len(),
                required: MIN_REFERENCE_POINTS,
            })
        }
    };

    let rows = others.len();
    let mut a = DMatrix::zeros(rows, 2);
    let mut b = DVector::zeros(rows);

    let pivot_norm = pivot.x.powi(2) + pivot.y.powi(2);
    let pivot_range = pivot.distance.powi(2);

    for (row, node) in others.iter().enumerate() {
        a[(row, 0)] = 2.0 * (node.x - pivot.x);
        a[(row, 1)] = 2.0 * (node.y - pivot.y);

        b[row] = (node.x.powi(2) + node.y.powi(2))
            - pivot_norm
            - (node.distance.powi(2) - pivot_range);
    }

    Ok(LinearSystem { a, b })
}
