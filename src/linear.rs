use core::fmt;

use faer_core::{Mat, MatRef};

/// Pivots below this magnitude are treated as singular.
pub const PIVOT_TOLERANCE: f64 = 1e-10;

/// Shape errors for a dense solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinearSystemError {
    /// The coefficient matrix is not square.
    NotSquare { nrows: usize, ncols: usize },
    /// The right-hand side length differs from the matrix order.
    RhsLen { expected: usize, actual: usize },
}

impl fmt::Display for LinearSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSquare { nrows, ncols } => {
                write!(f, "matrix must be square (got {nrows}x{ncols})")
            }
            Self::RhsLen { expected, actual } => {
                write!(f, "rhs length {actual} does not match expected {expected}")
            }
        }
    }
}

impl std::error::Error for LinearSystemError {}

/// Solution of `S x = b` with the number of pivots skipped as singular.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSolution {
    pub x: Vec<f64>,
    pub skipped_pivots: usize,
}

/// Solves `S x = b` by Gaussian elimination with partial pivoting.
///
/// Singular pivots never fail the solve: elimination skips the column and
/// back-substitution assigns `0` to any unknown whose diagonal is below
/// `tolerance`, so the result is always defined.
pub fn solve_dense(
    matrix: MatRef<'_, f64>,
    rhs: &[f64],
    tolerance: f64,
) -> Result<LinearSolution, LinearSystemError> {
    let n = matrix.nrows();
    if matrix.ncols() != n {
        return Err(LinearSystemError::NotSquare {
            nrows: n,
            ncols: matrix.ncols(),
        });
    }
    if rhs.len() != n {
        return Err(LinearSystemError::RhsLen {
            expected: n,
            actual: rhs.len(),
        });
    }

    // Augmented [S | b].
    let mut aug = Mat::<f64>::from_fn(n, n + 1, |i, j| {
        if j < n {
            matrix.read(i, j)
        } else {
            rhs[i]
        }
    });

    let mut skipped_pivots = 0;
    for p in 0..n {
        let mut max = p;
        for i in p + 1..n {
            if aug.read(i, p).abs() > aug.read(max, p).abs() {
                max = i;
            }
        }
        if max != p {
            swap_rows(&mut aug, p, max);
        }

        let pivot = aug.read(p, p);
        if pivot.abs() < tolerance {
            log::debug!("pivot {p} is singular ({pivot:e}), skipping");
            skipped_pivots += 1;
            continue;
        }

        for i in p + 1..n {
            let alpha = aug.read(i, p) / pivot;
            if alpha == 0.0 {
                continue;
            }
            for j in p..=n {
                let v = aug.read(i, j) - alpha * aug.read(p, j);
                aug.write(i, j, v);
            }
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let diag = aug.read(i, i);
        if diag.abs() < tolerance {
            continue;
        }
        let mut sum = 0.0;
        for j in i + 1..n {
            sum += aug.read(i, j) * x[j];
        }
        x[i] = (aug.read(i, n) - sum) / diag;
    }

    Ok(LinearSolution { x, skipped_pivots })
}

fn swap_rows(mat: &mut Mat<f64>, a: usize, b: usize) {
    for j in 0..mat.ncols() {
        let tmp = mat.read(a, j);
        mat.write(a, j, mat.read(b, j));
        mat.write(b, j, tmp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mat(rows: &[&[f64]]) -> Mat<f64> {
        Mat::from_fn(rows.len(), rows[0].len(), |i, j| rows[i][j])
    }

    #[test]
    fn solves_with_row_swap() {
        let s = mat(&[&[0.0, 2.0], &[3.0, 1.0]]);
        let sol = solve_dense(s.as_ref(), &[4.0, 5.0], PIVOT_TOLERANCE).unwrap();
        assert_eq!(sol.skipped_pivots, 0);
        assert!((sol.x[0] - 1.0).abs() < 1e-12);
        assert!((sol.x[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn singular_unknowns_degrade_to_zero() {
        let s = mat(&[&[0.0, 0.0, 1.0], &[0.0, 0.0, 1.0], &[1.0, 1.0, 0.0]]);
        let sol = solve_dense(s.as_ref(), &[0.0, 0.0, 1.0], PIVOT_TOLERANCE).unwrap();
        assert_eq!(sol.skipped_pivots, 1);
        assert_eq!(sol.x, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn all_zero_matrix_yields_zero_vector() {
        let s = Mat::<f64>::zeros(3, 3);
        let sol = solve_dense(s.as_ref(), &[1.0, 2.0, 3.0], PIVOT_TOLERANCE).unwrap();
        assert_eq!(sol.skipped_pivots, 3);
        assert!(sol.x.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn rejects_bad_shapes() {
        let s = Mat::<f64>::zeros(2, 3);
        assert_eq!(
            solve_dense(s.as_ref(), &[0.0, 0.0], PIVOT_TOLERANCE),
            Err(LinearSystemError::NotSquare { nrows: 2, ncols: 3 })
        );
        let s = Mat::<f64>::zeros(2, 2);
        assert_eq!(
            solve_dense(s.as_ref(), &[0.0], PIVOT_TOLERANCE),
            Err(LinearSystemError::RhsLen {
                expected: 2,
                actual: 1
            })
        );
    }
}
