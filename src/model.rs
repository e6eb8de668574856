//! Equality-constrained least squares for the blend proportions.
//!
//! For a contribution matrix `A` (one row per nutrient, one column per
//! material) and target `t`, the model solves the Lagrange system
//!
//! ```text
//! [ AᵗA  1 ] [x]   [Aᵗt]
//! [ 1ᵗ   0 ] [λ] = [ 1 ]
//! ```
//!
//! and drops `λ`. The resulting `x` sums to one but may contain negative
//! entries or entries above one; [`scale_to_batch`] turns it into
//! non-negative batch quantities.

use faer_core::mul::matmul;
use faer_core::{Mat, Parallelism};

use crate::linear::{solve_dense, LinearSolution, LinearSystemError};
use crate::material::Material;
use crate::nutrient::{NutrientProfile, NUTRIENT_COUNT};

/// Contribution matrix and target for one solve.
pub struct BlendModel {
    contributions: Mat<f64>,
    target: NutrientProfile,
}

/// Raw least-squares output, one entry per material in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquares {
    pub x: Vec<f64>,
    pub skipped_pivots: usize,
}

/// Least-squares proportions scaled to the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchQuantities {
    pub quantities: Vec<f64>,
    /// The equal-split fallback replaced the least-squares proportions.
    pub equal_split: bool,
}

impl BlendModel {
    pub fn new(materials: &[Material], target: &NutrientProfile) -> Self {
        let contributions = Mat::<f64>::from_fn(NUTRIENT_COUNT, materials.len(), |i, j| {
            materials[j].contribution().as_array()[i]
        });
        Self {
            contributions,
            target: *target,
        }
    }

    /// Number of materials (columns of `A`).
    pub fn nmaterials(&self) -> usize {
        self.contributions.ncols()
    }

    /// True when no material contributes any nutrient.
    pub fn is_uninformative(&self) -> bool {
        let a = &self.contributions;
        (0..a.nrows()).all(|i| (0..a.ncols()).all(|j| a.read(i, j) == 0.0))
    }

    /// Builds the `(m + 1) x (m + 1)` constrained normal-equations system.
    pub fn normal_equations(&self, parallelism: Parallelism) -> (Mat<f64>, Vec<f64>) {
        let m = self.nmaterials();
        let a = self.contributions.as_ref();

        let mut gram = Mat::<f64>::zeros(m, m);
        matmul(gram.as_mut(), a.transpose(), a, None, 1.0, parallelism);

        let target = Mat::<f64>::from_fn(NUTRIENT_COUNT, 1, |i, _| self.target.as_array()[i]);
        let mut projected = Mat::<f64>::zeros(m, 1);
        matmul(
            projected.as_mut(),
            a.transpose(),
            target.as_ref(),
            None,
            1.0,
            parallelism,
        );

        let system = Mat::<f64>::from_fn(m + 1, m + 1, |i, j| match (i < m, j < m) {
            (true, true) => gram.read(i, j),
            (false, false) => 0.0,
            _ => 1.0,
        });
        let mut rhs: Vec<f64> = (0..m).map(|i| projected.read(i, 0)).collect();
        rhs.push(1.0);
        (system, rhs)
    }

    /// Solves the constrained system and discards the multiplier.
    pub fn solve(
        &self,
        parallelism: Parallelism,
        tolerance: f64,
    ) -> Result<LeastSquares, LinearSystemError> {
        let (system, rhs) = self.normal_equations(parallelism);
        let LinearSolution {
            mut x,
            skipped_pivots,
        } = solve_dense(system.as_ref(), &rhs, tolerance)?;
        x.truncate(self.nmaterials());
        Ok(LeastSquares { x, skipped_pivots })
    }
}

/// Clamps negatives to zero, renormalizes and scales to `batch_size`.
///
/// Falls back to an equal split when the clamped proportions sum to zero or
/// when `equal_split` is forced by the caller.
pub fn scale_to_batch(raw: &[f64], batch_size: f64, equal_split: bool) -> BatchQuantities {
    let clamped: Vec<f64> = raw.iter().map(|&v| v.max(0.0)).collect();
    let sum: f64 = clamped.iter().sum();
    if equal_split || sum <= 0.0 || raw.is_empty() {
        let share = batch_size / raw.len().max(1) as f64;
        return BatchQuantities {
            quantities: vec![share; raw.len()],
            equal_split: true,
        };
    }
    BatchQuantities {
        quantities: clamped.iter().map(|v| v / sum * batch_size).collect(),
        equal_split: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(name: &str, contribution: NutrientProfile) -> Material {
        Material::new(name, contribution, 25)
    }

    #[test]
    fn normal_equations_match_hand_built_system() {
        let materials = [
            material("a", NutrientProfile::new(100.0, 0.0, 0.0, 0.0)),
            material("b", NutrientProfile::new(0.0, 200.0, 0.0, 0.0)),
        ];
        let model = BlendModel::new(&materials, &NutrientProfile::new(20.0, 20.0, 0.0, 0.0));
        let (s, b) = model.normal_equations(Parallelism::None);
        let expected = [
            [10000.0, 0.0, 1.0],
            [0.0, 40000.0, 1.0],
            [1.0, 1.0, 0.0],
        ];
        for (i, row) in expected.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                assert_eq!(s.read(i, j), v, "entry ({i},{j})");
            }
        }
        assert_eq!(b, vec![2000.0, 4000.0, 1.0]);
    }

    #[test]
    fn constrained_solution_sums_to_one() {
        let materials = [
            material("a", NutrientProfile::new(100.0, 0.0, 0.0, 0.0)),
            material("b", NutrientProfile::new(0.0, 200.0, 0.0, 0.0)),
        ];
        let model = BlendModel::new(&materials, &NutrientProfile::new(20.0, 20.0, 0.0, 0.0));
        let ls = model.solve(Parallelism::None, 1e-10).unwrap();
        assert_eq!(ls.x.len(), 2);
        assert!((ls.x[0] - 0.76).abs() < 1e-9);
        assert!((ls.x[1] - 0.24).abs() < 1e-9);
    }

    #[test]
    fn detects_uninformative_materials() {
        let zero = [material("a", NutrientProfile::ZERO), material("b", NutrientProfile::ZERO)];
        assert!(BlendModel::new(&zero, &NutrientProfile::ZERO).is_uninformative());
        let some = [material("a", NutrientProfile::new(0.0, 0.0, 1.0, 0.0))];
        assert!(!BlendModel::new(&some, &NutrientProfile::ZERO).is_uninformative());
    }

    #[test]
    fn scaling_clamps_and_renormalizes() {
        let scaled = scale_to_batch(&[1.5, -0.5], 1000.0, false);
        assert!(!scaled.equal_split);
        assert_eq!(scaled.quantities, vec![1000.0, 0.0]);

        let scaled = scale_to_batch(&[0.25, 0.25, 0.5], 1000.0, false);
        assert_eq!(scaled.quantities, vec![250.0, 250.0, 500.0]);
    }

    #[test]
    fn scaling_falls_back_to_equal_split() {
        let scaled = scale_to_batch(&[-1.0, 0.0, -2.0, 0.0], 1000.0, false);
        assert!(scaled.equal_split);
        assert_eq!(scaled.quantities, vec![250.0; 4]);

        let forced = scale_to_batch(&[1.0, 0.0], 1000.0, true);
        assert_eq!(forced.quantities, vec![500.0, 500.0]);
    }
}
