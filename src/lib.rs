//! Fertilizer blending by constrained least squares.
//!
//! Given raw materials with known nutrient contributions (per 1000 parts) and
//! a target nutrient profile, this crate computes how many parts of each
//! material go into a fixed-size batch.
//!
//! How it works (high level):
//! - Solve `min ||A x - t||^2` subject to `sum(x) = 1` through the augmented
//!   normal equations, with Gaussian elimination that degrades singular pivots
//!   to zero instead of failing.
//! - Clamp, renormalize and scale the proportions to the batch.
//! - Walk materials in priority order and give each the smaller of its
//!   least-squares quantity and the largest amount the remaining nutrient
//!   budget allows; spread unassigned batch total over the chosen materials.
//! - Round each quantity to its divisibility unit and put the rounding
//!   difference on the highest-priority material.
//!
//! Calling it:
//! - Fill a `MaterialTable` (or implement `ContributionSource`).
//! - Build a `PriorityList` with each material's divisibility unit.
//! - Call `BlendSolver::solve` and inspect `Blend::stats`.
//!
//! Example:
//! ```rust,no_run
//! use faer_core::Parallelism;
//! use npk_blend::{BlendOptions, BlendSolver, MaterialTable, NutrientProfile, PriorityList};
//!
//! let table = MaterialTable::new()
//!     .with("urea", NutrientProfile::new(460.0, 0.0, 0.0, 0.0))
//!     .with("dap", NutrientProfile::new(180.0, 460.0, 0.0, 0.0))
//!     .with("mop", NutrientProfile::new(0.0, 0.0, 600.0, 0.0));
//! let priorities = PriorityList::new().with("dap", 25).with("mop", 25).with("urea", 25);
//! let target: NutrientProfile = "15-15-15-0".parse().unwrap();
//!
//! let solver = BlendSolver::new(Parallelism::None);
//! let blend = solver
//!     .solve(&["urea", "dap", "mop"], &table, &priorities, &target, &BlendOptions::default(), None)
//!     .unwrap();
//! assert!(blend.quantities.iter().all(|&q| q >= 0.0));
//! ```

mod allocate;
mod analysis;
mod linear;
mod material;
mod model;
mod nutrient;
mod report;
mod round;
mod solver;

pub use allocate::{allocate, allocate_step, distribute_leftover, Allocation, AllocationStep, Budget};
pub use analysis::{achieved_profile, NutrientCheck, NutrientComparison, NUTRIENT_TOLERANCE};
pub use linear::{solve_dense, LinearSolution, LinearSystemError, PIVOT_TOLERANCE};
pub use material::{
    resolve_materials, ContributionSource, Material, MaterialTable, PriorityEntry, PriorityList,
    DEFAULT_DIVISIBILITY,
};
pub use model::{scale_to_batch, BatchQuantities, BlendModel, LeastSquares};
pub use nutrient::{Nutrient, NutrientProfile, ProfileError, NUTRIENT_COUNT};
pub use report::{render_blend_table, BlendStats, BlendStatus, Reporter, StdoutReporter};
pub use round::{round_batch, round_to_unit, RoundedBatch};
pub use solver::{Blend, BlendError, BlendOptions, BlendSolver};
