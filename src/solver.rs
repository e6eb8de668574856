use core::fmt;

use faer_core::Parallelism;
use std::time::{Duration, Instant};

use crate::allocate::allocate;
use crate::linear::{LinearSystemError, PIVOT_TOLERANCE};
use crate::material::{resolve_materials, ContributionSource, Material, PriorityList};
use crate::model::{scale_to_batch, BlendModel};
use crate::nutrient::{NutrientProfile, ProfileError};
use crate::report::{emit_line, BlendStats, BlendStatus, Reporter, StdoutReporter};
use crate::round::round_batch;

/// Caller-level precondition failures.
#[derive(Debug, Clone, PartialEq)]
pub enum BlendError {
    /// No materials were selected.
    NoMaterials,
    /// The target profile has a negative or non-finite value.
    InvalidTarget(ProfileError),
    /// The batch size is not a positive finite number.
    InvalidBatchSize { value: f64 },
    /// The normal-equations system had an unexpected shape.
    Linear(LinearSystemError),
}

impl fmt::Display for BlendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMaterials => write!(f, "at least one material must be selected"),
            Self::InvalidTarget(err) => write!(f, "invalid target profile: {err}"),
            Self::InvalidBatchSize { value } => {
                write!(f, "batch size must be positive and finite (got {value})")
            }
            Self::Linear(err) => write!(f, "linear system error: {err}"),
        }
    }
}

impl std::error::Error for BlendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidTarget(err) => Some(err),
            Self::Linear(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProfileError> for BlendError {
    fn from(err: ProfileError) -> Self {
        Self::InvalidTarget(err)
    }
}

impl From<LinearSystemError> for BlendError {
    fn from(err: LinearSystemError) -> Self {
        Self::Linear(err)
    }
}

/// Options controlling a blend solve.
#[derive(Debug, Clone)]
pub struct BlendOptions {
    /// Parts per batch that the recipe sums to.
    pub batch_size: f64,
    /// Pivots below this magnitude are skipped as singular.
    pub pivot_tolerance: f64,
    /// Slack below which batch totals count as closed.
    pub leftover_tolerance: f64,
    /// Print the allocation table and solve time.
    pub verbose: bool,
}

impl Default for BlendOptions {
    fn default() -> Self {
        Self {
            batch_size: 1000.0,
            pivot_tolerance: PIVOT_TOLERANCE,
            leftover_tolerance: 0.01,
            verbose: false,
        }
    }
}

/// Final recipe, aligned with the caller's material order.
#[derive(Debug, Clone)]
pub struct Blend {
    pub names: Vec<String>,
    pub quantities: Vec<f64>,
    pub stats: BlendStats,
}

impl Blend {
    pub fn total(&self) -> f64 {
        self.quantities.iter().sum()
    }

    pub fn quantity_of(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.quantities[i])
    }

    pub fn status(&self) -> BlendStatus {
        self.stats.status
    }
}

enum ReporterSlot<'a> {
    External(&'a mut dyn Reporter),
    Local(StdoutReporter),
    None,
}

impl<'a> ReporterSlot<'a> {
    fn new(reporter: Option<&'a mut dyn Reporter>, verbose: bool) -> Self {
        match reporter {
            Some(r) => Self::External(r),
            None if verbose => Self::Local(StdoutReporter::new()),
            None => Self::None,
        }
    }

    fn as_mut(&mut self) -> Option<&mut dyn Reporter> {
        match self {
            Self::External(r) => Some(*r),
            Self::Local(r) => Some(r),
            Self::None => None,
        }
    }
}

/// Fertilizer blend solver.
///
/// Holds only the parallelism used by the dense kernels; every solve takes
/// complete inputs and returns a self-contained [`Blend`].
pub struct BlendSolver {
    parallelism: Parallelism,
}

impl BlendSolver {
    pub fn new(parallelism: Parallelism) -> Self {
        Self { parallelism }
    }

    /// Resolves `selected` against `source` and solves the blend.
    pub fn solve<N, S>(
        &self,
        selected: &[N],
        source: &S,
        priorities: &PriorityList,
        target: &NutrientProfile,
        options: &BlendOptions,
        reporter: Option<&mut dyn Reporter>,
    ) -> Result<Blend, BlendError>
    where
        N: AsRef<str>,
        S: ContributionSource + ?Sized,
    {
        let materials = resolve_materials(selected, source, priorities);
        self.solve_materials(&materials, priorities, target, options, reporter)
    }

    /// Solves the blend for already resolved materials.
    pub fn solve_materials(
        &self,
        materials: &[Material],
        priorities: &PriorityList,
        target: &NutrientProfile,
        options: &BlendOptions,
        reporter: Option<&mut dyn Reporter>,
    ) -> Result<Blend, BlendError> {
        if materials.is_empty() {
            return Err(BlendError::NoMaterials);
        }
        target.check_target()?;
        let batch_size = options.batch_size;
        if !(batch_size.is_finite() && batch_size > 0.0) {
            return Err(BlendError::InvalidBatchSize { value: batch_size });
        }

        let start_time = options.verbose.then(Instant::now);
        let mut reporter = ReporterSlot::new(reporter, options.verbose);

        // Least squares in input order, scaled to the batch.
        let model = BlendModel::new(materials, target);
        let least_squares = model.solve(self.parallelism, options.pivot_tolerance)?;
        let uninformative = model.is_uninformative();
        let scaled = scale_to_batch(&least_squares.x, batch_size, uninformative);
        if scaled.equal_split {
            log::debug!(
                "no usable least-squares proportions, splitting {batch_size} evenly over {} materials",
                materials.len()
            );
        }

        // Greedy pass in priority order.
        let order = priorities.order(materials);
        let allocation = allocate(
            materials,
            &order,
            &scaled.quantities,
            target,
            batch_size,
            options.leftover_tolerance,
        );
        if let Some(reporter) = reporter.as_mut() {
            for step in &allocation.steps {
                reporter.on_step(step);
            }
        }

        // Round to units; the highest-priority material takes the correction.
        let units: Vec<u32> = materials.iter().map(Material::unit).collect();
        let rounded = round_batch(
            &allocation.quantities,
            &units,
            order[0],
            batch_size,
            options.leftover_tolerance,
        );

        let status = if rounded.residual == 0.0 {
            BlendStatus::Exact
        } else {
            BlendStatus::Residual
        };
        let stats = BlendStats {
            status,
            least_squares: least_squares.x,
            scaled: scaled.quantities,
            allocated: allocation.quantities,
            skipped_pivots: least_squares.skipped_pivots,
            equal_split: scaled.equal_split,
            leftover: allocation.leftover,
            corrected: rounded.corrected,
            residual: rounded.residual,
        };
        let blend = Blend {
            names: materials.iter().map(|m| m.name().to_owned()).collect(),
            quantities: rounded.quantities,
            stats,
        };
        Ok(finish_blend(blend, start_time, &mut reporter))
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs >= 1.0 {
        format!("{:.3} s", secs)
    } else if secs >= 1e-3 {
        format!("{:.3} ms", secs * 1e3)
    } else if secs >= 1e-6 {
        format!("{:.3} us", secs * 1e6)
    } else {
        format!("{:.0} ns", secs * 1e9)
    }
}

fn finish_blend(
    blend: Blend,
    start_time: Option<Instant>,
    reporter: &mut ReporterSlot<'_>,
) -> Blend {
    if let Some(reporter) = reporter.as_mut() {
        reporter.on_finish();
    }
    if let Some(start) = start_time {
        let elapsed = format_duration(start.elapsed());
        emit_line(&format!(
            "total: {:.0} (residual {})  time: {elapsed}",
            blend.total(),
            blend.stats.residual
        ));
    }
    blend
}
