use crate::material::Material;
use crate::nutrient::{Nutrient, NutrientProfile};

/// Nutrient and batch budget still available during the priority pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Budget {
    pub nutrients: NutrientProfile,
    pub total: f64,
}

impl Budget {
    pub fn new(target: &NutrientProfile, batch_size: f64) -> Self {
        Self {
            nutrients: *target,
            total: batch_size,
        }
    }

    /// Largest quantity of a material that keeps every nutrient within budget.
    ///
    /// Only nutrients the material actually supplies constrain it; the batch
    /// total always does.
    pub fn ceiling(&self, contribution: &NutrientProfile) -> f64 {
        let mut ceiling = self.total;
        for nutrient in Nutrient::ALL {
            let per_part = contribution[nutrient] / 1000.0;
            if per_part > 0.0 {
                ceiling = ceiling.min(self.nutrients[nutrient].max(0.0) / per_part);
            }
        }
        ceiling.max(0.0)
    }

    /// Budget left after assigning `quantity` of a material.
    pub fn consume(self, quantity: f64, contribution: &NutrientProfile) -> Self {
        let mut nutrients = self.nutrients;
        for nutrient in Nutrient::ALL {
            nutrients[nutrient] -= quantity / 1000.0 * contribution[nutrient];
        }
        Self {
            nutrients,
            total: self.total - quantity,
        }
    }
}

/// One material's turn in the priority pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationStep {
    /// Position of the material in the caller's input order.
    pub position: usize,
    pub name: String,
    /// Scaled least-squares quantity used as the upper bound.
    pub least_squares: f64,
    pub ceiling: f64,
    pub assigned: f64,
    /// Batch total still unassigned after this step.
    pub remaining_total: f64,
}

/// Output of the priority pass, indexed by input position.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub quantities: Vec<f64>,
    pub steps: Vec<AllocationStep>,
    /// Batch total spread over the assigned materials after the pass.
    pub leftover: f64,
}

impl Allocation {
    pub fn total(&self) -> f64 {
        self.quantities.iter().sum()
    }
}

/// Assigns the single step for one material and returns the updated budget.
pub fn allocate_step(
    budget: Budget,
    position: usize,
    material: &Material,
    least_squares: f64,
) -> (AllocationStep, Budget) {
    let ceiling = budget.ceiling(material.contribution());
    let assigned = ceiling.min(least_squares).max(0.0);
    let budget = budget.consume(assigned, material.contribution());
    let step = AllocationStep {
        position,
        name: material.name().to_owned(),
        least_squares,
        ceiling,
        assigned,
        remaining_total: budget.total,
    };
    (step, budget)
}

/// Greedy priority pass over `order`.
///
/// Each material receives the smaller of its nutrient ceiling and its
/// least-squares quantity. Batch total left above `leftover_tolerance` is
/// then split evenly across materials that received a non-zero share,
/// without re-checking nutrient ceilings.
pub fn allocate(
    materials: &[Material],
    order: &[usize],
    least_squares: &[f64],
    target: &NutrientProfile,
    batch_size: f64,
    leftover_tolerance: f64,
) -> Allocation {
    let mut quantities = vec![0.0; materials.len()];
    let mut steps = Vec::with_capacity(order.len());
    let mut budget = Budget::new(target, batch_size);

    for &position in order {
        let (step, next) =
            allocate_step(budget, position, &materials[position], least_squares[position]);
        quantities[position] = step.assigned;
        steps.push(step);
        budget = next;
    }

    let leftover = distribute_leftover(&mut quantities, budget.total, leftover_tolerance);
    Allocation {
        quantities,
        steps,
        leftover,
    }
}

/// Spreads `remaining` evenly over the non-zero entries.
///
/// Returns the amount spread, which is zero when `remaining` is within
/// `tolerance` or nothing was assigned.
pub fn distribute_leftover(quantities: &mut [f64], remaining: f64, tolerance: f64) -> f64 {
    if remaining <= tolerance {
        return 0.0;
    }
    let assigned = quantities.iter().filter(|&&q| q > 0.0).count();
    if assigned == 0 {
        return 0.0;
    }
    let extra = remaining / assigned as f64;
    for q in quantities.iter_mut().filter(|q| **q > 0.0) {
        *q += extra;
    }
    remaining
}
