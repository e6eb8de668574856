use crate::material::Material;
use crate::nutrient::{Nutrient, NutrientProfile};

/// Difference above which an achieved value counts as off target.
pub const NUTRIENT_TOLERANCE: f64 = 0.01;

/// Expected versus achieved value for one nutrient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutrientCheck {
    pub nutrient: Nutrient,
    pub expected: f64,
    pub achieved: f64,
    /// `|expected - achieved| > NUTRIENT_TOLERANCE`.
    pub differs: bool,
    /// Achieved is above a non-zero expected value.
    pub exceeds: bool,
}

/// Nutrient content of a recipe compared against a target.
#[derive(Debug, Clone, PartialEq)]
pub struct NutrientComparison {
    pub expected: NutrientProfile,
    pub achieved: NutrientProfile,
    pub checks: Vec<NutrientCheck>,
}

impl NutrientComparison {
    /// Evaluates `quantities` (parts per `batch_size`) of `materials`.
    ///
    /// Works on any recipe, including hand-edited ones that do not sum to the
    /// batch.
    pub fn evaluate(
        materials: &[Material],
        quantities: &[f64],
        target: &NutrientProfile,
        batch_size: f64,
    ) -> Self {
        let achieved = achieved_profile(materials, quantities, batch_size);
        let checks = Nutrient::ALL
            .iter()
            .map(|&nutrient| {
                let expected = target[nutrient];
                let value = achieved[nutrient];
                NutrientCheck {
                    nutrient,
                    expected,
                    achieved: value,
                    differs: (expected - value).abs() > NUTRIENT_TOLERANCE,
                    exceeds: value > expected && expected != 0.0,
                }
            })
            .collect();
        Self {
            expected: *target,
            achieved,
            checks,
        }
    }

    /// True when no nutrient is off target.
    pub fn is_on_target(&self) -> bool {
        self.checks.iter().all(|c| !c.differs)
    }

    pub fn check(&self, nutrient: Nutrient) -> &NutrientCheck {
        &self.checks[nutrient.index()]
    }
}

/// `Σ quantity / batch_size × contribution` over the recipe.
pub fn achieved_profile(
    materials: &[Material],
    quantities: &[f64],
    batch_size: f64,
) -> NutrientProfile {
    let mut achieved = NutrientProfile::ZERO;
    for (material, &quantity) in materials.iter().zip(quantities) {
        let factor = quantity / batch_size;
        for nutrient in Nutrient::ALL {
            achieved[nutrient] += factor * material.contribution()[nutrient];
        }
    }
    achieved
}
