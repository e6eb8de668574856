use core::fmt;
use core::ops::{Index, IndexMut};
use core::str::FromStr;

/// Number of tracked nutrients.
pub const NUTRIENT_COUNT: usize = 4;

/// A tracked fertilizer component.
///
/// The declaration order fixes the row order of every contribution matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Nutrient {
    N,
    P2O5,
    K2O,
    MgO,
}

impl Nutrient {
    pub const ALL: [Nutrient; NUTRIENT_COUNT] =
        [Nutrient::N, Nutrient::P2O5, Nutrient::K2O, Nutrient::MgO];

    /// Row index of this nutrient.
    pub fn index(self) -> usize {
        match self {
            Self::N => 0,
            Self::P2O5 => 1,
            Self::K2O => 2,
            Self::MgO => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::P2O5 => "P2O5",
            Self::K2O => "K2O",
            Self::MgO => "MgO",
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per nutrient.
///
/// For a material this is the nutrient amount per 1000 parts of pure material;
/// for a target it is the desired content of a 1000-part batch.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NutrientProfile {
    values: [f64; NUTRIENT_COUNT],
}

/// Validation errors for a target profile.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// A target value is below zero.
    Negative { nutrient: Nutrient, value: f64 },
    /// A target value is NaN or infinite.
    NonFinite { nutrient: Nutrient, value: f64 },
    /// No `N-P-K-Mg` grade was found in the input.
    Grade { input: String },
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Negative { nutrient, value } => {
                write!(f, "target {nutrient} must be non-negative (got {value})")
            }
            Self::NonFinite { nutrient, value } => {
                write!(f, "target {nutrient} must be finite (got {value})")
            }
            Self::Grade { input } => {
                write!(f, "no N-P-K-Mg grade found in {input:?}")
            }
        }
    }
}

impl std::error::Error for ProfileError {}

impl NutrientProfile {
    pub const ZERO: Self = Self {
        values: [0.0; NUTRIENT_COUNT],
    };

    pub fn new(n: f64, p2o5: f64, k2o: f64, mgo: f64) -> Self {
        Self {
            values: [n, p2o5, k2o, mgo],
        }
    }

    pub fn from_array(values: [f64; NUTRIENT_COUNT]) -> Self {
        Self { values }
    }

    pub fn as_array(&self) -> &[f64; NUTRIENT_COUNT] {
        &self.values
    }

    pub fn get(&self, nutrient: Nutrient) -> f64 {
        self.values[nutrient.index()]
    }

    pub fn set(&mut self, nutrient: Nutrient, value: f64) {
        self.values[nutrient.index()] = value;
    }

    /// Sum over all nutrients.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// True when every nutrient is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Nutrient, f64)> + '_ {
        Nutrient::ALL.iter().map(move |&n| (n, self.get(n)))
    }

    /// Checks that the profile can serve as a blend target.
    pub fn check_target(&self) -> Result<(), ProfileError> {
        for (nutrient, value) in self.iter() {
            if !value.is_finite() {
                return Err(ProfileError::NonFinite { nutrient, value });
            }
            if value < 0.0 {
                return Err(ProfileError::Negative { nutrient, value });
            }
        }
        Ok(())
    }

    /// Parses the first `N-P-K-Mg` grade embedded in a product name.
    ///
    /// The grade is a run of four dash-separated unsigned integers, e.g.
    /// `"Compound 15-15-15-2 (A)"` or `"12-12-17-2+TE"`.
    pub fn from_grade(input: &str) -> Result<Self, ProfileError> {
        for token in input.split(|c: char| !(c.is_ascii_digit() || c == '-')) {
            let parts: Vec<&str> = token.split('-').collect();
            for window in parts.windows(NUTRIENT_COUNT) {
                if let Some(values) = parse_grade_window(window) {
                    return Ok(Self::from_array(values));
                }
            }
        }
        Err(ProfileError::Grade {
            input: input.to_owned(),
        })
    }
}

fn parse_grade_window(window: &[&str]) -> Option<[f64; NUTRIENT_COUNT]> {
    let mut values = [0.0; NUTRIENT_COUNT];
    for (slot, part) in values.iter_mut().zip(window) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = f64::from(part.parse::<u32>().ok()?);
    }
    Some(values)
}

impl FromStr for NutrientProfile {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_grade(s)
    }
}

impl Index<Nutrient> for NutrientProfile {
    type Output = f64;

    fn index(&self, nutrient: Nutrient) -> &f64 {
        &self.values[nutrient.index()]
    }
}

impl IndexMut<Nutrient> for NutrientProfile {
    fn index_mut(&mut self, nutrient: Nutrient) -> &mut f64 {
        &mut self.values[nutrient.index()]
    }
}
