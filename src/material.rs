use std::collections::HashMap;

use crate::nutrient::NutrientProfile;

/// Rounding unit used when a material has no positive unit configured.
pub const DEFAULT_DIVISIBILITY: u32 = 25;

/// Resolves a material name to its nutrient contribution per 1000 parts.
pub trait ContributionSource {
    fn contribution(&self, name: &str) -> Option<NutrientProfile>;
}

impl ContributionSource for HashMap<String, NutrientProfile> {
    fn contribution(&self, name: &str) -> Option<NutrientProfile> {
        self.get(name).copied()
    }
}

/// In-memory contribution table keyed by material name.
#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    entries: HashMap<String, NutrientProfile>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, contribution: NutrientProfile) {
        self.entries.insert(name.into(), contribution);
    }

    /// Builder form of [`MaterialTable::insert`].
    pub fn with(mut self, name: impl Into<String>, contribution: NutrientProfile) -> Self {
        self.insert(name, contribution);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ContributionSource for MaterialTable {
    fn contribution(&self, name: &str) -> Option<NutrientProfile> {
        self.entries.get(name).copied()
    }
}

/// A selected raw material, snapshotted for one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    name: String,
    contribution: NutrientProfile,
    unit: u32,
}

impl Material {
    /// A non-positive `unit` falls back to [`DEFAULT_DIVISIBILITY`].
    pub fn new(name: impl Into<String>, contribution: NutrientProfile, unit: u32) -> Self {
        Self {
            name: name.into(),
            contribution,
            unit: normalize_unit(unit),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nutrient amount per 1000 parts of pure material.
    pub fn contribution(&self) -> &NutrientProfile {
        &self.contribution
    }

    /// Divisibility unit the final quantity rounds to.
    pub fn unit(&self) -> u32 {
        self.unit
    }
}

/// One ranked material name and its divisibility unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityEntry {
    pub name: String,
    pub divisible_by: u32,
}

/// Externally supplied material precedence; earlier entries rank higher.
#[derive(Debug, Clone, Default)]
pub struct PriorityList {
    entries: Vec<PriorityEntry>,
}

impl PriorityList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ranks the names in order, all with the default unit.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::new();
        for name in names {
            list.push(name, DEFAULT_DIVISIBILITY);
        }
        list
    }

    /// Appends a lower-ranked entry. A zero unit becomes the default.
    pub fn push(&mut self, name: impl Into<String>, divisible_by: u32) {
        self.entries.push(PriorityEntry {
            name: name.into(),
            divisible_by: normalize_unit(divisible_by),
        });
    }

    pub fn with(mut self, name: impl Into<String>, divisible_by: u32) -> Self {
        self.push(name, divisible_by);
        self
    }

    pub fn entries(&self) -> &[PriorityEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the first entry with this name.
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    pub fn unit_of(&self, name: &str) -> u32 {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map_or(DEFAULT_DIVISIBILITY, |e| e.divisible_by)
    }

    /// Input positions sorted by rank.
    ///
    /// Unlisted materials sort after every listed one; the sort is stable, so
    /// equal ranks keep their input order.
    pub fn order(&self, materials: &[Material]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..materials.len()).collect();
        order.sort_by_key(|&i| self.rank(materials[i].name()).unwrap_or(self.len()));
        order
    }
}

/// Snapshots the selected names into material records.
///
/// Names the source does not know get an all-zero contribution.
pub fn resolve_materials<N, S>(
    selected: &[N],
    source: &S,
    priorities: &PriorityList,
) -> Vec<Material>
where
    N: AsRef<str>,
    S: ContributionSource + ?Sized,
{
    selected
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let contribution = source.contribution(name).unwrap_or_else(|| {
                log::debug!("material {name:?} has no contribution data, using zeros");
                NutrientProfile::ZERO
            });
            Material::new(name, contribution, priorities.unit_of(name))
        })
        .collect()
}

fn normalize_unit(unit: u32) -> u32 {
    if unit == 0 {
        DEFAULT_DIVISIBILITY
    } else {
        unit
    }
}
