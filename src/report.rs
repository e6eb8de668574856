use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};

use crate::allocate::AllocationStep;
use crate::analysis::NutrientComparison;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendStatus {
    /// Rounded quantities sum to the batch size.
    Exact,
    /// The anchor's unit could not absorb the rounding difference.
    Residual,
}

#[derive(Debug, Clone)]
pub struct BlendStats {
    pub status: BlendStatus,
    /// Constrained least-squares proportions before clamping.
    pub least_squares: Vec<f64>,
    /// Least-squares quantities scaled to the batch.
    pub scaled: Vec<f64>,
    /// Priority-pass quantities before rounding.
    pub allocated: Vec<f64>,
    pub skipped_pivots: usize,
    pub equal_split: bool,
    /// Batch total spread after the priority pass.
    pub leftover: f64,
    /// Input position of the material that absorbed the rounding correction.
    pub corrected: Option<usize>,
    /// `batch_size - sum(quantities)`.
    pub residual: f64,
}

pub(crate) fn emit_line(line: &str) {
    if log::log_enabled!(log::Level::Info) {
        log::info!("{line}");
    } else {
        println!("{line}");
    }
}

pub trait Reporter {
    fn on_step(&mut self, step: &AllocationStep);
    fn on_finish(&mut self) {}
}

pub struct StdoutReporter {
    rows: Vec<AllocationStep>,
}

impl StdoutReporter {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }
}

impl Default for StdoutReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for StdoutReporter {
    fn on_step(&mut self, step: &AllocationStep) {
        self.rows.push(step.clone());
    }

    fn on_finish(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        if !log::log_enabled!(log::Level::Info) {
            println!();
        }
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("rank").set_alignment(CellAlignment::Right),
            Cell::new("material"),
            Cell::new("lsq").set_alignment(CellAlignment::Right),
            Cell::new("ceiling").set_alignment(CellAlignment::Right),
            Cell::new("assigned").set_alignment(CellAlignment::Right),
            Cell::new("remaining").set_alignment(CellAlignment::Right),
        ]);
        for (rank, row) in self.rows.iter().enumerate() {
            table.add_row(vec![
                Cell::new(rank).set_alignment(CellAlignment::Right),
                Cell::new(&row.name),
                Cell::new(format!("{:.2}", row.least_squares)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", row.ceiling)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", row.assigned)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", row.remaining_total))
                    .set_alignment(CellAlignment::Right),
            ]);
        }

        for line in table.to_string().lines() {
            emit_line(line);
        }
        self.rows.clear();
    }
}

/// Renders a recipe and its nutrient check as two stacked tables.
pub fn render_blend_table(
    names: &[String],
    quantities: &[f64],
    comparison: &NutrientComparison,
) -> String {
    let mut recipe = Table::new();
    recipe.load_preset(presets::UTF8_FULL);
    recipe.set_content_arrangement(ContentArrangement::Dynamic);
    recipe.set_header(vec![
        Cell::new("material"),
        Cell::new("parts").set_alignment(CellAlignment::Right),
    ]);
    for (name, quantity) in names.iter().zip(quantities) {
        recipe.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{quantity:.0}")).set_alignment(CellAlignment::Right),
        ]);
    }
    let total: f64 = quantities.iter().sum();
    recipe.add_row(vec![
        Cell::new("total"),
        Cell::new(format!("{total:.0}")).set_alignment(CellAlignment::Right),
    ]);

    let mut nutrients = Table::new();
    nutrients.load_preset(presets::UTF8_FULL);
    nutrients.set_content_arrangement(ContentArrangement::Dynamic);
    nutrients.set_header(vec![
        Cell::new("nutrient"),
        Cell::new("expected").set_alignment(CellAlignment::Right),
        Cell::new("calculated").set_alignment(CellAlignment::Right),
        Cell::new("flag"),
    ]);
    for check in &comparison.checks {
        let flag = if check.exceeds {
            "over"
        } else if check.differs {
            "off"
        } else {
            ""
        };
        nutrients.add_row(vec![
            Cell::new(check.nutrient),
            Cell::new(format!("{:.1}", check.expected)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}", check.achieved)).set_alignment(CellAlignment::Right),
            Cell::new(flag),
        ]);
    }
    nutrients.add_row(vec![
        Cell::new("total"),
        Cell::new(format!("{:.1}", comparison.expected.total())).set_alignment(CellAlignment::Right),
        Cell::new(format!("{:.1}", comparison.achieved.total())).set_alignment(CellAlignment::Right),
        Cell::new(""),
    ]);

    format!("{recipe}\n{nutrients}")
}
