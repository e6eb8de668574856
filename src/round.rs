/// Rounded batch plus the outcome of the single corrective adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundedBatch {
    pub quantities: Vec<f64>,
    /// Input position that absorbed the correction, if one was needed.
    pub corrected: Option<usize>,
    /// `batch_size - sum(quantities)` after correction.
    pub residual: f64,
}

/// Rounds to the nearest multiple of `unit`, halves away from zero.
pub fn round_to_unit(quantity: f64, unit: u32) -> f64 {
    let unit = f64::from(unit.max(1));
    (quantity / unit).round() * unit
}

/// Snaps each quantity to its unit and corrects the sum on `anchor`.
///
/// Quantities are first rescaled to `batch_size` when their total is off by
/// more than `tolerance`. After rounding, any difference from `batch_size` is
/// added to the `anchor` entry, which is rounded to its unit once more; the
/// result can still miss the batch by less than one unit.
pub fn round_batch(
    quantities: &[f64],
    units: &[u32],
    anchor: usize,
    batch_size: f64,
    tolerance: f64,
) -> RoundedBatch {
    debug_assert_eq!(quantities.len(), units.len());

    let total: f64 = quantities.iter().sum();
    let factor = if (total - batch_size).abs() > tolerance && total > 0.0 {
        batch_size / total
    } else {
        1.0
    };

    let mut rounded: Vec<f64> = quantities
        .iter()
        .zip(units)
        .map(|(&q, &unit)| round_to_unit(q * factor, unit))
        .collect();

    let mut corrected = None;
    let sum: f64 = rounded.iter().sum();
    if sum != batch_size && anchor < rounded.len() {
        let diff = batch_size - sum;
        let adjusted = round_to_unit(rounded[anchor] + diff, units[anchor]).max(0.0);
        rounded[anchor] = adjusted;
        corrected = Some(anchor);
    }

    let residual = batch_size - rounded.iter().sum::<f64>();
    if residual != 0.0 {
        log::debug!("rounded batch misses {batch_size} by {residual}");
    }
    RoundedBatch {
        quantities: rounded,
        corrected,
        residual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up_for_positive_quantities() {
        assert_eq!(round_to_unit(12.5, 25), 25.0);
        assert_eq!(round_to_unit(12.4, 25), 0.0);
        assert_eq!(round_to_unit(333.3, 25), 325.0);
        assert_eq!(round_to_unit(7.0, 0), 7.0);
    }

    #[test]
    fn exact_batch_needs_no_correction() {
        let rounded = round_batch(&[550.0, 450.0], &[25, 25], 0, 1000.0, 0.01);
        assert_eq!(rounded.quantities, vec![550.0, 450.0]);
        assert_eq!(rounded.corrected, None);
        assert_eq!(rounded.residual, 0.0);
    }

    #[test]
    fn correction_lands_on_anchor_only() {
        let third = 1000.0 / 3.0;
        let rounded = round_batch(&[third; 3], &[25; 3], 2, 1000.0, 0.01);
        assert_eq!(rounded.quantities, vec![325.0, 325.0, 350.0]);
        assert_eq!(rounded.corrected, Some(2));
        assert_eq!(rounded.residual, 0.0);
    }

    #[test]
    fn rescales_before_rounding() {
        let rounded = round_batch(&[100.0, 100.0], &[25, 25], 0, 1000.0, 0.01);
        assert_eq!(rounded.quantities, vec![500.0, 500.0]);
    }

    #[test]
    fn coarse_anchor_unit_leaves_residual() {
        let rounded = round_batch(&[490.0, 510.0], &[100, 25], 0, 1000.0, 0.01);
        // 500 + 500 = 1000 after rounding; no residual.
        assert_eq!(rounded.residual, 0.0);

        let rounded = round_batch(&[480.0, 520.0], &[100, 10], 0, 1000.0, 0.01);
        // 500 + 520 overshoots by 20, which rounds back to 500 on the anchor.
        assert_eq!(rounded.quantities, vec![500.0, 520.0]);
        assert_eq!(rounded.corrected, Some(0));
        assert_eq!(rounded.residual, -20.0);
        assert!(rounded.residual.abs() < 100.0);
    }

    #[test]
    fn zero_total_goes_to_anchor() {
        let rounded = round_batch(&[0.0, 0.0], &[25, 25], 1, 1000.0, 0.01);
        assert_eq!(rounded.quantities, vec![0.0, 1000.0]);
        assert_eq!(rounded.residual, 0.0);
    }

    #[test]
    fn correction_never_goes_negative() {
        let rounded = round_batch(&[10.0, 990.0], &[25, 1], 0, 100.0, 0.01);
        assert!(rounded.quantities.iter().all(|&q| q >= 0.0));
    }
}
