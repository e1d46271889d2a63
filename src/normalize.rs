//! Per-column flux normalization of collected pixel samples.
//!
//! Rescales each column's run of samples so its flux is expressed relative
//! to a reference level: either an externally supplied spectrum (typically
//! the output of the aperture extractor) or, absent one, the column's own
//! pixel-flux sum.

use ndarray::ArrayView2;

use crate::error::ExtractError;
use crate::pixel_table::PixelTable;

/// Floor applied to every normalization factor.
///
/// Near-zero or negative column flux would otherwise blow up the division;
/// heavily suppressed columns are biased low instead of becoming unstable.
pub const MIN_NORM: f64 = 0.01;

/// Normalize a pixel table's flux and variance per column using the
/// default [`MIN_NORM`] floor.
///
/// See [`normalize_flux_with_floor`] for the full semantics.
pub fn normalize_flux(
    table: &PixelTable,
    reference: Option<&ArrayView2<f64>>,
) -> Result<PixelTable, ExtractError> {
    normalize_flux_with_floor(table, reference, MIN_NORM)
}

/// Normalize a pixel table's flux and variance per column with a custom
/// normalization floor.
///
/// For every (integration, column) run located through the span table the
/// normalization factor is `reference[[integration, column]]` when a
/// reference spectrum is supplied, otherwise the sum of the run's flux
/// values. The factor is floored at `floor`, then each sample is rescaled
/// as `flux / norm` and `variance / norm²`. Columns with zero samples are
/// left untouched.
///
/// The input table is not modified; a rescaled copy is returned.
///
/// # Arguments
///
/// * `table` - collected pixel samples with their column index
/// * `reference` - optional `[n_integrations, n_columns]` normalization
///   spectrum; column sums are used when absent
/// * `floor` - minimum allowed normalization factor
///
/// # Errors
///
/// Returns [`ExtractError::ShapeMismatch`] if a supplied reference
/// spectrum does not match the table's span grid.
pub fn normalize_flux_with_floor(
    table: &PixelTable,
    reference: Option<&ArrayView2<f64>>,
    floor: f64,
) -> Result<PixelTable, ExtractError> {
    let n_ints = table.n_integrations();
    let n_cols = table.n_columns();

    if let Some(spectrum) = reference {
        if spectrum.dim() != (n_ints, n_cols) {
            return Err(ExtractError::ShapeMismatch {
                what: "reference spectrum",
                expected: vec![n_ints, n_cols],
                actual: spectrum.shape().to_vec(),
            });
        }
    }

    let mut normalized = table.clone();

    for integration in 0..n_ints {
        for col in 0..n_cols {
            let span = table.spans[[integration, col]];
            if span.len == 0 {
                continue;
            }

            let run = span.start..span.start + span.len;
            let norm = match reference {
                Some(spectrum) => spectrum[[integration, col]],
                None => table.samples[run.clone()].iter().map(|s| s.flux).sum(),
            };
            if norm < floor {
                log::debug!(
                    "normalization floored at integration {integration}, column {col}: \
                     {norm:.4} -> {floor}"
                );
            }
            let norm = norm.max(floor);

            for sample in &mut normalized.samples[run] {
                sample.flux /= norm;
                sample.variance /= norm * norm;
            }
        }
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel_table::collect_pixels;
    use approx::assert_relative_eq;
    use ndarray::{Array2, Array3};

    fn collect_simple(
        flux_value: f64,
        n_rows: usize,
        trace_pos: f64,
        radius: f64,
    ) -> PixelTable {
        let cube = Array3::<f64>::from_elem((1, n_rows, 4), flux_value);
        let variance = Array3::<f64>::from_elem((1, n_rows, 4), 1.0);
        let trace = Array2::from_elem((1, 4), trace_pos);
        collect_pixels(&cube.view(), &variance.view(), &trace.view(), radius).unwrap()
    }

    #[test]
    fn test_self_normalized_columns_sum_to_one() {
        let table = collect_simple(3.0, 11, 5.0, 2.0);
        let normalized = normalize_flux(&table, None).unwrap();

        for col in 0..4 {
            let column_sum: f64 = normalized
                .column_samples(0, col)
                .iter()
                .map(|s| s.flux)
                .sum();
            assert_relative_eq!(column_sum, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_reference_spectrum_normalization() {
        let table = collect_simple(2.0, 11, 5.0, 2.0);
        // Window [3, 7): 4 samples of flux 2.0 -> column sum 8.0.
        let reference = Array2::from_elem((1, 4), 8.0);
        let normalized = normalize_flux(&table, Some(&reference.view())).unwrap();

        for sample in &normalized.samples {
            assert_relative_eq!(sample.flux, 0.25, epsilon = 1e-12);
            assert_relative_eq!(sample.variance, 1.0 / 64.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_variance_scales_with_norm_squared() {
        let table = collect_simple(5.0, 11, 5.0, 2.0);
        let normalized = normalize_flux(&table, None).unwrap();

        // Column sum = 20.0; variance 1.0 -> 1/400.
        for sample in &normalized.samples {
            assert_relative_eq!(sample.variance, 1.0 / 400.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_floor_applies_below_min_norm() {
        // Column sum = 4 * 1e-3 = 0.004 < MIN_NORM, so the floor divides
        // and the normalized column sums to true_sum / MIN_NORM < 1.
        let table = collect_simple(1e-3, 11, 5.0, 2.0);
        let normalized = normalize_flux(&table, None).unwrap();

        let column_sum: f64 = normalized
            .column_samples(0, 0)
            .iter()
            .map(|s| s.flux)
            .sum();
        assert_relative_eq!(column_sum, 0.004 / MIN_NORM, epsilon = 1e-12);
        assert!(column_sum < 1.0);
    }

    #[test]
    fn test_negative_column_sum_is_floored() {
        let table = collect_simple(-2.0, 11, 5.0, 2.0);
        let normalized = normalize_flux(&table, None).unwrap();

        for sample in &normalized.samples {
            assert_relative_eq!(sample.flux, -2.0 / MIN_NORM, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_custom_floor() {
        let table = collect_simple(1.0, 11, 5.0, 2.0);
        // Column sum 4.0 < floor 10.0 -> everything divided by 10.
        let normalized = normalize_flux_with_floor(&table, None, 10.0).unwrap();

        for sample in &normalized.samples {
            assert_relative_eq!(sample.flux, 0.1, epsilon = 1e-12);
            assert_relative_eq!(sample.variance, 0.01, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_input_table_is_untouched() {
        let table = collect_simple(3.0, 11, 5.0, 2.0);
        let before = table.clone();

        let _ = normalize_flux(&table, None).unwrap();

        assert_eq!(table.samples, before.samples);
        assert_eq!(table.spans, before.spans);
    }

    #[test]
    fn test_empty_columns_are_untouched() {
        let cube = Array3::<f64>::ones((1, 5, 3));
        let variance = Array3::<f64>::ones((1, 5, 3));
        let trace = Array2::from_shape_vec((1, 3), vec![2.0, -1.0, 2.0]).unwrap();
        let table = collect_pixels(&cube.view(), &variance.view(), &trace.view(), 1.0).unwrap();

        let normalized = normalize_flux(&table, None).unwrap();

        assert!(normalized.column_samples(0, 1).is_empty());
        assert_eq!(normalized.len(), table.len());
    }

    #[test]
    fn test_reference_shape_mismatch_fails_fast() {
        let table = collect_simple(1.0, 11, 5.0, 2.0);
        let reference = Array2::from_elem((2, 4), 1.0);

        let err = normalize_flux(&table, Some(&reference.view())).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::ShapeMismatch {
                what: "reference spectrum",
                ..
            }
        ));
    }
}
