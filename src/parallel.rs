//! Parallel whole-cube extraction.
//!
//! Each integration's extraction is independent of every other, so a cube
//! is processed by fanning the per-frame extractor out across integrations
//! with rayon and reassembling the per-integration spectra into 2D output
//! arrays. Results are deterministic regardless of scheduling.

use ndarray::{Array2, ArrayView2, ArrayView3, Axis};
use rayon::prelude::*;

use crate::aperture::extract_spectrum;
use crate::config::ExtractionConfig;
use crate::error::ExtractError;

/// Extract one spectrum per integration of a cube, in parallel.
///
/// Equivalent to calling [`extract_spectrum`] on every
/// `cube[integration, .., ..]` slice with the matching variance frame and
/// trace row, returning `[n_integrations, n_columns]` flux and variance
/// arrays.
///
/// # Arguments
///
/// * `cube` - data cube `[integration, row, column]`
/// * `variance` - per-pixel noise variance, same shape as `cube`
/// * `trace` - trace position per `[integration, column]`
/// * `config` - aperture radius and illumination mode
///
/// # Errors
///
/// Returns [`ExtractError::ShapeMismatch`] if `variance` or `trace` do not
/// match `cube`, and [`ExtractError::InvalidApertureRadius`] from
/// [`ExtractionConfig::validate`]. Shape checking happens before any
/// worker starts.
pub fn extract_cube(
    cube: &ArrayView3<f64>,
    variance: &ArrayView3<f64>,
    trace: &ArrayView2<f64>,
    config: &ExtractionConfig,
) -> Result<(Array2<f64>, Array2<f64>), ExtractError> {
    config.validate()?;

    let (n_ints, n_rows, n_cols) = cube.dim();
    if variance.dim() != (n_ints, n_rows, n_cols) {
        return Err(ExtractError::ShapeMismatch {
            what: "variance",
            expected: vec![n_ints, n_rows, n_cols],
            actual: variance.shape().to_vec(),
        });
    }
    if trace.dim() != (n_ints, n_cols) {
        return Err(ExtractError::ShapeMismatch {
            what: "trace positions",
            expected: vec![n_ints, n_cols],
            actual: trace.shape().to_vec(),
        });
    }

    let spectra: Vec<_> = cube
        .axis_iter(Axis(0))
        .into_par_iter()
        .zip(variance.axis_iter(Axis(0)).into_par_iter())
        .zip(trace.axis_iter(Axis(0)).into_par_iter())
        .map(|((frame, frame_variance), frame_trace)| {
            extract_spectrum(
                &frame,
                &frame_variance,
                &frame_trace,
                config.aperture_radius,
                config.uniform_source,
            )
        })
        .collect::<Result<_, _>>()?;

    let mut flux = Array2::<f64>::zeros((n_ints, n_cols));
    let mut var = Array2::<f64>::zeros((n_ints, n_cols));
    for (integration, spectrum) in spectra.into_iter().enumerate() {
        flux.row_mut(integration).assign(&spectrum.flux);
        var.row_mut(integration).assign(&spectrum.variance);
    }

    Ok((flux, var))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array2, Array3};

    #[test]
    fn test_matches_serial_extraction() {
        let n_ints = 4;
        let n_rows = 12;
        let n_cols = 7;

        // Deterministic non-constant cube so every integration differs.
        let cube = Array3::from_shape_fn((n_ints, n_rows, n_cols), |(i, r, c)| {
            (i * 100 + r * 10 + c) as f64 * 0.1
        });
        let variance = cube.mapv(|v| 0.5 + v * 0.01);
        let trace = Array2::from_shape_fn((n_ints, n_cols), |(i, c)| 5.0 + i as f64 * 0.3 + c as f64 * 0.1);
        let config = ExtractionConfig::new(2.5);

        let (flux, var) =
            extract_cube(&cube.view(), &variance.view(), &trace.view(), &config).unwrap();

        for integration in 0..n_ints {
            let serial = extract_spectrum(
                &cube.index_axis(Axis(0), integration),
                &variance.index_axis(Axis(0), integration),
                &trace.index_axis(Axis(0), integration),
                config.aperture_radius,
                config.uniform_source,
            )
            .unwrap();

            for col in 0..n_cols {
                assert_relative_eq!(flux[[integration, col]], serial.flux[col], epsilon = 1e-12);
                assert_relative_eq!(
                    var[[integration, col]],
                    serial.variance[col],
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_out_of_range_rows_are_zero() {
        let cube = Array3::<f64>::ones((2, 6, 3));
        let variance = Array3::<f64>::ones((2, 6, 3));
        let mut trace = Array2::from_elem((2, 3), 3.0);
        trace.row_mut(1).fill(-1.0); // whole second integration invalid

        let config = ExtractionConfig::new(1.0);
        let (flux, var) =
            extract_cube(&cube.view(), &variance.view(), &trace.view(), &config).unwrap();

        assert!(flux.row(0).iter().all(|&v| v > 0.0));
        assert!(flux.row(1).iter().all(|&v| v == 0.0));
        assert!(var.row(1).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_cube_shape_mismatch_fails_fast() {
        let cube = Array3::<f64>::ones((2, 6, 3));
        let variance = Array3::<f64>::ones((2, 5, 3));
        let trace = Array2::from_elem((2, 3), 3.0);

        let err = extract_cube(
            &cube.view(),
            &variance.view(),
            &trace.view(),
            &ExtractionConfig::new(1.0),
        )
        .unwrap_err();
        assert!(matches!(err, ExtractError::ShapeMismatch { .. }));
    }
}
