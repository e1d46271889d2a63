//! Simple aperture extraction of a spectrum from a single detector frame.
//!
//! Sums (or averages) the pixels in a band straddling the spectral trace,
//! column by column, propagating the per-pixel variance alongside the flux.

use ndarray::{s, Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::window::{aperture_window, validate_radius};

/// Spectrum extracted from one frame, with its propagated variance.
///
/// Both arrays have one entry per detector column. Columns whose trace
/// position fell outside the frame hold zero in both fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedSpectrum {
    /// Extracted flux per column.
    pub flux: Array1<f64>,
    /// Variance of the extracted flux per column.
    pub variance: Array1<f64>,
}

/// Extract a 1D spectrum from a 2D frame by aperture summation.
///
/// For each column the aperture window around `trace[col]` is computed by
/// the shared windowing policy and the pixels inside it are reduced:
///
/// - `uniform == false`: flux and variance are the plain sums over the
///   window (box-sum photometry).
/// - `uniform == true`: flux and variance are the window means rescaled by
///   the nominal aperture width `2 * radius`. The mean is taken over the
///   clamped window but the rescale uses the nominal width, so columns
///   clamped at a frame edge are approximated as if uniformly lit across
///   the full aperture.
///
/// Columns with a trace position outside `[0, n_rows)` are left at zero in
/// both outputs.
///
/// # Arguments
///
/// * `frame` - 2D data frame, rows = cross-dispersion, columns = dispersion
/// * `variance` - per-pixel noise variance, same shape as `frame`
/// * `trace` - sub-pixel row position of the spectral order per column
/// * `radius` - aperture half-width in pixel rows
/// * `uniform` - treat the slit as uniformly illuminated (mean × nominal
///   width) instead of box-summing
///
/// # Errors
///
/// Returns [`ExtractError::ShapeMismatch`] if `variance` or `trace` do not
/// match `frame`, and [`ExtractError::InvalidApertureRadius`] for a
/// non-positive or non-finite radius. Shape checking happens before any
/// pixel is read.
pub fn extract_spectrum(
    frame: &ArrayView2<f64>,
    variance: &ArrayView2<f64>,
    trace: &ArrayView1<f64>,
    radius: f64,
    uniform: bool,
) -> Result<ExtractedSpectrum, ExtractError> {
    validate_radius(radius)?;

    let (n_rows, n_cols) = frame.dim();
    if variance.dim() != (n_rows, n_cols) {
        return Err(ExtractError::ShapeMismatch {
            what: "variance",
            expected: vec![n_rows, n_cols],
            actual: variance.shape().to_vec(),
        });
    }
    if trace.len() != n_cols {
        return Err(ExtractError::ShapeMismatch {
            what: "trace positions",
            expected: vec![n_cols],
            actual: vec![trace.len()],
        });
    }

    let nominal_width = 2.0 * radius;
    let mut flux = Array1::<f64>::zeros(n_cols);
    let mut var = Array1::<f64>::zeros(n_cols);

    for col in 0..n_cols {
        let Some(window) = aperture_window(trace[col], radius, n_rows) else {
            continue;
        };

        let flux_sum = frame.slice(s![window.start..window.end, col]).sum();
        let var_sum = variance.slice(s![window.start..window.end, col]).sum();

        if uniform {
            let n_pix = window.len() as f64;
            flux[col] = flux_sum / n_pix * nominal_width;
            var[col] = var_sum / n_pix * nominal_width;
        } else {
            flux[col] = flux_sum;
            var[col] = var_sum;
        }
    }

    Ok(ExtractedSpectrum {
        flux,
        variance: var,
    })
}
