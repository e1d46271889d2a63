//! Synthetic spectral test inputs.
//!
//! Deterministic generators for frames and cubes with a known
//! cross-dispersion profile along a known trace, used to validate the
//! extraction algorithms against exact expected values.

use ndarray::{Array1, Array2, Array3, ArrayView2};

/// Generate a linear trace: `start_row + slope * column`.
///
/// # Arguments
/// * `n_cols` - number of detector columns
/// * `start_row` - trace row position at column 0
/// * `slope` - trace drift in rows per column
pub fn linear_trace(n_cols: usize, start_row: f64, slope: f64) -> Array1<f64> {
    Array1::from_shape_fn(n_cols, |col| start_row + slope * col as f64)
}

/// Generate a frame with a Gaussian cross-dispersion profile per column.
///
/// Each column carries a Gaussian band centered on `trace[col]` with the
/// given profile width, scaled so the column's pixel sum equals
/// `column_flux` exactly (the discrete profile is renormalized, not the
/// continuous one).
///
/// # Arguments
/// * `n_rows` - frame height (cross-dispersion)
/// * `trace` - per-column profile center, length `n_cols`
/// * `sigma` - Gaussian profile width in rows
/// * `column_flux` - total pixel sum per column
pub fn gaussian_profile_frame(
    n_rows: usize,
    trace: &Array1<f64>,
    sigma: f64,
    column_flux: f64,
) -> Array2<f64> {
    let n_cols = trace.len();
    let mut frame = Array2::<f64>::zeros((n_rows, n_cols));

    for col in 0..n_cols {
        let center = trace[col];
        let mut column_sum = 0.0;
        for row in 0..n_rows {
            let offset = row as f64 - center;
            let value = (-offset * offset / (2.0 * sigma * sigma)).exp();
            frame[[row, col]] = value;
            column_sum += value;
        }
        if column_sum > 0.0 {
            for row in 0..n_rows {
                frame[[row, col]] *= column_flux / column_sum;
            }
        }
    }

    frame
}

/// Generate a cube of Gaussian-profile frames, one per trace row.
///
/// # Arguments
/// * `n_rows` - frame height (cross-dispersion)
/// * `traces` - per-integration, per-column profile centers
///   `[n_integrations, n_columns]`
/// * `sigma` - Gaussian profile width in rows
/// * `column_flux` - total pixel sum per column
pub fn gaussian_profile_cube(
    n_rows: usize,
    traces: &ArrayView2<f64>,
    sigma: f64,
    column_flux: f64,
) -> Array3<f64> {
    let (n_ints, n_cols) = traces.dim();
    let mut cube = Array3::<f64>::zeros((n_ints, n_rows, n_cols));

    for integration in 0..n_ints {
        let trace = traces.row(integration).to_owned();
        let frame = gaussian_profile_frame(n_rows, &trace, sigma, column_flux);
        cube.index_axis_mut(ndarray::Axis(0), integration).assign(&frame);
    }

    cube
}
