//! Per-pixel sample collection across a data cube.
//!
//! Scans every integration of a cube and flattens the aperture pixels of a
//! single spectral order into one contiguous sample list, indexed by a
//! per-column span table. Downstream profile fitting consumes the samples
//! column by column through that table, so the flat layout is kept
//! cache-friendly: one allocation, no gaps, variable-length runs addressed
//! by (start, len) spans rather than nested vectors.

use ndarray::{Array2, ArrayView2, ArrayView3};
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::window::{aperture_window, validate_radius};

/// One aperture pixel, tagged with its position relative to the trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelSample {
    /// Signed distance from the trace center in rows. Sub-pixel: the row
    /// index is integral but the trace position is not.
    pub offset: f64,
    /// Pixel value.
    pub flux: f64,
    /// Per-pixel noise variance.
    pub variance: f64,
    /// Detector column the sample came from.
    pub column: usize,
}

/// Location of one column's samples in the flat sample list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpan {
    /// Index of the column's first sample.
    pub start: usize,
    /// Number of samples; 0 for columns with no extractable data, in which
    /// case `start` still records the running cursor position.
    pub len: usize,
}

/// Flat aperture-pixel list for a whole cube, with its column index.
///
/// Samples are ordered integration-major, column-minor; each column's run
/// is contiguous. The sum of all span lengths equals `samples.len()`, and
/// span starts are monotonically non-decreasing within an integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixelTable {
    /// All samples, one contiguous run per (integration, column).
    pub samples: Vec<PixelSample>,
    /// Span of each (integration, column) in `samples`.
    pub spans: Array2<ColumnSpan>,
}

impl PixelTable {
    /// Samples of one (integration, column) run; empty for skipped columns.
    pub fn column_samples(&self, integration: usize, column: usize) -> &[PixelSample] {
        let span = self.spans[[integration, column]];
        &self.samples[span.start..span.start + span.len]
    }

    /// Number of integrations indexed by the span table.
    pub fn n_integrations(&self) -> usize {
        self.spans.nrows()
    }

    /// Number of detector columns indexed by the span table.
    pub fn n_columns(&self) -> usize {
        self.spans.ncols()
    }

    /// Total number of collected samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when no column produced any sample.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Collect the aperture pixels of a spectral order across a whole cube.
///
/// Iterates integrations, then columns, applying the shared windowing
/// policy per (integration, column). For each window row one
/// [`PixelSample`] is appended to the flat list; the run's position and
/// length are recorded in the span table. Columns whose trace position
/// falls outside the frame contribute zero samples and do not advance the
/// cursor.
///
/// # Arguments
///
/// * `cube` - data cube `[integration, row, column]`
/// * `variance` - per-pixel noise variance, same shape as `cube`
/// * `trace` - trace position per `[integration, column]`
/// * `radius` - aperture half-width in pixel rows
///
/// # Errors
///
/// Returns [`ExtractError::ShapeMismatch`] if `variance` or `trace` do not
/// match `cube`, and [`ExtractError::InvalidApertureRadius`] for a
/// non-positive or non-finite radius. Shape checking happens before any
/// pixel is read.
pub fn collect_pixels(
    cube: &ArrayView3<f64>,
    variance: &ArrayView3<f64>,
    trace: &ArrayView2<f64>,
    radius: f64,
) -> Result<PixelTable, ExtractError> {
    validate_radius(radius)?;

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

    let mut spans = Array2::<ColumnSpan>::default((n_ints, n_cols));
    let mut samples =
        Vec::with_capacity(n_ints * n_cols * (2.0 * radius).ceil() as usize);

    for integration in 0..n_ints {
        for col in 0..n_cols {
            let cursor = samples.len();
            spans[[integration, col]].start = cursor;

            let trace_pos = trace[[integration, col]];
            let Some(window) = aperture_window(trace_pos, radius, n_rows) else {
                continue;
            };

            for row in window.start..window.end {
                samples.push(PixelSample {
                    offset: row as f64 - trace_pos,
                    flux: cube[[integration, row, col]],
                    variance: variance[[integration, row, col]],
                    column: col,
                });
            }
            spans[[integration, col]].len = window.len();
        }
    }

    Ok(PixelTable { samples, spans })
}
