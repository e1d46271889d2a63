//! Shared aperture-windowing policy.
//!
//! Both the per-frame extractor and the cube pixel collector derive their
//! row windows from this single function so the two can never disagree on
//! rounding or clamping, which would silently bias flux near frame edges.

use crate::error::ExtractError;

/// Row window of an extraction aperture, half-open `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApertureWindow {
    /// First row inside the aperture.
    pub start: usize,
    /// One past the last row inside the aperture.
    pub end: usize,
}

impl ApertureWindow {
    /// Number of rows in the window. Always at least 1: empty windows are
    /// never constructed, they collapse into the skipped-column case.
    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Compute the aperture row window for one column.
///
/// The window is `[round(trace_pos - radius), round(trace_pos + radius))`
/// with the lower bound clamped at 0 and the upper bound clamped at
/// `n_rows - 1`, so a window reaching the top edge loses its last row.
/// Rounding is `f64::round` (half away from zero).
///
/// Returns `None` when the column holds no extractable data:
/// - `trace_pos` outside `[0, n_rows)`, or
/// - the clamped window is empty (trace within half a pixel of the top
///   edge).
///
/// Skipped columns are a silent, well-defined default for the callers,
/// never an error.
pub fn aperture_window(trace_pos: f64, radius: f64, n_rows: usize) -> Option<ApertureWindow> {
    if trace_pos < 0.0 || trace_pos >= n_rows as f64 {
        return None;
    }

    let start = ((trace_pos - radius).round() as i64).max(0);
    let end = ((trace_pos + radius).round() as i64).min(n_rows as i64 - 1);

    if end <= start {
        return None;
    }

    Some(ApertureWindow {
        start: start as usize,
        end: end as usize,
    })
}

/// Reject aperture radii that cannot define a window.
pub(crate) fn validate_radius(radius: f64) -> Result<(), ExtractError> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(ExtractError::InvalidApertureRadius { radius });
    }
    Ok(())
}
