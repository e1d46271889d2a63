use thiserror::Error;

/// Errors produced by the spectral extraction routines.
///
/// Out-of-range trace positions are not errors: the affected columns
/// default to zero output (or zero samples). Only precondition violations
/// that would otherwise surface as out-of-bounds indexing are reported
/// here, before any pixel is touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// Input array dimensions do not agree.
    #[error("{what} shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Which input is inconsistent (e.g. "variance", "trace positions").
        what: &'static str,
        /// Shape implied by the primary data array.
        expected: Vec<usize>,
        /// Shape actually supplied.
        actual: Vec<usize>,
    },

    /// Aperture radius is not a positive finite number of pixels.
    #[error("invalid aperture radius {radius}: must be finite and > 0")]
    InvalidApertureRadius {
        /// The rejected radius value.
        radius: f64,
    },
}
