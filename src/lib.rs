//! Aperture extraction of spectra from astronomical detector images.
//!
//! Given a detector frame (or a cube of integrations), a per-column trace
//! position and an aperture half-width, this crate collects and normalizes
//! the flux and variance in a band of pixels straddling the spectral
//! trace. It is the numerical front end of a spectroscopic pipeline whose
//! later stages fit PSF profiles across columns.
//!
//! Three independently usable stages share one windowing policy:
//!
//! 1. [`extract_spectrum`] reduces a 2D frame to a 1D spectrum and its
//!    variance by summing (or averaging) the aperture pixels per column;
//!    [`extract_cube`] fans it out across a cube's integrations.
//! 2. [`collect_pixels`] flattens the aperture pixels of an entire cube
//!    into a contiguous [`PixelTable`] of (offset-from-trace, flux,
//!    variance, column) samples with a per-column span index.
//! 3. [`normalize_flux`] rescales a pixel table per column by a reference
//!    spectrum or by the columns' own flux sums.
//!
//! All stages are pure functions over ndarray views: they allocate their
//! outputs, keep no references to their inputs, and are safe to run
//! concurrently over disjoint integrations or spectral orders.

pub mod aperture;
pub mod config;
pub mod error;
pub mod normalize;
pub mod parallel;
pub mod pixel_table;
pub mod test_patterns;
pub mod window;

// Re-export the pipeline surface for easier access
pub use aperture::{extract_spectrum, ExtractedSpectrum};
pub use config::ExtractionConfig;
pub use error::ExtractError;
pub use normalize::{normalize_flux, normalize_flux_with_floor, MIN_NORM};
pub use parallel::extract_cube;
pub use pixel_table::{collect_pixels, ColumnSpan, PixelSample, PixelTable};
pub use window::{aperture_window, ApertureWindow};
