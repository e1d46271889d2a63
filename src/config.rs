use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::window::validate_radius;

/// Per-run extraction parameters threaded through the pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Aperture half-width around the trace, in pixel rows.
    pub aperture_radius: f64,
    /// Treat the slit as uniformly illuminated: average the aperture
    /// counts and rescale by the nominal aperture width instead of
    /// box-summing. Appropriate for extended/slit-filling sources.
    pub uniform_source: bool,
}

impl ExtractionConfig {
    /// Box-sum extraction with the given aperture radius.
    pub fn new(aperture_radius: f64) -> Self {
        Self {
            aperture_radius,
            uniform_source: false,
        }
    }

    /// Check the configuration before a run.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidApertureRadius`] when the radius is
    /// not a positive finite number.
    pub fn validate(&self) -> Result<(), ExtractError> {
        validate_radius(self.aperture_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_positive_radius() {
        assert!(ExtractionConfig::new(3.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_radii() {
        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = ExtractionConfig::new(radius);
            assert!(matches!(
                config.validate(),
                Err(ExtractError::InvalidApertureRadius { .. })
            ));
        }
    }
}
