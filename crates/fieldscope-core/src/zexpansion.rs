//! Monotone nonlinear remapping of scalar values.

use serde::{Deserialize, Serialize};

use crate::error::{FieldscopeError, Result};

/// Expands values near the centre of a range and compresses values far from it.
///
/// With centre `c = (min + max) / 2` and half-range `h`, a value `z` maps to
/// `c + sign(z - c) · h · (1 - e^(-k|z - c|/h)) / (1 - e^(-k))`. The endpoints
/// and the centre are fixed points; larger `k` expands small deviations more.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZExpansion {
    factor: f64,
    min: f64,
    max: f64,
}

impl ZExpansion {
    /// Creates an expansion with the given strength. The factor must be positive.
    pub fn new(factor: f64) -> Result<Self> {
        if !(factor > 0.0 && factor.is_finite()) {
            return Err(FieldscopeError::InvalidArgument(format!(
                "expansion factor must be positive, got {factor}"
            )));
        }
        Ok(Self {
            factor,
            min: -1.0,
            max: 1.0,
        })
    }

    #[must_use]
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Sets the range whose endpoints stay fixed.
    pub fn set_min_max(&mut self, min: f64, max: f64) {
        self.min = min.min(max);
        self.max = min.max(max);
    }

    #[must_use]
    pub fn min_max(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Maps `z` through the expansion.
    #[must_use]
    pub fn evaluate(&self, z: f64) -> f64 {
        let half = (self.max - self.min) / 2.0;
        if half <= 0.0 || !half.is_finite() {
            return z;
        }
        let centre = (self.max + self.min) / 2.0;
        let offset = z - centre;
        let norm = 1.0 - (-self.factor).exp();
        let mapped = half * (1.0 - (-self.factor * offset.abs() / half).exp()) / norm;
        centre + mapped.copysign(offset)
    }
}
