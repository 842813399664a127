use std::any::Any;

use crate::math::{Real, Voigt};

/// Constitutive model of the solid phase.
pub trait Material<const D: usize>: Send + Sync {
    fn id(&self) -> usize;

    fn name(&self) -> &'static str;

    fn density(&self) -> Real;

    /// Stress after applying the strain increment `dstrain` to `stress`.
    fn compute_stress(&self, stress: &Voigt, dstrain: &Voigt) -> Voigt;

    fn as_any(&self) -> &dyn Any;
}

/// Parameters accepted by the built-in material constructors.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialProperties {
    pub density: Real,
    pub youngs_modulus: Real,
    pub poisson_ratio: Real,
}

impl Default for MaterialProperties {
    fn default() -> Self {
        Self {
            density: 1000.0,
            youngs_modulus: 1.0e6,
            poisson_ratio: 0.3,
        }
    }
}

impl MaterialProperties {
    pub fn with_density(mut self, density: Real) -> Self {
        self.density = density;
        self
    }

    pub fn with_youngs_modulus(mut self, youngs_modulus: Real) -> Self {
        self.youngs_modulus = youngs_modulus;
        self
    }

    pub fn with_poisson_ratio(mut self, poisson_ratio: Real) -> Self {
        self.poisson_ratio = poisson_ratio;
        self
    }
}
