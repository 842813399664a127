//! Isotropic linear elasticity in rate form

use std::any::Any;

use crate::error::{MpmError, MpmResult};
use crate::materials::material::{Material, MaterialProperties};
use crate::materials::utils::{check, physics};
use crate::math::{Real, Voigt, voigt_trace};

#[derive(Clone, Debug)]
pub struct LinearElastic<const D: usize> {
    id: usize,
    density: Real,
    lambda: Real,
    mu: Real,
}

impl<const D: usize> LinearElastic<D> {
    pub fn new(id: usize, properties: &MaterialProperties) -> MpmResult<Self> {
        if !check::density_ok(properties.density) {
            return Err(MpmError::config(format!(
                "material {id}: density {} out of range",
                properties.density
            )));
        }
        if !check::young_modulus_ok(properties.youngs_modulus) {
            return Err(MpmError::config(format!(
                "material {id}: Young's modulus {} out of range",
                properties.youngs_modulus
            )));
        }
        if !check::poisson_ratio_ok(properties.poisson_ratio) {
            return Err(MpmError::config(format!(
                "material {id}: Poisson ratio {} out of range",
                properties.poisson_ratio
            )));
        }
        let (lambda, mu) =
            physics::lame_lambda_mu(properties.youngs_modulus, properties.poisson_ratio);
        Ok(Self {
            id,
            density: properties.density,
            lambda,
            mu,
        })
    }
}

impl<const D: usize> Material<D> for LinearElastic<D> {
    fn id(&self) -> usize {
        self.id
    }

    fn name(&self) -> &'static str {
        if D == 2 { "LinearElastic2D" } else { "LinearElastic3D" }
    }

    fn density(&self) -> Real {
        self.density
    }

    /// Shear components of `dstrain` are engineering strains.
    fn compute_stress(&self, stress: &Voigt, dstrain: &Voigt) -> Voigt {
        let volumetric = self.lambda * voigt_trace(dstrain);
        let mut updated = *stress;
        for i in 0..3 {
            updated[i] += volumetric + 2.0 * self.mu * dstrain[i];
        }
        for i in 3..6 {
            updated[i] += self.mu * dstrain[i];
        }
        updated
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
