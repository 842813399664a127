use crate::config::constants::MAX_PHASES;
use crate::error::{MpmError, MpmResult};
use crate::math::{Real, Vector};

/// Solver parameters for controlling the explicit MPM timestep
#[derive(Clone, Debug, PartialEq)]
pub struct SolverParams {
    /// Time increment per step
    pub dt: Real,

    /// Body acceleration; its length must match the mesh dimension
    pub gravity: Vec<Real>,

    /// Number of phases mapped between particles and nodes each step
    pub nphases: usize,

    /// Local (Cundall) damping factor applied to nodal forces, 0.0 disables it
    pub damping: Real,

    /// When true, particles that leave their cell are searched for in
    /// neighbouring cells. When false they are deactivated instead.
    pub locate_particles: bool,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            dt: 1e-3,
            gravity: Vec::new(),
            nphases: 1,
            damping: 0.0,
            locate_particles: true,
        }
    }
}

impl SolverParams {
    pub fn with_dt(mut self, dt: Real) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_gravity(mut self, gravity: &[Real]) -> Self {
        self.gravity = gravity.to_vec();
        self
    }

    pub fn with_phases(mut self, nphases: usize) -> Self {
        self.nphases = nphases;
        self
    }

    /// Set the damping factor (0.0 to 1.0)
    pub fn with_damping(mut self, damping: Real) -> Self {
        self.damping = damping.clamp(0.0, 1.0);
        self
    }

    pub fn without_particle_search(mut self) -> Self {
        self.locate_particles = false;
        self
    }

    /// Check the parameters against the mesh dimension.
    pub fn validate<const D: usize>(&self) -> MpmResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(MpmError::config(format!("dt must be positive, got {}", self.dt)));
        }
        if !self.gravity.is_empty() && self.gravity.len() != D {
            return Err(MpmError::config(format!(
                "gravity has {} components for a {}D mesh",
                self.gravity.len(),
                D
            )));
        }
        if self.nphases == 0 || self.nphases > MAX_PHASES {
            return Err(MpmError::config(format!(
                "phase count {} outside 1..={}",
                self.nphases, MAX_PHASES
            )));
        }
        Ok(())
    }

    /// Gravity as a D-vector; an empty gravity list means no body force.
    pub fn gravity_vector<const D: usize>(&self) -> MpmResult<Vector<D>> {
        if self.gravity.is_empty() {
            return Ok(Vector::<D>::zeros());
        }
        crate::math::vector_from_slice::<D>(&self.gravity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_valid_in_2d_and_3d() {
        let params = SolverParams::default();
        assert!(params.validate::<2>().is_ok());
        assert!(params.validate::<3>().is_ok());
        assert_eq!(params.gravity_vector::<3>().unwrap(), Vector::<3>::zeros());
    }

    #[test]
    fn gravity_dimension_is_checked() {
        let params = SolverParams::default().with_gravity(&[0.0, -9.81]);
        assert!(params.validate::<2>().is_ok());
        assert!(matches!(
            params.validate::<3>(),
            Err(MpmError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_bad_dt_and_phase_count() {
        assert!(SolverParams::default().with_dt(0.0).validate::<2>().is_err());
        assert!(SolverParams::default().with_phases(3).validate::<2>().is_err());
        assert_eq!(SolverParams::default().with_damping(4.0).damping, 1.0);
    }
}
