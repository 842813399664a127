//! Time-varying boundary magnitudes
//!
//! A [`LoadFunction`] scales a base magnitude by a function of time. It is
//! queried once per timestep for every boundary entity it drives.

use std::sync::Arc;

use crate::core::NodeBase;
use crate::error::{MpmError, MpmResult, check_phase};
use crate::math::{Index, Real};

pub mod sine_load;
pub mod step_load;

pub use sine_load::SineLoad;
pub use step_load::StepLoad;

pub trait LoadFunction: Send + Sync {
    fn id(&self) -> usize;

    /// Magnitude at `current_time` for a base `magnitude`.
    fn value(&self, current_time: Real, magnitude: Real) -> Real;
}

/// Constructor parameters for the built-in load functions. Each variant
/// reads only the fields it needs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadProperties {
    /// `(time, relative load)` pairs for `StepLoad`
    pub table: Vec<(Real, Real)>,
    pub frequency: Real,
    pub phase_shift: Real,
}

impl LoadProperties {
    pub fn step(table: &[(Real, Real)]) -> Self {
        Self {
            table: table.to_vec(),
            ..Self::default()
        }
    }

    pub fn sine(frequency: Real, phase_shift: Real) -> Self {
        Self {
            frequency,
            phase_shift,
            ..Self::default()
        }
    }
}

/// Point force on one node component, scaled over time.
#[derive(Clone)]
pub struct NodalLoad {
    pub node: Index,
    pub phase: usize,
    pub direction: usize,
    pub magnitude: Real,
    pub function: Arc<dyn LoadFunction>,
}

impl NodalLoad {
    pub fn new(
        node: Index,
        phase: usize,
        direction: usize,
        magnitude: Real,
        function: Arc<dyn LoadFunction>,
    ) -> Self {
        Self {
            node,
            phase,
            direction,
            magnitude,
            function,
        }
    }

    /// Add the force at `time` to the node's external force.
    pub fn apply<const D: usize>(&self, node: &mut dyn NodeBase<D>, time: Real) -> MpmResult<()> {
        check_phase(self.phase, node.nphases())?;
        let dof = node.dof();
        if self.direction >= dof {
            return Err(MpmError::DimensionMismatch {
                expected: dof,
                actual: self.direction + 1,
            });
        }
        let mut force = vec![0.0; dof];
        force[self.direction] = self.function.value(time, self.magnitude);
        node.update_external_force(self.phase, &force)
    }
}

impl std::fmt::Debug for NodalLoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodalLoad")
            .field("node", &self.node)
            .field("phase", &self.phase)
            .field("direction", &self.direction)
            .field("magnitude", &self.magnitude)
            .field("function", &self.function.id())
            .finish()
    }
}
