use std::f64::consts::TAU;

use crate::loads::LoadFunction;
use crate::math::Real;

/// `magnitude * sin(2 pi f t + phase_shift)`
#[derive(Clone, Debug, PartialEq)]
pub struct SineLoad {
    id: usize,
    frequency: Real,
    phase_shift: Real,
}

impl SineLoad {
    pub fn new(id: usize, frequency: Real, phase_shift: Real) -> Self {
        Self {
            id,
            frequency,
            phase_shift,
        }
    }
}

impl LoadFunction for SineLoad {
    fn id(&self) -> usize {
        self.id
    }

    fn value(&self, current_time: Real, magnitude: Real) -> Real {
        magnitude * (TAU * self.frequency * current_time + self.phase_shift).sin()
    }
}
