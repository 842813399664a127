use crate::error::{MpmError, MpmResult};
use crate::loads::LoadFunction;
use crate::math::Real;

/// Piecewise-constant load from a `(time, relative load)` table.
///
/// The entry with the greatest time not after the query time applies.
/// Before the first entry the load is zero.
#[derive(Clone, Debug, PartialEq)]
pub struct StepLoad {
    id: usize,
    table: Vec<(Real, Real)>,
}

impl StepLoad {
    pub fn new(id: usize, mut table: Vec<(Real, Real)>) -> MpmResult<Self> {
        if table.is_empty() {
            return Err(MpmError::config(format!("step load {id} has an empty table")));
        }
        if let Some((time, load)) = table
            .iter()
            .find(|(time, load)| !time.is_finite() || !load.is_finite())
        {
            return Err(MpmError::config(format!(
                "step load {id} has a non-finite entry ({time}, {load})"
            )));
        }
        table.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self { id, table })
    }

    pub fn table(&self) -> &[(Real, Real)] {
        &self.table
    }

    /// Relative load at `time`.
    pub fn factor(&self, time: Real) -> Real {
        match self.table.partition_point(|(t, _)| *t <= time) {
            0 => 0.0,
            n => self.table[n - 1].1,
        }
    }
}

impl LoadFunction for StepLoad {
    fn id(&self) -> usize {
        self.id
    }

    fn value(&self, current_time: Real, magnitude: Real) -> Real {
        magnitude * self.factor(current_time)
    }
}
