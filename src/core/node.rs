//! Grid nodes
//!
//! A node carries per-phase accumulators filled by the particle scatter and
//! consumed by the node solve. Nothing here resets itself: the mesh calls
//! [`NodeBase::initialise`] before every scatter pass.

use std::any::Any;

use indexmap::IndexMap;
use nalgebra::{DVector, SMatrix, SVector};

use crate::config::constants::MASS_TOLERANCE;
use crate::error::{MpmError, MpmResult, check_phase};
use crate::math::{Index, Real, Vector};

pub trait NodeBase<const D: usize>: Send + Sync {
    fn id(&self) -> Index;

    fn coordinates(&self) -> Vector<D>;

    /// Degrees of freedom per phase.
    fn dof(&self) -> usize;

    fn nphases(&self) -> usize;

    /// Zero every accumulator and derived quantity. Velocity constraints are
    /// part of the mesh definition and survive.
    fn initialise(&mut self);

    fn assign_mass(&mut self, phase: usize, mass: Real) -> MpmResult<()>;

    fn update_mass(&mut self, phase: usize, mass: Real) -> MpmResult<()>;

    fn mass(&self, phase: usize) -> MpmResult<Real>;

    fn update_momentum(&mut self, phase: usize, momentum: &[Real]) -> MpmResult<()>;

    fn momentum(&self, phase: usize) -> MpmResult<DVector<Real>>;

    fn update_external_force(&mut self, phase: usize, force: &[Real]) -> MpmResult<()>;

    fn external_force(&self, phase: usize) -> MpmResult<DVector<Real>>;

    fn update_internal_force(&mut self, phase: usize, force: &[Real]) -> MpmResult<()>;

    fn internal_force(&self, phase: usize) -> MpmResult<DVector<Real>>;

    fn assign_velocity(&mut self, phase: usize, velocity: &[Real]) -> MpmResult<()>;

    fn velocity(&self, phase: usize) -> MpmResult<DVector<Real>>;

    fn acceleration(&self, phase: usize) -> MpmResult<DVector<Real>>;

    /// Velocity from momentum; massless nodes get zero velocity.
    fn compute_velocity(&mut self, phase: usize) -> MpmResult<()>;

    /// Explicit update `a = f / m`, `v += a * dt` with local damping
    /// `f - damping * |f| * sign(v)` applied per component.
    fn compute_acceleration_velocity(
        &mut self,
        phase: usize,
        dt: Real,
        damping: Real,
    ) -> MpmResult<()>;

    fn assign_velocity_constraint(
        &mut self,
        phase: usize,
        direction: usize,
        velocity: Real,
    ) -> MpmResult<()>;

    /// Fix constrained velocity components and zero their acceleration.
    fn apply_velocity_constraints(&mut self);

    fn as_any(&self) -> &dyn Any;
}

/// Node with `DOF` degrees of freedom for each of `NPHASES` phases.
#[derive(Clone, Debug)]
pub struct Node<const D: usize, const DOF: usize, const NPHASES: usize> {
    id: Index,
    coordinates: Vector<D>,
    mass: SVector<Real, NPHASES>,
    momentum: SMatrix<Real, DOF, NPHASES>,
    velocity: SMatrix<Real, DOF, NPHASES>,
    acceleration: SMatrix<Real, DOF, NPHASES>,
    external_force: SMatrix<Real, DOF, NPHASES>,
    internal_force: SMatrix<Real, DOF, NPHASES>,
    /// (phase, direction) -> prescribed velocity
    velocity_constraints: IndexMap<(usize, usize), Real>,
}

impl<const D: usize, const DOF: usize, const NPHASES: usize> Node<D, DOF, NPHASES> {
    pub fn new(id: Index, coordinates: Vector<D>) -> Self {
        Self {
            id,
            coordinates,
            mass: SVector::zeros(),
            momentum: SMatrix::zeros(),
            velocity: SMatrix::zeros(),
            acceleration: SMatrix::zeros(),
            external_force: SMatrix::zeros(),
            internal_force: SMatrix::zeros(),
            velocity_constraints: IndexMap::new(),
        }
    }

    fn check(phase: usize, values: &[Real]) -> MpmResult<()> {
        check_phase(phase, NPHASES)?;
        if values.len() != DOF {
            return Err(MpmError::DimensionMismatch {
                expected: DOF,
                actual: values.len(),
            });
        }
        Ok(())
    }

    fn column(matrix: &SMatrix<Real, DOF, NPHASES>, phase: usize) -> MpmResult<DVector<Real>> {
        check_phase(phase, NPHASES)?;
        Ok(DVector::from_iterator(DOF, matrix.column(phase).iter().copied()))
    }

    fn accumulate(
        matrix: &mut SMatrix<Real, DOF, NPHASES>,
        phase: usize,
        values: &[Real],
    ) -> MpmResult<()> {
        Self::check(phase, values)?;
        for (dir, value) in values.iter().enumerate() {
            matrix[(dir, phase)] += value;
        }
        Ok(())
    }

    fn apply_phase_constraints(&mut self, phase: usize) {
        for (&(constrained_phase, dir), &value) in &self.velocity_constraints {
            if constrained_phase == phase {
                self.velocity[(dir, phase)] = value;
                self.acceleration[(dir, phase)] = 0.0;
            }
        }
    }
}

impl<const D: usize, const DOF: usize, const NPHASES: usize> NodeBase<D>
    for Node<D, DOF, NPHASES>
{
    fn id(&self) -> Index {
        self.id
    }

    fn coordinates(&self) -> Vector<D> {
        self.coordinates
    }

    fn dof(&self) -> usize {
        DOF
    }

    fn nphases(&self) -> usize {
        NPHASES
    }

    fn initialise(&mut self) {
        self.mass.fill(0.0);
        self.momentum.fill(0.0);
        self.velocity.fill(0.0);
        self.acceleration.fill(0.0);
        self.external_force.fill(0.0);
        self.internal_force.fill(0.0);
    }

    fn assign_mass(&mut self, phase: usize, mass: Real) -> MpmResult<()> {
        check_phase(phase, NPHASES)?;
        self.mass[phase] = mass;
        Ok(())
    }

    fn update_mass(&mut self, phase: usize, mass: Real) -> MpmResult<()> {
        check_phase(phase, NPHASES)?;
        self.mass[phase] += mass;
        Ok(())
    }

    fn mass(&self, phase: usize) -> MpmResult<Real> {
        check_phase(phase, NPHASES)?;
        Ok(self.mass[phase])
    }

    fn update_momentum(&mut self, phase: usize, momentum: &[Real]) -> MpmResult<()> {
        Self::accumulate(&mut self.momentum, phase, momentum)
    }

    fn momentum(&self, phase: usize) -> MpmResult<DVector<Real>> {
        Self::column(&self.momentum, phase)
    }

    fn update_external_force(&mut self, phase: usize, force: &[Real]) -> MpmResult<()> {
        Self::accumulate(&mut self.external_force, phase, force)
    }

    fn external_force(&self, phase: usize) -> MpmResult<DVector<Real>> {
        Self::column(&self.external_force, phase)
    }

    fn update_internal_force(&mut self, phase: usize, force: &[Real]) -> MpmResult<()> {
        Self::accumulate(&mut self.internal_force, phase, force)
    }

    fn internal_force(&self, phase: usize) -> MpmResult<DVector<Real>> {
        Self::column(&self.internal_force, phase)
    }

    fn assign_velocity(&mut self, phase: usize, velocity: &[Real]) -> MpmResult<()> {
        Self::check(phase, velocity)?;
        for (dir, value) in velocity.iter().enumerate() {
            self.velocity[(dir, phase)] = *value;
        }
        Ok(())
    }

    fn velocity(&self, phase: usize) -> MpmResult<DVector<Real>> {
        Self::column(&self.velocity, phase)
    }

    fn acceleration(&self, phase: usize) -> MpmResult<DVector<Real>> {
        Self::column(&self.acceleration, phase)
    }

    fn compute_velocity(&mut self, phase: usize) -> MpmResult<()> {
        check_phase(phase, NPHASES)?;
        let mass = self.mass[phase];
        for dir in 0..DOF {
            self.velocity[(dir, phase)] = if mass > MASS_TOLERANCE {
                self.momentum[(dir, phase)] / mass
            } else {
                0.0
            };
        }
        self.apply_phase_constraints(phase);
        Ok(())
    }

    fn compute_acceleration_velocity(
        &mut self,
        phase: usize,
        dt: Real,
        damping: Real,
    ) -> MpmResult<()> {
        check_phase(phase, NPHASES)?;
        let mass = self.mass[phase];
        if mass > MASS_TOLERANCE {
            for dir in 0..DOF {
                let mut force =
                    self.external_force[(dir, phase)] + self.internal_force[(dir, phase)];
                let velocity = self.velocity[(dir, phase)];
                if velocity != 0.0 {
                    force -= damping * force.abs() * velocity.signum();
                }
                let acceleration = force / mass;
                self.acceleration[(dir, phase)] = acceleration;
                self.velocity[(dir, phase)] = velocity + acceleration * dt;
            }
        } else {
            self.acceleration.column_mut(phase).fill(0.0);
        }
        self.apply_phase_constraints(phase);
        Ok(())
    }

    fn assign_velocity_constraint(
        &mut self,
        phase: usize,
        direction: usize,
        velocity: Real,
    ) -> MpmResult<()> {
        check_phase(phase, NPHASES)?;
        if direction >= DOF {
            return Err(MpmError::DimensionMismatch {
                expected: DOF,
                actual: direction + 1,
            });
        }
        self.velocity_constraints.insert((phase, direction), velocity);
        Ok(())
    }

    fn apply_velocity_constraints(&mut self) {
        for phase in 0..NPHASES {
            self.apply_phase_constraints(phase);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn node() -> Node<2, 2, 2> {
        Node::new(7, Vector::<2>::new(1.0, 2.0))
    }

    #[test]
    fn updates_accumulate_until_initialise() {
        let mut node = node();
        node.update_mass(0, 0.5).unwrap();
        node.update_mass(0, 0.25).unwrap();
        node.update_momentum(1, &[1.0, -1.0]).unwrap();
        node.update_momentum(1, &[1.0, 0.0]).unwrap();

        assert_relative_eq!(node.mass(0).unwrap(), 0.75);
        assert_eq!(node.momentum(1).unwrap().as_slice(), &[2.0, -1.0]);
        assert_eq!(node.momentum(0).unwrap().as_slice(), &[0.0, 0.0]);

        node.initialise();
        assert_eq!(node.mass(0).unwrap(), 0.0);
        assert_eq!(node.momentum(1).unwrap().as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn phase_and_size_are_checked() {
        let mut node = node();
        assert!(matches!(
            node.update_mass(2, 1.0),
            Err(MpmError::InvalidPhase { phase: 2, nphases: 2 })
        ));
        assert!(matches!(
            node.update_momentum(0, &[1.0, 2.0, 3.0]),
            Err(MpmError::DimensionMismatch { expected: 2, actual: 3 })
        ));
        assert!(node.velocity(5).is_err());
    }

    #[test]
    fn massless_node_has_zero_velocity() {
        let mut node = node();
        node.update_momentum(0, &[3.0, 4.0]).unwrap();
        node.compute_velocity(0).unwrap();
        assert_eq!(node.velocity(0).unwrap().as_slice(), &[0.0, 0.0]);

        node.update_mass(0, 2.0).unwrap();
        node.compute_velocity(0).unwrap();
        assert_eq!(node.velocity(0).unwrap().as_slice(), &[1.5, 2.0]);
    }

    #[test]
    fn explicit_update_uses_total_force() {
        let mut node: Node<2, 2, 1> = Node::new(0, Vector::<2>::zeros());
        node.update_mass(0, 2.0).unwrap();
        node.update_external_force(0, &[0.0, -4.0]).unwrap();
        node.update_internal_force(0, &[2.0, 0.0]).unwrap();
        node.compute_acceleration_velocity(0, 0.5, 0.0).unwrap();

        assert_eq!(node.acceleration(0).unwrap().as_slice(), &[1.0, -2.0]);
        assert_eq!(node.velocity(0).unwrap().as_slice(), &[0.5, -1.0]);
    }

    #[test]
    fn damping_opposes_motion() {
        let mut node: Node<2, 2, 1> = Node::new(0, Vector::<2>::zeros());
        node.update_mass(0, 1.0).unwrap();
        node.assign_velocity(0, &[1.0, 0.0]).unwrap();
        node.update_external_force(0, &[2.0, 2.0]).unwrap();
        node.compute_acceleration_velocity(0, 1.0, 0.5).unwrap();

        let acceleration = node.acceleration(0).unwrap();
        assert_relative_eq!(acceleration[0], 1.0);
        // no velocity in y, no damping
        assert_relative_eq!(acceleration[1], 2.0);
    }

    #[test]
    fn constraints_survive_initialise_and_override_solve() {
        let mut node: Node<3, 3, 1> = Node::new(0, Vector::<3>::zeros());
        node.assign_velocity_constraint(0, 2, 0.0).unwrap();
        assert!(node.assign_velocity_constraint(0, 3, 0.0).is_err());

        node.initialise();
        node.update_mass(0, 1.0).unwrap();
        node.update_external_force(0, &[1.0, 1.0, -9.81]).unwrap();
        node.compute_acceleration_velocity(0, 0.1, 0.0).unwrap();

        let velocity = node.velocity(0).unwrap();
        assert_relative_eq!(velocity[0], 0.1);
        assert_eq!(velocity[2], 0.0);
        assert_eq!(node.acceleration(0).unwrap()[2], 0.0);
    }
}
