//! Material points
//!
//! A particle stores its own state and nothing else: momentum is never
//! derived from mass and velocity here, the solver keeps them consistent.

use std::any::Any;
use std::io::{Read, Write};

use nalgebra::{SMatrix, SVector};

use crate::config::constants::{SOLID_PHASE, VOIGT_SIZE};
use crate::core::cell::Cell;
use crate::core::checkpoint::ParticleRecord;
use crate::error::{MpmError, MpmResult, check_phase};
use crate::materials::Material;
use crate::math::{Index, Real, Vector, Voigt, vector_from_slice, zero_voigt};

pub trait ParticleBase<const D: usize>: Send + Sync {
    fn id(&self) -> Index;

    fn coordinates(&self) -> Vector<D>;

    fn assign_coordinates(&mut self, coordinates: Vector<D>);

    fn nphases(&self) -> usize;

    /// Registry key of the concrete variant.
    fn particle_type(&self) -> String;

    /// `false` once the particle has been logically removed.
    fn status(&self) -> bool;

    fn assign_status(&mut self, status: bool);

    /// Containing cell, `None` while unassigned.
    fn cell_id(&self) -> Option<Index>;

    /// Local coordinates in the containing cell, cached by `assign_cell`.
    fn local_coordinates(&self) -> Vector<D>;

    /// Bind to `cell` if the particle lies inside it. On `false` the previous
    /// binding is left untouched.
    fn assign_cell(&mut self, cell: &Cell<D>) -> bool;

    fn remove_cell(&mut self);

    /// Zero all per-phase state. Identity, position, status and cell binding
    /// are kept.
    fn initialise(&mut self);

    fn volume(&self) -> Real;

    fn assign_volume(&mut self, volume: Real);

    fn material_id(&self) -> Option<usize>;

    fn assign_material_id(&mut self, material_id: usize);

    fn mass(&self, phase: usize) -> MpmResult<Real>;

    fn assign_mass(&mut self, phase: usize, mass: Real) -> MpmResult<()>;

    fn stress(&self, phase: usize) -> MpmResult<Voigt>;

    fn assign_stress(&mut self, phase: usize, stress: &[Real]) -> MpmResult<()>;

    fn velocity(&self, phase: usize) -> MpmResult<Vector<D>>;

    fn assign_velocity(&mut self, phase: usize, velocity: &[Real]) -> MpmResult<()>;

    fn momentum(&self, phase: usize) -> MpmResult<Vector<D>>;

    fn assign_momentum(&mut self, phase: usize, momentum: &[Real]) -> MpmResult<()>;

    fn acceleration(&self, phase: usize) -> MpmResult<Vector<D>>;

    fn assign_acceleration(&mut self, phase: usize, acceleration: &[Real]) -> MpmResult<()>;

    /// Accumulated strain of the solid phase, engineering shear.
    fn strain(&self) -> Voigt;

    fn strain_rate(&self) -> Voigt;

    /// Store `rate` and integrate it over `dt`.
    fn compute_strain(&mut self, rate: Voigt, dt: Real);

    /// Update the solid stress with the increment of the last
    /// `compute_strain` call.
    fn compute_stress(&mut self, material: &dyn Material<D>) -> MpmResult<()>;

    /// `x += v_solid * dt`
    fn compute_updated_position(&mut self, dt: Real);

    fn record(&self) -> ParticleRecord;

    /// Overwrite the state with `record`. Identity and type must match.
    fn load(&mut self, record: &ParticleRecord) -> MpmResult<()>;

    fn save(&self, sink: &mut dyn Write) -> MpmResult<()> {
        self.record().write(sink)
    }

    fn as_any(&self) -> &dyn Any;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle<const D: usize, const NPHASES: usize> {
    id: Index,
    coordinates: Vector<D>,
    status: bool,
    cell: Option<Index>,
    local_coordinates: Vector<D>,
    volume: Real,
    material_id: Option<usize>,
    mass: SVector<Real, NPHASES>,
    stress: SMatrix<Real, VOIGT_SIZE, NPHASES>,
    velocity: SMatrix<Real, D, NPHASES>,
    momentum: SMatrix<Real, D, NPHASES>,
    acceleration: SMatrix<Real, D, NPHASES>,
    strain: Voigt,
    strain_rate: Voigt,
    dstrain: Voigt,
}

impl<const D: usize, const NPHASES: usize> Particle<D, NPHASES> {
    pub fn new(id: Index, coordinates: Vector<D>) -> Self {
        Self::with_status(id, coordinates, true)
    }

    pub fn with_status(id: Index, coordinates: Vector<D>, status: bool) -> Self {
        Self {
            id,
            coordinates,
            status,
            cell: None,
            local_coordinates: Vector::<D>::zeros(),
            volume: 0.0,
            material_id: None,
            mass: SVector::zeros(),
            stress: SMatrix::zeros(),
            velocity: SMatrix::zeros(),
            momentum: SMatrix::zeros(),
            acceleration: SMatrix::zeros(),
            strain: zero_voigt(),
            strain_rate: zero_voigt(),
            dstrain: zero_voigt(),
        }
    }

    /// Read one record written by [`ParticleBase::save`].
    pub fn restore(source: &mut dyn Read) -> MpmResult<Self> {
        let record = ParticleRecord::read(source)?;
        let coordinates = vector_from_slice::<D>(&record.coordinates)?;
        let mut particle = Self::new(record.id, coordinates);
        particle.load(&record)?;
        Ok(particle)
    }

    fn assign_column<const R: usize>(
        matrix: &mut SMatrix<Real, R, NPHASES>,
        phase: usize,
        values: &[Real],
    ) -> MpmResult<()> {
        check_phase(phase, NPHASES)?;
        let column = vector_from_slice::<R>(values)?;
        matrix.set_column(phase, &column);
        Ok(())
    }

    fn column<const R: usize>(
        matrix: &SMatrix<Real, R, NPHASES>,
        phase: usize,
    ) -> MpmResult<SVector<Real, R>> {
        check_phase(phase, NPHASES)?;
        Ok(matrix.column(phase).into_owned())
    }

    fn load_matrix<const R: usize>(
        matrix: &mut SMatrix<Real, R, NPHASES>,
        values: &[Real],
    ) -> MpmResult<()> {
        if values.len() != R * NPHASES {
            return Err(MpmError::DimensionMismatch {
                expected: R * NPHASES,
                actual: values.len(),
            });
        }
        matrix.copy_from_slice(values);
        Ok(())
    }
}

impl<const D: usize, const NPHASES: usize> ParticleBase<D> for Particle<D, NPHASES> {
    fn id(&self) -> Index {
        self.id
    }

    fn coordinates(&self) -> Vector<D> {
        self.coordinates
    }

    fn assign_coordinates(&mut self, coordinates: Vector<D>) {
        self.coordinates = coordinates;
    }

    fn nphases(&self) -> usize {
        NPHASES
    }

    fn particle_type(&self) -> String {
        if NPHASES == 1 {
            format!("P{D}D")
        } else {
            format!("P{D}D{NPHASES}PHASE")
        }
    }

    fn status(&self) -> bool {
        self.status
    }

    fn assign_status(&mut self, status: bool) {
        self.status = status;
    }

    fn cell_id(&self) -> Option<Index> {
        self.cell
    }

    fn local_coordinates(&self) -> Vector<D> {
        self.local_coordinates
    }

    fn assign_cell(&mut self, cell: &Cell<D>) -> bool {
        match cell.contained_local_coordinates(&self.coordinates) {
            Some(xi) => {
                self.cell = Some(cell.id());
                self.local_coordinates = xi;
                true
            }
            None => false,
        }
    }

    fn remove_cell(&mut self) {
        self.cell = None;
        self.local_coordinates = Vector::<D>::zeros();
    }

    fn initialise(&mut self) {
        self.volume = 0.0;
        self.mass.fill(0.0);
        self.stress.fill(0.0);
        self.velocity.fill(0.0);
        self.momentum.fill(0.0);
        self.acceleration.fill(0.0);
        self.strain = zero_voigt();
        self.strain_rate = zero_voigt();
        self.dstrain = zero_voigt();
    }

    fn volume(&self) -> Real {
        self.volume
    }

    fn assign_volume(&mut self, volume: Real) {
        self.volume = volume;
    }

    fn material_id(&self) -> Option<usize> {
        self.material_id
    }

    fn assign_material_id(&mut self, material_id: usize) {
        self.material_id = Some(material_id);
    }

    fn mass(&self, phase: usize) -> MpmResult<Real> {
        check_phase(phase, NPHASES)?;
        Ok(self.mass[phase])
    }

    fn assign_mass(&mut self, phase: usize, mass: Real) -> MpmResult<()> {
        check_phase(phase, NPHASES)?;
        self.mass[phase] = mass;
        Ok(())
    }

    fn stress(&self, phase: usize) -> MpmResult<Voigt> {
        Self::column(&self.stress, phase)
    }

    fn assign_stress(&mut self, phase: usize, stress: &[Real]) -> MpmResult<()> {
        Self::assign_column(&mut self.stress, phase, stress)
    }

    fn velocity(&self, phase: usize) -> MpmResult<Vector<D>> {
        Self::column(&self.velocity, phase)
    }

    fn assign_velocity(&mut self, phase: usize, velocity: &[Real]) -> MpmResult<()> {
        Self::assign_column(&mut self.velocity, phase, velocity)
    }

    fn momentum(&self, phase: usize) -> MpmResult<Vector<D>> {
        Self::column(&self.momentum, phase)
    }

    fn assign_momentum(&mut self, phase: usize, momentum: &[Real]) -> MpmResult<()> {
        Self::assign_column(&mut self.momentum, phase, momentum)
    }

    fn acceleration(&self, phase: usize) -> MpmResult<Vector<D>> {
        Self::column(&self.acceleration, phase)
    }

    fn assign_acceleration(&mut self, phase: usize, acceleration: &[Real]) -> MpmResult<()> {
        Self::assign_column(&mut self.acceleration, phase, acceleration)
    }

    fn strain(&self) -> Voigt {
        self.strain
    }

    fn strain_rate(&self) -> Voigt {
        self.strain_rate
    }

    fn compute_strain(&mut self, rate: Voigt, dt: Real) {
        self.strain_rate = rate;
        self.dstrain = rate * dt;
        self.strain += self.dstrain;
    }

    fn compute_stress(&mut self, material: &dyn Material<D>) -> MpmResult<()> {
        let stress = Self::column(&self.stress, SOLID_PHASE)?;
        let updated = material.compute_stress(&stress, &self.dstrain);
        self.stress.set_column(SOLID_PHASE, &updated);
        Ok(())
    }

    fn compute_updated_position(&mut self, dt: Real) {
        let velocity = self.velocity.column(SOLID_PHASE).into_owned();
        self.coordinates += velocity * dt;
    }

    fn record(&self) -> ParticleRecord {
        ParticleRecord {
            particle_type: self.particle_type(),
            id: self.id,
            coordinates: self.coordinates.as_slice().to_vec(),
            status: self.status,
            cell: self.cell,
            local_coordinates: self.local_coordinates.as_slice().to_vec(),
            volume: self.volume,
            material_id: self.material_id.map(|id| id as u64),
            mass: self.mass.as_slice().to_vec(),
            stress: self.stress.as_slice().to_vec(),
            velocity: self.velocity.as_slice().to_vec(),
            momentum: self.momentum.as_slice().to_vec(),
            acceleration: self.acceleration.as_slice().to_vec(),
            strain: self.strain.as_slice().to_vec(),
            strain_rate: self.strain_rate.as_slice().to_vec(),
            strain_increment: self.dstrain.as_slice().to_vec(),
            ..ParticleRecord::default()
        }
    }

    fn load(&mut self, record: &ParticleRecord) -> MpmResult<()> {
        let particle_type = self.particle_type();
        if record.particle_type != particle_type {
            return Err(MpmError::Checkpoint(format!(
                "record of type `{}` loaded into a `{}` particle",
                record.particle_type, particle_type
            )));
        }
        if record.id != self.id {
            return Err(MpmError::Checkpoint(format!(
                "record of particle {} loaded into particle {}",
                record.id, self.id
            )));
        }
        self.coordinates = vector_from_slice::<D>(&record.coordinates)?;
        self.local_coordinates = vector_from_slice::<D>(&record.local_coordinates)?;
        self.status = record.status;
        self.cell = record.cell;
        self.volume = record.volume;
        self.material_id = record.material_id.map(|id| id as usize);
        self.mass = vector_from_slice::<NPHASES>(&record.mass)?;
        Self::load_matrix(&mut self.stress, &record.stress)?;
        Self::load_matrix(&mut self.velocity, &record.velocity)?;
        Self::load_matrix(&mut self.momentum, &record.momentum)?;
        Self::load_matrix(&mut self.acceleration, &record.acceleration)?;
        self.strain = vector_from_slice::<VOIGT_SIZE>(&record.strain)?;
        self.strain_rate = vector_from_slice::<VOIGT_SIZE>(&record.strain_rate)?;
        self.dstrain = vector_from_slice::<VOIGT_SIZE>(&record.strain_increment)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
