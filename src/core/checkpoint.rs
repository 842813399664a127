//! Versioned binary checkpoint records
//!
//! A checkpoint is a [`CheckpointHeader`] followed by one [`ParticleRecord`]
//! per particle, each encoded with bincode's standard configuration. Floats
//! are written as raw IEEE bits, so restored values are bit-for-bit equal.

use std::io::{Read, Write};

use bincode::{Decode, Encode};

use crate::config::constants::CHECKPOINT_VERSION;
use crate::core::particle::ParticleBase;
use crate::error::{MpmError, MpmResult};
use crate::math::{Index, Real, Vector, vector_from_slice};
use crate::registry::{EntityStatusArgs, Registry};

#[derive(Clone, Debug, PartialEq, Encode, Decode)]
pub struct CheckpointHeader {
    pub version: u32,
    pub dimension: u32,
    pub time: Real,
    pub step: u64,
    pub nparticles: u64,
}

impl CheckpointHeader {
    pub fn new(dimension: usize, time: Real, step: u64, nparticles: usize) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            dimension: dimension as u32,
            time,
            step,
            nparticles: nparticles as u64,
        }
    }

    pub fn write(&self, sink: &mut dyn Write) -> MpmResult<()> {
        encode(self, sink)
    }

    pub fn read(source: &mut dyn Read) -> MpmResult<Self> {
        let header: Self = decode(source)?;
        check_version(header.version)?;
        Ok(header)
    }
}

/// Full state of one particle. Per-phase matrices are stored column-major,
/// one column per phase.
#[derive(Clone, Debug, PartialEq, Encode, Decode)]
pub struct ParticleRecord {
    pub version: u32,
    pub particle_type: String,
    pub id: Index,
    pub coordinates: Vec<Real>,
    pub status: bool,
    pub cell: Option<Index>,
    pub local_coordinates: Vec<Real>,
    pub volume: Real,
    pub material_id: Option<u64>,
    pub mass: Vec<Real>,
    pub stress: Vec<Real>,
    pub velocity: Vec<Real>,
    pub momentum: Vec<Real>,
    pub acceleration: Vec<Real>,
    pub strain: Vec<Real>,
    pub strain_rate: Vec<Real>,
    pub strain_increment: Vec<Real>,
}

impl Default for ParticleRecord {
    fn default() -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            particle_type: String::new(),
            id: 0,
            coordinates: Vec::new(),
            status: true,
            cell: None,
            local_coordinates: Vec::new(),
            volume: 0.0,
            material_id: None,
            mass: Vec::new(),
            stress: Vec::new(),
            velocity: Vec::new(),
            momentum: Vec::new(),
            acceleration: Vec::new(),
            strain: Vec::new(),
            strain_rate: Vec::new(),
            strain_increment: Vec::new(),
        }
    }
}

impl ParticleRecord {
    pub fn write(&self, sink: &mut dyn Write) -> MpmResult<()> {
        encode(self, sink)
    }

    pub fn read(source: &mut dyn Read) -> MpmResult<Self> {
        let record: Self = decode(source)?;
        check_version(record.version)?;
        Ok(record)
    }
}

/// Read one record and rebuild the particle through the registry, using the
/// stored type key.
pub fn restore_particle<const D: usize>(
    registry: &Registry,
    source: &mut dyn Read,
) -> MpmResult<Box<dyn ParticleBase<D>>> {
    let record = ParticleRecord::read(source)?;
    let coordinates: Vector<D> = vector_from_slice::<D>(&record.coordinates)?;
    let mut particle = registry.create::<dyn ParticleBase<D>, EntityStatusArgs<D>>(
        &record.particle_type,
        (record.id, coordinates, record.status),
    )?;
    particle.load(&record)?;
    Ok(particle)
}

fn encode<T: Encode>(value: &T, mut sink: &mut dyn Write) -> MpmResult<()> {
    bincode::encode_into_std_write(value, &mut sink, bincode::config::standard())
        .map(|_| ())
        .map_err(|e| MpmError::Checkpoint(e.to_string()))
}

fn decode<T: Decode<()>>(mut source: &mut dyn Read) -> MpmResult<T> {
    bincode::decode_from_std_read(&mut source, bincode::config::standard())
        .map_err(|e| MpmError::Checkpoint(e.to_string()))
}

fn check_version(version: u32) -> MpmResult<()> {
    if version == CHECKPOINT_VERSION {
        Ok(())
    } else {
        Err(MpmError::Checkpoint(format!(
            "unsupported format version {version} (expected {CHECKPOINT_VERSION})"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip() {
        let header = CheckpointHeader::new(3, 0.25, 10, 42);
        let mut bytes = Vec::new();
        header.write(&mut bytes).unwrap();
        assert_eq!(CheckpointHeader::read(&mut bytes.as_slice()).unwrap(), header);
    }

    #[test]
    fn unknown_version_is_rejected() {
        let record = ParticleRecord {
            version: CHECKPOINT_VERSION + 1,
            ..ParticleRecord::default()
        };
        let mut bytes = Vec::new();
        record.write(&mut bytes).unwrap();
        assert!(matches!(
            ParticleRecord::read(&mut bytes.as_slice()),
            Err(MpmError::Checkpoint(_))
        ));
    }

    #[test]
    fn truncated_stream_is_an_error() {
        let mut bytes = Vec::new();
        ParticleRecord::default().write(&mut bytes).unwrap();
        bytes.truncate(bytes.len() / 2);
        assert!(ParticleRecord::read(&mut bytes.as_slice()).is_err());
    }
}
