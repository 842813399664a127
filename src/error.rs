//! Crate-wide error type.
//!
//! Construction-time variants (`UnknownType`, `InvalidConfig`) abort the
//! affected subsystem. Accessor variants (`InvalidPhase`,
//! `DimensionMismatch`) signal an inconsistency between phase count and
//! accessor usage. `CellAssignment` and `ParticleLost` are per-particle and
//! never abort the other particles of a timestep.

use thiserror::Error;

use crate::math::Index;

pub type MpmResult<T> = Result<T, MpmError>;

#[derive(Error, Debug)]
pub enum MpmError {
    #[error("no `{key}` registered for {base}")]
    UnknownType { base: &'static str, key: String },

    #[error("phase {phase} out of range (phase count {nphases})")]
    InvalidPhase { phase: usize, nphases: usize },

    #[error("size mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("particle {particle} is not inside cell {cell}")]
    CellAssignment { particle: Index, cell: Index },

    #[error("particle {particle} is outside every cell of the mesh")]
    ParticleLost { particle: Index },

    #[error("unknown {kind} id {id}")]
    UnknownEntity { kind: &'static str, id: Index },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("checkpoint: {0}")]
    Checkpoint(String),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MpmError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Errors that must abort the run rather than be isolated per particle.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::CellAssignment { .. } | Self::ParticleLost { .. })
    }
}

/// Phase bounds check shared by particle and node accessors.
#[inline]
pub fn check_phase(phase: usize, nphases: usize) -> MpmResult<()> {
    if phase < nphases {
        Ok(())
    } else {
        Err(MpmError::InvalidPhase { phase, nphases })
    }
}
