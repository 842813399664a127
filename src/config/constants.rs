// Numerical constants shared by the entities and the solver.

/// Components of a symmetric tensor in Voigt notation.
pub const VOIGT_SIZE: usize = 6;

/// Upper bound on phases per entity (solid skeleton + pore fluid).
pub const MAX_PHASES: usize = 2;

pub const SOLID_PHASE: usize = 0;
pub const FLUID_PHASE: usize = 1;

/// Nodal masses below this are treated as empty.
pub const MASS_TOLERANCE: f64 = 1e-15;

/// Slack on the reference-element bounds in point-in-cell tests.
pub const LOCAL_COORDINATE_TOLERANCE: f64 = 1e-10;

/// Largest accepted mismatch between a point and the image of its local
/// coordinates, relative to the cell size.
pub const LOCAL_COORDINATE_RESIDUAL: f64 = 1e-11;

/// Step size, in reference units, at which the local-coordinate solve stops.
pub const NEWTON_TOLERANCE: f64 = 1e-12;
pub const NEWTON_MAX_ITERATIONS: usize = 20;

/// Adjacency rings searched around a particle's last cell before falling
/// back to a scan of the whole mesh.
pub const NEIGHBOUR_SEARCH_RINGS: usize = 2;

/// Partition-of-unity tolerance used by consistency checks.
pub const PARTITION_TOLERANCE: f64 = 1e-10;

/// Bumped whenever the particle record layout changes.
pub const CHECKPOINT_VERSION: u32 = 2;
