use mpm_core::config::constants::{FLUID_PHASE, SOLID_PHASE};
use mpm_core::core::{CheckpointHeader, ParticleBase, restore_particle};
use mpm_core::geometry::StructuredGrid;
use mpm_core::math::{Real, Vector};
use mpm_core::registry::EntityArgs;
use mpm_core::{MpmError, MpmState, ParticleSetConfig, Registry, SolverParams};

#[test]
fn restore_through_registry_is_bit_exact() {
    let registry = Registry::with_defaults();
    let coordinates = Vector::<3>::new(0.1 + 0.2, -1.0 / 7.0, 1e-310);
    let mut particle = registry
        .create::<dyn ParticleBase<3>, EntityArgs<3>>("P3D2PHASE", (123_456_789, coordinates))
        .unwrap();
    particle.assign_mass(FLUID_PHASE, Real::MIN_POSITIVE).unwrap();
    particle.assign_velocity(SOLID_PHASE, &[1.0 / 3.0, 2.0 / 3.0, -0.0]).unwrap();
    particle.assign_material_id(4);
    particle.assign_status(false);

    let mut bytes = Vec::new();
    particle.save(&mut bytes).unwrap();
    let restored = restore_particle::<3>(&registry, &mut bytes.as_slice()).unwrap();

    assert_eq!(restored.id(), 123_456_789);
    assert_eq!(restored.particle_type(), "P3D2PHASE");
    for (a, b) in restored.coordinates().iter().zip(coordinates.iter()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
    assert_eq!(restored.mass(FLUID_PHASE).unwrap(), Real::MIN_POSITIVE);
    assert_eq!(
        restored.velocity(SOLID_PHASE).unwrap()[2].to_bits(),
        (-0.0 as Real).to_bits()
    );
    assert_eq!(restored.material_id(), Some(4));
    assert!(!restored.status());
    assert_eq!(restored.record(), particle.record());
}

#[test]
fn state_checkpoint_round_trip() {
    let registry = Registry::with_defaults();
    let grid = StructuredGrid::<2>::new(Vector::<2>::zeros(), Vector::<2>::repeat(1.0), [2, 2]);
    let mesh = grid.build(&registry, "Node2D", "ED2Q4").unwrap();
    let params = SolverParams::default().with_gravity(&[0.0, -9.81]).with_dt(1e-3);
    let mut state = MpmState::new(mesh, params.clone()).unwrap();

    let points = [Vector::<2>::new(0.5, 0.5), Vector::<2>::new(1.5, 1.25)];
    state
        .mesh_mut()
        .create_particles(&registry, &ParticleSetConfig::new("P2D", 2), &points)
        .unwrap();
    for id in 0..2 {
        state.mesh_mut().particle_mut(id).unwrap().assign_mass(SOLID_PHASE, 1.0).unwrap();
    }
    for _ in 0..5 {
        state.step().unwrap();
    }

    let mut bytes = Vec::new();
    state.checkpoint(&mut bytes).unwrap();

    let mesh = grid.build(&registry, "Node2D", "ED2Q4").unwrap();
    let mut restored = MpmState::new(mesh, params).unwrap();
    assert_eq!(restored.restore_particles(&registry, &mut bytes.as_slice()).unwrap(), 2);
    assert_eq!(restored.step_count(), 5);
    assert_eq!(restored.time().to_bits(), state.time().to_bits());

    for (a, b) in state.mesh().particles().zip(restored.mesh().particles()) {
        assert_eq!(a.record(), b.record());
    }

    // Both continue identically.
    state.step().unwrap();
    restored.step().unwrap();
    for (a, b) in state.mesh().particles().zip(restored.mesh().particles()) {
        assert_eq!(a.coordinates(), b.coordinates());
    }
}

#[test]
fn dimension_mismatch_is_rejected() {
    let mut bytes = Vec::new();
    CheckpointHeader::new(3, 0.0, 0, 0).write(&mut bytes).unwrap();

    let registry = Registry::with_defaults();
    let grid = StructuredGrid::<2>::new(Vector::<2>::zeros(), Vector::<2>::repeat(1.0), [1, 1]);
    let mesh = grid.build(&registry, "Node2D", "ED2Q4").unwrap();
    let mut state = MpmState::new(mesh, SolverParams::default()).unwrap();
    assert!(matches!(
        state.restore_particles(&registry, &mut bytes.as_slice()),
        Err(MpmError::Checkpoint(_))
    ));
}
