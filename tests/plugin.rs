use std::sync::atomic::Ordering;

use bevy::prelude::*;
use mpm_core::config::constants::SOLID_PHASE;
use mpm_core::core::ParticleBase;
use mpm_core::geometry::StructuredGrid;
use mpm_core::math::Vector;
use mpm_core::{MpmPlugin, MpmState, ParticleSetConfig, Registry, SolverParams};

fn app_with_state() -> App {
    let registry = Registry::with_defaults();
    let grid = StructuredGrid::<2>::new(Vector::<2>::zeros(), Vector::<2>::repeat(1.0), [2, 2]);
    let mut mesh = grid.build(&registry, "Node2D", "ED2Q4").unwrap();
    mesh.create_particles(
        &registry,
        &ParticleSetConfig::new("P2D", 2),
        &[Vector::<2>::new(1.0, 1.5)],
    )
    .unwrap();
    mesh.particle_mut(0)
        .unwrap()
        .assign_mass(SOLID_PHASE, 1.0)
        .unwrap();

    let params = SolverParams::default().with_dt(0.01).with_gravity(&[0.0, -1.0]);
    let mut app = App::new();
    app.insert_resource(MpmState::new(mesh, params).unwrap())
        .add_plugins(MpmPlugin::<2>::default());
    app
}

#[test]
fn one_step_per_update() {
    let mut app = app_with_state();
    app.update();
    app.update();
    app.update();

    let state = app.world().resource::<MpmState<2>>();
    assert_eq!(state.step_count(), 3);
    let velocity = state.mesh().particle(0).unwrap().velocity(SOLID_PHASE).unwrap();
    approx::assert_relative_eq!(velocity[1], -0.03, max_relative = 1e-12);
}

#[test]
fn cancellation_halts_after_the_current_step() {
    let mut app = app_with_state();
    app.update();
    app.world()
        .resource::<MpmState<2>>()
        .cancel_flag()
        .store(true, Ordering::Relaxed);
    app.update();
    app.update();

    let state = app.world().resource::<MpmState<2>>();
    assert_eq!(state.step_count(), 2);
    assert!(state.is_halted());
}

#[test]
fn missing_state_is_ignored() {
    let mut app = App::new();
    app.add_plugins(MpmPlugin::<3>::default());
    app.update();
    assert!(app.world().get_resource::<MpmState<3>>().is_none());
}
