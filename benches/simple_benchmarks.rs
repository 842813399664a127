/// Simple custom benchmarking without criterion
use std::time::Instant;

use mpm_core::generators::{GaussPointGenerator, PointGenerator};
use mpm_core::geometry::StructuredGrid;
use mpm_core::materials::MaterialProperties;
use mpm_core::math::Vector;
use mpm_core::solver;
use mpm_core::{MpmState, ParticleSetConfig, Registry, SolverParams};

fn time_it<F: FnMut()>(name: &str, iterations: usize, mut f: F) {
    // Warmup
    for _ in 0..5 {
        f();
    }

    let start = Instant::now();
    for _ in 0..iterations {
        f();
    }
    let elapsed = start.elapsed();

    let avg_ms = elapsed.as_secs_f64() * 1000.0 / iterations as f64;
    println!("{}: {:.3}ms avg ({} iterations)", name, avg_ms, iterations);
}

/// Square block of `cells`^2 quads with four particles per cell.
fn create_state(registry: &Registry, cells: usize) -> MpmState<2> {
    let spacing = 1.0 / cells as f64;
    let grid = StructuredGrid::<2>::new(Vector::<2>::zeros(), Vector::<2>::repeat(spacing), [cells, cells]);
    let mut mesh = grid
        .build(registry, "Node2D", "ED2Q4")
        .expect("structured mesh");
    let points = GaussPointGenerator::new(2)
        .generate_points(&mesh)
        .expect("gauss points");
    mesh.create_particles(registry, &ParticleSetConfig::new("P2D", 2).with_material(0), &points)
        .expect("particles");

    let params = SolverParams::default()
        .with_dt(1e-5)
        .with_gravity(&[0.0, -9.81]);
    let mut state = MpmState::new(mesh, params).expect("state");
    state
        .create_material(registry, "LinearElastic2D", 0, MaterialProperties::default())
        .expect("material");
    state.initialise_particles().expect("initialise");
    state
}

fn main() {
    println!("\n=== MPM Benchmarks ===\n");
    let registry = Registry::with_defaults();

    println!("--- Particle Location ---");
    for &cells in &[16, 32, 64] {
        let mut state = create_state(&registry, cells);
        time_it(
            &format!("locate (n={})", state.mesh().nparticles()),
            20,
            || {
                state.locate_particles();
            },
        );
    }

    println!("\n--- Scatter ---");
    for &cells in &[16, 32, 64] {
        let mut state = create_state(&registry, cells);
        let gravity = state.gravity();
        time_it(
            &format!("reset+scatter (n={})", state.mesh().nparticles()),
            20,
            || {
                state.mesh_mut().reset_nodes();
                solver::scatter(state.mesh_mut(), &gravity, 1).expect("scatter");
            },
        );
    }

    println!("\n--- Full Step ---");
    for &cells in &[16, 32, 64] {
        let mut state = create_state(&registry, cells);
        time_it(
            &format!("step (n={})", state.mesh().nparticles()),
            10,
            || {
                state.step().expect("step");
            },
        );
    }

    println!("\n=== Benchmark Complete ===\n");
}
