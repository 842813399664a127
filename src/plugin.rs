//! Bevy integration
//!
//! The timestep phases run as chained systems in `Update`, one timestep per
//! frame, against an [`MpmState`] resource inserted by the caller.

use std::marker::PhantomData;
use std::sync::atomic::Ordering;

use bevy::log::info;
use bevy::prelude::*;

use crate::core::MpmState;
use crate::error::MpmResult;

pub struct MpmPlugin<const D: usize> {
    _dimension: PhantomData<[(); D]>,
}

impl<const D: usize> Default for MpmPlugin<D> {
    fn default() -> Self {
        Self {
            _dimension: PhantomData,
        }
    }
}

impl<const D: usize> Plugin for MpmPlugin<D> {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                locate_particles::<D>,
                reset_nodes::<D>,
                scatter::<D>,
                apply_loads::<D>,
                solve_nodes::<D>,
                gather::<D>,
                finish_step::<D>,
            )
                .chain()
                .run_if(simulation_running::<D>),
        );
    }
}

pub fn simulation_running<const D: usize>(state: Option<Res<MpmState<D>>>) -> bool {
    state.is_some_and(|state| !state.is_halted())
}

/// Run a fallible phase unless an earlier phase of this frame halted.
fn run_stage<const D: usize>(
    state: &mut MpmState<D>,
    stage: impl FnOnce(&mut MpmState<D>) -> MpmResult<()>,
) {
    if state.is_halted() {
        return;
    }
    if let Err(err) = stage(state) {
        state.halt_with(&err);
    }
}

pub fn locate_particles<const D: usize>(mut state: ResMut<MpmState<D>>) {
    if !state.is_halted() {
        state.locate_particles();
    }
}

pub fn reset_nodes<const D: usize>(mut state: ResMut<MpmState<D>>) {
    if !state.is_halted() {
        state.reset_nodes();
    }
}

pub fn scatter<const D: usize>(mut state: ResMut<MpmState<D>>) {
    run_stage(&mut *state, MpmState::scatter);
}

pub fn apply_loads<const D: usize>(mut state: ResMut<MpmState<D>>) {
    run_stage(&mut *state, MpmState::apply_loads);
}

pub fn solve_nodes<const D: usize>(mut state: ResMut<MpmState<D>>) {
    run_stage(&mut *state, MpmState::solve_nodes);
}

pub fn gather<const D: usize>(mut state: ResMut<MpmState<D>>) {
    run_stage(&mut *state, MpmState::gather);
}

/// Close the timestep, then honour a pending cancellation request.
pub fn finish_step<const D: usize>(mut state: ResMut<MpmState<D>>) {
    if state.is_halted() {
        return;
    }
    state.finish_step();
    if state.cancel_flag().load(Ordering::Relaxed) {
        info!("cancelled after step {}", state.step_count());
        state.halt();
    }
}
