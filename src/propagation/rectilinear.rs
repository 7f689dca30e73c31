//! Constant-velocity (rectilinear) extrapolation.
//!
//! `r(t) = r₀ + v · (t − t₀)`, with `t − t₀` expressed in Julian years to match the
//! AU/year velocity unit of [`OrbitalState`]. No gravity, no perturbations.
use crate::orbit_type::OrbitalState;
use crate::propagation::{Propagator, Trajectory};
use crate::time::TimeGrid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RectilinearPropagator;

impl Propagator for RectilinearPropagator {
    fn propagate(&self, state: &OrbitalState, times: &TimeGrid) -> Trajectory {
        let positions = times
            .steps()
            .iter()
            .map(|&t| state.position + state.velocity * times.years_since_epoch(t))
            .collect();
        Trajectory::new(positions)
    }
}
