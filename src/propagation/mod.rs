//! # Trajectory propagation
//!
//! A [`Propagator`] advances one sampled [`OrbitalState`] across a shared [`TimeGrid`] and
//! returns the object's [`Trajectory`]: one position per grid node **after** the epoch
//! (the epoch itself is the initial state and is not re-emitted).
//!
//! The motion model lives behind the trait so the pipeline does not depend on it.
//! The crate ships [`RectilinearPropagator`](crate::propagation::rectilinear::RectilinearPropagator),
//! a constant-velocity extrapolation with no gravitational dynamics.
//!
//! ## See also
//! ------------
//! * [`ImpactDetector`](crate::impact::detector) – Consumes trajectories against a reference body.
//! * [`TimeGrid`] – Shared, read-only time nodes of a run.
use nalgebra::Vector3;

use crate::orbit_type::OrbitalState;
use crate::time::TimeGrid;

pub mod rectilinear;

/// Motion model turning an initial state into a position history.
///
/// Implementations must be deterministic (no randomness) and `Sync`, as one propagator is
/// shared by every worker of a Monte Carlo batch.
pub trait Propagator: Sync {
    /// Propagate `state`, defined at `times.epoch()`, over `times.steps()`.
    ///
    /// Return
    /// ----------
    /// * A trajectory with exactly `times.len() - 1` positions.
    fn propagate(&self, state: &OrbitalState, times: &TimeGrid) -> Trajectory;
}

/// Position history of one sample, aligned with `TimeGrid::steps()`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    positions: Vec<Vector3<f64>>,
}

impl Trajectory {
    pub fn new(positions: Vec<Vector3<f64>>) -> Self {
        Trajectory { positions }
    }

    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vector3<f64>> {
        self.positions.iter()
    }

    /// `true` when every coordinate of every position is finite.
    pub fn is_finite(&self) -> bool {
        self.positions
            .iter()
            .all(|p| p.iter().all(|c| c.is_finite()))
    }

    pub fn into_positions(self) -> Vec<Vector3<f64>> {
        self.positions
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Vector3<f64>;
    type IntoIter = std::slice::Iter<'a, Vector3<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.iter()
    }
}
