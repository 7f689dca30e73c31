//! # Monte Carlo sampling of perturbed initial states
//!
//! Draws independent realizations of the object's initial state from the
//! multivariate Gaussian `N(mean, Σ)` of an [`UncertaintyModel`].
//!
//! Each draw takes six standard-normal deviates `z ~ N(0, I₆)` from the caller's
//! random source and maps them through the covariance square root,
//! `x = mean + L·z`. The random source is injected so runs are reproducible with a
//! seeded generator such as [`rand::rngs::StdRng`].
//!
//! ```rust
//! use nalgebra::{Matrix6, Vector3};
//! use neo_impact::orbit_type::OrbitalState;
//! use neo_impact::state_sampler::sample;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mean = OrbitalState::at_rest(Vector3::new(1.0, 0.0, 0.0));
//! let mut rng = StdRng::seed_from_u64(42);
//! let states = sample(&mean, &(Matrix6::identity() * 1e-4), 16, &mut rng).unwrap();
//! assert_eq!(states.len(), 16);
//! ```
use nalgebra::{Matrix6, Vector6};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::impact_errors::ImpactError;
use crate::orbit_type::uncertainty::UncertaintyModel;
use crate::orbit_type::OrbitalState;

/// Draw `count` independent states from `N(mean, covariance)`.
///
/// Arguments
/// -----------------
/// * `mean`: Mean state.
/// * `covariance`: 6×6 symmetric positive-semidefinite covariance.
/// * `count`: Number of draws, `> 0`.
/// * `rng`: Random source (seed it for reproducible runs).
///
/// Return
/// ----------
/// * `count` states. A zero covariance yields `count` exact copies of `mean`.
/// * [`ImpactError::InvalidCovariance`] or [`ImpactError::InvalidSampleCount`] on invalid inputs,
///   before any draw is made.
pub fn sample(
    mean: &OrbitalState,
    covariance: &Matrix6<f64>,
    count: usize,
    rng: &mut impl Rng,
) -> Result<Vec<OrbitalState>, ImpactError> {
    let model = UncertaintyModel::new(*mean, *covariance)?;
    sample_states(&model, count, rng)
}

/// Draw `count` independent states from a validated [`UncertaintyModel`].
///
/// Draws are consumed from `rng` in sample order, six deviates per sample, so a given seed
/// always produces the same sequence of states.
pub fn sample_states(
    model: &UncertaintyModel,
    count: usize,
    rng: &mut impl Rng,
) -> Result<Vec<OrbitalState>, ImpactError> {
    if count == 0 {
        return Err(ImpactError::InvalidSampleCount(count));
    }

    Ok((0..count).map(|_| draw_state(model, &mut *rng)).collect())
}

/// One draw `mean + L·z`.
#[inline]
pub fn draw_state(model: &UncertaintyModel, rng: &mut impl Rng) -> OrbitalState {
    let z = Vector6::from_fn(|_, _| rng.sample::<f64, _>(StandardNormal));
    model.draw_from_standard_normal(&z)
}
