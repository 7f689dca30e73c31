//! # Impact events
//!
//! An [`ImpactEvent`] is a weighted point on the surface of the reference body: the
//! sub-object point at a time step where a sampled trajectory came closer to the body
//! than the detection threshold. Its weight is the probability mass carried by the
//! sample (`1 / N` for uniform Monte Carlo weighting).
//!
//! Submodules
//! -----------------
//! * [`detector`] – Scan one trajectory against the body's position table.
//! * [`aggregator`] – Flatten the per-sample event lists into one weighted point set.
//! * [`validation`] – Compare predicted impacts with a recorded historical impact.
use std::fmt;

use crate::constants::Degree;

pub mod aggregator;
pub mod detector;
pub mod validation;

/// Weighted impact location.
///
/// Fields
/// -----------------
/// * `latitude`: Degrees, in [-90, 90].
/// * `longitude`: Degrees, in (-180, 180].
/// * `weight`: Probability mass of the event, `≥ 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactEvent {
    pub latitude: Degree,
    pub longitude: Degree,
    pub weight: f64,
}

impl ImpactEvent {
    pub fn new(latitude: Degree, longitude: Degree, weight: f64) -> Self {
        ImpactEvent {
            latitude,
            longitude,
            weight,
        }
    }
}

impl fmt::Display for ImpactEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lat={:+.4}°, lon={:+.4}°, w={:.6}",
            self.latitude, self.longitude, self.weight
        )
    }
}

/// How many events a single trajectory may contribute.
///
/// * `FirstCrossing` – stop scanning at the first step under the threshold; a sample impacts
///   at most once and the total weight of a run never exceeds 1.
/// * `AllCrossings` – record every step under the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionPolicy {
    #[default]
    FirstCrossing,
    AllCrossings,
}

impl fmt::Display for DetectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionPolicy::FirstCrossing => write!(f, "first-crossing"),
            DetectionPolicy::AllCrossings => write!(f, "all-crossings"),
        }
    }
}
