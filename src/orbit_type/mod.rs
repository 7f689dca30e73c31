//! # Orbital states and their uncertainty
//!
//! This module defines the data carried through the Monte Carlo pipeline:
//!
//! - [`OrbitalState`](crate::orbit_type::OrbitalState) — one point of the 6-dimensional phase space
//!   (position in AU, velocity in AU/year), heliocentric ecliptic frame.
//! - [`keplerian_element`](crate::orbit_type::keplerian_element) — Classical Keplerian elements
//!   `(a, e, i, Ω, ω, M)` and their conversion to an [`OrbitalState`].
//! - [`uncertainty`](crate::orbit_type::uncertainty) — The [`UncertaintyModel`](crate::orbit_type::uncertainty::UncertaintyModel)
//!   pairing a mean state with its 6×6 covariance.
//!
//! ## Typical workflow
//!
//! ```rust, no_run
//! use neo_impact::orbit_type::keplerian_element::KeplerianElements;
//! use neo_impact::orbit_type::uncertainty::UncertaintyModel;
//!
//! let kep = KeplerianElements {
//!     reference_epoch: 2451545.0,
//!     semi_major_axis: 1.458,
//!     eccentricity: 0.223,
//!     inclination: 10.83_f64.to_radians(),
//!     ascending_node_longitude: 0.0,
//!     periapsis_argument: 0.0,
//!     mean_anomaly: 0.0,
//! };
//!
//! let mean = kep.to_orbital_state().unwrap();
//! let model = UncertaintyModel::isotropic(mean, 0.01).unwrap();
//! ```
use nalgebra::{Vector3, Vector6};

/// Classical Keplerian elements structure and utilities.
pub mod keplerian_element;

/// Mean state + covariance.
pub mod uncertainty;

/// Cartesian state of the object: one point in 6-dimensional phase space.
///
/// Units
/// -----
/// * `position`: AU.
/// * `velocity`: AU per Julian year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalState {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl OrbitalState {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        OrbitalState { position, velocity }
    }

    /// Object at rest at `position`.
    pub fn at_rest(position: Vector3<f64>) -> Self {
        OrbitalState {
            position,
            velocity: Vector3::zeros(),
        }
    }

    /// Stack the state as `[x, y, z, vx, vy, vz]`.
    pub fn to_vector6(&self) -> Vector6<f64> {
        Vector6::new(
            self.position.x,
            self.position.y,
            self.position.z,
            self.velocity.x,
            self.velocity.y,
            self.velocity.z,
        )
    }

    /// Inverse of [`OrbitalState::to_vector6`].
    pub fn from_vector6(v: &Vector6<f64>) -> Self {
        OrbitalState {
            position: Vector3::new(v[0], v[1], v[2]),
            velocity: Vector3::new(v[3], v[4], v[5]),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().chain(self.velocity.iter()).all(|c| c.is_finite())
    }
}

impl From<Vector6<f64>> for OrbitalState {
    fn from(v: Vector6<f64>) -> Self {
        OrbitalState::from_vector6(&v)
    }
}

impl From<&OrbitalState> for Vector6<f64> {
    fn from(s: &OrbitalState) -> Self {
        s.to_vector6()
    }
}
