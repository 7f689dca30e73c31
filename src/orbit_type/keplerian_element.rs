//! # Keplerian orbital elements
//!
//! This module defines the [`crate::orbit_type::keplerian_element::KeplerianElements`] struct
//! and its conversion to a heliocentric Cartesian [`OrbitalState`], which is how the mean
//! state of a Monte Carlo run is obtained from the orbit record of a near-Earth object.
//!
//! ## What are Keplerian elements?
//!
//! The six Keplerian elements are:
//!
//! 1. **a** – Semi-major axis (AU)
//! 2. **e** – Eccentricity (unitless)
//! 3. **i** – Inclination (radians)
//! 4. **Ω** – Longitude of ascending node (radians)
//! 5. **ω** – Argument of periapsis (radians)
//! 6. **M** – Mean anomaly at epoch (radians)
//!
//! Together with the epoch of reference (Julian Date), these parameters fully describe
//! an orbit under the two-body approximation.
//!
//! ## Units
//!
//! - Lengths: **AU**
//! - Angles: **radians**
//! - Output velocity: **AU per Julian year**
//!
//! Only elliptic orbits (`0 ≤ e < 1`, `a > 0`) can be converted.
//!
//! ## See also
//!
//! - [`solve_kepler_equation`](crate::kepler::solve_kepler_equation) – eccentric anomaly from M.
//! - Milani & Gronchi, *Theory of Orbit Determination* (2010).

use nalgebra::{Rotation3, Vector3};
use std::fmt;

use crate::constants::{DAYS_PER_JULIAN_YEAR, GAUSS_GRAV_SQUARED};
use crate::impact_errors::ImpactError;
use crate::kepler::solve_kepler_equation;
use crate::orbit_type::OrbitalState;

/// Keplerian orbital elements (osculating, two-body).
///
/// Units
/// -----
/// * `reference_epoch`: JD (Julian Date).
/// * `semi_major_axis`: Astronomical Units (AU).
/// * `eccentricity`: unitless.
/// * `inclination`: radians.
/// * `ascending_node_longitude`: radians (Ω).
/// * `periapsis_argument`: radians (ω).
/// * `mean_anomaly`: radians (M).
#[derive(Debug, PartialEq, Clone)]
pub struct KeplerianElements {
    pub reference_epoch: f64,
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub ascending_node_longitude: f64,
    pub periapsis_argument: f64,
    pub mean_anomaly: f64,
}

impl KeplerianElements {
    /// Convert the elements to a heliocentric ecliptic Cartesian state.
    ///
    /// The eccentric anomaly is obtained from Kepler's equation, the state is built in the
    /// perifocal frame, then rotated by `R3(Ω)·R1(i)·R3(ω)`.
    ///
    /// Return
    /// ----------
    /// * The [`OrbitalState`] at `reference_epoch` (AU, AU/year), or
    ///   [`ImpactError::InvalidOrbitalElements`] for non-elliptic or non-finite elements.
    pub fn to_orbital_state(&self) -> Result<OrbitalState, ImpactError> {
        let a = self.semi_major_axis;
        let e = self.eccentricity;

        if !(a.is_finite() && a > 0.0) {
            return Err(ImpactError::InvalidOrbitalElements(format!(
                "semi-major axis must be finite and > 0, got {a}"
            )));
        }
        if !(e.is_finite() && (0.0..1.0).contains(&e)) {
            return Err(ImpactError::InvalidOrbitalElements(format!(
                "eccentricity must lie in [0, 1), got {e}"
            )));
        }
        if ![
            self.inclination,
            self.ascending_node_longitude,
            self.periapsis_argument,
            self.mean_anomaly,
        ]
        .iter()
        .all(|x| x.is_finite())
        {
            return Err(ImpactError::InvalidOrbitalElements(
                "angular elements must be finite".into(),
            ));
        }

        let ecc_anomaly = solve_kepler_equation(self.mean_anomaly, e)?;
        let (sin_e, cos_e) = ecc_anomaly.sin_cos();
        let beta = (1.0 - e * e).sqrt();

        // Mean motion in rad/day
        let n = (GAUSS_GRAV_SQUARED / a.powi(3)).sqrt();

        let pos_pf = Vector3::new(a * (cos_e - e), a * beta * sin_e, 0.0);
        let rdot = a * n / (1.0 - e * cos_e);
        let vel_pf = Vector3::new(-rdot * sin_e, rdot * beta * cos_e, 0.0);

        let rot = Rotation3::from_axis_angle(&Vector3::z_axis(), self.ascending_node_longitude)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), self.inclination)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), self.periapsis_argument);

        Ok(OrbitalState::new(
            rot * pos_pf,
            rot * vel_pf * DAYS_PER_JULIAN_YEAR,
        ))
    }
}

impl fmt::Display for KeplerianElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rad_to_deg = 180.0 / std::f64::consts::PI;
        writeln!(
            f,
            "Keplerian Elements @ epoch (JD): {:.6}",
            self.reference_epoch
        )?;
        writeln!(f, "-------------------------------------------")?;
        writeln!(
            f,
            "  a   (semi-major axis)       = {:.6} AU",
            self.semi_major_axis
        )?;
        writeln!(
            f,
            "  e   (eccentricity)          = {:.6}",
            self.eccentricity
        )?;
        writeln!(
            f,
            "  i   (inclination)           = {:.6} rad ({:.6}°)",
            self.inclination,
            self.inclination * rad_to_deg
        )?;
        writeln!(
            f,
            "  Ω   (longitude of node)     = {:.6} rad ({:.6}°)",
            self.ascending_node_longitude,
            self.ascending_node_longitude * rad_to_deg
        )?;
        writeln!(
            f,
            "  ω   (argument of periapsis) = {:.6} rad ({:.6}°)",
            self.periapsis_argument,
            self.periapsis_argument * rad_to_deg
        )?;
        writeln!(
            f,
            "  M   (mean anomaly)          = {:.6} rad ({:.6}°)",
            self.mean_anomaly,
            self.mean_anomaly * rad_to_deg
        )
    }
}
