use super::constants::DPI;
use crate::impact_errors::ImpactError;
use std::f64::consts::PI;

/// Principal value of an angle in radians, in [0, 2π).
pub(crate) fn principal_angle(a: f64) -> f64 {
    a.rem_euclid(DPI)
}

/// Solve Kepler's equation `M = E − e·sin(E)` for the eccentric anomaly of an elliptic orbit.
///
/// Newton iteration started from `E₀ = M` (or `π` for e > 0.8, which keeps the iteration
/// monotone for highly eccentric orbits).
///
/// Arguments
/// -----------------
/// * `mean_anomaly`: Mean anomaly M (radians), any range.
/// * `eccentricity`: Eccentricity e, `0 ≤ e < 1`.
///
/// Return
/// ----------
/// * The eccentric anomaly E in [0, 2π), or [`ImpactError::KeplerNoConvergence`].
pub(crate) fn solve_kepler_equation(
    mean_anomaly: f64,
    eccentricity: f64,
) -> Result<f64, ImpactError> {
    const MAX_IT: usize = 50;
    let contr = 100.0 * f64::EPSILON;

    let m = principal_angle(mean_anomaly);
    if eccentricity == 0.0 {
        return Ok(m);
    }

    let mut ecc_anomaly = if eccentricity > 0.8 { PI } else { m };
    for _ in 0..MAX_IT {
        let fun = ecc_anomaly - eccentricity * ecc_anomaly.sin() - m;
        let funp = 1.0 - eccentricity * ecc_anomaly.cos();
        let delta = fun / funp;
        ecc_anomaly -= delta;
        if delta.abs() < contr * (1.0 + ecc_anomaly.abs()) {
            return Ok(principal_angle(ecc_anomaly));
        }
    }

    Err(ImpactError::KeplerNoConvergence)
}

#[cfg(test)]
mod kepler_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_principal_angle() {
        assert_relative_eq!(principal_angle(-PI / 2.0), 3.0 * PI / 2.0);
        assert_relative_eq!(principal_angle(5.0 * PI), PI, epsilon = 1e-12);
    }

    #[test]
    fn test_circular_orbit_is_identity() {
        assert_eq!(solve_kepler_equation(1.25, 0.0).unwrap(), 1.25);
    }

    #[test]
    fn test_solution_satisfies_kepler_equation() {
        for &e in &[0.01, 0.2835591457, 0.7, 0.95] {
            for &m in &[0.1, 1.0, 2.5, 4.0, 6.0] {
                let ecc_anomaly = solve_kepler_equation(m, e).unwrap();
                assert_relative_eq!(
                    ecc_anomaly - e * ecc_anomaly.sin(),
                    m,
                    epsilon = 1e-12
                );
            }
        }
    }
}
