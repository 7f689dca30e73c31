//! # Close-approach detection
//!
//! For each step of a trajectory, the Euclidean distance to the reference body at the same
//! epoch is compared with a threshold. Every qualifying step (`distance < threshold`) is
//! projected onto the body's surface as the **sub-object point** of the relative position
//! `r = object − body`:
//!
//! ```text
//! latitude  = asin(r_z / |r|)
//! longitude = atan2(r_y, r_x)
//! ```
//!
//! both in degrees, in the body-centred frame parallel to the trajectory frame. An object
//! exactly coincident with the body (`|r| = 0`) projects to `(0°, 0°)`.
//!
//! Since the comparison is strict, a threshold of zero never produces an event.
use nalgebra::Vector3;

use crate::constants::Degree;
use crate::impact::{DetectionPolicy, ImpactEvent};
use crate::impact_errors::ImpactError;
use crate::propagation::Trajectory;
use crate::time::TimeGrid;

/// Detect close approaches of one trajectory.
///
/// Arguments
/// -----------------
/// * `trajectory`: Positions aligned with `times.steps()`.
/// * `times`: Time grid of the run.
/// * `reference_positions`: Body positions aligned with `times.steps()`.
/// * `threshold_distance`: Detection distance (AU).
/// * `weight`: Probability mass given to each event, usually `1 / n_samples`.
/// * `policy`: Whether to stop at the first crossing.
///
/// Return
/// ----------
/// * The events in time order (possibly empty), or
///   [`ImpactError::MisalignedReferencePositions`] if the trajectory, the grid and the
///   position table do not have matching lengths.
pub fn detect(
    trajectory: &Trajectory,
    times: &TimeGrid,
    reference_positions: &[Vector3<f64>],
    threshold_distance: f64,
    weight: f64,
    policy: DetectionPolicy,
) -> Result<Vec<ImpactEvent>, ImpactError> {
    let expected = times.steps().len();
    if trajectory.len() != expected {
        return Err(ImpactError::MisalignedReferencePositions {
            expected,
            found: trajectory.len(),
        });
    }
    if reference_positions.len() != expected {
        return Err(ImpactError::MisalignedReferencePositions {
            expected,
            found: reference_positions.len(),
        });
    }

    let mut crossings = trajectory
        .iter()
        .zip(reference_positions)
        .map(|(object, body)| object - body)
        .filter(|relative| relative.norm() < threshold_distance)
        .map(|relative| {
            let (latitude, longitude) = sub_object_point(&relative);
            ImpactEvent::new(latitude, longitude, weight)
        });

    let events = match policy {
        DetectionPolicy::FirstCrossing => crossings.next().into_iter().collect(),
        DetectionPolicy::AllCrossings => crossings.collect(),
    };
    Ok(events)
}

/// Spherical coordinates (latitude, longitude) in degrees of a body-centred vector.
pub fn sub_object_point(relative: &Vector3<f64>) -> (Degree, Degree) {
    let r = relative.norm();
    if r == 0.0 {
        return (0.0, 0.0);
    }

    let latitude = (relative.z / r).clamp(-1.0, 1.0).asin().to_degrees();
    let mut longitude = relative.y.atan2(relative.x).to_degrees();
    if longitude <= -180.0 {
        longitude += 360.0;
    }
    (latitude, longitude)
}

#[cfg(test)]
mod test_detector {
    use super::*;
    use crate::orbit_type::OrbitalState;
    use crate::propagation::rectilinear::RectilinearPropagator;
    use crate::propagation::Propagator;
    use approx::assert_relative_eq;

    fn grid() -> TimeGrid {
        TimeGrid::new(vec![0.0, 365.25, 730.5, 1095.75, 1461.0]).unwrap()
    }

    #[test]
    fn test_zero_threshold_never_detects() {
        let times = grid();
        let traj = RectilinearPropagator.propagate(
            &OrbitalState::new(Vector3::new(-2.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)),
            &times,
        );
        let body = vec![Vector3::new(0.0, 0.0, 0.0); 4];
        let events = detect(&traj, &times, &body, 0.0, 0.25, DetectionPolicy::AllCrossings).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_policies() {
        let times = grid();
        // x = -2.5, -1.5, -0.5, 0.5
        let traj = RectilinearPropagator.propagate(
            &OrbitalState::new(Vector3::new(-3.5, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)),
            &times,
        );
        let body = vec![Vector3::zeros(); 4];

        let first = detect(&traj, &times, &body, 1.0, 0.1, DetectionPolicy::FirstCrossing).unwrap();
        assert_eq!(first, vec![ImpactEvent::new(0.0, 180.0, 0.1)]);

        let all = detect(&traj, &times, &body, 1.0, 0.1, DetectionPolicy::AllCrossings).unwrap();
        assert_eq!(
            all,
            vec![
                ImpactEvent::new(0.0, 180.0, 0.1),
                ImpactEvent::new(0.0, 0.0, 0.1)
            ]
        );
    }

    #[test]
    fn test_no_crossing_yields_empty() {
        let times = grid();
        let traj = RectilinearPropagator.propagate(
            &OrbitalState::at_rest(Vector3::new(5.0, 5.0, 5.0)),
            &times,
        );
        let body = vec![Vector3::zeros(); 4];
        let events = detect(&traj, &times, &body, 1.0, 1.0, DetectionPolicy::AllCrossings).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_misaligned_inputs_rejected() {
        let times = grid();
        let traj = Trajectory::new(vec![Vector3::zeros(); 4]);
        assert_eq!(
            detect(&traj, &times, &[Vector3::zeros(); 3], 1.0, 1.0, DetectionPolicy::FirstCrossing),
            Err(ImpactError::MisalignedReferencePositions {
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn test_sub_object_point() {
        assert_eq!(sub_object_point(&Vector3::zeros()), (0.0, 0.0));

        let (lat, lon) = sub_object_point(&Vector3::new(0.0, 0.0, 2.0));
        assert_relative_eq!(lat, 90.0);
        assert_relative_eq!(lon, 0.0);

        let (lat, lon) = sub_object_point(&Vector3::new(1.0, 1.0, 2.0_f64.sqrt()));
        assert_relative_eq!(lat, 45.0, epsilon = 1e-12);
        assert_relative_eq!(lon, 45.0, epsilon = 1e-12);

        let (_, lon) = sub_object_point(&Vector3::new(-1.0, -0.0, 0.0));
        assert_relative_eq!(lon, 180.0);

        let (lat, lon) = sub_object_point(&Vector3::new(0.0, -3.0, -3.0));
        assert_relative_eq!(lat, -45.0, epsilon = 1e-12);
        assert_relative_eq!(lon, -90.0, epsilon = 1e-12);
    }
}
