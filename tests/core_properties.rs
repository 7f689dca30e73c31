use nalgebra::{Matrix6, Vector3};
use neo_impact::impact::detector::detect;
use neo_impact::impact::DetectionPolicy;
use neo_impact::impact_errors::ImpactError;
use neo_impact::orbit_type::OrbitalState;
use neo_impact::propagation::rectilinear::RectilinearPropagator;
use neo_impact::propagation::Propagator;
use neo_impact::reference_body::{FixedBody, ReferenceBody};
use neo_impact::state_sampler::sample;
use neo_impact::time::TimeGrid;

mod common;
use common::{assert_state_eq, seeded_rng};

fn correlated_covariance() -> Matrix6<f64> {
    let a = Matrix6::from_fn(|i, j| ((i + 2 * j) % 5) as f64 * 0.01);
    a * a.transpose()
}

#[test]
fn test_sample_count_for_valid_covariances() {
    let mean = OrbitalState::new(Vector3::new(1.0, 0.5, -0.1), Vector3::new(0.0, 6.2, 0.1));
    let mut rng = seeded_rng(11);

    for cov in [
        Matrix6::identity() * 0.01,
        correlated_covariance(),
        Matrix6::from_diagonal(&nalgebra::Vector6::new(1e-6, 0.0, 1e-6, 0.0, 1e-3, 0.0)),
    ] {
        for count in [1, 7, 250] {
            let states = sample(&mean, &cov, count, &mut rng).unwrap();
            assert_eq!(states.len(), count);
            assert!(states.iter().all(|s| s.is_finite()));
        }
    }
}

#[test]
fn test_zero_covariance_returns_mean_exactly() {
    let mean = OrbitalState::new(
        Vector3::new(0.123456789, -1.5, 3.25),
        Vector3::new(1e-3, -2.0, 0.5),
    );
    let states = sample(&mean, &Matrix6::zeros(), 50, &mut seeded_rng(5)).unwrap();
    assert_eq!(states.len(), 50);
    states.iter().for_each(|s| assert_state_eq(s, &mean));
}

#[test]
fn test_invalid_sampler_inputs() {
    let mean = OrbitalState::at_rest(Vector3::zeros());
    let mut rng = seeded_rng(0);
    assert_eq!(
        sample(&mean, &Matrix6::identity(), 0, &mut rng),
        Err(ImpactError::InvalidSampleCount(0))
    );
    assert!(matches!(
        sample(&mean, &(-Matrix6::identity()), 3, &mut rng),
        Err(ImpactError::InvalidCovariance(_))
    ));
}

#[test]
fn test_stationary_trajectory_is_constant() {
    let start = Vector3::new(0.7, -0.2, 0.05);
    let times = TimeGrid::spanning(2451545.0, 3.0, 100).unwrap();
    let trajectory = RectilinearPropagator.propagate(&OrbitalState::at_rest(start), &times);

    assert_eq!(trajectory.len(), times.len() - 1);
    assert!(trajectory.iter().all(|p| *p == start));
}

#[test]
fn test_zero_threshold_never_detects() {
    let times = TimeGrid::spanning(2451545.0, 2.0, 50).unwrap();
    let body = FixedBody::new(Vector3::new(1.0, 0.0, 0.0));
    let table = body.positions_on(&times).unwrap();
    let mut rng = seeded_rng(21);

    let states = sample(
        &OrbitalState::new(Vector3::new(0.9, 0.0, 0.0), Vector3::new(0.1, 0.0, 0.0)),
        &(Matrix6::identity() * 1e-3),
        20,
        &mut rng,
    )
    .unwrap();

    for state in &states {
        let trajectory = RectilinearPropagator.propagate(state, &times);
        let events = detect(
            &trajectory,
            &times,
            &table,
            0.0,
            0.05,
            DetectionPolicy::AllCrossings,
        )
        .unwrap();
        assert!(events.is_empty());
    }
}

#[test]
fn test_detection_weight_and_first_step() {
    let times = TimeGrid::spanning(2451545.0, 1.0, 13).unwrap();
    let body = FixedBody::new(Vector3::new(-0.4, 0.9, 0.0));
    let table = body.positions_on(&times).unwrap();

    let trajectory = RectilinearPropagator.propagate(&OrbitalState::at_rest(body.position), &times);
    let events = detect(
        &trajectory,
        &times,
        &table,
        0.01,
        0.1,
        DetectionPolicy::FirstCrossing,
    )
    .unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].weight, 0.1);
    assert_eq!((events[0].latitude, events[0].longitude), (0.0, 0.0));
}
