#![allow(dead_code)]

use approx::assert_relative_eq;
use nalgebra::Vector3;
use neo_impact::density::ProbabilityGrid;
use neo_impact::forecast::ForecastParams;
use neo_impact::orbit_type::OrbitalState;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// NeoWs lookup document of 433 Eros (trimmed to the fields the crate reads).
pub const EROS_NEOWS: &str = r#"{
    "id": "2000433",
    "name": "433 Eros (A898 PA)",
    "is_potentially_hazardous_asteroid": false,
    "estimated_diameter": {
        "kilometers": {
            "estimated_diameter_min": 22.1082810359,
            "estimated_diameter_max": 49.4349280561
        }
    },
    "orbital_data": {
        "epoch_osculation": "2461000.5",
        "eccentricity": ".2228359407071628",
        "semi_major_axis": "1.458120998474684",
        "inclination": "10.82846651399785",
        "ascending_node_longitude": "304.2701025753316",
        "perihelion_argument": "178.9297536744151",
        "mean_anomaly": "310.5543277370992"
    }
}"#;

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Small run: `n_samples` draws, one year at monthly resolution.
pub fn small_params(n_samples: usize, threshold: f64) -> ForecastParams {
    ForecastParams::builder()
        .n_samples(n_samples)
        .years_forward(1.0)
        .steps_per_year(12)
        .threshold_distance(threshold)
        .build()
        .unwrap()
}

pub fn assert_state_eq(actual: &OrbitalState, expected: &OrbitalState) {
    assert_eq!(actual.position, expected.position);
    assert_eq!(actual.velocity, expected.velocity);
}

pub fn assert_vec3_close(actual: &Vector3<f64>, expected: &Vector3<f64>, epsilon: f64) {
    assert_relative_eq!(actual.x, expected.x, epsilon = epsilon);
    assert_relative_eq!(actual.y, expected.y, epsilon = epsilon);
    assert_relative_eq!(actual.z, expected.z, epsilon = epsilon);
}

/// Every value in [0, 1]; either all zero or spanning exactly [0, 1].
pub fn assert_normalized(grid: &ProbabilityGrid) {
    assert!(grid.values.iter().all(|&v| (0.0..=1.0).contains(&v)));
    if !grid.is_all_zero() {
        assert_eq!(grid.values.max(), 1.0);
        assert_eq!(grid.values.min(), 0.0);
    }
}
