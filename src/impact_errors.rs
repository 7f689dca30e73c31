use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImpactError {
    #[error("Invalid covariance matrix: {0}")]
    InvalidCovariance(String),

    #[error("Invalid sample count: {0} (must be > 0)")]
    InvalidSampleCount(usize),

    #[error("Time grid is empty")]
    EmptyTimeGrid,

    #[error("Time grid is not strictly increasing at index {0}")]
    NonMonotonicTimeGrid(usize),

    #[error("Invalid kernel bandwidth: {0} (must be finite and > 0)")]
    InvalidBandwidth(f64),

    #[error("Invalid grid specification: {0}")]
    InvalidGridSpec(String),

    #[error("Invalid impact weight: {0} (must be finite and >= 0)")]
    InvalidWeight(f64),

    #[error("Reference body positions misaligned with trajectory: expected {expected}, found {found}")]
    MisalignedReferencePositions { expected: usize, found: usize },

    #[error("Invalid forecast parameter: {0}")]
    InvalidForecastParameter(String),

    #[error("Invalid orbital elements: {0}")]
    InvalidOrbitalElements(String),

    #[error("Kepler equation solver did not converge")]
    KeplerNoConvergence,

    #[error("Unable to parse ephemeris table: {0}")]
    EphemerisParsing(String),

    #[error("Epoch {0} JD is outside the ephemeris table")]
    EphemerisOutOfRange(f64),

    #[error("Invalid calendar date: {0}")]
    InvalidDate(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("CSV parsing error: {0}")]
    CsvParsing(#[from] csv::Error),

    #[error("Impact archive lookup failed: {0}")]
    ImpactArchive(String),
}

impl PartialEq for ImpactError {
    fn eq(&self, other: &Self) -> bool {
        use ImpactError::*;
        match (self, other) {
            (InvalidCovariance(a), InvalidCovariance(b)) => a == b,
            (InvalidSampleCount(a), InvalidSampleCount(b)) => a == b,
            (NonMonotonicTimeGrid(a), NonMonotonicTimeGrid(b)) => a == b,
            (InvalidBandwidth(a), InvalidBandwidth(b)) => a.to_bits() == b.to_bits(),
            (InvalidGridSpec(a), InvalidGridSpec(b)) => a == b,
            (InvalidWeight(a), InvalidWeight(b)) => a.to_bits() == b.to_bits(),
            (
                MisalignedReferencePositions {
                    expected: e1,
                    found: f1,
                },
                MisalignedReferencePositions {
                    expected: e2,
                    found: f2,
                },
            ) => e1 == e2 && f1 == f2,
            (InvalidForecastParameter(a), InvalidForecastParameter(b)) => a == b,
            (InvalidOrbitalElements(a), InvalidOrbitalElements(b)) => a == b,
            (EphemerisParsing(a), EphemerisParsing(b)) => a == b,
            (EphemerisOutOfRange(a), EphemerisOutOfRange(b)) => a.to_bits() == b.to_bits(),
            (ImpactArchive(a), ImpactArchive(b)) => a == b,
            (InvalidDate(a), InvalidDate(b)) => a == b,

            // Wrapped foreign errors are not comparable: same variant is enough
            (JsonParsing(_), JsonParsing(_)) => true,
            (CsvParsing(_), CsvParsing(_)) => true,

            (EmptyTimeGrid, EmptyTimeGrid) => true,
            (KeplerNoConvergence, KeplerNoConvergence) => true,

            _ => false,
        }
    }
}
