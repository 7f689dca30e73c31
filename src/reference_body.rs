//! # Reference bodies
//!
//! The impact detector compares every trajectory against the position of a reference body
//! (the Earth) at the same epochs. A [`ReferenceBody`] answers "where is the body at this
//! Julian Date?" in the frame of the propagated trajectories (heliocentric ecliptic, AU).
//!
//! Provided implementations
//! -----------------
//! * [`FixedBody`] – A body that does not move. Useful for controlled scenarios and tests.
//! * [`CircularOrbitBody`] – Uniform circular motion in the ecliptic plane.
//!   [`CircularOrbitBody::earth`] gives a mean-Earth approximation.
//! * [`TabulatedEphemeris`] – Positions read from a JPL Horizons CSV vector table
//!   (`TABLE_TYPE='VECTORS'`, `CSV_FORMAT=YES`, `OUT_UNITS=AU-D`) and linearly interpolated.
//! * Any closure `Fn(JulianDate) -> Vector3<f64> + Sync`.
//!
//! The position table of a run is computed once by [`ReferenceBody::positions_on`] and shared
//! read-only by every sample.
use nalgebra::Vector3;
use regex::Regex;

use crate::constants::{
    JulianDate, DPI, EARTH_MEAN_LONGITUDE_J2000, EARTH_SIDEREAL_YEAR_DAYS, J2000_JD, RADEG,
};
use crate::impact_errors::ImpactError;
use crate::time::TimeGrid;

pub trait ReferenceBody: Sync {
    /// Position of the body at `jd` (AU).
    fn position(&self, jd: JulianDate) -> Result<Vector3<f64>, ImpactError>;

    /// Position table aligned with `times.steps()`, i.e. with trajectory positions.
    fn positions_on(&self, times: &TimeGrid) -> Result<Vec<Vector3<f64>>, ImpactError> {
        times.steps().iter().map(|&t| self.position(t)).collect()
    }
}

impl<F> ReferenceBody for F
where
    F: Fn(JulianDate) -> Vector3<f64> + Sync,
{
    fn position(&self, jd: JulianDate) -> Result<Vector3<f64>, ImpactError> {
        Ok(self(jd))
    }
}

/// Body at rest at a fixed position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedBody {
    pub position: Vector3<f64>,
}

impl FixedBody {
    pub fn new(position: Vector3<f64>) -> Self {
        FixedBody { position }
    }
}

impl ReferenceBody for FixedBody {
    fn position(&self, _jd: JulianDate) -> Result<Vector3<f64>, ImpactError> {
        Ok(self.position)
    }
}

/// Uniform circular orbit around the origin, in the `z = 0` plane.
///
/// Fields
/// -----------------
/// * `radius`: Orbit radius (AU).
/// * `period_days`: Orbital period (days).
/// * `longitude_at_j2000`: Longitude of the body at J2000.0 (degrees).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularOrbitBody {
    pub radius: f64,
    pub period_days: f64,
    pub longitude_at_j2000: f64,
}

impl CircularOrbitBody {
    /// Mean Earth: 1 AU, sidereal year, J2000 mean longitude.
    pub fn earth() -> Self {
        CircularOrbitBody {
            radius: 1.0,
            period_days: EARTH_SIDEREAL_YEAR_DAYS,
            longitude_at_j2000: EARTH_MEAN_LONGITUDE_J2000,
        }
    }
}

impl ReferenceBody for CircularOrbitBody {
    fn position(&self, jd: JulianDate) -> Result<Vector3<f64>, ImpactError> {
        let angle = self.longitude_at_j2000 * RADEG + DPI * (jd - J2000_JD) / self.period_days;
        let (sin, cos) = angle.sin_cos();
        Ok(Vector3::new(self.radius * cos, self.radius * sin, 0.0))
    }
}

/// One row of a JPL Horizons vector table.
#[derive(Debug, serde::Deserialize, PartialEq)]
struct PosRecord {
    #[serde(rename = "JDTDB")]
    jd: f64,
    #[serde(rename = "X")]
    x: f64,
    #[serde(rename = "Y")]
    y: f64,
    #[serde(rename = "Z")]
    z: f64,
}

/// Body positions tabulated at increasing epochs, linearly interpolated in between.
#[derive(Debug, Clone, PartialEq)]
pub struct TabulatedEphemeris {
    epochs: Vec<JulianDate>,
    positions: Vec<Vector3<f64>>,
}

impl TabulatedEphemeris {
    /// Build a table from `(epoch, position)` rows.
    ///
    /// Return
    /// ----------
    /// * The table, or [`ImpactError::EphemerisParsing`] if it is empty or the epochs are not
    ///   strictly increasing.
    pub fn new(rows: Vec<(JulianDate, Vector3<f64>)>) -> Result<Self, ImpactError> {
        if rows.is_empty() {
            return Err(ImpactError::EphemerisParsing("empty ephemeris table".into()));
        }
        if rows.windows(2).any(|w| !(w[1].0 > w[0].0)) {
            return Err(ImpactError::EphemerisParsing(
                "ephemeris epochs must be strictly increasing".into(),
            ));
        }
        let (epochs, positions) = rows.into_iter().unzip();
        Ok(TabulatedEphemeris { epochs, positions })
    }

    /// Parse the text response of a JPL Horizons vector query.
    ///
    /// Only the column header line (starting with `JDTDB`) and the rows between `$$SOE` and
    /// `$$EOE` are read. Columns other than `JDTDB`, `X`, `Y`, `Z` are ignored.
    ///
    /// Arguments
    /// -----------------
    /// * `horizons_response`: Raw Horizons output in CSV format, AU-D units.
    ///
    /// Return
    /// ----------
    /// * The interpolating table, or [`ImpactError::EphemerisParsing`] /
    ///   [`ImpactError::CsvParsing`] on malformed input.
    pub fn from_horizons_csv(horizons_response: &str) -> Result<Self, ImpactError> {
        let header_regex = Regex::new(r"(?m)^\s*(JDTDB\s*,.*)$")
            .map_err(|e| ImpactError::EphemerisParsing(e.to_string()))?;
        let data_regex = Regex::new(r"(?s)\$\$SOE\s*\n(.*?)\$\$EOE")
            .map_err(|e| ImpactError::EphemerisParsing(e.to_string()))?;

        let header = header_regex
            .captures(horizons_response)
            .and_then(|c| c.get(1))
            .ok_or_else(|| ImpactError::EphemerisParsing("missing JDTDB header line".into()))?
            .as_str();
        let data = data_regex
            .captures(horizons_response)
            .and_then(|c| c.get(1))
            .ok_or_else(|| ImpactError::EphemerisParsing("missing $$SOE/$$EOE block".into()))?
            .as_str();

        let table = format!("{}\n{}", header.trim(), data.trim());
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(table.as_bytes());

        let rows = reader
            .deserialize::<PosRecord>()
            .map(|rec| rec.map(|r| (r.jd, Vector3::new(r.x, r.y, r.z))))
            .collect::<Result<Vec<_>, csv::Error>>()?;

        TabulatedEphemeris::new(rows)
    }

    /// First and last tabulated epochs.
    pub fn span(&self) -> (JulianDate, JulianDate) {
        (self.epochs[0], self.epochs[self.epochs.len() - 1])
    }
}

impl ReferenceBody for TabulatedEphemeris {
    fn position(&self, jd: JulianDate) -> Result<Vector3<f64>, ImpactError> {
        let (first, last) = self.span();
        if !(first..=last).contains(&jd) {
            return Err(ImpactError::EphemerisOutOfRange(jd));
        }

        // Index of the first epoch strictly after jd
        let upper = self.epochs.partition_point(|&e| e <= jd);
        if upper == self.epochs.len() {
            return Ok(self.positions[upper - 1]);
        }
        let lower = upper - 1;
        let (t0, t1) = (self.epochs[lower], self.epochs[upper]);
        let frac = (jd - t0) / (t1 - t0);
        Ok(self.positions[lower] + (self.positions[upper] - self.positions[lower]) * frac)
    }
}
