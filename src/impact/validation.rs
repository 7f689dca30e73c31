//! # Validation against recorded impacts
//!
//! For objects that already struck the Earth, a historical record of the impact location
//! can be compared with the forecast. The predicted location is the weighted mean of the
//! impact events (arithmetic mean in latitude, circular mean in longitude so that events
//! straddling the antimeridian average correctly).
//!
//! The error is reported both as the planar distance in degrees in the (lat, lon) plane and
//! as the great-circle distance on a spherical Earth.
//!
//! Record lookups go through the [`ImpactArchive`] trait. A failed lookup must never end a
//! forecast: callers degrade to "no validation possible".
use std::fmt;

use serde::Deserialize;

use crate::constants::{Degree, JulianDate, Kilometer, EARTH_MEAN_RADIUS_KM};
use crate::impact::ImpactEvent;
use crate::impact_errors::ImpactError;
use crate::time::utc_str_to_jd;

/// Recorded impact of an object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImpactRecord {
    #[serde(alias = "lat")]
    pub latitude: Degree,
    #[serde(alias = "lon")]
    pub longitude: Degree,
    #[serde(default)]
    pub time: Option<String>,
}

impl ImpactRecord {
    /// Parse a `{"lat": .., "lon": .., "time": ..}` document.
    pub fn from_json(json: &str) -> Result<Self, ImpactError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Julian Date of the recorded impact, `None` when the record carries no time.
    pub fn impact_jd(&self) -> Result<Option<JulianDate>, ImpactError> {
        self.time.as_deref().map(utc_str_to_jd).transpose()
    }
}

/// Source of historical impact records.
pub trait ImpactArchive {
    /// Look up the recorded impact of `neo_id`.
    ///
    /// Return
    /// ----------
    /// * `Ok(Some(record))` – the object is known to have impacted.
    /// * `Ok(None)` – no record for this object.
    /// * `Err(_)` – the archive could not be queried.
    fn lookup(&self, neo_id: &str) -> Result<Option<ImpactRecord>, ImpactError>;
}

/// Archive that never has a record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoArchive;

impl ImpactArchive for NoArchive {
    fn lookup(&self, _neo_id: &str) -> Result<Option<ImpactRecord>, ImpactError> {
        Ok(None)
    }
}

impl<F> ImpactArchive for F
where
    F: Fn(&str) -> Result<Option<ImpactRecord>, ImpactError>,
{
    fn lookup(&self, neo_id: &str) -> Result<Option<ImpactRecord>, ImpactError> {
        self(neo_id)
    }
}

/// Predicted vs. recorded impact location.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub predicted_latitude: Degree,
    pub predicted_longitude: Degree,
    pub recorded: ImpactRecord,
    /// `sqrt(Δlat² + Δlon²)`, with Δlon wrapped to [-180, 180].
    pub error_degrees: Degree,
    pub great_circle_error_km: Kilometer,
}

impl ValidationReport {
    /// Compare the weighted mean predicted location with a recorded impact.
    ///
    /// Return
    /// ----------
    /// * `None` when there is no event or their total weight is zero.
    pub fn compare(events: &[ImpactEvent], recorded: &ImpactRecord) -> Option<Self> {
        let (predicted_latitude, predicted_longitude) = weighted_mean_location(events)?;

        let dlat = predicted_latitude - recorded.latitude;
        let dlon = wrap_longitude(predicted_longitude - recorded.longitude);
        let error_degrees = dlat.hypot(dlon);

        let great_circle_error_km = great_circle_distance_km(
            predicted_latitude,
            predicted_longitude,
            recorded.latitude,
            recorded.longitude,
        );

        Some(ValidationReport {
            predicted_latitude,
            predicted_longitude,
            recorded: recorded.clone(),
            error_degrees,
            great_circle_error_km,
        })
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "predicted=({:+.3}°, {:+.3}°) recorded=({:+.3}°, {:+.3}°) error={:.3}° ({:.1} km)",
            self.predicted_latitude,
            self.predicted_longitude,
            self.recorded.latitude,
            self.recorded.longitude,
            self.error_degrees,
            self.great_circle_error_km
        )
    }
}

/// Weighted mean (latitude, longitude) of `events`, circular in longitude.
pub fn weighted_mean_location(events: &[ImpactEvent]) -> Option<(Degree, Degree)> {
    let total: f64 = events.iter().map(|e| e.weight).sum();
    if events.is_empty() || !(total > 0.0) {
        return None;
    }

    let (lat_sum, sin_sum, cos_sum) =
        events
            .iter()
            .fold((0.0, 0.0, 0.0), |(lat, s, c), e| {
                let (sin, cos) = e.longitude.to_radians().sin_cos();
                (lat + e.weight * e.latitude, s + e.weight * sin, c + e.weight * cos)
            });

    Some((lat_sum / total, sin_sum.atan2(cos_sum).to_degrees()))
}

/// Wrap a longitude difference into [-180, 180].
fn wrap_longitude(dlon: Degree) -> Degree {
    let wrapped = (dlon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && dlon > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// Haversine distance on a sphere of mean Earth radius.
pub fn great_circle_distance_km(lat1: Degree, lon1: Degree, lat2: Degree, lon2: Degree) -> Kilometer {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dphi = phi2 - phi1;
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_MEAN_RADIUS_KM * a.sqrt().min(1.0).asin()
}
