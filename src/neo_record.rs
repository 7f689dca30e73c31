//! # Orbit record of a near-Earth object
//!
//! [`NeoOrbitRecord`] holds the orbital elements and size of one NEO, as published by the
//! NASA NeoWs "neo lookup" service (`/neo/rest/v1/neo/{id}`). Fetching the document is left
//! to the caller; this module only parses it.
//!
//! NeoWs transmits the orbital elements as JSON *strings* (`"semi_major_axis": "1.4579"`)
//! while sizes are plain numbers. Both forms are accepted for every numeric field.
//!
//! Missing data never makes the parse fail. Each absent field is replaced by its documented
//! default and the substitution is logged with `warn!`:
//!
//! | field              | default      |
//! |--------------------|--------------|
//! | semi-major axis    | 1.0 AU       |
//! | eccentricity       | 0.1          |
//! | inclination        | 10°          |
//! | osculation epoch   | 2451545.0 JD |
//! | diameter (max est.)| 1.0 km       |
//!
//! The orientation angles (Ω, ω, M) default to zero without warning.
use std::fmt;

use log::{debug, warn};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::constants::{
    Degree, JulianDate, Kilometer, DEFAULT_DIAMETER_KM, DEFAULT_ECCENTRICITY,
    DEFAULT_EPOCH_JD, DEFAULT_INCLINATION, DEFAULT_SEMI_MAJOR_AXIS, RADEG,
};
use crate::impact_errors::ImpactError;
use crate::orbit_type::keplerian_element::KeplerianElements;

#[serde_as]
#[derive(Debug, Deserialize, Default)]
struct RawOrbitalData {
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    semi_major_axis: Option<f64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    eccentricity: Option<f64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    inclination: Option<f64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    epoch_osculation: Option<f64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    ascending_node_longitude: Option<f64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    perihelion_argument: Option<f64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    mean_anomaly: Option<f64>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
struct RawDiameterRange {
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    estimated_diameter_max: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawEstimatedDiameter {
    #[serde(default)]
    kilometers: Option<RawDiameterRange>,
}

#[derive(Debug, Deserialize)]
struct RawNeo {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    is_potentially_hazardous_asteroid: bool,
    #[serde(default)]
    estimated_diameter: Option<RawEstimatedDiameter>,
    #[serde(default)]
    orbital_data: Option<RawOrbitalData>,
}

/// Orbital elements and size of a near-Earth object.
///
/// Fields
/// -----------------
/// * `semi_major_axis`: AU.
/// * `inclination`, `ascending_node_longitude`, `perihelion_argument`, `mean_anomaly`: degrees.
/// * `epoch_osculation`: Julian Date.
/// * `diameter_km`: Maximum estimated diameter.
#[derive(Debug, Clone, PartialEq)]
pub struct NeoOrbitRecord {
    pub neo_id: String,
    pub name: String,
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: Degree,
    pub ascending_node_longitude: Degree,
    pub perihelion_argument: Degree,
    pub mean_anomaly: Degree,
    pub epoch_osculation: JulianDate,
    pub diameter_km: Kilometer,
    pub is_potentially_hazardous: bool,
}

impl Default for NeoOrbitRecord {
    fn default() -> Self {
        NeoOrbitRecord {
            neo_id: String::new(),
            name: String::new(),
            semi_major_axis: DEFAULT_SEMI_MAJOR_AXIS,
            eccentricity: DEFAULT_ECCENTRICITY,
            inclination: DEFAULT_INCLINATION,
            ascending_node_longitude: 0.0,
            perihelion_argument: 0.0,
            mean_anomaly: 0.0,
            epoch_osculation: DEFAULT_EPOCH_JD,
            diameter_km: DEFAULT_DIAMETER_KM,
            is_potentially_hazardous: false,
        }
    }
}

fn or_default(value: Option<f64>, default: f64, neo_id: &str, field: &str) -> f64 {
    value.unwrap_or_else(|| {
        warn!("{neo_id}: missing {field}, using default {default}");
        default
    })
}

impl NeoOrbitRecord {
    /// Parse a NeoWs "neo lookup" JSON document.
    ///
    /// Return
    /// ----------
    /// * The record with defaults substituted for missing fields, or
    ///   [`ImpactError::JsonParsing`] if the document is not valid JSON or a field has the
    ///   wrong type.
    pub fn from_neows_json(json: &str) -> Result<Self, ImpactError> {
        let raw: RawNeo = serde_json::from_str(json)?;
        let neo_id = raw.id.unwrap_or_default();

        let orbital = raw.orbital_data.unwrap_or_else(|| {
            warn!("{neo_id}: no orbital_data in record, using default elements");
            RawOrbitalData::default()
        });

        let diameter = raw
            .estimated_diameter
            .and_then(|d| d.kilometers)
            .and_then(|km| km.estimated_diameter_max);

        let record = NeoOrbitRecord {
            semi_major_axis: or_default(
                orbital.semi_major_axis,
                DEFAULT_SEMI_MAJOR_AXIS,
                &neo_id,
                "semi_major_axis",
            ),
            eccentricity: or_default(
                orbital.eccentricity,
                DEFAULT_ECCENTRICITY,
                &neo_id,
                "eccentricity",
            ),
            inclination: or_default(
                orbital.inclination,
                DEFAULT_INCLINATION,
                &neo_id,
                "inclination",
            ),
            epoch_osculation: or_default(
                orbital.epoch_osculation,
                DEFAULT_EPOCH_JD,
                &neo_id,
                "epoch_osculation",
            ),
            diameter_km: or_default(diameter, DEFAULT_DIAMETER_KM, &neo_id, "estimated diameter"),
            ascending_node_longitude: orbital.ascending_node_longitude.unwrap_or(0.0),
            perihelion_argument: orbital.perihelion_argument.unwrap_or(0.0),
            mean_anomaly: orbital.mean_anomaly.unwrap_or(0.0),
            name: raw.name.unwrap_or_default(),
            is_potentially_hazardous: raw.is_potentially_hazardous_asteroid,
            neo_id,
        };
        debug!("Parsed orbit record: {record}");
        Ok(record)
    }

    /// Keplerian elements of the record, angles converted to radians.
    pub fn keplerian_elements(&self) -> KeplerianElements {
        KeplerianElements {
            reference_epoch: self.epoch_osculation,
            semi_major_axis: self.semi_major_axis,
            eccentricity: self.eccentricity,
            inclination: self.inclination * RADEG,
            ascending_node_longitude: self.ascending_node_longitude * RADEG,
            periapsis_argument: self.perihelion_argument * RADEG,
            mean_anomaly: self.mean_anomaly * RADEG,
        }
    }
}

impl fmt::Display for NeoOrbitRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): a={:.6} AU, e={:.6}, i={:.4}°, epoch={:.1} JD, D={:.3} km{}",
            self.neo_id,
            self.name,
            self.semi_major_axis,
            self.eccentricity,
            self.inclination,
            self.epoch_osculation,
            self.diameter_km,
            if self.is_potentially_hazardous {
                ", PHA"
            } else {
                ""
            }
        )
    }
}
