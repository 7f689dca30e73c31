//! # Constants and type definitions for neo_impact
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! definitions** used throughout the impact forecasting pipeline.
//!
//! ## Overview
//!
//! - Astronomical and geophysical constants
//! - Unit conversions (degrees ↔ radians, days ↔ Julian years)
//! - Core type aliases used across the crate
//! - Fallback orbital elements used when an orbit record is incomplete

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Days in a Julian year
pub const DAYS_PER_JULIAN_YEAR: f64 = 365.25;

/// Julian Date of J2000.0 (2000-01-01 12:00:00 TT)
pub const J2000_JD: f64 = 2_451_545.0;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Mean Earth radius in kilometers (IUGG)
pub const EARTH_MEAN_RADIUS_KM: f64 = 6_371.0;

/// Earth sidereal orbital period in days
pub const EARTH_SIDEREAL_YEAR_DAYS: f64 = 365.256_363;

/// Earth mean longitude at J2000.0 in degrees
pub const EARTH_MEAN_LONGITUDE_J2000: f64 = 100.464_57;

/// Gaussian gravitational constant k (AU^(3/2) / day)
pub const GAUSS_GRAV: f64 = 0.01720209895;

/// k², the heliocentric gravitational parameter in AU³/day²
pub const GAUSS_GRAV_SQUARED: f64 = GAUSS_GRAV * GAUSS_GRAV;

// -------------------------------------------------------------------------------------------------
// Fallback orbital elements
// -------------------------------------------------------------------------------------------------

/// Semi-major axis substituted when an orbit record omits it (AU)
pub const DEFAULT_SEMI_MAJOR_AXIS: f64 = 1.0;

/// Eccentricity substituted when an orbit record omits it
pub const DEFAULT_ECCENTRICITY: f64 = 0.1;

/// Inclination substituted when an orbit record omits it (degrees)
pub const DEFAULT_INCLINATION: f64 = 10.0;

/// Osculation epoch substituted when an orbit record omits it (JD)
pub const DEFAULT_EPOCH_JD: f64 = J2000_JD;

/// Estimated diameter substituted when an orbit record omits it (km)
pub const DEFAULT_DIAMETER_KM: f64 = 1.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Julian Date (days)
pub type JulianDate = f64;
