//! # Impact probability surface
//!
//! Turns the weighted impact point set of a run into a normalized probability surface over a
//! regular longitude/latitude grid.
//!
//! Procedure
//! -----------------
//! 1. Fit a weighted Gaussian [`KernelDensity`] to the `(longitude, latitude)` points.
//! 2. Evaluate the density at every node of the grid described by a [`GridSpec`].
//! 3. Min-max normalize the values to `[0, 1]`.
//!
//! An empty point set (or one of total weight zero) yields a grid of zeros, as does a
//! perfectly flat density (`max == min`).
//!
//! Bandwidth
//! -----------------
//! The bandwidth is the kernel standard deviation in degrees and is always supplied by the
//! caller. Larger bandwidths smooth the surface and shrink the contrast of the peak; smaller
//! ones sharpen it but overfit when only a handful of samples impacted.
//!
//! Grid rows are evaluated in parallel with `rayon`. Each cell is computed independently, in a
//! fixed summation order, so the output is bit-identical from run to run.
use std::fmt;

use itertools::Itertools;
use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::constants::Degree;
use crate::impact::ImpactEvent;
use crate::impact_errors::ImpactError;

pub mod kde;

pub use kde::KernelDensity;

/// Geographic evaluation grid.
///
/// Fields
/// -----------------
/// * `lon_range`: `(min, max)` longitude in degrees.
/// * `lat_range`: `(min, max)` latitude in degrees.
/// * `lon_resolution`: Number of longitude nodes (endpoints included).
/// * `lat_resolution`: Number of latitude nodes (endpoints included).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub lon_range: (Degree, Degree),
    pub lat_range: (Degree, Degree),
    pub lon_resolution: usize,
    pub lat_resolution: usize,
}

impl Default for GridSpec {
    /// Whole globe, 100 longitude × 50 latitude nodes.
    fn default() -> Self {
        GridSpec {
            lon_range: (-180.0, 180.0),
            lat_range: (-90.0, 90.0),
            lon_resolution: 100,
            lat_resolution: 50,
        }
    }
}

impl GridSpec {
    pub fn new(
        lon_range: (Degree, Degree),
        lat_range: (Degree, Degree),
        lon_resolution: usize,
        lat_resolution: usize,
    ) -> Result<Self, ImpactError> {
        let spec = GridSpec {
            lon_range,
            lat_range,
            lon_resolution,
            lat_resolution,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check ranges (finite, `min < max`) and resolutions (`≥ 1`).
    pub fn validate(&self) -> Result<(), ImpactError> {
        check_axis("longitude", self.lon_range, self.lon_resolution)?;
        check_axis("latitude", self.lat_range, self.lat_resolution)
    }

    /// Longitude and latitude axes, `linspace(min, max, n)` each.
    pub fn axes(&self) -> (Vec<Degree>, Vec<Degree>) {
        (
            linspace(self.lon_range, self.lon_resolution),
            linspace(self.lat_range, self.lat_resolution),
        )
    }

    /// `(lon_resolution, lat_resolution)`
    pub fn shape(&self) -> (usize, usize) {
        (self.lon_resolution, self.lat_resolution)
    }
}

impl fmt::Display for GridSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lon [{}, {}] × {}, lat [{}, {}] × {}",
            self.lon_range.0,
            self.lon_range.1,
            self.lon_resolution,
            self.lat_range.0,
            self.lat_range.1,
            self.lat_resolution
        )
    }
}

fn check_axis(name: &str, (min, max): (Degree, Degree), n: usize) -> Result<(), ImpactError> {
    if n == 0 {
        return Err(ImpactError::InvalidGridSpec(format!(
            "{name} resolution must be at least 1"
        )));
    }
    if !(min.is_finite() && max.is_finite() && min < max) {
        return Err(ImpactError::InvalidGridSpec(format!(
            "{name} range must be finite with min < max, got [{min}, {max}]"
        )));
    }
    Ok(())
}

fn linspace((min, max): (Degree, Degree), n: usize) -> Vec<Degree> {
    if n == 1 {
        return vec![min];
    }
    let step = (max - min) / (n - 1) as f64;
    (0..n)
        .map(|i| if i == n - 1 { max } else { min + step * i as f64 })
        .collect()
}

/// Normalized impact probability over a longitude/latitude grid.
///
/// `values[(i, j)]` is the value at `(longitude_axis[i], latitude_axis[j])`, in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityGrid {
    pub longitude_axis: Vec<Degree>,
    pub latitude_axis: Vec<Degree>,
    pub values: DMatrix<f64>,
}

impl ProbabilityGrid {
    /// All-zero grid over `spec`.
    pub fn zeros(spec: &GridSpec) -> Self {
        let (longitude_axis, latitude_axis) = spec.axes();
        ProbabilityGrid {
            values: DMatrix::zeros(longitude_axis.len(), latitude_axis.len()),
            longitude_axis,
            latitude_axis,
        }
    }

    /// `(n_lon, n_lat)`
    pub fn shape(&self) -> (usize, usize) {
        self.values.shape()
    }

    pub fn is_all_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }

    /// Grid indices of the maximum value (first one in longitude-major order), `None` for an
    /// all-zero grid.
    pub fn peak_index(&self) -> Option<(usize, usize)> {
        let (n_lon, n_lat) = self.shape();
        let mut best: Option<((usize, usize), f64)> = None;
        for i in 0..n_lon {
            for j in 0..n_lat {
                let v = self.values[(i, j)];
                if v > best.map_or(0.0, |(_, b)| b) {
                    best = Some(((i, j), v));
                }
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// `(longitude, latitude)` of the maximum, `None` for an all-zero grid.
    pub fn peak(&self) -> Option<(Degree, Degree)> {
        self.peak_index()
            .map(|(i, j)| (self.longitude_axis[i], self.latitude_axis[j]))
    }
}

/// Estimate the impact probability surface of a weighted point set.
///
/// Arguments
/// -----------------
/// * `points`: Aggregated impact events.
/// * `grid_spec`: Evaluation grid.
/// * `bandwidth`: Gaussian kernel standard deviation in degrees, `> 0`.
///
/// Return
/// ----------
/// * The min-max normalized grid of shape `grid_spec.shape()`.
///   Errors are [`ImpactError::InvalidBandwidth`], [`ImpactError::InvalidGridSpec`] or
///   [`ImpactError::InvalidWeight`]; an empty point set is not an error.
pub fn estimate(
    points: &[ImpactEvent],
    grid_spec: &GridSpec,
    bandwidth: f64,
) -> Result<ProbabilityGrid, ImpactError> {
    grid_spec.validate()?;
    let kde = KernelDensity::fit(points, bandwidth)?;

    let mut grid = ProbabilityGrid::zeros(grid_spec);
    if kde.is_empty() {
        log::debug!("No weighted impact point, returning an all-zero grid");
        return Ok(grid);
    }

    let rows: Vec<Vec<f64>> = grid
        .longitude_axis
        .par_iter()
        .map(|&lon| {
            grid.latitude_axis
                .iter()
                .map(|&lat| kde.density(lon, lat))
                .collect()
        })
        .collect();

    let (n_lon, n_lat) = grid_spec.shape();
    let raw = DMatrix::from_fn(n_lon, n_lat, |i, j| rows[i][j]);

    match raw.iter().copied().minmax().into_option() {
        Some((min, max)) if max > min => {
            let range = max - min;
            grid.values = raw.map(|v| (v - min) / range);
        }
        _ => log::debug!("Flat density over the grid, returning an all-zero grid"),
    }

    Ok(grid)
}
