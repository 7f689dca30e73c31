//! # Forecast parameters
//!
//! [`ForecastParams`] gathers every tunable of an impact forecast run: Monte Carlo size,
//! propagation horizon and sampling density, detection threshold and policy, density
//! bandwidth and evaluation grid, and the tolerated fraction of dropped samples.
//!
//! Parameters are built through [`ForecastParamsBuilder`], whose [`build`](ForecastParamsBuilder::build)
//! validates the whole set before a run can start.
//!
//! ## Example
//!
//! ```rust
//! use neo_impact::forecast::ForecastParams;
//!
//! let params = ForecastParams::builder()
//!     .n_samples(500)
//!     .years_forward(5.0)
//!     .bandwidth(2.0)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(params.n_time_points(), 365 * 5);
//! println!("{params:#}");
//! ```
use std::cmp::Ordering::{Equal, Greater, Less};
use std::fmt;

use crate::density::GridSpec;
use crate::impact::DetectionPolicy;
use crate::impact_errors::ImpactError;

/// Tunables of an impact forecast run.
///
/// Fields
/// -----------------
/// * `n_samples`: Number of Monte Carlo state draws.
/// * `years_forward`: Propagation horizon in Julian years.
/// * `steps_per_year`: Time-grid nodes per year of horizon.
/// * `threshold_distance`: Close-approach detection distance (AU).
/// * `bandwidth`: Kernel standard deviation of the density estimate (degrees).
/// * `grid`: Geographic evaluation grid.
/// * `detection_policy`: One event per sample, or one per crossing step.
/// * `max_skipped_fraction`: Fraction of dropped samples above which the run reports a warning.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastParams {
    // --- Monte Carlo ---
    pub n_samples: usize,

    // --- Time grid ---
    pub years_forward: f64,
    pub steps_per_year: usize,

    // --- Detection ---
    pub threshold_distance: f64,
    pub detection_policy: DetectionPolicy,

    // --- Density ---
    /// Larger values smooth the surface, smaller ones sharpen it and overfit sparse impact sets.
    pub bandwidth: f64,
    pub grid: GridSpec,

    // --- Batch health ---
    pub max_skipped_fraction: f64,
}

/// Return true iff x > 0.0 and comparable (i.e., not NaN).
#[inline]
fn gt0(x: f64) -> bool {
    x.partial_cmp(&0.0) == Some(Greater)
}

/// Return true iff x >= 0.0 and comparable (i.e., not NaN).
#[inline]
fn ge0(x: f64) -> bool {
    matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
}

/// Return true iff a <= b and comparable (i.e., not NaN).
#[inline]
fn le(a: f64, b: f64) -> bool {
    matches!(a.partial_cmp(&b), Some(Less) | Some(Equal))
}

impl ForecastParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a [`ForecastParamsBuilder`] initialized with the default values.
    pub fn builder() -> ForecastParamsBuilder {
        ForecastParamsBuilder::new()
    }

    /// Total number of time-grid nodes, `round(steps_per_year × years_forward)`.
    pub fn n_time_points(&self) -> usize {
        (self.steps_per_year as f64 * self.years_forward).round() as usize
    }

    /// Probability mass of one sample, `1 / n_samples`.
    pub fn sample_weight(&self) -> f64 {
        1.0 / self.n_samples as f64
    }

    /// Check the whole parameter set.
    ///
    /// Called by [`ForecastParamsBuilder::build`] and again at the start of every forecast run,
    /// since the fields are public and can be edited after building.
    ///
    /// Validation rules
    /// -----------------
    /// * `n_samples ≥ 1`.
    /// * `years_forward > 0`, finite; `steps_per_year ≥ 1`; the grid must have at least two
    ///   nodes (`round(steps_per_year × years_forward) ≥ 2`).
    /// * `threshold_distance ≥ 0`, finite. Zero is accepted and never detects anything.
    /// * `bandwidth > 0`, finite.
    /// * `grid` must be a valid [`GridSpec`].
    /// * `0 ≤ max_skipped_fraction ≤ 1`.
    ///
    /// Return
    /// ----------
    /// * [`ImpactError::InvalidForecastParameter`] / [`ImpactError::InvalidSampleCount`] /
    ///   [`ImpactError::InvalidBandwidth`] / [`ImpactError::InvalidGridSpec`] naming the first
    ///   failed rule.
    pub fn validate(&self) -> Result<(), ImpactError> {
        if self.n_samples == 0 {
            return Err(ImpactError::InvalidSampleCount(self.n_samples));
        }

        if !(gt0(self.years_forward) && self.years_forward.is_finite()) {
            return Err(ImpactError::InvalidForecastParameter(
                "years_forward must be finite and > 0".into(),
            ));
        }
        if self.steps_per_year == 0 {
            return Err(ImpactError::InvalidForecastParameter(
                "steps_per_year must be >= 1".into(),
            ));
        }
        if self.n_time_points() < 2 {
            return Err(ImpactError::InvalidForecastParameter(format!(
                "steps_per_year × years_forward must give at least 2 time points, got {}",
                self.n_time_points()
            )));
        }

        if !(ge0(self.threshold_distance) && self.threshold_distance.is_finite()) {
            return Err(ImpactError::InvalidForecastParameter(
                "threshold_distance must be finite and >= 0".into(),
            ));
        }

        if !(gt0(self.bandwidth) && self.bandwidth.is_finite()) {
            return Err(ImpactError::InvalidBandwidth(self.bandwidth));
        }
        self.grid.validate()?;

        if !(ge0(self.max_skipped_fraction) && le(self.max_skipped_fraction, 1.0)) {
            return Err(ImpactError::InvalidForecastParameter(
                "require 0 <= max_skipped_fraction <= 1".into(),
            ));
        }

        Ok(())
    }
}

impl Default for ForecastParams {
    fn default() -> Self {
        ForecastParams {
            n_samples: 1000,
            years_forward: 10.0,
            steps_per_year: 365,
            threshold_distance: 1.01,
            detection_policy: DetectionPolicy::FirstCrossing,
            bandwidth: 5.0,
            grid: GridSpec::default(),
            max_skipped_fraction: 0.05,
        }
    }
}

/// Builder for [`ForecastParams`], with validation.
#[derive(Debug, Clone)]
pub struct ForecastParamsBuilder {
    params: ForecastParams,
}

impl Default for ForecastParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: ForecastParams::default(),
        }
    }

    pub fn n_samples(mut self, v: usize) -> Self {
        self.params.n_samples = v;
        self
    }
    pub fn years_forward(mut self, v: f64) -> Self {
        self.params.years_forward = v;
        self
    }
    pub fn steps_per_year(mut self, v: usize) -> Self {
        self.params.steps_per_year = v;
        self
    }
    pub fn threshold_distance(mut self, v: f64) -> Self {
        self.params.threshold_distance = v;
        self
    }
    pub fn detection_policy(mut self, v: DetectionPolicy) -> Self {
        self.params.detection_policy = v;
        self
    }
    pub fn bandwidth(mut self, v: f64) -> Self {
        self.params.bandwidth = v;
        self
    }
    pub fn grid(mut self, v: GridSpec) -> Self {
        self.params.grid = v;
        self
    }
    pub fn max_skipped_fraction(mut self, v: f64) -> Self {
        self.params.max_skipped_fraction = v;
        self
    }

    /// Finalize the builder, checking the set with [`ForecastParams::validate`].
    pub fn build(self) -> Result<ForecastParams, ImpactError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

impl fmt::Display for ForecastParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            const PARAM_COL: usize = 50;
            writeln!(f, "Impact Forecast Parameters")?;
            writeln!(f, "--------------------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.chars().count() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.chars().count())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            writeln!(f, "[Monte Carlo]")?;
            line!(
                "n_samples            = {}",
                self.n_samples,
                "Number of sampled initial states"
            )?;

            writeln!(f, "\n[Time grid]")?;
            line!(
                "years_forward        = {:.3} yr",
                self.years_forward,
                "Propagation horizon"
            )?;
            line!(
                "steps_per_year       = {}",
                self.steps_per_year,
                "Grid nodes per year"
            )?;
            line!(
                "n_time_points        = {}",
                self.n_time_points(),
                "Total grid nodes, epoch included"
            )?;

            writeln!(f, "\n[Detection]")?;
            line!(
                "threshold_distance   = {:.4} AU",
                self.threshold_distance,
                "Close-approach distance"
            )?;
            line!(
                "detection_policy     = {}",
                self.detection_policy,
                "Events recorded per sample"
            )?;

            writeln!(f, "\n[Density]")?;
            line!(
                "bandwidth            = {:.3} deg",
                self.bandwidth,
                "Gaussian kernel standard deviation"
            )?;
            line!("grid                 = {}", self.grid, "Evaluation grid")?;

            writeln!(f, "\n[Batch health]")?;
            line!(
                "max_skipped_fraction = {:.3}",
                self.max_skipped_fraction,
                "Warn above this dropped-sample fraction"
            )?;

            Ok(())
        } else {
            write!(
                f,
                "ForecastParams(n_samples={}, years_forward={:.2}, steps_per_year={}, threshold={:.4}AU, policy={}, bandwidth={:.2}°, grid={}×{})",
                self.n_samples,
                self.years_forward,
                self.steps_per_year,
                self.threshold_distance,
                self.detection_policy,
                self.bandwidth,
                self.grid.lon_resolution,
                self.grid.lat_resolution,
            )
        }
    }
}

#[cfg(test)]
mod test_forecast_params {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = ForecastParams::default();
        assert_eq!(p.n_samples, 1000);
        assert_eq!(p.n_time_points(), 3650);
        assert_eq!(p.threshold_distance, 1.01);
        assert_eq!(p.bandwidth, 5.0);
        assert_eq!(p.detection_policy, DetectionPolicy::FirstCrossing);
        assert_eq!(p.grid.shape(), (100, 50));
        assert_eq!(ForecastParams::builder().build().unwrap(), p);
    }

    #[test]
    fn test_builder_overrides() {
        let p = ForecastParams::builder()
            .n_samples(10)
            .years_forward(0.5)
            .steps_per_year(12)
            .threshold_distance(0.0)
            .detection_policy(DetectionPolicy::AllCrossings)
            .build()
            .unwrap();
        assert_eq!(p.n_time_points(), 6);
        assert_eq!(p.sample_weight(), 0.1);
        assert_eq!(p.detection_policy, DetectionPolicy::AllCrossings);
    }

    #[test]
    fn test_builder_rejections() {
        assert_eq!(
            ForecastParams::builder().n_samples(0).build(),
            Err(ImpactError::InvalidSampleCount(0))
        );
        assert_eq!(
            ForecastParams::builder().bandwidth(0.0).build(),
            Err(ImpactError::InvalidBandwidth(0.0))
        );
        assert!(matches!(
            ForecastParams::builder().years_forward(f64::NAN).build(),
            Err(ImpactError::InvalidForecastParameter(_))
        ));
        assert!(matches!(
            ForecastParams::builder()
                .years_forward(0.001)
                .steps_per_year(1)
                .build(),
            Err(ImpactError::InvalidForecastParameter(_))
        ));
        assert!(matches!(
            ForecastParams::builder().threshold_distance(-1.0).build(),
            Err(ImpactError::InvalidForecastParameter(_))
        ));
        assert!(matches!(
            ForecastParams::builder().max_skipped_fraction(1.5).build(),
            Err(ImpactError::InvalidForecastParameter(_))
        ));
        assert!(matches!(
            ForecastParams::builder()
                .grid(GridSpec {
                    lon_resolution: 0,
                    ..GridSpec::default()
                })
                .build(),
            Err(ImpactError::InvalidGridSpec(_))
        ));
    }

    #[test]
    fn test_validate_catches_edits_after_build() {
        let mut p = ForecastParams::builder().build().unwrap();
        assert_eq!(p.validate(), Ok(()));

        p.threshold_distance = f64::NAN;
        assert!(matches!(
            p.validate(),
            Err(ImpactError::InvalidForecastParameter(_))
        ));

        p.threshold_distance = 0.5;
        p.bandwidth = -2.0;
        assert_eq!(p.validate(), Err(ImpactError::InvalidBandwidth(-2.0)));
    }

    #[test]
    fn test_display_forms() {
        let p = ForecastParams::default();
        let compact = format!("{p}");
        assert!(compact.starts_with("ForecastParams(n_samples=1000"));

        let table = format!("{p:#}");
        assert!(table.contains("[Detection]"));
        assert!(table.contains("n_time_points        = 3650"));
        assert!(table.contains("first-crossing"));
    }
}
