//! # Weighted Gaussian kernel density
//!
//! Isotropic two-dimensional Gaussian kernel over `(longitude, latitude)` in degrees:
//!
//! ```text
//! p(x) = Σ wᵢ · exp(−|x − xᵢ|² / 2h²) / (W · 2πh²),     W = Σ wᵢ
//! ```
//!
//! The density is evaluated in log space with the log-sum-exp trick so that cells far away
//! from every point return a finite, very negative log-density instead of `log(0)`.
//!
//! Points with zero weight contribute nothing and are discarded at fit time. A set whose
//! total weight is zero fits an *empty* model: its log-density is `−∞` everywhere.
use crate::constants::{Degree, DPI};
use crate::impact::ImpactEvent;
use crate::impact_errors::ImpactError;

#[derive(Debug, Clone, PartialEq)]
pub struct KernelDensity {
    /// (longitude, latitude, ln weight) of every point with positive weight
    points: Vec<(Degree, Degree, f64)>,
    bandwidth: f64,
    /// ln(W · 2πh²)
    log_normalization: f64,
}

impl KernelDensity {
    /// Fit the kernel model to weighted impact locations.
    ///
    /// Arguments
    /// -----------------
    /// * `points`: Impact events, longitude/latitude in degrees.
    /// * `bandwidth`: Kernel standard deviation in degrees. Larger values smooth the surface
    ///   and lower the contrast of the peak; smaller values sharpen it but overfit sparse
    ///   impact sets.
    ///
    /// Return
    /// ----------
    /// * The model, [`ImpactError::InvalidBandwidth`] if `bandwidth` is not finite and positive,
    ///   or [`ImpactError::InvalidWeight`] for a negative or non-finite weight.
    pub fn fit(points: &[ImpactEvent], bandwidth: f64) -> Result<Self, ImpactError> {
        if !(bandwidth.is_finite() && bandwidth > 0.0) {
            return Err(ImpactError::InvalidBandwidth(bandwidth));
        }
        if let Some(bad) = points
            .iter()
            .find(|p| !(p.weight.is_finite() && p.weight >= 0.0))
        {
            return Err(ImpactError::InvalidWeight(bad.weight));
        }

        let kept: Vec<(Degree, Degree, f64)> = points
            .iter()
            .filter(|p| p.weight > 0.0)
            .map(|p| (p.longitude, p.latitude, p.weight.ln()))
            .collect();
        let total_weight: f64 = points.iter().map(|p| p.weight).sum();

        let log_normalization = if kept.is_empty() {
            f64::INFINITY
        } else {
            total_weight.ln() + (DPI * bandwidth * bandwidth).ln()
        };

        Ok(KernelDensity {
            points: kept,
            bandwidth,
            log_normalization,
        })
    }

    /// `true` when no point carries weight.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Natural logarithm of the density at `(lon, lat)`.
    pub fn log_density(&self, lon: Degree, lat: Degree) -> f64 {
        if self.is_empty() {
            return f64::NEG_INFINITY;
        }
        let inv_two_h2 = 1.0 / (2.0 * self.bandwidth * self.bandwidth);

        let exponents = self.points.iter().map(|&(plon, plat, log_w)| {
            let d2 = (lon - plon).powi(2) + (lat - plat).powi(2);
            log_w - d2 * inv_two_h2
        });

        log_sum_exp(exponents) - self.log_normalization
    }

    /// Density at `(lon, lat)`.
    pub fn density(&self, lon: Degree, lat: Degree) -> f64 {
        self.log_density(lon, lat).exp()
    }
}

/// `ln Σ exp(xᵢ)`, stable for large negative terms.
fn log_sum_exp<I>(terms: I) -> f64
where
    I: Iterator<Item = f64> + Clone,
{
    let max = terms.clone().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return max;
    }
    max + terms.map(|x| (x - max).exp()).sum::<f64>().ln()
}
