//! # Uncertainty model: mean orbital state + 6×6 covariance
//!
//! The covariance is validated once at construction (finite entries, symmetric,
//! eigenvalues non-negative up to a relative tolerance) and factored as
//! `Σ = L·Lᵀ` with `L = Q·√Λ` from its symmetric eigen-decomposition. Unlike a
//! Cholesky factorization this accepts positive-**semi**definite matrices, so a
//! zero covariance is a valid model whose factor is the zero matrix.
use nalgebra::{Matrix6, Vector6};

use crate::impact_errors::ImpactError;
use crate::orbit_type::OrbitalState;

/// Relative tolerance used for symmetry and eigenvalue-sign checks.
const COVARIANCE_REL_TOL: f64 = 1e-12;

/// Mean state and covariance of the uncertain initial conditions of an object.
#[derive(Debug, Clone, PartialEq)]
pub struct UncertaintyModel {
    mean: OrbitalState,
    covariance: Matrix6<f64>,
    sampling_factor: Matrix6<f64>,
}

impl UncertaintyModel {
    /// Build a model from a mean state and a covariance matrix.
    ///
    /// Arguments
    /// -----------------
    /// * `mean`: Mean state (AU, AU/year).
    /// * `covariance`: 6×6 covariance of `[x, y, z, vx, vy, vz]`.
    ///
    /// Return
    /// ----------
    /// * The model, or [`ImpactError::InvalidCovariance`] when the matrix has non-finite entries,
    ///   is not symmetric, or has a negative eigenvalue.
    pub fn new(mean: OrbitalState, covariance: Matrix6<f64>) -> Result<Self, ImpactError> {
        if !mean.is_finite() {
            return Err(ImpactError::InvalidCovariance(
                "mean state has non-finite components".into(),
            ));
        }
        let sampling_factor = sampling_factor(&covariance)?;
        Ok(UncertaintyModel {
            mean,
            covariance,
            sampling_factor,
        })
    }

    /// Diagonal proxy covariance `variance · I₆`.
    pub fn isotropic(mean: OrbitalState, variance: f64) -> Result<Self, ImpactError> {
        UncertaintyModel::new(mean, Matrix6::identity() * variance)
    }

    /// Model without uncertainty: every draw equals `mean`.
    pub fn certain(mean: OrbitalState) -> Result<Self, ImpactError> {
        UncertaintyModel::new(mean, Matrix6::zeros())
    }

    pub fn mean(&self) -> &OrbitalState {
        &self.mean
    }

    pub fn covariance(&self) -> &Matrix6<f64> {
        &self.covariance
    }

    /// Matrix `L` with `L·Lᵀ = Σ`, mapping standard-normal draws onto the covariance.
    pub fn sampling_factor(&self) -> &Matrix6<f64> {
        &self.sampling_factor
    }

    /// Map a standard-normal vector `z` to a draw `mean + L·z`.
    #[inline]
    pub fn draw_from_standard_normal(&self, z: &Vector6<f64>) -> OrbitalState {
        OrbitalState::from_vector6(&(self.mean.to_vector6() + self.sampling_factor * z))
    }
}

/// Validate the covariance and compute its square-root factor.
fn sampling_factor(covariance: &Matrix6<f64>) -> Result<Matrix6<f64>, ImpactError> {
    if covariance.iter().any(|c| !c.is_finite()) {
        return Err(ImpactError::InvalidCovariance(
            "covariance has non-finite entries".into(),
        ));
    }

    let scale = covariance.amax().max(1.0);
    let tol = COVARIANCE_REL_TOL * scale;

    let asymmetry = (covariance - covariance.transpose()).amax();
    if asymmetry > tol {
        return Err(ImpactError::InvalidCovariance(format!(
            "covariance is not symmetric (max |Σ - Σᵀ| = {asymmetry:e})"
        )));
    }

    if covariance.iter().all(|&c| c == 0.0) {
        return Ok(Matrix6::zeros());
    }

    let eigen = covariance.symmetric_eigen();
    if let Some(min_eig) = eigen.eigenvalues.iter().copied().reduce(f64::min) {
        if min_eig < -tol {
            return Err(ImpactError::InvalidCovariance(format!(
                "covariance is not positive-semidefinite (eigenvalue {min_eig:e})"
            )));
        }
    }

    let sqrt_eig = eigen.eigenvalues.map(|l| l.max(0.0).sqrt());
    Ok(eigen.eigenvectors * Matrix6::from_diagonal(&sqrt_eig))
}
