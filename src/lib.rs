//! # neo_impact
//!
//! Monte Carlo forecast of the impact location of a near-Earth object.
//!
//! Starting from a mean orbital state and its covariance, the crate draws perturbed initial
//! states, propagates each of them over a time grid, detects close approaches with a
//! reference body, and turns the weighted impact points into a normalized probability surface
//! over longitude/latitude.
//!
//! ```text
//! UncertaintyModel ─► state_sampler ─► propagation (×N) ─► impact::detector (×N)
//!                                                            │
//!                      density ◄─ impact::aggregator ◄───────┘
//! ```
//!
//! Modules
//! -----------------
//! * [`orbit_type`] – Cartesian states, Keplerian elements, uncertainty model.
//! * [`neo_record`] – Orbit records of NEOs (NASA NeoWs JSON) with default substitution.
//! * [`time`] – Time grid shared by every propagation of a run.
//! * [`state_sampler`] – Seedable multivariate Gaussian sampling of initial states.
//! * [`propagation`] – Trajectory propagators (rectilinear extrapolation).
//! * [`reference_body`] – Positions of the body scanned for close approaches.
//! * [`impact`] – Close-approach detection, aggregation and validation.
//! * [`density`] – Weighted kernel density estimate on a geographic grid.
//! * [`forecast`] – End-to-end pipeline, parameters and report.
pub mod constants;
pub mod density;
pub mod forecast;
pub mod impact;
pub mod impact_errors;
mod kepler;
pub mod neo_record;
pub mod orbit_type;
pub mod propagation;
pub mod reference_body;
pub mod state_sampler;
pub mod time;
