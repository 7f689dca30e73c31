//! # Impact forecast pipeline
//!
//! [`ImpactForecast::run`] chains the whole Monte Carlo procedure for one object:
//!
//! 1. **Time grid** – `n_time_points` nodes from the epoch to `epoch + years_forward`.
//! 2. **Reference table** – the body position at every step, computed once and shared.
//! 3. **Sampling** – `n_samples` initial states drawn sequentially from the caller's RNG.
//! 4. **Propagation & detection** – every sample is propagated and scanned for close
//!    approaches independently, in parallel (`rayon`), results collected in sample order.
//! 5. **Aggregation** – event lists flattened; failed samples skipped and counted.
//! 6. **Density** – the weighted events are turned into a normalized probability grid.
//!
//! With the same seed, inputs and parameters, two runs return bit-identical grids: all
//! randomness is consumed before the parallel stage and the density is evaluated cell by cell
//! in a fixed order.
//!
//! ### Progress UI (feature: `progress`)
//! When compiled with the `progress` feature, the propagation stage renders a live progress bar
//! (via `indicatif`).
//!
//! ## Example
//!
//! ```rust
//! use nalgebra::Vector3;
//! use neo_impact::forecast::{ForecastParams, ImpactForecast};
//! use neo_impact::orbit_type::{uncertainty::UncertaintyModel, OrbitalState};
//! use neo_impact::reference_body::FixedBody;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let earth = FixedBody::new(Vector3::new(1.0, 0.0, 0.0));
//! let model = UncertaintyModel::certain(OrbitalState::at_rest(earth.position)).unwrap();
//! let params = ForecastParams::builder()
//!     .n_samples(10)
//!     .years_forward(1.0)
//!     .threshold_distance(0.01)
//!     .build()
//!     .unwrap();
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let forecast = ImpactForecast::run(&model, 2451545.0, &earth, &params, &mut rng).unwrap();
//! assert_eq!(forecast.impacting_samples(), 10);
//! ```
use std::fmt;

use itertools::Itertools;
use log::{debug, info, warn};
use nalgebra::Vector3;
use rand::Rng;
use rayon::prelude::*;

#[cfg(feature = "progress")]
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};

use crate::constants::{Degree, JulianDate};
use crate::density::{self, ProbabilityGrid};
use crate::impact::aggregator::{ImpactAggregate, SampleFailure};
use crate::impact::detector::detect;
use crate::impact::validation::{ImpactArchive, ValidationReport};
use crate::impact::ImpactEvent;
use crate::impact_errors::ImpactError;
use crate::orbit_type::uncertainty::UncertaintyModel;
use crate::orbit_type::OrbitalState;
use crate::propagation::rectilinear::RectilinearPropagator;
use crate::propagation::{Propagator, Trajectory};
use crate::reference_body::ReferenceBody;
use crate::state_sampler::sample_states;
use crate::time::TimeGrid;

pub mod params;
pub mod timing;

pub use params::{ForecastParams, ForecastParamsBuilder};
use timing::StageTimer;

/// Result of an impact forecast run.
///
/// Fields
/// -----------------
/// * `time_grid`: Grid shared by every propagation.
/// * `trajectories`: Trajectories of the samples that were not skipped, in sample order.
/// * `events`: Flattened impact events, in sample order.
/// * `grid`: Normalized impact probability surface.
/// * `impacting_samples`: Samples that produced at least one event.
/// * `skipped_samples`: Samples dropped because of a non-finite state or trajectory.
/// * `n_samples`: Samples drawn.
/// * `timings`: Wall-clock duration of every stage.
#[derive(Debug, Clone)]
pub struct ImpactForecast {
    pub time_grid: TimeGrid,
    pub trajectories: Vec<Trajectory>,
    pub events: Vec<ImpactEvent>,
    pub grid: ProbabilityGrid,
    impacting_samples: usize,
    pub skipped_samples: usize,
    pub n_samples: usize,
    pub timings: StageTimer,
}

/// Propagate one sample and detect its close approaches.
fn run_sample<P: Propagator + ?Sized>(
    state: &OrbitalState,
    propagator: &P,
    times: &TimeGrid,
    reference_positions: &[Vector3<f64>],
    params: &ForecastParams,
) -> Result<(Trajectory, Vec<ImpactEvent>), SampleFailure> {
    if !state.is_finite() {
        return Err(SampleFailure::NonFiniteState);
    }
    let trajectory = propagator.propagate(state, times);
    if !trajectory.is_finite() {
        return Err(SampleFailure::NonFiniteTrajectory);
    }
    let events = detect(
        &trajectory,
        times,
        reference_positions,
        params.threshold_distance,
        params.sample_weight(),
        params.detection_policy,
    )
    .map_err(|e| SampleFailure::Detection(e.to_string()))?;
    Ok((trajectory, events))
}

#[cfg(feature = "progress")]
fn sample_progress_bar(n_samples: usize) -> ProgressBar {
    let pb = ProgressBar::new(n_samples.max(1) as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | {per_sec} | ETA {eta_precise} | {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_message("propagating samples");
    pb
}

impl ImpactForecast {
    /// Run the full forecast with the rectilinear propagator.
    ///
    /// Arguments
    /// -----------------
    /// * `model`: Mean initial state and covariance (AU, AU/year).
    /// * `epoch_jd`: Epoch of the initial state, first node of the time grid.
    /// * `body`: Reference body scanned for close approaches.
    /// * `params`: Validated run parameters.
    /// * `rng`: Random source of the state draws.
    ///
    /// Return
    /// ----------
    /// * The forecast, or the first input error. Parameters are checked with
    ///   [`ForecastParams::validate`] before any sample is drawn, then the reference body is
    ///   tabulated. Individual sample failures never abort the run.
    pub fn run<B>(
        model: &UncertaintyModel,
        epoch_jd: JulianDate,
        body: &B,
        params: &ForecastParams,
        rng: &mut impl Rng,
    ) -> Result<Self, ImpactError>
    where
        B: ReferenceBody + ?Sized,
    {
        Self::run_with(&RectilinearPropagator, model, epoch_jd, body, params, rng)
    }

    /// Run the full forecast with an arbitrary [`Propagator`].
    pub fn run_with<P, B>(
        propagator: &P,
        model: &UncertaintyModel,
        epoch_jd: JulianDate,
        body: &B,
        params: &ForecastParams,
        rng: &mut impl Rng,
    ) -> Result<Self, ImpactError>
    where
        P: Propagator + ?Sized,
        B: ReferenceBody + ?Sized,
    {
        params.validate()?;
        let mut timer = StageTimer::new();
        info!("Starting impact forecast: {params}");

        let time_grid = TimeGrid::spanning(epoch_jd, params.years_forward, params.n_time_points())?;
        let reference_positions = body.positions_on(&time_grid)?;
        timer.lap("setup");
        debug!(
            "Time grid: {} nodes from JD {:.3}, reference table ready",
            time_grid.len(),
            time_grid.epoch()
        );

        let states = sample_states(model, params.n_samples, rng)?;
        let dt = timer.lap("sampling");
        info!("Drew {} initial states in {}", states.len(), timing::fmt_dur(dt));

        let per_sample =
            |state: &OrbitalState| run_sample(state, propagator, &time_grid, &reference_positions, params);

        #[cfg(feature = "progress")]
        let outcomes: Vec<_> = {
            let pb = sample_progress_bar(states.len());
            let outcomes: Vec<_> = states
                .par_iter()
                .progress_with(pb.clone())
                .map(per_sample)
                .collect();
            pb.finish_and_clear();
            outcomes
        };
        #[cfg(not(feature = "progress"))]
        let outcomes: Vec<_> = states.par_iter().map(per_sample).collect();

        let mut trajectories = Vec::with_capacity(outcomes.len());
        let aggregate = ImpactAggregate::collect(outcomes.into_iter().enumerate().map(
            |(idx, outcome)| {
                outcome
                    .map(|(trajectory, events)| {
                        trajectories.push(trajectory);
                        events
                    })
                    .inspect_err(|failure| debug!("Sample {idx} skipped: {failure}"))
            },
        ));
        let dt = timer.lap("propagation");
        info!(
            "Propagated {} samples in {}: {} impacting, {} events, {} skipped",
            params.n_samples,
            timing::fmt_dur(dt),
            aggregate.impacting_samples,
            aggregate.events.len(),
            aggregate.skipped_samples
        );

        let skipped_fraction = aggregate.skipped_samples as f64 / params.n_samples as f64;
        if skipped_fraction > params.max_skipped_fraction {
            warn!(
                "{} of {} samples skipped ({:.1}%), above the {:.1}% tolerance",
                aggregate.skipped_samples,
                params.n_samples,
                100.0 * skipped_fraction,
                100.0 * params.max_skipped_fraction
            );
        }

        let grid = density::estimate(&aggregate.events, &params.grid, params.bandwidth)?;
        let dt = timer.lap("density");
        info!(
            "Evaluated {}×{} probability grid in {}",
            grid.longitude_axis.len(),
            grid.latitude_axis.len(),
            timing::fmt_dur(dt)
        );
        info!("Impact forecast done ({timer})");

        Ok(ImpactForecast {
            time_grid,
            trajectories,
            events: aggregate.events,
            grid,
            impacting_samples: aggregate.impacting_samples,
            skipped_samples: aggregate.skipped_samples,
            n_samples: params.n_samples,
            timings: timer,
        })
    }

    /// Sum of the event weights. Under
    /// [`DetectionPolicy::FirstCrossing`](crate::impact::DetectionPolicy::FirstCrossing) this is the fraction
    /// of samples that impacted.
    pub fn impact_probability(&self) -> f64 {
        self.events.iter().map(|e| e.weight).sum()
    }

    /// Samples with at least one event.
    pub fn impacting_samples(&self) -> usize {
        self.impacting_samples
    }

    /// `(longitude, latitude)` of the grid maximum, `None` when nothing impacted.
    pub fn peak(&self) -> Option<(Degree, Degree)> {
        self.grid.peak()
    }

    /// The first `max` trajectories, for visualization.
    pub fn trajectory_bundle(&self, max: usize) -> &[Trajectory] {
        &self.trajectories[..max.min(self.trajectories.len())]
    }

    /// Compare the forecast with the recorded impact of `neo_id`, if any.
    ///
    /// Return
    /// ----------
    /// * `None` when the archive has no record, the lookup fails (logged with `warn!`),
    ///   or no event was predicted.
    pub fn validate<A>(&self, neo_id: &str, archive: &A) -> Option<ValidationReport>
    where
        A: ImpactArchive + ?Sized,
    {
        let record = match archive.lookup(neo_id) {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("No recorded impact for {neo_id}");
                return None;
            }
            Err(err) => {
                warn!("Impact record lookup for {neo_id} failed, skipping validation: {err}");
                return None;
            }
        };

        match record.impact_jd() {
            Ok(Some(jd)) if !self.time_grid.covers(jd) => warn!(
                "Recorded impact of {neo_id} at JD {jd:.3} lies outside the forecast horizon"
            ),
            Ok(_) => {}
            Err(err) => debug!("Unreadable impact time for {neo_id}: {err}"),
        }

        let report = ValidationReport::compare(&self.events, &record);
        match &report {
            Some(r) => info!("Validation of {neo_id}: {r}"),
            None => debug!("No predicted impact to validate for {neo_id}"),
        }
        report
    }

    /// Distinct impacting latitudes/longitudes rounded to `decimals`, for quick inspection.
    pub fn distinct_impact_sites(&self, decimals: i32) -> Vec<(Degree, Degree)> {
        let scale = 10f64.powi(decimals);
        self.events
            .iter()
            .map(|e| {
                (
                    (e.latitude * scale).round() / scale,
                    (e.longitude * scale).round() / scale,
                )
            })
            .unique_by(|&(lat, lon)| (lat.to_bits(), lon.to_bits()))
            .collect()
    }
}

impl fmt::Display for ImpactForecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let peak = match self.peak() {
            Some((lon, lat)) => format!("({lat:+.2}°, {lon:+.2}°)"),
            None => "none".to_string(),
        };
        if f.alternate() {
            writeln!(f, "Impact Forecast")?;
            writeln!(f, "---------------")?;
            writeln!(
                f,
                "  time grid          : {} nodes, JD {:.3} → {:.3}",
                self.time_grid.len(),
                self.time_grid.epoch(),
                self.time_grid.as_slice()[self.time_grid.len() - 1]
            )?;
            writeln!(f, "  samples            : {}", self.n_samples)?;
            writeln!(f, "  skipped samples    : {}", self.skipped_samples)?;
            writeln!(f, "  impacting samples  : {}", self.impacting_samples)?;
            writeln!(f, "  impact events      : {}", self.events.len())?;
            writeln!(f, "  impact probability : {:.6}", self.impact_probability())?;
            writeln!(
                f,
                "  grid               : {}×{}",
                self.grid.longitude_axis.len(),
                self.grid.latitude_axis.len()
            )?;
            writeln!(f, "  peak (lat, lon)    : {peak}")?;
            write!(f, "  timings            : {}", self.timings)
        } else {
            write!(
                f,
                "ImpactForecast(samples={}, impacting={}, events={}, skipped={}, P={:.4}, peak={})",
                self.n_samples,
                self.impacting_samples,
                self.events.len(),
                self.skipped_samples,
                self.impact_probability(),
                peak
            )
        }
    }
}

#[cfg(test)]
mod test_forecast {
    use super::*;
    use crate::impact::validation::{ImpactRecord, NoArchive};
    use crate::impact::DetectionPolicy;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::reference_body::FixedBody;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn small_params() -> ForecastParams {
        ForecastParams::builder()
            .n_samples(8)
            .years_forward(1.0)
            .steps_per_year(12)
            .threshold_distance(0.01)
            .build()
            .unwrap()
    }

    fn certain_hit() -> (UncertaintyModel, FixedBody) {
        let body = FixedBody::new(Vector3::new(0.3, -0.2, 0.1));
        let model = UncertaintyModel::certain(OrbitalState::at_rest(body.position)).unwrap();
        (model, body)
    }

    #[test]
    fn test_certain_hit_counts() {
        let (model, body) = certain_hit();
        let mut rng = StdRng::seed_from_u64(1);
        let forecast = ImpactForecast::run(&model, 2451545.0, &body, &small_params(), &mut rng).unwrap();

        assert_eq!(forecast.n_samples, 8);
        assert_eq!(forecast.skipped_samples, 0);
        assert_eq!(forecast.impacting_samples(), 8);
        assert_eq!(forecast.events.len(), 8);
        assert_relative_eq!(forecast.impact_probability(), 1.0, epsilon = 1e-12);
        assert_eq!(forecast.trajectories.len(), 8);
        assert_eq!(forecast.trajectories[0].len(), 11);
        assert_eq!(forecast.trajectory_bundle(3).len(), 3);
        assert_eq!(forecast.trajectory_bundle(100).len(), 8);
        assert_eq!(forecast.distinct_impact_sites(3), vec![(0.0, 0.0)]);
    }

    #[test]
    fn test_all_crossings_policy() {
        let (model, body) = certain_hit();
        let params = ForecastParams::builder()
            .n_samples(4)
            .years_forward(1.0)
            .steps_per_year(12)
            .threshold_distance(0.01)
            .detection_policy(DetectionPolicy::AllCrossings)
            .build()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let forecast = ImpactForecast::run(&model, 2451545.0, &body, &params, &mut rng).unwrap();

        assert_eq!(forecast.impacting_samples(), 4);
        assert_eq!(forecast.events.len(), 4 * 11);
        assert_relative_eq!(forecast.impact_probability(), 11.0, epsilon = 1e-12);
    }

    #[test]
    fn test_miss_gives_zero_grid() {
        let body = FixedBody::new(Vector3::new(50.0, 0.0, 0.0));
        let model = UncertaintyModel::isotropic(
            OrbitalState::at_rest(Vector3::new(1.0, 0.0, 0.0)),
            1e-4,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let forecast = ImpactForecast::run(&model, 2451545.0, &body, &small_params(), &mut rng).unwrap();

        assert!(forecast.events.is_empty());
        assert!(forecast.grid.is_all_zero());
        assert_eq!(forecast.peak(), None);
        assert!(forecast.validate("x", &NoArchive).is_none());
        assert!(forecast.to_string().contains("peak=none"));
    }

    #[test]
    fn test_validate_degrades_on_lookup_failure() {
        let (model, body) = certain_hit();
        let mut rng = StdRng::seed_from_u64(3);
        let forecast = ImpactForecast::run(&model, 2451545.0, &body, &small_params(), &mut rng).unwrap();

        let failing = |_: &str| -> Result<Option<ImpactRecord>, ImpactError> {
            Err(ImpactError::ImpactArchive("service unavailable".into()))
        };
        assert!(forecast.validate("2008 TC3", &failing).is_none());

        let known = |_: &str| -> Result<Option<ImpactRecord>, ImpactError> {
            Ok(Some(ImpactRecord {
                latitude: 0.0,
                longitude: 3.0,
                time: None,
            }))
        };
        let report = forecast.validate("2008 TC3", &known).unwrap();
        assert_relative_eq!(report.error_degrees, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reference_body_error_is_fatal() {
        let (model, _) = certain_hit();
        let table = crate::reference_body::TabulatedEphemeris::new(vec![
            (2451545.0, Vector3::zeros()),
            (2451546.0, Vector3::zeros()),
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            ImpactForecast::run(&model, 2451545.0, &table, &small_params(), &mut rng),
            Err(ImpactError::EphemerisOutOfRange(_))
        ));
    }

    /// Rectilinear motion, counting every call.
    #[derive(Default)]
    struct CountingPropagator {
        calls: AtomicUsize,
    }

    impl Propagator for CountingPropagator {
        fn propagate(&self, state: &OrbitalState, times: &TimeGrid) -> Trajectory {
            self.calls.fetch_add(1, Ordering::SeqCst);
            RectilinearPropagator.propagate(state, times)
        }
    }

    #[test]
    fn test_bad_params_fail_before_any_propagation() {
        let (model, body) = certain_hit();
        let propagator = CountingPropagator::default();

        let mut params = small_params();
        params.n_samples = 50;
        params.bandwidth = -2.0;
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            ImpactForecast::run_with(&propagator, &model, 2451545.0, &body, &params, &mut rng)
                .unwrap_err(),
            ImpactError::InvalidBandwidth(-2.0)
        );
        assert_eq!(propagator.calls.load(Ordering::SeqCst), 0);

        let mut params = small_params();
        params.threshold_distance = f64::NAN;
        assert!(matches!(
            ImpactForecast::run_with(&propagator, &model, 2451545.0, &body, &params, &mut rng),
            Err(ImpactError::InvalidForecastParameter(_))
        ));
        assert_eq!(propagator.calls.load(Ordering::SeqCst), 0);

        ImpactForecast::run_with(&propagator, &model, 2451545.0, &body, &small_params(), &mut rng)
            .unwrap();
        assert_eq!(propagator.calls.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn test_display_forms() {
        let (model, body) = certain_hit();
        let mut rng = StdRng::seed_from_u64(3);
        let forecast = ImpactForecast::run(&model, 2451545.0, &body, &small_params(), &mut rng).unwrap();

        assert!(format!("{forecast}").starts_with("ImpactForecast(samples=8, impacting=8"));
        let table = format!("{forecast:#}");
        assert!(table.contains("impact probability : 1.000000"));
        assert!(table.contains("timings"));
    }
}
