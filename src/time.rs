//! # Time grid shared by every propagation of a run
//!
//! A [`TimeGrid`] is an ordered, strictly increasing sequence of Julian Dates
//! spanning an epoch up to `epoch + horizon`. Its first node is the epoch of the
//! sampled states; every later node yields one trajectory position.
//!
//! Calendar strings (impact records, observation logs) are turned into Julian Dates
//! with [`hifitime`], see [`utc_str_to_jd`].
use std::str::FromStr;

use hifitime::Epoch;

use crate::constants::{JulianDate, DAYS_PER_JULIAN_YEAR};
use crate::impact_errors::ImpactError;

/// Ordered sequence of Julian Dates, strictly increasing, at least one node long.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<JulianDate>,
}

impl TimeGrid {
    /// Build a time grid from explicit Julian Dates.
    ///
    /// Arguments
    /// -----------------
    /// * `times`: Julian Dates, strictly increasing.
    ///
    /// Return
    /// ----------
    /// * The grid, [`ImpactError::EmptyTimeGrid`] for an empty input, or
    ///   [`ImpactError::NonMonotonicTimeGrid`] with the first offending index.
    pub fn new(times: Vec<JulianDate>) -> Result<Self, ImpactError> {
        if times.is_empty() {
            return Err(ImpactError::EmptyTimeGrid);
        }
        if let Some(idx) = times
            .windows(2)
            .position(|w| !(w[1] > w[0]) || !w[1].is_finite())
        {
            return Err(ImpactError::NonMonotonicTimeGrid(idx + 1));
        }
        if !times[0].is_finite() {
            return Err(ImpactError::NonMonotonicTimeGrid(0));
        }
        Ok(TimeGrid { times })
    }

    /// Evenly spaced grid from `epoch_jd` to `epoch_jd + years_forward` Julian years,
    /// both endpoints included.
    ///
    /// Arguments
    /// -----------------
    /// * `epoch_jd`: First node of the grid (JD, UTC).
    /// * `years_forward`: Horizon in Julian years (365.25 days).
    /// * `n_points`: Total number of nodes, including both endpoints.
    ///
    /// Return
    /// ----------
    /// * The grid. `n_points == 0` is rejected with [`ImpactError::EmptyTimeGrid`];
    ///   `n_points == 1` yields the epoch alone.
    pub fn spanning(
        epoch_jd: JulianDate,
        years_forward: f64,
        n_points: usize,
    ) -> Result<Self, ImpactError> {
        if n_points == 0 {
            return Err(ImpactError::EmptyTimeGrid);
        }
        if n_points == 1 {
            return TimeGrid::new(vec![epoch_jd]);
        }

        let step = years_forward * DAYS_PER_JULIAN_YEAR / (n_points - 1) as f64;

        let times = (0..n_points)
            .map(|i| epoch_jd + step * i as f64)
            .collect();
        TimeGrid::new(times)
    }

    /// The epoch, i.e. the first node of the grid.
    pub fn epoch(&self) -> JulianDate {
        self.times[0]
    }

    /// Every node after the epoch, one per trajectory position.
    pub fn steps(&self) -> &[JulianDate] {
        &self.times[1..]
    }

    pub fn as_slice(&self) -> &[JulianDate] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Elapsed Julian years between the epoch and `jd`.
    #[inline]
    pub fn years_since_epoch(&self, jd: JulianDate) -> f64 {
        (jd - self.epoch()) / DAYS_PER_JULIAN_YEAR
    }

    /// `true` when `jd` lies between the first and the last node, both included.
    pub fn covers(&self, jd: JulianDate) -> bool {
        self.epoch() <= jd && jd <= self.times[self.times.len() - 1]
    }
}

/// Convert a calendar date string to a Julian Date (UTC).
///
/// Accepts the ISO 8601 forms understood by [`hifitime::Epoch`], e.g.
/// `"2008-10-07T02:46:00 UTC"`.
///
/// Return
/// ----------
/// * The Julian Date, or [`ImpactError::InvalidDate`] with the parser message.
pub fn utc_str_to_jd(date: &str) -> Result<JulianDate, ImpactError> {
    let epoch = Epoch::from_str(date.trim())
        .map_err(|e| ImpactError::InvalidDate(format!("{date}: {e}")))?;
    Ok(epoch.to_jde_utc_days())
}

#[cfg(test)]
mod test_time_grid {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_grid_rejected() {
        assert_eq!(TimeGrid::new(vec![]), Err(ImpactError::EmptyTimeGrid));
        assert_eq!(
            TimeGrid::spanning(2451545.0, 1.0, 0),
            Err(ImpactError::EmptyTimeGrid)
        );
    }

    #[test]
    fn test_non_monotonic_grid_rejected() {
        assert_eq!(
            TimeGrid::new(vec![1.0, 2.0, 2.0, 3.0]),
            Err(ImpactError::NonMonotonicTimeGrid(2))
        );
        assert_eq!(
            TimeGrid::new(vec![1.0, 0.5]),
            Err(ImpactError::NonMonotonicTimeGrid(1))
        );
    }

    #[test]
    fn test_spanning_includes_endpoints() {
        let grid = TimeGrid::spanning(2451545.0, 2.0, 730).unwrap();
        assert_eq!(grid.len(), 730);
        assert_eq!(grid.steps().len(), 729);
        assert_eq!(grid.epoch(), 2451545.0);
        assert_relative_eq!(
            grid.as_slice()[729],
            2451545.0 + 2.0 * DAYS_PER_JULIAN_YEAR,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_spanning_step_is_plain_day_count() {
        let grid = TimeGrid::spanning(2451545.0, 1.0, 5).unwrap();
        let step = DAYS_PER_JULIAN_YEAR / 4.0;
        for (i, &jd) in grid.as_slice().iter().enumerate() {
            assert_eq!(jd, 2451545.0 + step * i as f64);
        }
        assert!(grid.covers(2451545.0));
        assert!(grid.covers(2451545.0 + 100.0));
        assert!(!grid.covers(2451544.9));
        assert!(!grid.covers(2451545.0 + 366.0));
    }

    #[test]
    fn test_utc_str_to_jd() {
        // 2008-10-07 00:00 UTC is JD 2454746.5
        let jd = utc_str_to_jd("2008-10-07T02:46:00 UTC").unwrap();
        assert_relative_eq!(jd, 2454746.5 + 166.0 / 1440.0, epsilon = 1e-6);

        assert_relative_eq!(
            utc_str_to_jd("2000-01-01T12:00:00 UTC").unwrap(),
            2451545.0,
            epsilon = 1e-6
        );

        assert!(matches!(
            utc_str_to_jd("yesterday"),
            Err(ImpactError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_years_since_epoch() {
        let grid = TimeGrid::new(vec![100.0, 100.0 + 365.25]).unwrap();
        assert_relative_eq!(grid.years_since_epoch(465.25), 1.0);
    }
}
