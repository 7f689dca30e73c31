//! # Aggregation of per-sample impact events
//!
//! The boundary between per-sample detection (run in parallel) and the global density
//! estimate. [`aggregate`] flattens event lists in sample order; [`ImpactAggregate::collect`]
//! additionally accepts failed samples, which are skipped and counted instead of aborting
//! the batch.
use std::fmt;

use crate::impact::ImpactEvent;

/// Why a sample was dropped from a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleFailure {
    /// The drawn initial state has NaN or infinite components.
    NonFiniteState,
    /// Propagation produced a NaN or infinite position.
    NonFiniteTrajectory,
    /// Detection rejected the sample's inputs.
    Detection(String),
}

impl fmt::Display for SampleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleFailure::NonFiniteState => write!(f, "non-finite initial state"),
            SampleFailure::NonFiniteTrajectory => write!(f, "non-finite trajectory"),
            SampleFailure::Detection(msg) => write!(f, "detection failed: {msg}"),
        }
    }
}

/// Flatten per-trajectory event lists into one weighted point set, preserving order.
pub fn aggregate<I>(per_trajectory_events: I) -> Vec<ImpactEvent>
where
    I: IntoIterator<Item = Vec<ImpactEvent>>,
{
    per_trajectory_events.into_iter().flatten().collect()
}

/// Flattened events of a batch, with sample bookkeeping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImpactAggregate {
    pub events: Vec<ImpactEvent>,
    /// Samples with at least one event.
    pub impacting_samples: usize,
    /// Samples dropped because of a [`SampleFailure`].
    pub skipped_samples: usize,
}

impl ImpactAggregate {
    /// Collect per-sample outcomes in sample order, skipping and counting failures.
    pub fn collect<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = Result<Vec<ImpactEvent>, SampleFailure>>,
    {
        outcomes
            .into_iter()
            .fold(ImpactAggregate::default(), |mut acc, outcome| {
                match outcome {
                    Ok(events) => {
                        if !events.is_empty() {
                            acc.impacting_samples += 1;
                        }
                        acc.events.extend(events);
                    }
                    Err(_) => acc.skipped_samples += 1,
                }
                acc
            })
    }

    /// Sum of event weights, i.e. the estimated impact probability under first-crossing detection.
    pub fn total_weight(&self) -> f64 {
        total_weight(&self.events)
    }
}

/// Sum of the weights of `events`.
pub fn total_weight(events: &[ImpactEvent]) -> f64 {
    events.iter().map(|e| e.weight).sum()
}
