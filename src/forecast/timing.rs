//! Wall-clock timing of the pipeline stages.
//!
//! * [`StageTimer`] – Records the duration of each named stage of a run, in order.
//! * [`fmt_dur`] – Human-readable formatter for [`Duration`] values, producing strings
//!   like `"253µs"`, `"42ms"` or `"3.14s"` depending on the scale.
use std::fmt;
use std::time::{Duration, Instant};

/// Durations of consecutive pipeline stages.
#[derive(Debug, Clone)]
pub struct StageTimer {
    start: Instant,
    last: Instant,
    stages: Vec<(&'static str, Duration)>,
}

impl Default for StageTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl StageTimer {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            stages: Vec::new(),
        }
    }

    /// Close the current stage under `name` and return its duration.
    #[inline]
    pub fn lap(&mut self, name: &'static str) -> Duration {
        let now = Instant::now();
        let dt = now.duration_since(self.last);
        self.last = now;
        self.stages.push((name, dt));
        dt
    }

    /// Time since the timer was created.
    pub fn total(&self) -> Duration {
        self.last.duration_since(self.start)
    }

    pub fn stages(&self) -> &[(&'static str, Duration)] {
        &self.stages
    }
}

impl fmt::Display for StageTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, dt) in &self.stages {
            write!(f, "{name}: {}, ", fmt_dur(*dt))?;
        }
        write!(f, "total: {}", fmt_dur(self.total()))
    }
}

#[inline]
pub fn fmt_dur(d: Duration) -> String {
    let us = d.as_micros();
    if us < 1_000 {
        format!("{us}µs")
    } else {
        let ms = d.as_millis();
        if ms < 1_000 {
            format!("{ms}ms")
        } else {
            let s = d.as_secs_f32();
            format!("{s:.2}s")
        }
    }
}
