//! Multi-attempt acquisition.
//!
//! The sampler calls a single-shot read a fixed number of times, keeps the
//! successful readings in order, and drops failed attempts without retrying
//! or substituting them. It runs on the caller's thread; the only waits are
//! the inter-sample delays.
use std::time::Duration;

use tracing::{debug, warn};
use vitals_traits::Clock;

use crate::config::SamplingCfg;
use crate::error::VitalsError;

/// Valid readings from one acquisition run.
///
/// Every value is finite. `values.len() + failures == attempts`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    values: Vec<f64>,
    attempts: usize,
    failures: usize,
}

impl SampleSet {
    /// Build a set from already-validated readings (no failed attempts).
    /// Non-finite values are dropped and counted as failures.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut set = Self::default();
        for v in values {
            set.record(Ok(v));
        }
        set
    }

    fn record(&mut self, reading: Result<f64, VitalsError>) {
        self.attempts += 1;
        match reading {
            Ok(v) if v.is_finite() => self.values.push(v),
            _ => self.failures += 1,
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn failures(&self) -> usize {
        self.failures
    }
}

pub struct Sampler<C: Clock> {
    clock: C,
    cfg: SamplingCfg,
}

impl<C: Clock> Sampler<C> {
    pub fn new(clock: C, cfg: SamplingCfg) -> Self {
        Self { clock, cfg }
    }

    pub fn cfg(&self) -> &SamplingCfg {
        &self.cfg
    }

    /// Make exactly `samples` attempts with `read`, pausing `delay` between
    /// them, and return the valid readings.
    ///
    /// Per-attempt failures (timeouts, bus/pin faults, invalid readings) are
    /// counted and skipped. Any other error aborts the run. Fails with
    /// `InsufficientSamples` when fewer than `min_samples` readings survive,
    /// and always when none do.
    pub fn collect<F>(&self, mut read: F) -> Result<SampleSet, VitalsError>
    where
        F: FnMut() -> Result<f64, VitalsError>,
    {
        let mut set = SampleSet::default();
        for attempt in 0..self.cfg.samples {
            if attempt > 0 {
                self.pause(self.cfg.delay);
            }
            match read() {
                Ok(v) if v.is_finite() => set.record(Ok(v)),
                Ok(v) => {
                    debug!(attempt, value = v, "dropping non-finite reading");
                    set.record(Err(VitalsError::InvalidReading(v.to_string())));
                }
                Err(e) if e.is_per_attempt() => {
                    debug!(attempt, error = %e, "dropping failed attempt");
                    set.record(Err(e));
                }
                Err(e) => return Err(e),
            }
        }

        if set.failures > 0 {
            warn!(
                failures = set.failures,
                attempts = set.attempts,
                "some acquisition attempts failed"
            );
        }
        let min = self.cfg.min_samples.max(1);
        if set.len() < min {
            return Err(VitalsError::InsufficientSamples {
                got: set.len(),
                min,
                attempts: set.attempts,
            });
        }
        debug!(valid = set.len(), attempts = set.attempts, "sample set collected");
        Ok(set)
    }

    #[inline]
    fn pause(&self, d: Duration) {
        self.clock.sleep(d);
    }
}
