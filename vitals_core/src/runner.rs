//! One-shot measurement runs: sample, filter, report.
//!
//! Each run owns its sample set and estimate; nothing is carried over to the
//! next run. Run-level failures (`InsufficientSamples`, `AllFiltered`) come
//! back as `eyre::Report` wrapping a `VitalsError`.

use tracing::info;
use vitals_traits::{Clock, DigitalIo, RegisterBus};

use crate::config::{RangerCfg, SamplingCfg, ThermometerCfg};
use crate::error::Result;
use crate::filter::{Estimate, FilterPolicy, estimate_from_mask, retention_mask};
use crate::ranger::Ranger;
use crate::report::{HeightReport, TemperatureReport, height_report, temperature_report};
use crate::sampler::{SampleSet, Sampler};
use crate::thermometer::Thermometer;

#[derive(Debug, Clone)]
pub struct HeightParams {
    pub ranger: RangerCfg,
    pub sampling: SamplingCfg,
    pub policy: FilterPolicy,
    pub reference_height_cm: f64,
    pub normalize_inches: bool,
}

impl Default for HeightParams {
    fn default() -> Self {
        Self {
            ranger: RangerCfg::default(),
            sampling: SamplingCfg::ranging(),
            policy: FilterPolicy::ZScore { threshold: 1.0 },
            reference_height_cm: 200.0,
            normalize_inches: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TemperatureParams {
    pub sensor: ThermometerCfg,
    pub sampling: SamplingCfg,
    pub policy: FilterPolicy,
}

impl Default for TemperatureParams {
    fn default() -> Self {
        Self {
            sensor: ThermometerCfg::default(),
            sampling: SamplingCfg::temperature(),
            policy: FilterPolicy::Iqr { k: 1.5 },
        }
    }
}

/// Outcome of a run: the report plus what it was derived from.
#[derive(Debug, Clone)]
pub struct Measurement<R> {
    pub report: R,
    pub estimate: Estimate,
    pub samples: SampleSet,
    /// Keep/drop decision for each entry of `samples.values()`.
    pub retained: Vec<bool>,
}

fn reduce(samples: &SampleSet, policy: FilterPolicy) -> Result<(Estimate, Vec<bool>)> {
    let mask = retention_mask(samples.values(), policy);
    let estimate = estimate_from_mask(samples.values(), &mask)?;
    Ok((estimate, mask))
}

/// Measure the subject's height with the rangefinder on `io`.
pub fn measure_height<G, C>(
    io: &mut G,
    clock: C,
    params: &HeightParams,
) -> Result<Measurement<HeightReport>>
where
    G: DigitalIo + ?Sized,
    C: Clock,
{
    info!(
        samples = params.sampling.samples,
        policy = params.policy.name(),
        "height measurement start"
    );
    let mut ranger = Ranger::new(io, &clock, params.ranger.clone())?;
    let sampler = Sampler::new(&clock, params.sampling.clone());
    let samples = sampler.collect(|| ranger.measure_distance())?;

    let (estimate, retained) = reduce(&samples, params.policy)?;
    let report = height_report(
        estimate.value,
        params.reference_height_cm,
        params.normalize_inches,
    );
    info!(
        distance_cm = estimate.value,
        height_cm = report.cm,
        retained = estimate.retained,
        rejected = estimate.rejected,
        "height measurement complete"
    );
    Ok(Measurement {
        report,
        estimate,
        samples,
        retained,
    })
}

/// Measure object temperature with the IR thermometer on `bus`.
pub fn measure_temperature<B, C>(
    bus: &mut B,
    clock: C,
    params: &TemperatureParams,
) -> Result<Measurement<TemperatureReport>>
where
    B: RegisterBus + ?Sized,
    C: Clock,
{
    info!(
        samples = params.sampling.samples,
        policy = params.policy.name(),
        "temperature measurement start"
    );
    let mut thermometer = Thermometer::new(bus, params.sensor);
    let sampler = Sampler::new(&clock, params.sampling.clone());
    let samples = sampler.collect(|| thermometer.read_temperature())?;

    let (estimate, retained) = reduce(&samples, params.policy)?;
    let report = temperature_report(estimate.value);
    info!(
        celsius = report.celsius,
        fahrenheit = report.fahrenheit,
        retained = estimate.retained,
        rejected = estimate.rejected,
        "temperature measurement complete"
    );
    Ok(Measurement {
        report,
        estimate,
        samples,
        retained,
    })
}
