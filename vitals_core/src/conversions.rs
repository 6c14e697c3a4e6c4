//! `From` implementations bridging `vitals_config` types to `vitals_core` types.

use std::time::Duration;

use crate::config::{RangerCfg, SamplingCfg, ThermometerCfg};
use crate::filter::FilterPolicy;
use crate::runner::{HeightParams, TemperatureParams};

// ── FilterPolicy ─────────────────────────────────────────────────────────────

impl From<vitals_config::FilterSpec> for FilterPolicy {
    fn from(spec: vitals_config::FilterSpec) -> Self {
        use vitals_config::FilterSpec as S;
        match spec {
            S::ZScore { threshold } => FilterPolicy::ZScore { threshold },
            S::Iqr { k } => FilterPolicy::Iqr { k },
            S::StdDevBound { k } => FilterPolicy::StdDevBound { k },
            S::SigmaWindow { k } => FilterPolicy::SigmaWindow { k },
            S::None => FilterPolicy::None,
        }
    }
}

// ── SamplingCfg ──────────────────────────────────────────────────────────────

impl From<&vitals_config::Acquisition> for SamplingCfg {
    fn from(a: &vitals_config::Acquisition) -> Self {
        Self {
            samples: a.samples,
            delay: Duration::from_millis(a.delay_ms),
            min_samples: a.min_samples,
        }
    }
}

// ── Ranger / Thermometer ─────────────────────────────────────────────────────

impl From<&vitals_config::Config> for RangerCfg {
    fn from(c: &vitals_config::Config) -> Self {
        Self {
            trigger_pin: c.pins.trigger,
            echo_pin: c.pins.echo,
            settle: Duration::from_millis(c.ranging.settle_ms),
            trigger_pulse: Duration::from_micros(c.ranging.trigger_pulse_us),
            timeout: Duration::from_millis(c.ranging.timeout_ms),
        }
    }
}

impl From<&vitals_config::Bus> for ThermometerCfg {
    fn from(b: &vitals_config::Bus) -> Self {
        Self {
            address: b.address,
            register: b.register,
        }
    }
}

// ── Run parameters ───────────────────────────────────────────────────────────

impl From<&vitals_config::Config> for HeightParams {
    fn from(c: &vitals_config::Config) -> Self {
        Self {
            ranger: c.into(),
            sampling: (&c.height).into(),
            policy: c.height.filter.into(),
            reference_height_cm: c.ranging.reference_height_cm,
            normalize_inches: c.ranging.normalize_inches,
        }
    }
}

impl From<&vitals_config::Config> for TemperatureParams {
    fn from(c: &vitals_config::Config) -> Self {
        Self {
            sensor: (&c.bus).into(),
            sampling: (&c.temperature).into(),
            policy: c.temperature.filter.into(),
        }
    }
}
