//! Measurement commands: backend assembly, CLI overrides, and output.

use std::path::Path;

use eyre::{Result, WrapErr};
use serde_json::json;
use tracing::{info, warn};
use vitals_config::{Config, MAX_SAMPLES};
use vitals_core::config::{RangerCfg, SamplingCfg, ThermometerCfg};
use vitals_core::{
    FilterPolicy, HeightParams, Measurement, Ranger, SampleStats, TemperatureParams, Thermometer,
    measure_height, measure_temperature,
};
use vitals_traits::{DigitalIo, MonotonicClock, RegisterBus};

use crate::cli::AcquisitionArgs;
use crate::rt::setup_rt_once;

// ── Backends ─────────────────────────────────────────────────────────────────

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn open_gpio(_cfg: &Config) -> Result<Box<dyn DigitalIo>> {
    let gpio = vitals_hardware::RpiGpio::open().wrap_err("open GPIO for rangefinder pins")?;
    Ok(Box::new(gpio))
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn open_bus(cfg: &Config) -> Result<Box<dyn RegisterBus>> {
    let bus = vitals_hardware::RpiBus::open(cfg.bus.i2c_bus)
        .wrap_err_with(|| format!("open i2c-{} for IR thermometer", cfg.bus.i2c_bus))?;
    Ok(Box::new(bus))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn open_gpio(cfg: &Config) -> Result<Box<dyn DigitalIo>> {
    use vitals_hardware::{SimGpio, SimTimebase};

    let gpio = SimGpio::new(
        cfg.pins.trigger,
        cfg.pins.echo,
        SimTimebase::Real(MonotonicClock::new()),
    );
    let gpio = if env_flag("VITALS_SIM_ECHO_TIMEOUT") {
        gpio.with_script(vec![None])
    } else {
        let cm = env_parse("VITALS_SIM_DISTANCE_CM", str::parse::<f64>)?.unwrap_or(30.0);
        gpio.with_distance(cm)
    };
    info!(trigger = cfg.pins.trigger, echo = cfg.pins.echo, "using simulated rangefinder");
    Ok(Box::new(gpio))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn open_bus(_cfg: &Config) -> Result<Box<dyn RegisterBus>> {
    use vitals_hardware::SimBus;

    let bus = if env_flag("VITALS_SIM_BUS_FAIL") {
        SimBus::failing()
    } else {
        // 0x3c7b (36.51 C) as it arrives low byte first
        let word = env_parse("VITALS_SIM_RAW_WORD", parse_word)?.unwrap_or(0x7b3c);
        SimBus::new(word)
    };
    info!("using simulated IR thermometer");
    Ok(Box::new(bus))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn env_flag(key: &str) -> bool {
    std::env::var(key).is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn env_parse<T, E>(key: &str, parse: impl Fn(&str) -> std::result::Result<T, E>) -> Result<Option<T>>
where
    E: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => parse(v.trim())
            .map(Some)
            .wrap_err_with(|| format!("{key}: cannot parse {v:?}")),
        Err(_) => Ok(None),
    }
}

/// Decimal or `0x`-prefixed hex register word.
#[cfg(any(test, not(all(feature = "hardware", target_os = "linux"))))]
pub fn parse_word(s: &str) -> std::result::Result<u16, std::num::ParseIntError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    }
}

// ── Overrides ────────────────────────────────────────────────────────────────

/// Apply command-line overrides on top of the config-derived plan.
pub fn apply_overrides(
    sampling: &mut SamplingCfg,
    policy: &mut FilterPolicy,
    args: &AcquisitionArgs,
) -> Result<()> {
    if let Some(n) = args.samples {
        if n == 0 {
            eyre::bail!("--samples must be >= 1");
        }
        if n > MAX_SAMPLES {
            eyre::bail!("--samples is unreasonably large (>{MAX_SAMPLES})");
        }
        sampling.samples = n;
    }
    if let Some(m) = args.min_samples {
        if m == 0 {
            eyre::bail!("--min-samples must be >= 1");
        }
        sampling.min_samples = m;
    }
    if sampling.min_samples > sampling.samples {
        if args.min_samples.is_some() {
            eyre::bail!(
                "--min-samples ({}) must not exceed samples ({})",
                sampling.min_samples,
                sampling.samples
            );
        }
        warn!(
            min_samples = sampling.min_samples,
            samples = sampling.samples,
            "min_samples lowered to the requested sample count"
        );
        sampling.min_samples = sampling.samples;
    }
    if let Some(ms) = args.delay_ms {
        sampling.delay = std::time::Duration::from_millis(ms);
    }
    if let Some(p) = args.policy {
        *policy = p.into();
    }
    if let Some(t) = args.threshold {
        if !(t.is_finite() && t > 0.0) {
            eyre::bail!("--threshold must be a finite value > 0");
        }
        if *policy == FilterPolicy::None {
            warn!("--threshold has no effect with policy none");
        }
        *policy = policy.with_parameter(t);
    }
    Ok(())
}

// ── Output ───────────────────────────────────────────────────────────────────

fn print_stats<R>(m: &Measurement<R>, policy: FilterPolicy) {
    eprintln!(
        "samples: attempts={} valid={} failed={}",
        m.samples.attempts(),
        m.samples.len(),
        m.samples.failures()
    );
    if let Some(s) = SampleStats::from_values(m.samples.values()) {
        eprintln!(
            "raw: mean={:.2} median={:.2} sd={:.3} min={:.2} max={:.2}",
            s.mean, s.median, s.std_dev, s.min, s.max
        );
    }
    eprintln!(
        "filter: policy={} retained={} rejected={} estimate={:.2}",
        policy.name(),
        m.estimate.retained,
        m.estimate.rejected,
        m.estimate.value
    );
}

/// `index,value,retained` for every valid sample, in acquisition order.
pub fn write_samples_csv<R>(path: &Path, m: &Measurement<R>) -> Result<()> {
    let mut w = csv::Writer::from_path(path)
        .wrap_err_with(|| format!("create samples CSV {}", path.display()))?;
    w.write_record(["index", "value", "retained"])?;
    for (i, (v, keep)) in m.samples.values().iter().zip(&m.retained).enumerate() {
        w.write_record([i.to_string(), v.to_string(), keep.to_string()])?;
    }
    w.flush()?;
    Ok(())
}

fn emit_extras<R>(m: &Measurement<R>, policy: FilterPolicy, args: &AcquisitionArgs) -> Result<()> {
    if args.stats {
        print_stats(m, policy);
    }
    if let Some(path) = &args.samples_csv {
        write_samples_csv(path, m)?;
        info!(path = %path.display(), "samples written");
    }
    Ok(())
}

// ── Commands ─────────────────────────────────────────────────────────────────

pub fn run_height(cfg: &Config, args: &AcquisitionArgs, rt: bool, rt_prio: Option<i32>) -> Result<()> {
    if rt {
        setup_rt_once(rt_prio);
    }
    let mut params = HeightParams::from(cfg);
    apply_overrides(&mut params.sampling, &mut params.policy, args)?;

    let mut gpio = open_gpio(cfg)?;
    let m = measure_height(&mut *gpio, MonotonicClock::new(), &params)?;
    emit_extras(&m, params.policy, args)?;

    println!(
        "{}",
        json!({ "cm": m.report.cm, "feet_and_inches": m.report.feet_and_inches() })
    );
    Ok(())
}

pub fn run_temperature(cfg: &Config, args: &AcquisitionArgs) -> Result<()> {
    let mut params = TemperatureParams::from(cfg);
    apply_overrides(&mut params.sampling, &mut params.policy, args)?;

    let mut bus = open_bus(cfg)?;
    let m = measure_temperature(&mut *bus, MonotonicClock::new(), &params)?;
    emit_extras(&m, params.policy, args)?;

    println!(
        "{}",
        json!({ "celsius": m.report.celsius, "fahrenheit": m.report.fahrenheit })
    );
    Ok(())
}

/// One shot from each sensor; no sampling or filtering.
pub fn self_check(cfg: &Config) -> Result<()> {
    let clock = MonotonicClock::new();

    let mut gpio = open_gpio(cfg)?;
    let mut ranger = Ranger::new(&mut *gpio, clock, RangerCfg::from(cfg))?;
    let cm = ranger
        .measure_distance()
        .wrap_err("rangefinder self-check")?;
    info!(distance_cm = cm, "rangefinder ok");

    let mut bus = open_bus(cfg)?;
    let celsius = Thermometer::new(&mut *bus, ThermometerCfg::from(&cfg.bus))
        .read_temperature()
        .wrap_err("thermometer self-check")?;
    info!(celsius, "thermometer ok");

    println!("ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::PolicyArg;
    use std::time::Duration;

    fn plan() -> (SamplingCfg, FilterPolicy) {
        (SamplingCfg::ranging(), FilterPolicy::ZScore { threshold: 1.0 })
    }

    #[test]
    fn samples_override_lowers_min_samples() {
        let (mut s, mut p) = plan();
        let args = AcquisitionArgs {
            samples: Some(3),
            delay_ms: Some(0),
            ..AcquisitionArgs::default()
        };
        apply_overrides(&mut s, &mut p, &args).unwrap();
        assert_eq!((s.samples, s.min_samples), (3, 3));
        assert_eq!(s.delay, Duration::ZERO);
    }

    #[test]
    fn explicit_min_samples_above_samples_is_rejected() {
        let (mut s, mut p) = plan();
        let args = AcquisitionArgs {
            samples: Some(3),
            min_samples: Some(4),
            ..AcquisitionArgs::default()
        };
        let err = apply_overrides(&mut s, &mut p, &args).unwrap_err();
        assert!(err.to_string().contains("must not exceed"));
    }

    #[test]
    fn threshold_applies_to_selected_policy() {
        let (mut s, mut p) = plan();
        let args = AcquisitionArgs {
            policy: Some(PolicyArg::Iqr),
            threshold: Some(3.0),
            ..AcquisitionArgs::default()
        };
        apply_overrides(&mut s, &mut p, &args).unwrap();
        assert_eq!(p, FilterPolicy::Iqr { k: 3.0 });
    }

    #[test]
    fn samples_override_is_bounded_like_the_config() {
        let (mut s, mut p) = plan();
        let args = AcquisitionArgs {
            samples: Some(MAX_SAMPLES + 1),
            ..AcquisitionArgs::default()
        };
        let err = apply_overrides(&mut s, &mut p, &args).unwrap_err();
        assert!(err.to_string().contains("unreasonably large"));
        assert_eq!(s.samples, SamplingCfg::ranging().samples);

        let args = AcquisitionArgs {
            samples: Some(MAX_SAMPLES),
            ..AcquisitionArgs::default()
        };
        apply_overrides(&mut s, &mut p, &args).unwrap();
        assert_eq!(s.samples, MAX_SAMPLES);
    }

    #[test]
    fn threshold_must_be_positive() {
        let (mut s, mut p) = plan();
        let args = AcquisitionArgs {
            threshold: Some(0.0),
            ..AcquisitionArgs::default()
        };
        assert!(apply_overrides(&mut s, &mut p, &args).is_err());
    }

    #[test]
    fn register_words_parse_hex_and_decimal() {
        assert_eq!(parse_word("0x7b3c").unwrap(), 0x7b3c);
        assert_eq!(parse_word("0X7B3C").unwrap(), 0x7b3c);
        assert_eq!(parse_word("15483").unwrap(), 15483);
        assert!(parse_word("0x1ffff").is_err());
    }
}
