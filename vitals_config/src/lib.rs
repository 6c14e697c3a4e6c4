#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the vitals kiosk sensors.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section except `[pins]` has defaults matching the reference
//!   kiosk wiring (HC-SR04 on GPIO 23/24, MLX90614 on i2c-4 at 0x5A).
use serde::{Deserialize, Deserializer};

#[derive(Debug, Deserialize)]
pub struct Pins {
    /// Rangefinder trigger output
    pub trigger: u8,
    /// Rangefinder echo input
    pub echo: u8,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Bus {
    /// I2C adapter number (`/dev/i2c-N`)
    pub i2c_bus: u8,
    /// 7-bit device address of the IR thermometer
    pub address: u8,
    /// Object temperature register
    pub register: u8,
}

impl Default for Bus {
    fn default() -> Self {
        Self {
            i2c_bus: 4,
            address: 0x5A,
            register: 0x07,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ranging {
    /// Sensor mounting height above the floor (cm)
    pub reference_height_cm: f64,
    /// Deadline for a full echo (rise and fall) after the trigger pulse
    pub timeout_ms: u64,
    /// Trigger low hold before each shot
    pub settle_ms: u64,
    /// Width of the trigger pulse
    pub trigger_pulse_us: u64,
    /// Carry an inches value of 12 into the feet count.
    /// `false` reproduces the legacy "5 feet 12 inches" output.
    pub normalize_inches: bool,
}

impl Default for Ranging {
    fn default() -> Self {
        Self {
            reference_height_cm: 200.0,
            timeout_ms: 50,
            settle_ms: 2,
            trigger_pulse_us: 10,
            normalize_inches: true,
        }
    }
}

/// Outlier rule applied before averaging.
///
/// Accepts `{ policy = "z-score", threshold = 1.0 }`,
/// `{ policy = "iqr", k = 1.5 }`, `{ policy = "std-dev-bound", k = 1.0 }`,
/// `{ policy = "sigma-window", k = 2.0 }` or `{ policy = "none" }`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum FilterSpec {
    ZScore {
        #[serde(default = "default_z_threshold")]
        threshold: f64,
    },
    Iqr {
        #[serde(default = "default_iqr_k")]
        k: f64,
    },
    StdDevBound {
        #[serde(default = "default_std_k")]
        k: f64,
    },
    SigmaWindow {
        #[serde(default = "default_sigma_k")]
        k: f64,
    },
    None,
}

fn default_z_threshold() -> f64 {
    1.0
}
fn default_iqr_k() -> f64 {
    1.5
}
fn default_std_k() -> f64 {
    1.0
}
fn default_sigma_k() -> f64 {
    2.0
}

impl FilterSpec {
    /// The tunable parameter of the rule, if it has one.
    pub fn parameter(&self) -> Option<f64> {
        match *self {
            FilterSpec::ZScore { threshold } => Some(threshold),
            FilterSpec::Iqr { k } | FilterSpec::StdDevBound { k } | FilterSpec::SigmaWindow { k } => {
                Some(k)
            }
            FilterSpec::None => None,
        }
    }
}

/// Upper bound on attempts per run.
pub const MAX_SAMPLES: usize = 10_000;

/// Sampling plan for one quantity.
///
/// Keys left out of a `[height]` or `[temperature]` table keep that
/// quantity's default.
#[derive(Debug)]
pub struct Acquisition {
    /// Attempts per run (failed attempts are dropped, not retried)
    pub samples: usize,
    /// Pause between attempts
    pub delay_ms: u64,
    /// Fewer valid readings than this fails the run
    pub min_samples: usize,
    pub filter: FilterSpec,
}

impl Acquisition {
    #[must_use]
    pub fn height() -> Self {
        Self {
            samples: 30,
            delay_ms: 50,
            min_samples: 5,
            filter: FilterSpec::ZScore { threshold: 1.0 },
        }
    }

    #[must_use]
    pub fn temperature() -> Self {
        Self {
            samples: 10,
            delay_ms: 500,
            min_samples: 1,
            filter: FilterSpec::Iqr { k: 1.5 },
        }
    }
}

/// An acquisition table as written, before section defaults are applied.
#[derive(Deserialize)]
struct AcquisitionTable {
    samples: Option<usize>,
    delay_ms: Option<u64>,
    min_samples: Option<usize>,
    filter: Option<FilterSpec>,
}

impl AcquisitionTable {
    fn over(self, base: Acquisition) -> Acquisition {
        Acquisition {
            samples: self.samples.unwrap_or(base.samples),
            delay_ms: self.delay_ms.unwrap_or(base.delay_ms),
            min_samples: self.min_samples.unwrap_or(base.min_samples),
            filter: self.filter.unwrap_or(base.filter),
        }
    }
}

fn height_section<'de, D: Deserializer<'de>>(d: D) -> Result<Acquisition, D::Error> {
    AcquisitionTable::deserialize(d).map(|t| t.over(Acquisition::height()))
}

fn temperature_section<'de, D: Deserializer<'de>>(d: D) -> Result<Acquisition, D::Error> {
    AcquisitionTable::deserialize(d).map(|t| t.over(Acquisition::temperature()))
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub bus: Bus,
    #[serde(default)]
    pub ranging: Ranging,
    #[serde(default = "Acquisition::height", deserialize_with = "height_section")]
    pub height: Acquisition,
    #[serde(
        default = "Acquisition::temperature",
        deserialize_with = "temperature_section"
    )]
    pub temperature: Acquisition,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

fn validate_acquisition(section: &str, acq: &Acquisition) -> eyre::Result<()> {
    if acq.samples == 0 {
        eyre::bail!("{section}.samples must be >= 1");
    }
    if acq.samples > MAX_SAMPLES {
        eyre::bail!("{section}.samples is unreasonably large (>{MAX_SAMPLES})");
    }
    if acq.min_samples == 0 {
        eyre::bail!("{section}.min_samples must be >= 1");
    }
    if acq.min_samples > acq.samples {
        eyre::bail!(
            "{section}.min_samples ({}) must not exceed {section}.samples ({})",
            acq.min_samples,
            acq.samples
        );
    }
    if acq.delay_ms > 60_000 {
        eyre::bail!("{section}.delay_ms is unreasonably large (>60s)");
    }
    if let Some(p) = acq.filter.parameter()
        && !(p.is_finite() && p > 0.0)
    {
        eyre::bail!("{section}.filter parameter must be a finite value > 0");
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Pins
        if self.pins.trigger == self.pins.echo {
            eyre::bail!("pins.trigger and pins.echo must be different pins");
        }
        if self.pins.trigger > 27 || self.pins.echo > 27 {
            eyre::bail!("pins must be BCM GPIO numbers in 0..=27");
        }

        // Bus
        if self.bus.address > 0x7F {
            eyre::bail!("bus.address must be a 7-bit address (<= 0x7F)");
        }

        // Ranging
        let r = &self.ranging;
        if !(r.reference_height_cm.is_finite() && r.reference_height_cm > 0.0) {
            eyre::bail!("ranging.reference_height_cm must be > 0");
        }
        if r.timeout_ms == 0 {
            eyre::bail!("ranging.timeout_ms must be >= 1");
        }
        if r.timeout_ms > 1_000 {
            eyre::bail!("ranging.timeout_ms is unreasonably large (>1s)");
        }
        if r.trigger_pulse_us == 0 || r.trigger_pulse_us > 1_000 {
            eyre::bail!("ranging.trigger_pulse_us must be in [1, 1000]");
        }
        if r.settle_ms > 1_000 {
            eyre::bail!("ranging.settle_ms is unreasonably large (>1s)");
        }

        validate_acquisition("height", &self.height)?;
        validate_acquisition("temperature", &self.temperature)?;

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly (got {rot:?})");
        }

        Ok(())
    }
}
