//! Runtime configuration for the acquisition engine.
//!
//! These are the structs the core consumes. They are separate from the
//! TOML-deserialized config in `vitals_config`; see `conversions`.

use std::time::Duration;

/// Pulse-timing rangefinder wiring and timing.
#[derive(Debug, Clone)]
pub struct RangerCfg {
    pub trigger_pin: u8,
    pub echo_pin: u8,
    /// Trigger low hold before each shot to clear residual echo state.
    pub settle: Duration,
    /// Width of the fire pulse. HC-SR04 expects 10 us.
    pub trigger_pulse: Duration,
    /// Deadline for both echo edges, measured from the end of the fire pulse.
    pub timeout: Duration,
}

impl Default for RangerCfg {
    fn default() -> Self {
        Self {
            trigger_pin: 23,
            echo_pin: 24,
            settle: Duration::from_millis(2),
            trigger_pulse: Duration::from_micros(10),
            timeout: Duration::from_millis(50),
        }
    }
}

/// IR thermometer location on the bus.
#[derive(Debug, Clone, Copy)]
pub struct ThermometerCfg {
    pub address: u8,
    pub register: u8,
}

impl Default for ThermometerCfg {
    fn default() -> Self {
        Self {
            address: 0x5A,
            register: 0x07,
        }
    }
}

/// Multi-attempt acquisition plan.
#[derive(Debug, Clone)]
pub struct SamplingCfg {
    /// Number of attempts (not successes).
    pub samples: usize,
    /// Pause between consecutive attempts.
    pub delay: Duration,
    /// Minimum valid readings for the run to continue.
    pub min_samples: usize,
}

impl SamplingCfg {
    /// Ranging defaults: 30 shots, 50 ms apart, at least 5 valid.
    pub fn ranging() -> Self {
        Self {
            samples: 30,
            delay: Duration::from_millis(50),
            min_samples: 5,
        }
    }

    /// Temperature defaults: 10 reads, 500 ms apart, at least 1 valid.
    pub fn temperature() -> Self {
        Self {
            samples: 10,
            delay: Duration::from_millis(500),
            min_samples: 1,
        }
    }
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self::ranging()
    }
}
