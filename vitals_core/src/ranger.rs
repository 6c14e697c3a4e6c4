//! Ultrasonic pulse-timing rangefinder (HC-SR04 protocol).
//!
//! One shot: hold trigger low to settle, fire a 10 us pulse, then busy-poll
//! the echo line for its rising and falling edges under a single deadline.
//! The echo width is the round-trip time of flight.

use std::time::Duration;

use tracing::trace;
use vitals_traits::{Clock, DigitalIo, Level, PinMode};

use crate::config::RangerCfg;
use crate::error::VitalsError;
use crate::hw_error::map_gpio_error;
use crate::util::{round2, wait_for_level};

/// Half the speed of sound at room temperature in cm/s (343 m/s round trip).
pub const HALF_SOUND_CM_PER_S: f64 = 17_150.0;

/// Convert an echo pulse width to a one-way distance in centimeters.
#[inline]
pub fn echo_to_cm(width: Duration) -> f64 {
    round2(width.as_secs_f64() * HALF_SOUND_CM_PER_S)
}

pub struct Ranger<'a, G: DigitalIo + ?Sized, C: Clock> {
    io: &'a mut G,
    clock: C,
    cfg: RangerCfg,
}

impl<'a, G: DigitalIo + ?Sized, C: Clock> Ranger<'a, G, C> {
    /// Configure trigger as output (driven low) and echo as input.
    pub fn new(io: &'a mut G, clock: C, cfg: RangerCfg) -> Result<Self, VitalsError> {
        if cfg.trigger_pin == cfg.echo_pin {
            return Err(VitalsError::Config(
                "trigger and echo must be different pins".into(),
            ));
        }
        io.configure_pin(cfg.trigger_pin, PinMode::Output)
            .map_err(|e| map_gpio_error(&*e))?;
        io.configure_pin(cfg.echo_pin, PinMode::Input)
            .map_err(|e| map_gpio_error(&*e))?;
        io.write_pin(cfg.trigger_pin, Level::Low)
            .map_err(|e| map_gpio_error(&*e))?;
        Ok(Self { io, clock, cfg })
    }

    pub fn cfg(&self) -> &RangerCfg {
        &self.cfg
    }

    fn set_trigger(&mut self, level: Level) -> Result<(), VitalsError> {
        self.io
            .write_pin(self.cfg.trigger_pin, level)
            .map_err(|e| map_gpio_error(&*e))
    }

    /// Fire one shot and return the distance in centimeters (2 decimals).
    pub fn measure_distance(&mut self) -> Result<f64, VitalsError> {
        self.set_trigger(Level::Low)?;
        self.clock.sleep(self.cfg.settle);

        self.set_trigger(Level::High)?;
        self.clock.spin_for(self.cfg.trigger_pulse);
        self.set_trigger(Level::Low)?;

        let deadline = self.clock.now() + self.cfg.timeout;
        let echo = self.cfg.echo_pin;
        let io = &mut *self.io;
        let mut read = || io.read_pin(echo).map_err(|e| map_gpio_error(&*e));

        let start = wait_for_level(
            &self.clock,
            &mut read,
            Level::High,
            deadline,
            "echo start timeout",
        )?;
        let end = wait_for_level(
            &self.clock,
            &mut read,
            Level::Low,
            deadline,
            "echo end timeout",
        )?;

        let width = end.saturating_duration_since(start);
        let cm = echo_to_cm(width);
        trace!(width_us = width.as_micros() as u64, cm, "echo measured");
        if !cm.is_finite() {
            return Err(VitalsError::InvalidReading(format!("non-finite distance {cm}")));
        }
        Ok(cm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_width_conversion() {
        assert_eq!(echo_to_cm(Duration::from_micros(0)), 0.0);
        // 10 ms round trip is 171.5 cm one way
        assert_eq!(echo_to_cm(Duration::from_millis(10)), 171.5);
        assert_eq!(echo_to_cm(Duration::from_micros(583)), 10.0);
    }
}
