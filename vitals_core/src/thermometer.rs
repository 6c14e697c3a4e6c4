//! Infrared thermometer (MLX90614) object temperature over SMBus.
//!
//! The device transmits the RAM word low byte first, the opposite of what the
//! bus layer hands back, so the word is byte-swapped before the linear
//! transform. Skipping the swap is off by roughly two orders of magnitude.

use tracing::trace;
use vitals_traits::RegisterBus;

use crate::config::ThermometerCfg;
use crate::error::VitalsError;
use crate::hw_error::map_bus_error;

/// Kelvin per LSB of the object temperature register.
pub const KELVIN_PER_LSB: f64 = 0.02;
/// 0 K in degrees Celsius.
pub const ABSOLUTE_ZERO_C: f64 = -273.15;
/// Bit 15 of the corrected word flags a failed conversion.
pub const ERROR_FLAG: u16 = 0x8000;

/// Reorder a word transmitted low byte first into host order.
#[inline]
pub fn correct_byte_order(raw: u16) -> u16 {
    raw.swap_bytes()
}

/// Linear transform of a corrected register word to degrees Celsius.
#[inline]
pub fn word_to_celsius(word: u16) -> f64 {
    f64::from(word) * KELVIN_PER_LSB + ABSOLUTE_ZERO_C
}

pub struct Thermometer<'a, B: RegisterBus + ?Sized> {
    bus: &'a mut B,
    cfg: ThermometerCfg,
}

impl<'a, B: RegisterBus + ?Sized> Thermometer<'a, B> {
    pub fn new(bus: &'a mut B, cfg: ThermometerCfg) -> Self {
        Self { bus, cfg }
    }

    /// Read the object temperature once, in degrees Celsius.
    ///
    /// Besides bus faults, a word with the device error flag (bit 15) set
    /// is rejected as `InvalidReading`; the sensor sets that flag when its
    /// own reading is unusable.
    pub fn read_temperature(&mut self) -> Result<f64, VitalsError> {
        let raw = self
            .bus
            .read_register(self.cfg.address, self.cfg.register)
            .map_err(|e| map_bus_error(&*e))?;
        let word = correct_byte_order(raw);
        if word & ERROR_FLAG != 0 {
            return Err(VitalsError::InvalidReading(format!(
                "device error flag set (word 0x{word:04x})"
            )));
        }
        let celsius = word_to_celsius(word);
        trace!(raw, word, celsius, "object temperature read");
        Ok(celsius)
    }
}
