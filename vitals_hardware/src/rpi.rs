//! Raspberry Pi backends on top of `rppal`.
use std::collections::HashMap;

use rppal::gpio::{Gpio, IoPin, Mode};
use rppal::i2c::I2c;
use tracing::{debug, trace};
use vitals_traits::{BoxError, DigitalIo, Level, PinMode, RegisterBus};

use crate::error::{HwError, Result};

/// GPIO handle owning every pin it has configured.
pub struct RpiGpio {
    gpio: Gpio,
    pins: HashMap<u8, IoPin>,
}

impl RpiGpio {
    pub fn open() -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        Ok(Self {
            gpio,
            pins: HashMap::new(),
        })
    }

    fn pin_mut(&mut self, pin: u8) -> Result<&mut IoPin> {
        self.pins.get_mut(&pin).ok_or(HwError::PinNotConfigured(pin))
    }
}

impl DigitalIo for RpiGpio {
    fn configure_pin(&mut self, pin: u8, mode: PinMode) -> std::result::Result<(), BoxError> {
        let mode = match mode {
            PinMode::Input => Mode::Input,
            PinMode::Output => Mode::Output,
        };
        if let Some(p) = self.pins.get_mut(&pin) {
            p.set_mode(mode);
        } else {
            let p = self
                .gpio
                .get(pin)
                .map_err(|e| HwError::Gpio(format!("open pin {pin}: {e}")))?
                .into_io(mode);
            self.pins.insert(pin, p);
        }
        debug!(pin, ?mode, "gpio pin configured");
        Ok(())
    }

    #[inline]
    fn write_pin(&mut self, pin: u8, level: Level) -> std::result::Result<(), BoxError> {
        let level = match level {
            Level::High => rppal::gpio::Level::High,
            Level::Low => rppal::gpio::Level::Low,
        };
        self.pin_mut(pin)?.write(level);
        Ok(())
    }

    #[inline]
    fn read_pin(&mut self, pin: u8) -> std::result::Result<Level, BoxError> {
        let level = self.pin_mut(pin)?.read();
        Ok(Level::from(level == rppal::gpio::Level::High))
    }
}

/// SMBus handle bound to one I2C adapter.
pub struct RpiBus {
    i2c: I2c,
    address: Option<u8>,
}

impl RpiBus {
    pub fn open(bus: u8) -> Result<Self> {
        let i2c = I2c::with_bus(bus).map_err(|e| HwError::I2c(format!("open i2c-{bus}: {e}")))?;
        Ok(Self { i2c, address: None })
    }
}

impl RegisterBus for RpiBus {
    fn read_register(&mut self, address: u8, register: u8) -> std::result::Result<u16, BoxError> {
        if self.address != Some(address) {
            self.i2c
                .set_slave_address(u16::from(address))
                .map_err(|e| HwError::I2c(format!("select 0x{address:02x}: {e}")))?;
            self.address = Some(address);
        }
        let word = self
            .i2c
            .smbus_read_word(register)
            .map_err(|e| HwError::I2c(format!("read 0x{address:02x}/0x{register:02x}: {e}")))?;
        trace!(address, register, raw = word, "smbus word read");
        Ok(word)
    }
}
