pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Boxed error used at the capability boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Logic level of a digital pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    #[inline]
    pub fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

/// Direction of a digital pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
}

/// Digital I/O capability addressed by pin number.
pub trait DigitalIo {
    fn configure_pin(&mut self, pin: u8, mode: PinMode) -> Result<(), BoxError>;
    fn write_pin(&mut self, pin: u8, level: Level) -> Result<(), BoxError>;
    fn read_pin(&mut self, pin: u8) -> Result<Level, BoxError>;
}

/// Register-oriented bus capability (SMBus/I2C word reads).
///
/// `read_register` returns the word exactly as the device transmitted it;
/// byte-order correction belongs to the device driver.
pub trait RegisterBus {
    fn read_register(&mut self, address: u8, register: u8) -> Result<u16, BoxError>;
}

impl<T: DigitalIo + ?Sized> DigitalIo for Box<T> {
    fn configure_pin(&mut self, pin: u8, mode: PinMode) -> Result<(), BoxError> {
        (**self).configure_pin(pin, mode)
    }
    fn write_pin(&mut self, pin: u8, level: Level) -> Result<(), BoxError> {
        (**self).write_pin(pin, level)
    }
    fn read_pin(&mut self, pin: u8) -> Result<Level, BoxError> {
        (**self).read_pin(pin)
    }
}

impl<T: RegisterBus + ?Sized> RegisterBus for Box<T> {
    fn read_register(&mut self, address: u8, register: u8) -> Result<u16, BoxError> {
        (**self).read_register(address, register)
    }
}
