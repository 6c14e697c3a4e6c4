//! Test and helper mocks for vitals_core

use std::time::Duration;

use vitals_traits::{BoxError, DigitalIo, Level, ManualClock, PinMode};

/// Digital I/O whose every input reads a fixed level, advancing a shared
/// manual clock per read. Models a disconnected or shorted echo line.
pub struct StuckLine {
    level: Level,
    clock: ManualClock,
    per_read: Duration,
    pub reads: usize,
}

impl StuckLine {
    pub fn new(level: Level, clock: ManualClock) -> Self {
        Self {
            level,
            clock,
            per_read: Duration::from_micros(1),
            reads: 0,
        }
    }
}

impl DigitalIo for StuckLine {
    fn configure_pin(&mut self, _pin: u8, _mode: PinMode) -> Result<(), BoxError> {
        Ok(())
    }

    fn write_pin(&mut self, _pin: u8, _level: Level) -> Result<(), BoxError> {
        Ok(())
    }

    fn read_pin(&mut self, _pin: u8) -> Result<Level, BoxError> {
        self.reads += 1;
        self.clock.advance(self.per_read);
        Ok(self.level)
    }
}
