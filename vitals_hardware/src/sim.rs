//! Simulated GPIO and SMBus backends.
//!
//! `SimGpio` models an HC-SR04 style rangefinder wired to a trigger and an
//! echo pin: a falling edge on the trigger arms an echo pulse whose width
//! encodes the scripted distance. `SimBus` replays scripted register words.
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use tracing::trace;
use vitals_traits::{
    BoxError, Clock, DigitalIo, Level, ManualClock, MonotonicClock, PinMode, RegisterBus,
};

use crate::error::HwError;

/// Half the speed of sound in cm/s; one-way distance per second of echo.
const HALF_SOUND_CM_PER_S: f64 = 17_150.0;

/// Time source for the simulated rangefinder.
#[derive(Debug, Clone)]
pub enum SimTimebase {
    /// Wall-clock time; echo edges happen in real time.
    Real(MonotonicClock),
    /// Shared manual clock advanced by `per_read` on every pin read.
    Manual { clock: ManualClock, per_read: Duration },
}

impl SimTimebase {
    fn now(&self) -> Instant {
        match self {
            SimTimebase::Real(c) => c.now(),
            SimTimebase::Manual { clock, .. } => clock.now(),
        }
    }

    fn after_read(&self) {
        if let SimTimebase::Manual { clock, per_read } = self {
            clock.advance(*per_read);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct EchoWindow {
    rise: Instant,
    fall: Instant,
}

/// Simulated ultrasonic rangefinder on two GPIO lines.
pub struct SimGpio {
    trigger: u8,
    echo: u8,
    time: SimTimebase,
    modes: HashMap<u8, PinMode>,
    trigger_level: Level,
    /// Delay between the trigger falling edge and the echo rising edge.
    echo_delay: Duration,
    /// One entry per shot; `None` means the echo never arrives. The last
    /// entry repeats once the script is exhausted.
    script: VecDeque<Option<f64>>,
    window: Option<EchoWindow>,
    shots: usize,
}

impl SimGpio {
    pub fn new(trigger: u8, echo: u8, time: SimTimebase) -> Self {
        Self {
            trigger,
            echo,
            time,
            modes: HashMap::new(),
            trigger_level: Level::Low,
            echo_delay: Duration::from_micros(450),
            script: VecDeque::from([Some(100.0)]),
            window: None,
            shots: 0,
        }
    }

    /// Every shot reports `distance_cm`.
    pub fn with_distance(mut self, distance_cm: f64) -> Self {
        self.script = VecDeque::from([Some(distance_cm)]);
        self
    }

    /// Replay `shots` in order; `None` entries never raise the echo line.
    pub fn with_script(mut self, shots: Vec<Option<f64>>) -> Self {
        self.script = if shots.is_empty() {
            VecDeque::from([None])
        } else {
            shots.into()
        };
        self
    }

    pub fn with_echo_delay(mut self, delay: Duration) -> Self {
        self.echo_delay = delay;
        self
    }

    /// Number of trigger pulses observed so far.
    pub fn shots(&self) -> usize {
        self.shots
    }

    fn next_distance(&mut self) -> Option<f64> {
        if self.script.len() > 1 {
            self.script.pop_front().flatten()
        } else {
            self.script.front().copied().flatten()
        }
    }

    fn fire(&mut self) {
        self.shots += 1;
        let fired_at = self.time.now();
        self.window = self.next_distance().map(|cm| {
            let rise = fired_at + self.echo_delay;
            let width = Duration::from_secs_f64((cm / HALF_SOUND_CM_PER_S).max(0.0));
            EchoWindow {
                rise,
                fall: rise + width,
            }
        });
        trace!(shot = self.shots, armed = self.window.is_some(), "sim trigger fired");
    }

    fn require_mode(&self, pin: u8, mode: PinMode) -> Result<(), HwError> {
        match self.modes.get(&pin) {
            Some(m) if *m == mode => Ok(()),
            Some(_) => Err(HwError::Gpio(format!(
                "pin {pin} configured with the wrong direction"
            ))),
            None => Err(HwError::PinNotConfigured(pin)),
        }
    }
}

impl DigitalIo for SimGpio {
    fn configure_pin(&mut self, pin: u8, mode: PinMode) -> Result<(), BoxError> {
        if pin != self.trigger && pin != self.echo {
            return Err(HwError::Gpio(format!("pin {pin} is not wired in the simulator")).into());
        }
        self.modes.insert(pin, mode);
        Ok(())
    }

    fn write_pin(&mut self, pin: u8, level: Level) -> Result<(), BoxError> {
        self.require_mode(pin, PinMode::Output)?;
        if pin == self.trigger {
            if self.trigger_level == Level::High && level == Level::Low {
                self.fire();
            }
            self.trigger_level = level;
        }
        Ok(())
    }

    fn read_pin(&mut self, pin: u8) -> Result<Level, BoxError> {
        self.require_mode(pin, PinMode::Input)?;
        let now = self.time.now();
        let level = match (pin == self.echo, self.window) {
            (true, Some(w)) => Level::from(now >= w.rise && now < w.fall),
            _ => Level::Low,
        };
        self.time.after_read();
        Ok(level)
    }
}

/// Simulated SMBus replaying scripted raw words.
#[derive(Debug, Clone)]
pub struct SimBus {
    /// `None` entries fail the read with a transport error. The last entry
    /// repeats once the script is exhausted.
    script: VecDeque<Option<u16>>,
    reads: usize,
}

impl SimBus {
    pub fn new(raw_word: u16) -> Self {
        Self::with_script(vec![Some(raw_word)])
    }

    pub fn with_script(words: Vec<Option<u16>>) -> Self {
        let script = if words.is_empty() {
            VecDeque::from([None])
        } else {
            words.into()
        };
        Self { script, reads: 0 }
    }

    /// A bus whose every read fails.
    pub fn failing() -> Self {
        Self::with_script(vec![None])
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl RegisterBus for SimBus {
    fn read_register(&mut self, address: u8, register: u8) -> Result<u16, BoxError> {
        self.reads += 1;
        let next = if self.script.len() > 1 {
            self.script.pop_front().flatten()
        } else {
            self.script.front().copied().flatten()
        };
        match next {
            Some(word) => {
                trace!(address, register, raw = word, "sim register read");
                Ok(word)
            }
            None => Err(HwError::I2c(format!(
                "no ACK from device 0x{address:02x} (register 0x{register:02x})"
            ))
            .into()),
        }
    }
}
