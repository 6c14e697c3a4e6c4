//! GPIO and SMBus backends for the vitals sensors.
//!
//! The simulated backends are always available. Real Raspberry Pi backends
//! (`rppal`) are compiled with the `hardware` feature on Linux.
pub mod error;
pub mod sim;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod rpi;

pub use error::HwError;
pub use sim::{SimBus, SimGpio, SimTimebase};

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use rpi::{RpiBus, RpiGpio};
