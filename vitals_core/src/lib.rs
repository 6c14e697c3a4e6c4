#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Sensor acquisition and outlier-filtering engine (hardware-agnostic).
//!
//! All hardware interaction goes through `vitals_traits::DigitalIo`,
//! `vitals_traits::RegisterBus` and `vitals_traits::Clock`, so every stage can
//! run against the simulated backends in tests.
//!
//! ## Architecture
//!
//! - **Ranger**: pulse-timing ultrasonic distance, one shot (`ranger`)
//! - **Thermometer**: byte-order corrected IR register read (`thermometer`)
//! - **Sampler**: fixed number of attempts, failed ones dropped (`sampler`)
//! - **Filter**: selectable outlier policy plus mean aggregation (`filter`)
//! - **Report**: cm/feet-inches and Celsius/Fahrenheit (`report`)
//! - **Runner**: the one-shot height and temperature runs (`runner`)

pub mod config;
pub mod conversions;
pub mod error;
pub mod filter;
pub mod hw_error;
pub mod mocks;
pub mod ranger;
pub mod report;
pub mod runner;
pub mod sampler;
pub mod thermometer;
pub mod util;

pub use config::{RangerCfg, SamplingCfg, ThermometerCfg};
pub use error::VitalsError;
pub use filter::{Estimate, FilterPolicy, SampleStats, aggregate};
pub use ranger::Ranger;
pub use report::{HeightReport, TemperatureReport, height_report, temperature_report};
pub use runner::{HeightParams, Measurement, TemperatureParams, measure_height, measure_temperature};
pub use sampler::{SampleSet, Sampler};
pub use thermometer::Thermometer;
