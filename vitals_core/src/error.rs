use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum VitalsError {
    #[error("timeout: {0}")]
    Timeout(&'static str),
    #[error("bus error: {0}")]
    Bus(String),
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("invalid reading: {0}")]
    InvalidReading(String),
    #[error("insufficient samples: got {got} valid of {attempts} attempts, need at least {min}")]
    InsufficientSamples {
        got: usize,
        min: usize,
        attempts: usize,
    },
    #[error("all {count} samples were rejected as outliers")]
    AllFiltered { count: usize },
    #[error("configuration error: {0}")]
    Config(String),
}

impl VitalsError {
    /// Failures of a single acquisition attempt. The sampler drops these and
    /// keeps going; everything else ends the run.
    pub fn is_per_attempt(&self) -> bool {
        matches!(
            self,
            VitalsError::Timeout(_)
                | VitalsError::Bus(_)
                | VitalsError::Gpio(_)
                | VitalsError::InvalidReading(_)
        )
    }
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
