//! Maps `Box<dyn Error>` from capability traits to typed `VitalsError`.
//!
//! The traits in `vitals_traits` use `Box<dyn Error + Send + Sync>` so any
//! backend can plug in; this module converts those to our typed error enum,
//! with an optional feature-gated path for `vitals_hardware::HwError`.

use crate::error::VitalsError;

/// Map a digital I/O failure to a typed `VitalsError`.
pub fn map_gpio_error(e: &(dyn std::error::Error + 'static)) -> VitalsError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<vitals_hardware::HwError>() {
            return match hw {
                vitals_hardware::HwError::I2c(msg) => VitalsError::Bus(msg.clone()),
                other => VitalsError::Gpio(other.to_string()),
            };
        }
    }

    VitalsError::Gpio(e.to_string())
}

/// Map a register bus failure to a typed `VitalsError`.
pub fn map_bus_error(e: &(dyn std::error::Error + 'static)) -> VitalsError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<vitals_hardware::HwError>() {
            return match hw {
                vitals_hardware::HwError::Gpio(msg) => VitalsError::Gpio(msg.clone()),
                vitals_hardware::HwError::I2c(msg) => VitalsError::Bus(msg.clone()),
                other => VitalsError::Bus(other.to_string()),
            };
        }
    }

    // Fallback: some drivers only surface a timeout in the message text
    let s = e.to_string();
    if s.to_lowercase().contains("timed out") || s.to_lowercase().contains("timeout") {
        VitalsError::Timeout("bus read timeout")
    } else {
        VitalsError::Bus(s)
    }
}
