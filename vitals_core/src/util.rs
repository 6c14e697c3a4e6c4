//! Rounding and deadline-polling helpers for vitals_core.

use std::time::Instant;

use vitals_traits::{Clock, Level};

use crate::error::VitalsError;

/// Round to two decimal places, half away from zero.
#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Busy-poll `read` until it reports `want`, returning the instant the level
/// was observed.
///
/// The deadline is checked on every iteration, so a line that never moves
/// fails with `Timeout(what)` instead of hanging the caller.
pub fn wait_for_level<C: Clock>(
    clock: &C,
    mut read: impl FnMut() -> Result<Level, VitalsError>,
    want: Level,
    deadline: Instant,
    what: &'static str,
) -> Result<Instant, VitalsError> {
    loop {
        if read()? == want {
            return Ok(clock.now());
        }
        if clock.now() >= deadline {
            return Err(VitalsError::Timeout(what));
        }
        std::hint::spin_loop();
    }
}
