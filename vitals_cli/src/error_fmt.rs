//! Human-readable error descriptions and structured JSON error formatting.

use vitals_core::VitalsError;

/// First `VitalsError` in the report's chain, if any.
fn domain_error(err: &eyre::Report) -> Option<&VitalsError> {
    err.chain().find_map(|e| e.downcast_ref::<VitalsError>())
}

/// Stable kind name used as the `reason` field of JSON errors.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    match domain_error(err) {
        Some(VitalsError::Timeout(_)) => "Timeout",
        Some(VitalsError::Bus(_)) => "Bus",
        Some(VitalsError::Gpio(_)) => "Gpio",
        Some(VitalsError::InvalidReading(_)) => "InvalidReading",
        Some(VitalsError::InsufficientSamples { .. }) => "InsufficientSamples",
        Some(VitalsError::AllFiltered { .. }) => "AllFiltered",
        Some(VitalsError::Config(_)) => "Config",
        None if looks_like_config(err) => "Config",
        None => "Error",
    }
}

fn looks_like_config(err: &eyre::Report) -> bool {
    let lower = format!("{err:#}").to_ascii_lowercase();
    lower.contains("invalid configuration")
        || lower.contains("read config")
        || lower.contains("must be")
        || lower.contains("must not exceed")
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(ve) = domain_error(err) {
        return match ve {
            VitalsError::Timeout(what) => format!(
                "What happened: The rangefinder did not answer in time ({what}).\nLikely causes: Trigger/echo pins swapped or miswired, sensor unpowered, or nothing within range.\nHow to fix: Check [pins] trigger/echo and 5V/GND; raise ranging.timeout_ms if the subject is far away."
            ),
            VitalsError::Bus(msg) => format!(
                "What happened: IR thermometer read failed ({msg}).\nLikely causes: Wrong I2C bus or address, loose SDA/SCL, or missing pull-ups.\nHow to fix: Check [bus] i2c_bus and address in the config and confirm the device with i2cdetect."
            ),
            VitalsError::Gpio(msg) => format!(
                "What happened: GPIO access failed ({msg}).\nLikely causes: Pin numbers outside the wired set or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process may access /dev/gpiomem."
            ),
            VitalsError::InvalidReading(msg) => format!(
                "What happened: The sensor returned an unusable value ({msg}).\nLikely causes: Device error flag set or electrical noise.\nHow to fix: Power-cycle the sensor and retry."
            ),
            VitalsError::InsufficientSamples { got, min, attempts } => format!(
                "What happened: Only {got} of {attempts} attempts produced a reading; at least {min} are needed.\nLikely causes: Sensor disconnected, subject out of range, or a noisy bus.\nHow to fix: Check wiring first; otherwise raise --samples or lower --min-samples."
            ),
            VitalsError::AllFiltered { count } => format!(
                "What happened: The outlier filter rejected all {count} samples.\nLikely causes: Too few samples for the chosen policy, or a threshold that is too tight.\nHow to fix: Take more samples, raise --threshold, or use --policy iqr."
            ),
            VitalsError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    let msg = format!("{err:#}");
    if looks_like_config(err) {
        return format!(
            "What happened: Configuration is invalid or incomplete ({msg}).\nLikely causes: Missing [pins] (trigger, echo), a typo in a policy name, or out-of-range values.\nHow to fix: Edit the TOML config (see etc/vitals.toml) and try again."
        );
    }

    format!(
        "Something went wrong.\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes; clap usage errors exit with 2 on their own.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match domain_error(err) {
        Some(VitalsError::InsufficientSamples { .. }) => 3,
        Some(VitalsError::AllFiltered { .. }) => 4,
        Some(VitalsError::Timeout(_)) => 5,
        _ => 1,
    }
}

/// Structured JSON error object for stdout.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let mut obj = json!({ "error": format!("{err:#}"), "reason": reason_name(err) });
    if let Some(VitalsError::InsufficientSamples { got, min, attempts }) = domain_error(err) {
        obj["details"] = json!({ "got": got, "min": min, "attempts": attempts });
    }
    obj.to_string()
}
