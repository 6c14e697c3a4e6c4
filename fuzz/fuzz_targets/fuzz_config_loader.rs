#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing and validation may reject input but must never panic.
    if let Ok(cfg) = toml::from_str::<vitals_config::Config>(data) {
        if cfg.validate().is_ok() {
            // A validated config must map onto runtime params without panicking
            let _ = vitals_core::HeightParams::from(&cfg);
            let _ = vitals_core::TemperatureParams::from(&cfg);
        }
    }
});
