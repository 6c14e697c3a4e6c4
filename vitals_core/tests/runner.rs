use std::time::Duration;

use rstest::rstest;
use vitals_core::config::SamplingCfg;
use vitals_core::report::{celsius_to_fahrenheit, height_report};
use vitals_core::{
    FilterPolicy, HeightParams, TemperatureParams, VitalsError, measure_height,
    measure_temperature, temperature_report,
};
use vitals_hardware::{SimBus, SimGpio, SimTimebase};
use vitals_traits::ManualClock;

fn sim_gpio(clock: &ManualClock, script: Vec<Option<f64>>) -> SimGpio {
    SimGpio::new(
        23,
        24,
        SimTimebase::Manual {
            clock: clock.clone(),
            per_read: Duration::from_micros(1),
        },
    )
    .with_script(script)
}

fn sampling(samples: usize, min_samples: usize) -> SamplingCfg {
    SamplingCfg {
        samples,
        delay: Duration::from_millis(50),
        min_samples,
    }
}

#[test]
fn height_end_to_end() {
    let clock = ManualClock::new();
    let mut gpio = sim_gpio(&clock, vec![Some(30.0)]);
    let m = measure_height(&mut gpio, clock.clone(), &HeightParams::default()).unwrap();
    assert_eq!(m.samples.attempts(), 30);
    assert_eq!(m.estimate.retained, 30);
    assert!((m.report.cm - 170.0).abs() < 0.05, "cm = {}", m.report.cm);
    assert_eq!(m.report.feet_and_inches(), "5 feet 7 inches");
    // 29 gaps of 50 ms plus per-shot settle and echo time
    assert!(clock.elapsed() >= Duration::from_millis(29 * 50));
}

#[test]
fn height_rejects_outlier_and_missing_echo() {
    let clock = ManualClock::new();
    let mut gpio = sim_gpio(
        &clock,
        vec![Some(50.0), None, Some(50.0), Some(50.0), Some(300.0)],
    );
    let params = HeightParams {
        sampling: sampling(5, 3),
        ..HeightParams::default()
    };
    let m = measure_height(&mut gpio, clock.clone(), &params).unwrap();
    assert_eq!(m.samples.failures(), 1);
    assert_eq!(m.retained, vec![true, true, true, false]);
    assert_eq!((m.estimate.retained, m.estimate.rejected), (3, 1));
    assert!((m.report.cm - 150.0).abs() < 0.05, "cm = {}", m.report.cm);
}

#[test]
fn height_with_no_echo_is_insufficient() {
    let clock = ManualClock::new();
    let mut gpio = sim_gpio(&clock, vec![None]);
    let params = HeightParams {
        sampling: sampling(3, 2),
        ..HeightParams::default()
    };
    let report = measure_height(&mut gpio, clock.clone(), &params).unwrap_err();
    assert_eq!(
        report.downcast_ref::<VitalsError>(),
        Some(&VitalsError::InsufficientSamples {
            got: 0,
            min: 2,
            attempts: 3
        })
    );
}

#[test]
fn two_distinct_readings_under_tight_z_score_are_all_filtered() {
    let clock = ManualClock::new();
    let mut gpio = sim_gpio(&clock, vec![Some(40.0), Some(60.0)]);
    let params = HeightParams {
        sampling: sampling(2, 1),
        // both readings sit one sigma out
        policy: FilterPolicy::ZScore { threshold: 0.5 },
        ..HeightParams::default()
    };
    let report = measure_height(&mut gpio, clock.clone(), &params).unwrap_err();
    assert_eq!(
        report.downcast_ref::<VitalsError>(),
        Some(&VitalsError::AllFiltered { count: 2 })
    );
}

#[test]
fn temperature_end_to_end() {
    let clock = ManualClock::new();
    let mut bus = SimBus::new(0x7b3c);
    let m = measure_temperature(&mut bus, clock.clone(), &TemperatureParams::default()).unwrap();
    assert_eq!(bus.reads(), 10);
    assert!((m.report.celsius - 36.51).abs() < 1e-9);
    assert!((m.report.fahrenheit - 97.72).abs() < 1e-9);
    // nine 500 ms gaps, none after the last read
    assert_eq!(clock.elapsed(), Duration::from_millis(4_500));
}

#[test]
fn temperature_survives_intermittent_bus() {
    let mut bus = SimBus::with_script(vec![None, Some(0x7b3c), None, Some(0x7b3c)]);
    let params = TemperatureParams {
        sampling: sampling(4, 1),
        ..TemperatureParams::default()
    };
    let m = measure_temperature(&mut bus, ManualClock::new(), &params).unwrap();
    assert_eq!(m.samples.len(), 2);
    assert_eq!(m.samples.failures(), 2);
}

#[test]
fn temperature_on_dead_bus_is_insufficient() {
    let mut bus = SimBus::failing();
    let err = measure_temperature(&mut bus, ManualClock::new(), &TemperatureParams::default())
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<VitalsError>(),
        Some(&VitalsError::InsufficientSamples {
            got: 0,
            min: 1,
            attempts: 10
        })
    );
}

#[rstest]
#[case(170.0, false, 30.0, 0, 12)]
#[case(170.0, true, 30.0, 1, 0)]
#[case(30.0, true, 170.0, 5, 7)]
#[case(20.0, true, 180.0, 5, 11)]
#[case(250.0, true, 0.0, 0, 0)]
fn height_reports(
    #[case] distance: f64,
    #[case] normalize: bool,
    #[case] cm: f64,
    #[case] feet: u32,
    #[case] inches: u32,
) {
    let r = height_report(distance, 200.0, normalize);
    assert_eq!((r.cm, r.feet, r.inches), (cm, feet, inches));
}

#[rstest]
#[case(36.5, 97.7)]
#[case(0.0, 32.0)]
#[case(-40.0, -40.0)]
#[case(37.0, 98.6)]
fn fahrenheit_conversion(#[case] c: f64, #[case] f: f64) {
    assert!((celsius_to_fahrenheit(c) - f).abs() < 1e-9);
    assert_eq!(temperature_report(c).celsius, c);
}

#[test]
fn params_follow_config_file() {
    let cfg = vitals_config::load_toml(
        r#"
[pins]
trigger = 5
echo = 6

[ranging]
reference_height_cm = 210.0
normalize_inches = false

[height]
samples = 12
delay_ms = 20
min_samples = 4
filter = { policy = "sigma-window", k = 2.0 }

[temperature]
samples = 3
delay_ms = 100
min_samples = 1
filter = { policy = "none" }
"#,
    )
    .unwrap();

    let h = HeightParams::from(&cfg);
    assert_eq!((h.ranger.trigger_pin, h.ranger.echo_pin), (5, 6));
    assert_eq!(h.ranger.timeout, Duration::from_millis(50));
    assert_eq!(h.sampling.samples, 12);
    assert_eq!(h.sampling.delay, Duration::from_millis(20));
    assert_eq!(h.policy, FilterPolicy::SigmaWindow { k: 2.0 });
    assert_eq!(h.reference_height_cm, 210.0);
    assert!(!h.normalize_inches);

    let t = TemperatureParams::from(&cfg);
    assert_eq!((t.sensor.address, t.sensor.register), (0x5A, 0x07));
    assert_eq!(t.sampling.min_samples, 1);
    assert_eq!(t.policy, FilterPolicy::None);
}
