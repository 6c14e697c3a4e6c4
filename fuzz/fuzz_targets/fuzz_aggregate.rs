#![no_main]
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;
use vitals_core::filter::{FilterPolicy, aggregate};
use vitals_core::sampler::SampleSet;

#[derive(Debug, Arbitrary)]
enum Policy {
    ZScore(f64),
    Iqr(f64),
    StdDevBound(f64),
    SigmaWindow(f64),
    None,
}

#[derive(Debug, Arbitrary)]
struct Input {
    policy: Policy,
    values: Vec<f64>,
}

fuzz_target!(|input: Input| {
    let param = |p: f64| if p.is_finite() && p > 0.0 { p } else { 1.0 };
    let policy = match input.policy {
        Policy::ZScore(t) => FilterPolicy::ZScore { threshold: param(t) },
        Policy::Iqr(k) => FilterPolicy::Iqr { k: param(k) },
        Policy::StdDevBound(k) => FilterPolicy::StdDevBound { k: param(k) },
        Policy::SigmaWindow(k) => FilterPolicy::SigmaWindow { k: param(k) },
        Policy::None => FilterPolicy::None,
    };
    let set = SampleSet::from_values(input.values);
    if let Ok(est) = aggregate(&set, policy) {
        assert_eq!(est.retained + est.rejected, set.len());
        assert!(est.retained > 0);
    }
});
