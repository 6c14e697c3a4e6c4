use rstest::rstest;
use vitals_core::error::VitalsError;
use vitals_core::filter::{FilterPolicy, aggregate, filter, retention_mask};
use vitals_core::sampler::SampleSet;

const ALL_POLICIES: [FilterPolicy; 5] = [
    FilterPolicy::ZScore { threshold: 1.0 },
    FilterPolicy::Iqr { k: 1.5 },
    FilterPolicy::StdDevBound { k: 1.0 },
    FilterPolicy::SigmaWindow { k: 2.0 },
    FilterPolicy::None,
];

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn z_score_drops_gross_outlier() {
    let set = SampleSet::from_values([10.0, 10.1, 9.9, 10.0, 50.0]);
    let est = aggregate(&set, FilterPolicy::ZScore { threshold: 1.0 }).unwrap();
    assert!(approx(est.value, 10.0), "estimate {}", est.value);
    assert_eq!((est.retained, est.rejected), (4, 1));
    assert_eq!(
        retention_mask(set.values(), FilterPolicy::ZScore { threshold: 1.0 }),
        vec![true, true, true, true, false]
    );
}

#[test]
fn iqr_fence_drops_outlier_and_is_idempotent() {
    let xs = [10.0, 10.1, 9.9, 10.0, 10.2, 9.8, 10.1, 50.0];
    let once = filter(&xs, FilterPolicy::Iqr { k: 1.5 });
    assert_eq!(once.len(), 7);
    assert!(!once.contains(&50.0));
    let twice = filter(&once, FilterPolicy::Iqr { k: 1.5 });
    assert_eq!(once, twice);

    let est = aggregate(&SampleSet::from_values(xs), FilterPolicy::Iqr { k: 1.5 }).unwrap();
    assert!(approx(est.value, 10.01), "estimate {}", est.value);
}

#[test]
fn std_dev_bound_is_idempotent_once_outlier_is_gone() {
    // mean 14, sample sd 9: only 30 is outside the bound
    let xs = [9.0, 11.0, 9.0, 11.0, 30.0];
    let once = filter(&xs, FilterPolicy::StdDevBound { k: 1.0 });
    assert_eq!(once, vec![9.0, 11.0, 9.0, 11.0]);
    // mean 10, sample sd 1.15: every deviation of 1 stays inside
    assert_eq!(filter(&once, FilterPolicy::StdDevBound { k: 1.0 }), once);
}

#[test]
fn std_dev_bound_second_pass_can_tighten() {
    // one pass is not a fixed point: 100 inflates the sd that hides 1
    let xs = [0.0, 0.0, 0.0, 0.0, 1.0, 100.0];
    let once = filter(&xs, FilterPolicy::StdDevBound { k: 1.0 });
    assert_eq!(once, vec![0.0, 0.0, 0.0, 0.0, 1.0]);
    // mean 0.2, sample sd 0.45
    assert_eq!(filter(&once, FilterPolicy::StdDevBound { k: 1.0 }), vec![0.0; 4]);
}

#[test]
fn sigma_window_reproduces_two_sigma_rule() {
    // 2 population sigma around the mean; only the far tail goes
    let xs = [100.0, 101.0, 99.0, 100.0, 100.5, 99.5, 100.0, 101.0, 99.0, 140.0];
    let kept = filter(&xs, FilterPolicy::SigmaWindow { k: 2.0 });
    assert_eq!(kept.len(), 9);
    assert!(!kept.contains(&140.0));
}

#[test]
fn iqr_two_samples_use_singleton_halves() {
    let xs = [3.0, 7.0];
    // Q1 = 3, Q3 = 7, fence [-3, 13]
    assert_eq!(retention_mask(&xs, FilterPolicy::Iqr { k: 1.5 }), vec![true, true]);
    let est = aggregate(&SampleSet::from_values(xs), FilterPolicy::Iqr { k: 1.5 }).unwrap();
    assert!(approx(est.value, 5.0));
}

#[test]
fn z_score_two_distinct_samples_rejects_both() {
    // each sample sits exactly one sigma from the mean, and the test is strict
    let set = SampleSet::from_values([3.0, 7.0]);
    let err = aggregate(&set, FilterPolicy::ZScore { threshold: 1.0 }).unwrap_err();
    assert_eq!(err, VitalsError::AllFiltered { count: 2 });
}

#[test]
fn std_dev_bound_keeps_samples_on_the_boundary() {
    // sample sd of [3, 7] is 2.83 > 2, so both stay
    let set = SampleSet::from_values([3.0, 7.0]);
    let est = aggregate(&set, FilterPolicy::StdDevBound { k: 1.0 }).unwrap();
    assert_eq!(est.retained, 2);
}

#[test]
fn empty_set_is_all_filtered() {
    for policy in ALL_POLICIES {
        let err = aggregate(&SampleSet::default(), policy).unwrap_err();
        assert_eq!(err, VitalsError::AllFiltered { count: 0 });
    }
}

#[rstest]
#[case(FilterPolicy::ZScore { threshold: 1.0 })]
#[case(FilterPolicy::Iqr { k: 1.5 })]
#[case(FilterPolicy::StdDevBound { k: 1.0 })]
#[case(FilterPolicy::SigmaWindow { k: 2.0 })]
#[case(FilterPolicy::None)]
fn single_sample_passes_every_policy(#[case] policy: FilterPolicy) {
    let est = aggregate(&SampleSet::from_values([42.42]), policy).unwrap();
    assert_eq!(est.value, 42.42);
    assert_eq!((est.retained, est.rejected), (1, 0));
}

#[rstest]
#[case(FilterPolicy::ZScore { threshold: 1.0 })]
#[case(FilterPolicy::Iqr { k: 1.5 })]
#[case(FilterPolicy::StdDevBound { k: 1.0 })]
#[case(FilterPolicy::SigmaWindow { k: 2.0 })]
fn zero_variance_keeps_everything(#[case] policy: FilterPolicy) {
    let est = aggregate(&SampleSet::from_values([36.6; 7]), policy).unwrap();
    assert_eq!(est.value, 36.6);
    assert_eq!(est.retained, 7);
}

#[test]
fn none_policy_is_plain_mean() {
    let set = SampleSet::from_values([1.0, 2.0, 3.0, 100.0]);
    let est = aggregate(&set, FilterPolicy::None).unwrap();
    assert!(approx(est.value, 26.5));
}
