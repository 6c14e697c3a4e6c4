use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use vitals_core::filter::{FilterPolicy, aggregate};
use vitals_core::sampler::SampleSet;

// Synthetic ranging run: a steady distance with jitter and occasional spikes
fn synth_run(n: usize, seed: u32) -> Vec<f64> {
    let mut state = seed.max(1);
    let mut next = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        f64::from(x) / (f64::from(u32::MAX) + 1.0)
    };
    (0..n)
        .map(|_| {
            let jitter = (next() * 2.0 - 1.0) * 0.3;
            let spike = if next() < 0.05 { 80.0 } else { 0.0 };
            ((30.0 + jitter + spike) * 100.0).round() / 100.0
        })
        .collect()
}

pub fn bench_policies(c: &mut Criterion) {
    let mut g = c.benchmark_group("aggregate");
    // BENCH_SAMPLE_SIZE=10 cargo bench -p vitals_core --bench aggregate
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE")
        && let Ok(n) = ss.parse::<usize>()
    {
        g.sample_size(n.max(10));
    }

    let policies = [
        FilterPolicy::ZScore { threshold: 1.0 },
        FilterPolicy::Iqr { k: 1.5 },
        FilterPolicy::StdDevBound { k: 1.0 },
        FilterPolicy::SigmaWindow { k: 2.0 },
    ];
    for &n in &[30usize, 1_000] {
        let run = synth_run(n, 0xC0FFEE);
        for policy in policies {
            g.bench_function(format!("{}_{n}", policy.name()), |b| {
                b.iter_batched(
                    || SampleSet::from_values(run.clone()),
                    |set| {
                        let est = aggregate(black_box(&set), black_box(policy));
                        let _ = black_box(est);
                    },
                    BatchSize::SmallInput,
                )
            });
        }
    }
    g.finish();
}

criterion_group!(benches, bench_policies);
criterion_main!(benches);
