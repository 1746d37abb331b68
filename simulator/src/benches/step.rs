use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use jackson_simulator::{Config, Network, Queue};
use rand::{rngs::StdRng, SeedableRng};

/// Number of transitions performed per iteration.
const STEPS: u64 = 10_000;

/// A ring of `n` single-server queues where each queue exits with probability 0.2 and otherwise
/// forwards to the next queue.
fn ring(n: usize) -> Config {
    let stations = n + 1;
    let mut routing = vec![vec![0.0; stations]; stations];
    routing[0][1] = 1.0;
    for i in 1..stations {
        routing[i][0] = 0.2;
        routing[i][i % n + 1] = 0.8;
    }
    Config::new(1.0, vec![Queue::new(10.0, 1); n], routing)
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group(module_path!());
    for n in [2, 8, 32, 128] {
        let cfg = ring(n);
        group.bench_with_input(BenchmarkId::new("queues", n), &cfg, |b, cfg| {
            b.iter_batched(
                || Network::new(StdRng::seed_from_u64(0), cfg).unwrap(),
                |mut network| network.run(STEPS).unwrap(),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_step);
criterion_main!(benches);
