use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use redund_core::{MemorySink, NullSink, PressureParams, Voter};

// Noisy readings around `centre` with an occasional spike.
fn synth_readings(n: usize, centre: f64, seed: u32) -> Vec<f64> {
    // tiny PRNG
    let mut state = seed.max(1);
    let mut next_f64 = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        f64::from(x) / (f64::from(u32::MAX) + 1.0)
    };
    (0..n)
        .map(|i| {
            let noise = (next_f64() * 2.0 - 1.0) * 0.5;
            if i % 17 == 0 { centre * 3.0 } else { centre + noise }
        })
        .collect()
}

fn sample_size(g: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>) {
    // BENCH_SAMPLE_SIZE=10 cargo bench -p redund_core --bench voting
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE")
        && let Ok(n) = ss.parse::<usize>()
    {
        g.sample_size(n.max(10));
    } else {
        g.sample_size(50);
    }
}

pub fn bench_aggregate(c: &mut Criterion) {
    let mut g = c.benchmark_group("aggregate");
    sample_size(&mut g);
    let agg = PressureParams::default().aggregator();
    for &n in &[4usize, 32, 256] {
        let readings = synth_readings(n, 32.0, 0xC0FFEE);
        g.bench_function(format!("leave_one_out_{n}"), |b| {
            b.iter(|| black_box(agg.aggregate(black_box(&readings), 0, &NullSink)))
        });
    }
    g.finish();
}

pub fn bench_vote_grid(c: &mut Criterion) {
    let mut g = c.benchmark_group("vote_grid");
    sample_size(&mut g);
    let voter = Voter::default();
    let grid: Vec<Vec<f64>> = (0..64).map(|z| vec![f64::from(z % 10) * 10.0; 8]).collect();
    let mut faulty = grid.clone();
    faulty[3][2] = 99.0;
    let replicas = vec![grid.clone(), faulty, grid];
    g.bench_function("tmr_64x8", |b| {
        b.iter_batched(
            MemorySink::new,
            |sink| black_box(voter.vote_grid(black_box(&replicas), &sink)),
            BatchSize::SmallInput,
        )
    });
    g.finish();
}

criterion_group!(voting, bench_aggregate, bench_vote_grid);
criterion_main!(voting);
