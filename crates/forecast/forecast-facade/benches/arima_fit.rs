//! ARIMA fitting benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use forecast_facade::{Arima, ForecastContext, ForecastRequest};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sequence_spi::Sequence;

fn generate_data(n: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut z = vec![0.0; n];
    for t in 2..n {
        z[t] = 0.5 * z[t - 1] - 0.2 * z[t - 2] + rng.gen_range(-1.0..1.0);
    }
    z.iter()
        .enumerate()
        .map(|(i, v)| 100.0 + 10.0 * (i as f64 * 0.1).sin() + v)
        .collect()
}

fn bench_arima_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("arima_fit");
    for size in [100usize, 500, 1000] {
        let data = generate_data(size);
        group.bench_with_input(BenchmarkId::new("auto_order", size), &data, |b, data| {
            b.iter(|| {
                let mut model = Arima::new();
                let _ = model.fit_values(black_box(data));
            })
        });
    }
    group.finish();
}

fn bench_forecast_sequence(c: &mut Criterion) {
    let seq = Sequence::from_values(0, 60_000, generate_data(500));
    c.bench_function("forecast_sequence_1h", |b| {
        b.iter(|| {
            let mut ctx = ForecastContext::new();
            let _ = forecast_facade::forecast_sequence(
                &mut ctx,
                black_box(&seq),
                ForecastRequest::new(3600.0),
            );
        })
    });
}

criterion_group!(benches, bench_arima_fit, bench_forecast_sequence);
criterion_main!(benches);
