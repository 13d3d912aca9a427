//! Benchmarks for the string mode bank.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};

use arco_dsp::string::{ModeBank, StringMaterial};

use crate::BLOCK_SIZES;

pub fn bench_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/modes");

    let sample_rate = 48_000.0;

    // Coefficient recomputation, the expensive control-path operation the
    // cache exists to avoid.
    group.bench_function("recompute", |b| {
        let mut bank = ModeBank::new(sample_rate);
        let mut fundamental = 110.0;
        b.iter(|| {
            fundamental = if fundamental > 440.0 { 110.0 } else { fundamental * 1.01 };
            bank.recompute(
                black_box(fundamental),
                StringMaterial::Steel,
                0.3,
                0.12,
            );
        })
    });

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();

        let mut bank = ModeBank::new(sample_rate);
        bank.recompute(220.0, StringMaterial::Steel, 0.3, 0.12);
        group.bench_with_input(BenchmarkId::new("process", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &sample in &input {
                    sum += bank.process(black_box(sample));
                }
                sum
            })
        });
    }

    group.finish();
}
