//! Benchmarks for the bow excitation generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};

use arco_dsp::string::BowExcitation;

use crate::BLOCK_SIZES;

pub fn bench_excitation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/excitation");

    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        let mut bow = BowExcitation::new(7);
        bow.set_bowing(true);
        group.bench_with_input(BenchmarkId::new("bowed", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for _ in 0..size {
                    sum += bow.next_sample(black_box(220.0), 0.7, 0.5, 1.0, sample_rate);
                }
                sum
            })
        });
    }

    group.finish();
}
