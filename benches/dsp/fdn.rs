//! Benchmarks for the FDN reverb.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};

use arco_dsp::FdnReverb;

use crate::BLOCK_SIZES;

pub fn bench_fdn(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/fdn");

    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| {
                if i < 10 {
                    1.0 - (i as f32 / 10.0) // Initial impulse
                } else {
                    (i as f32 * 0.05).sin() * 0.1 // Quiet tail
                }
            })
            .collect();

        // Small room (short reverb)
        let mut reverb = FdnReverb::new(sample_rate);
        reverb.set_room_size(0.2);
        reverb.set_decay(0.3);
        group.bench_with_input(BenchmarkId::new("small_room", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &sample in &input {
                    sum += reverb.process(black_box(sample));
                }
                sum
            })
        });

        // Large hall with full modulation
        let mut reverb = FdnReverb::new(sample_rate);
        reverb.set_room_size(0.9);
        reverb.set_decay(0.9);
        reverb.set_modulation(1.0, 1.0);
        group.bench_with_input(BenchmarkId::new("large_hall", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &sample in &input {
                    sum += reverb.process(black_box(sample));
                }
                sum
            })
        });
    }

    group.finish();
}
