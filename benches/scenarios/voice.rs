//! Full voice-chain benchmarks: engine render plus reverb.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};

use arco_dsp::engine::{Action, EngineCommand};
use arco_dsp::{BowedStringEngine, EngineConfig, Expression, FdnReverb};

use crate::BLOCK_SIZES;

pub fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voice");

    for &size in BLOCK_SIZES {
        // Plain bowed tone.
        let mut engine =
            BowedStringEngine::new(EngineConfig::default()).expect("default config");
        engine.apply(EngineCommand::now(Action::SetBowing(true)));
        let mut buffer = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("bowed", size), &size, |b, _| {
            b.iter(|| {
                engine.render_block(black_box(&mut buffer));
                buffer[0]
            })
        });

        // Vibrato voice into the reverb, the full performance chain.
        let mut engine =
            BowedStringEngine::new(EngineConfig::default()).expect("default config");
        engine.apply(EngineCommand::now(Action::SetBowing(true)));
        engine.apply(EngineCommand::now(Action::SetExpression(
            Expression::Vibrato,
        )));
        let mut reverb = FdnReverb::new(48_000.0);
        reverb.set_mix(0.3);
        let mut buffer = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("vibrato_reverb", size), &size, |b, _| {
            b.iter(|| {
                engine.render_block(black_box(&mut buffer));
                reverb.render_block(&mut buffer);
                buffer[0]
            })
        });
    }

    group.finish();
}
