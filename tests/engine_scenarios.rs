//! End-to-end scenarios driving the public engine API the way a host
//! would: commands in, audio out, snapshots observed.

use rustfft::{num_complex::Complex, FftPlanner};

use arco_dsp::engine::{Action, EngineCommand, ParamId};
use arco_dsp::{BowedStringEngine, EngineConfig, Expression, FdnReverb};

const SAMPLE_RATE: f32 = 48_000.0;

fn engine() -> BowedStringEngine {
    BowedStringEngine::new(EngineConfig::default()).expect("default config")
}

/// Dominant frequency of a buffer via a Hann-windowed FFT peak.
fn dominant_frequency(samples: &[f32], sample_rate: f32) -> f32 {
    let n = samples.len();
    let mut buf: Vec<Complex<f32>> = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let w = 0.5 - 0.5 * (std::f32::consts::TAU * i as f32 / n as f32).cos();
            Complex { re: s * w, im: 0.0 }
        })
        .collect();

    FftPlanner::new().plan_fft_forward(n).process(&mut buf);

    let mut peak_bin = 1;
    let mut peak_mag = 0.0f32;
    for (bin, c) in buf.iter().enumerate().take(n / 2).skip(1) {
        let mag = c.norm_sqr();
        if mag > peak_mag {
            peak_mag = mag;
            peak_bin = bin;
        }
    }
    peak_bin as f32 * sample_rate / n as f32
}

#[test]
fn bowed_tone_lands_on_the_requested_fundamental() {
    let mut engine = engine();
    let controls = engine.controls();
    controls.set(ParamId::FundamentalFrequency, 440.0);
    controls.set(ParamId::BowForce, 0.8);
    engine.apply(EngineCommand::now(Action::SetBowing(true)));

    // Let the gate envelope and resonators settle, then capture.
    let mut warmup = vec![0.0f32; 10_000];
    engine.render_block(&mut warmup);

    let mut capture = vec![0.0f32; 32_768];
    engine.render_block(&mut capture);

    let detected = dominant_frequency(&capture, SAMPLE_RATE);
    assert!(
        (detected - 440.0).abs() / 440.0 < 0.01,
        "dominant frequency {} Hz is more than 1% from 440 Hz",
        detected
    );
}

#[test]
fn vibrato_command_establishes_within_the_transition() {
    let mut engine = engine();
    let controls = engine.controls();
    controls.set(ParamId::VibratoRate, 5.0);
    controls.set(ParamId::VibratoDepth, 1.0);
    engine.apply(EngineCommand::now(Action::SetBowing(true)));
    engine.apply(EngineCommand::now(Action::SetExpression(
        Expression::Vibrato,
    )));

    // Default transition duration is one second.
    let mut out = vec![0.0f32; 48_000];
    engine.render_block(&mut out);

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.current, Expression::Vibrato);
    assert_eq!(snapshot.vibrato_progress, 1.0);
}

#[test]
fn expression_handover_is_observed_through_the_hub() {
    let mut engine = engine();
    engine.apply(EngineCommand::now(Action::SetBowing(true)));
    engine.apply(EngineCommand::now(Action::SetExpression(
        Expression::Vibrato,
    )));

    let mut block = vec![0.0f32; 96_000];
    engine.render_block(&mut block);
    assert_eq!(engine.snapshot().current, Expression::Vibrato);

    engine.apply(EngineCommand::now(Action::SetExpression(Expression::Trill)));

    // Observe `current` at fine granularity across the whole handover.
    let mut observed = vec![engine.snapshot().current];
    let mut small = vec![0.0f32; 64];
    for _ in 0..(48_000 * 6 / 64) {
        engine.render_block(&mut small);
        let current = engine.snapshot().current;
        if *observed.last().unwrap() != current {
            observed.push(current);
        }
        if current == Expression::Trill {
            break;
        }
    }

    assert_eq!(
        observed,
        vec![Expression::Vibrato, Expression::None, Expression::Trill],
        "vibrato must never hand over to trill without passing through None"
    );
}

#[test]
fn detuned_engine_stays_near_the_fundamental() {
    let mut engine = engine();
    let controls = engine.controls();
    controls.set(ParamId::FundamentalFrequency, 440.0);
    controls.set(ParamId::Detune, 0.2);
    engine.apply(EngineCommand::now(Action::SetBowing(true)));

    let mut warmup = vec![0.0f32; 10_000];
    engine.render_block(&mut warmup);
    let mut capture = vec![0.0f32; 32_768];
    engine.render_block(&mut capture);

    // amount^2 * 12 semitones at 0.2 is under a half semitone of drift.
    let detected = dominant_frequency(&capture, SAMPLE_RATE);
    assert!(
        (detected / 440.0).log2().abs() * 12.0 < 1.0,
        "drift too large: detected {} Hz",
        detected
    );
}

#[test]
fn synthesis_into_reverb_chain_is_stable() {
    let mut engine = engine();
    let mut reverb = FdnReverb::new(SAMPLE_RATE);
    reverb.set_mix(0.4);

    engine.apply(EngineCommand::now(Action::SetBowing(true)));
    engine
        .controls()
        .set(ParamId::BowForce, 1.0);

    let mut block = vec![0.0f32; 512];
    let mut energy = 0.0f32;
    for _ in 0..(48_000 * 2 / 512) {
        engine.render_block(&mut block);
        reverb.render_block(&mut block);
        for &s in block.iter() {
            assert!(s.is_finite());
            assert!(s.abs() <= 2.0, "chain output out of bounds: {}", s);
            energy += s * s;
        }
    }
    assert!(energy > 0.01, "chain should produce sound");
}

#[test]
fn scheduled_commands_fire_in_sync_across_instances() {
    // Two engines given the same scheduled command but rendered under
    // different host block sizes must start bowing on the same sample.
    let start = 12_000u64;
    let onset_of = |block_size: usize| {
        let mut engine = engine();
        engine.apply(EngineCommand::at(Action::SetBowing(true), start));
        let mut out = vec![0.0f32; 24_000];
        for chunk in out.chunks_mut(block_size) {
            engine.render_block(chunk);
        }
        out.iter()
            .position(|&s| s.abs() > 1e-6)
            .expect("bowing should start")
    };

    let coarse = onset_of(2_048);
    let fine = onset_of(375);
    assert_eq!(coarse, fine);
    assert!(coarse >= start as usize);
}
