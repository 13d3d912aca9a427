//! Render three seconds of bowed tone offline and print level stats.

use arco_dsp::engine::{Action, EngineCommand};
use arco_dsp::{BowedStringEngine, EngineConfig, FdnReverb};

fn main() {
    let mut engine = BowedStringEngine::new(EngineConfig::default()).expect("default config");
    let mut reverb = FdnReverb::new(engine.config().sample_rate);
    engine.apply(EngineCommand::now(Action::SetBowing(true)));

    let mut buffer = vec![0.0f32; 48_000 * 3];
    for chunk in buffer.chunks_mut(512) {
        engine.render_block(chunk);
    }
    reverb.render_block(&mut buffer);

    let peak = buffer.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
    let rms = (buffer.iter().map(|s| s * s).sum::<f32>() / buffer.len() as f32).sqrt();
    println!(
        "rendered {} samples  peak {:.3}  rms {:.3}",
        buffer.len(),
        peak,
        rms
    );
}
