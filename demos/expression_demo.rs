//! Trace the expression state machine through a VIBRATO -> TRILL handover.
//!
//! Prints one line per 100 ms of rendered audio; watch `current` route
//! through None between the two ornaments.

use arco_dsp::engine::{Action, EngineCommand};
use arco_dsp::{BowedStringEngine, EngineConfig, Expression};

fn main() {
    let mut engine = BowedStringEngine::new(EngineConfig::default()).expect("default config");
    engine.apply(EngineCommand::now(Action::SetBowing(true)));
    engine.apply(EngineCommand::now(Action::SetExpression(
        Expression::Vibrato,
    )));

    let mut block = vec![0.0f32; 4_800]; // 100 ms at 48 kHz
    for step in 0..40 {
        if step == 15 {
            engine.apply(EngineCommand::now(Action::SetExpression(Expression::Trill)));
            println!("--- requested TRILL ---");
        }
        engine.render_block(&mut block);

        let s = engine.snapshot();
        println!(
            "{:>5} ms  current={:?} phase={:?}  vib={:.2} trill={:.2}",
            step * 100,
            s.current,
            s.phase,
            s.vibrato_progress,
            s.trill_progress
        );
    }
}
