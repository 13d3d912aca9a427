//! Play a bowed A3 with vibrato through the default output for five seconds.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use arco_dsp::engine::{Action, EngineCommand, ParamId};
use arco_dsp::{BowedStringEngine, EngineConfig, Expression, FdnReverb, MAX_BLOCK_SIZE};

fn main() {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .expect("no default output device");
    let config = device
        .default_output_config()
        .expect("no default output config");

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let mut engine = BowedStringEngine::new(EngineConfig {
        sample_rate,
        ..Default::default()
    })
    .expect("engine construction");
    engine.controls().set(ParamId::FundamentalFrequency, 220.0);
    engine.apply(EngineCommand::now(Action::SetBowing(true)));
    engine.apply(EngineCommand::now(Action::SetExpression(
        Expression::Vibrato,
    )));

    let mut reverb = FdnReverb::new(sample_rate);
    reverb.set_mix(0.3);

    let mut block = vec![0.0f32; MAX_BLOCK_SIZE];
    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let frames = data.len() / channels;
                let mut done = 0;
                while done < frames {
                    let n = (frames - done).min(MAX_BLOCK_SIZE);
                    let chunk = &mut block[..n];
                    engine.render_block(chunk);
                    for (i, &sample) in chunk.iter().enumerate() {
                        let (l, r) = reverb.process_stereo(sample, sample);
                        let base = (done + i) * channels;
                        for ch in 0..channels {
                            data[base + ch] = if ch % 2 == 0 { l } else { r };
                        }
                    }
                    done += n;
                }
            },
            |err| eprintln!("audio error: {err}"),
            None,
        )
        .expect("build stream");

    stream.play().expect("play stream");
    println!("bowing for five seconds...");
    std::thread::sleep(std::time::Duration::from_secs(5));
}
