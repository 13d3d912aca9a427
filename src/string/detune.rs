use crate::dsp::noise::ValueNoise2;

/*
Detune Engine
=============

Emulates the slow intonation drift of a real player: a coherent noise
function sampled along an advancing time coordinate produces a pitch offset
that wanders over minutes, not milliseconds. The offset is squared against
the detune control so the knob has fine resolution near zero and only
reaches the full +/-12 semitone span at the extreme.

The engine samples once per block; the multiplier is then applied to the
fundamental for the whole block. Mode-bank recomputation keys off the 1%
change threshold in the control cache, so a nearly-still multiplier never
forces coefficient work.
*/

/// Drift rate in noise-lattice cells per second. One cell is roughly one
/// swing of the drift curve, so 1/90 puts the period in the minutes range.
const DRIFT_RATE: f64 = 1.0 / 90.0;

/// Fixed second lattice coordinate; each instance decorrelates via its seed.
const DRIFT_LANE: f32 = 17.31;

pub struct DetuneEngine {
    noise: ValueNoise2,
    time: f64,
    multiplier: f32,
}

impl DetuneEngine {
    pub fn new(seed: u64) -> Self {
        Self {
            noise: ValueNoise2::new(seed),
            time: 0.0,
            multiplier: 1.0,
        }
    }

    /// Advance the drift clock by one block and return the current
    /// frequency multiplier.
    pub fn advance_block(&mut self, block_len: usize, sample_rate: f32, amount: f32) -> f32 {
        self.time += block_len as f64 / sample_rate as f64 * DRIFT_RATE;

        let amount = amount.clamp(0.0, 1.0);
        let drift = self.noise.sample(self.time as f32, DRIFT_LANE);
        let semitones = drift * amount * amount * 12.0;
        self.multiplier = (semitones / 12.0).exp2();
        self.multiplier
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }
}
