//! FDN Reverb - Room Simulation via a Feedback Delay Network
//!
//! An independent rendering unit fed by the synthesis output. Per sample:
//!
//! ```text
//! in -> [pre-delay] -> [DC block] -+-> [10 early taps] ------------+
//!                                  |                               |
//!                                  +-> [4x allpass diffusion] -+   |
//!                                                              v   v
//!        +--[12 modulated delay lines]--[12x12 Hadamard mix]--(+) (+)-> wet
//!        |            |                                        |
//!        +--[decay * damping * DC block]<----------------------+
//! ```
//!
//! The 12 delay lines are read with sinusoidally modulated,
//! linear-interpolated fractional delays (chorus-like density), mixed
//! through an orthogonal Hadamard matrix, damped, DC-blocked, and written
//! back with a decay gain hard-capped below unity - stability is
//! structural, never checked at runtime. Room-size changes rescale the
//! line lengths by [0.5x, 2x] through smooth current->target
//! interpolation; buffers are permanently sized for the maximum, so a
//! sweep never reallocates or overruns.

mod matrix;

use crate::dsp::delay::DelayLine;
use matrix::{HADAMARD, HADAMARD_NORM};
use std::f32::consts::TAU;

pub const FDN_LINES: usize = 12;
pub const EARLY_TAPS: usize = 10;
pub const DIFFUSION_STAGES: usize = 4;

/// Base delay-line lengths in ms, co-prime-ish so the modes interleave.
const LINE_BASE_MS: [f32; FDN_LINES] = [
    29.7, 37.1, 41.1, 43.7, 47.3, 53.9, 59.3, 61.7, 67.1, 71.3, 73.9, 79.1,
];

/// Per-line modulation LFO rates in Hz, spread so no two lines breathe
/// together.
const LINE_LFO_HZ: [f32; FDN_LINES] = [
    0.07, 0.11, 0.13, 0.17, 0.19, 0.23, 0.29, 0.31, 0.37, 0.41, 0.43, 0.53,
];

const ALLPASS_MS: [f32; DIFFUSION_STAGES] = [4.7, 3.6, 12.7, 9.3];

const EARLY_MS: [f32; EARLY_TAPS] = [
    11.3, 17.9, 22.7, 26.3, 31.7, 35.9, 41.3, 46.1, 52.7, 58.9,
];
const EARLY_GAIN: [f32; EARLY_TAPS] = [
    1.0, 0.86, 0.76, 0.68, 0.56, 0.48, 0.41, 0.34, 0.28, 0.22,
];
const EARLY_PAN: [f32; EARLY_TAPS] = [
    -0.8, 0.7, -0.55, 0.5, -0.4, 0.35, -0.25, 0.2, -0.1, 0.05,
];

const MAX_PRE_DELAY_MS: f32 = 250.0;
const ROOM_SCALE_MIN: f32 = 0.5;
const ROOM_SCALE_MAX: f32 = 2.0;
/// Modulation depth cap in samples; deeper wobble detunes the tail.
const MAX_MOD_SAMPLES: f32 = 8.0;
/// Hard ceiling on per-line feedback gain. Everything downstream assumes
/// the network decays.
const DECAY_CAP: f32 = 0.97;
const DC_COEFF: f32 = 0.995;
/// Per-sample fraction of the remaining length change applied while a
/// room-size transition is in flight.
const LENGTH_SLEW: f32 = 0.0004;

/// One-pole DC-blocking high-pass.
#[derive(Default)]
struct DcBlocker {
    x1: f32,
    y1: f32,
}

impl DcBlocker {
    #[inline]
    fn process(&mut self, x: f32) -> f32 {
        let y = x - self.x1 + DC_COEFF * self.y1;
        self.x1 = x;
        self.y1 = y;
        y
    }

    fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}

/// Allpass stage for input diffusion (pre-allocated, RT-safe).
struct DiffusionAllpass {
    buffer: Vec<f32>,
    write_pos: usize,
    gain: f32,
}

impl DiffusionAllpass {
    fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            write_pos: 0,
            gain: 0.6,
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.write_pos];
        let output = -self.gain * input + delayed;
        self.buffer[self.write_pos] = input + self.gain * output;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
        output
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

struct EarlyTap {
    delay_samples: usize,
    gain: f32,
    /// Constant-power pan gains, precomputed from the tap's pan position.
    pan_left: f32,
    pan_right: f32,
}

struct FdnLine {
    delay: DelayLine,
    current_len: f32,
    target_len: f32,
    lfo_phase: f32,
    lfo_rate_hz: f32,
    feedback_gain: f32,
    damp_state: f32,
    dc: DcBlocker,
}

pub struct FdnReverb {
    sample_rate: f32,
    pre_delay: DelayLine,
    pre_delay_samples: f32,
    input_dc: DcBlocker,
    early_line: DelayLine,
    early_taps: [EarlyTap; EARLY_TAPS],
    diffusers: [DiffusionAllpass; DIFFUSION_STAGES],
    lines: [FdnLine; FDN_LINES],

    mix: f32,
    room_size: f32,
    decay: f32,
    damping: f32,
    diffusion: f32,
    mod_depth_samples: f32,
    mod_rate_scale: f32,
    early_level: f32,
}

impl FdnReverb {
    pub fn new(sample_rate: f32) -> Self {
        let ms = |v: f32| v * sample_rate / 1000.0;

        let early_taps = std::array::from_fn(|i| {
            // pan in [-1, 1] -> angle in [0, pi/2].
            let angle = (EARLY_PAN[i] + 1.0) * 0.5 * std::f32::consts::FRAC_PI_2;
            EarlyTap {
                delay_samples: ms(EARLY_MS[i]).max(1.0) as usize,
                gain: EARLY_GAIN[i],
                pan_left: angle.cos(),
                pan_right: angle.sin(),
            }
        });

        let lines = std::array::from_fn(|i| {
            // Permanently sized for 2x room scale plus modulation headroom.
            let capacity = (ms(LINE_BASE_MS[i]) * ROOM_SCALE_MAX + MAX_MOD_SAMPLES + 8.0) as usize;
            let base_len = ms(LINE_BASE_MS[i]);
            FdnLine {
                delay: DelayLine::with_capacity(capacity),
                current_len: base_len,
                target_len: base_len,
                lfo_phase: i as f32 * 0.5,
                lfo_rate_hz: LINE_LFO_HZ[i],
                feedback_gain: 0.8,
                damp_state: 0.0,
                dc: DcBlocker::default(),
            }
        });

        let mut reverb = Self {
            sample_rate,
            pre_delay: DelayLine::with_capacity(ms(MAX_PRE_DELAY_MS) as usize + 8),
            pre_delay_samples: ms(20.0),
            input_dc: DcBlocker::default(),
            early_line: DelayLine::with_capacity(ms(EARLY_MS[EARLY_TAPS - 1]) as usize + 8),
            early_taps,
            diffusers: std::array::from_fn(|i| DiffusionAllpass::new(ms(ALLPASS_MS[i]) as usize)),
            lines,

            mix: 0.3,
            room_size: 0.5,
            decay: 0.5,
            damping: 0.4,
            diffusion: 0.7,
            mod_depth_samples: 0.3 * MAX_MOD_SAMPLES,
            mod_rate_scale: 1.0,
            early_level: 0.5,
        };
        reverb.apply_room_size();
        reverb.apply_diffusion();
        // Construction starts at the target; nothing to slew toward.
        for line in reverb.lines.iter_mut() {
            line.current_len = line.target_len;
        }
        reverb
    }

    /// Dry/wet blend. 0 is bit-transparent bypass.
    pub fn set_mix(&mut self, mix: f32) {
        self.mix = mix.clamp(0.0, 1.0);
    }

    /// Room size 0-1, rescaling every line length into [0.5x, 2x] of its
    /// base. Applied by smooth interpolation, never by jumping.
    pub fn set_room_size(&mut self, size: f32) {
        self.room_size = size.clamp(0.0, 1.0);
        self.apply_room_size();
    }

    /// Reverb time 0-1. The derived per-line gain is hard-capped below
    /// unity.
    pub fn set_decay(&mut self, decay: f32) {
        self.decay = decay.clamp(0.0, 1.0);
        self.apply_feedback_gains();
    }

    /// High-frequency absorption in the tail, 0-1.
    pub fn set_damping(&mut self, damping: f32) {
        self.damping = damping.clamp(0.0, 1.0);
    }

    pub fn set_pre_delay_ms(&mut self, ms: f32) {
        let ms = ms.clamp(0.0, MAX_PRE_DELAY_MS);
        self.pre_delay_samples = (ms * self.sample_rate / 1000.0).max(1.0);
    }

    /// Input diffusion amount, 0-1.
    pub fn set_diffusion(&mut self, diffusion: f32) {
        self.diffusion = diffusion.clamp(0.0, 1.0);
        self.apply_diffusion();
    }

    /// Delay-line modulation: depth 0-1 (capped internally for stability)
    /// and rate 0-1 (scales the per-line LFO frequencies 0.25x-2x).
    pub fn set_modulation(&mut self, depth: f32, rate: f32) {
        self.mod_depth_samples = depth.clamp(0.0, 1.0) * MAX_MOD_SAMPLES;
        self.mod_rate_scale = 0.25 + rate.clamp(0.0, 1.0) * 1.75;
    }

    /// Early-reflection share of the wet signal, 0-1.
    pub fn set_early_level(&mut self, level: f32) {
        self.early_level = level.clamp(0.0, 1.0);
    }

    pub fn mix(&self) -> f32 {
        self.mix
    }

    fn apply_room_size(&mut self) {
        // size 0 -> 0.5x, size 1 -> 2x, geometric through 1x at 0.5.
        let factor = (2.0f32).powf(2.0 * self.room_size - 1.0);
        let ms = self.sample_rate / 1000.0;
        for (line, base) in self.lines.iter_mut().zip(LINE_BASE_MS.iter()) {
            let len = base * ms * factor;
            let max_len = (line.delay.capacity() as f32) - MAX_MOD_SAMPLES - 4.0;
            line.target_len = len.clamp(4.0, max_len);
        }
        self.apply_feedback_gains();
    }

    fn apply_feedback_gains(&mut self) {
        // RT60-style gain: each line loses 60 dB over the decay time, so
        // longer lines feed back harder for the same tail length.
        let rt60 = 0.25 + self.decay * 5.75;
        for line in self.lines.iter_mut() {
            let gain = 10.0f32.powf(-3.0 * line.target_len / (rt60 * self.sample_rate));
            line.feedback_gain = gain.min(DECAY_CAP);
        }
    }

    fn apply_diffusion(&mut self) {
        let gain = 0.25 + 0.45 * self.diffusion;
        for ap in self.diffusers.iter_mut() {
            ap.gain = gain;
        }
    }

    /// Core network tick: returns (early_left, early_right, late).
    #[inline]
    fn tick(&mut self, mono_in: f32) -> (f32, f32, f32) {
        // Pre-delay, then DC-block the delayed input.
        self.pre_delay.write(mono_in);
        let delayed = self.pre_delay.read_interpolated(self.pre_delay_samples);
        let x = self.input_dc.process(delayed);

        // Early reflections.
        self.early_line.write(x);
        let mut early_l = 0.0;
        let mut early_r = 0.0;
        for tap in self.early_taps.iter() {
            let s = self.early_line.read(tap.delay_samples) * tap.gain;
            early_l += s * tap.pan_left;
            early_r += s * tap.pan_right;
        }
        early_l *= 0.3;
        early_r *= 0.3;

        // Input diffusion.
        let mut diffused = x;
        for ap in self.diffusers.iter_mut() {
            diffused = ap.process(diffused);
        }

        // Modulated line reads.
        let mut outputs = [0.0f32; FDN_LINES];
        for (out, line) in outputs.iter_mut().zip(self.lines.iter_mut()) {
            let wobble = line.lfo_phase.sin() * self.mod_depth_samples;
            *out = line.delay.read_interpolated(line.current_len + wobble);
            line.lfo_phase += TAU * line.lfo_rate_hz * self.mod_rate_scale / self.sample_rate;
            if line.lfo_phase >= TAU {
                line.lfo_phase -= TAU;
            }
        }

        // Orthogonal feedback mix.
        let mut mixed = [0.0f32; FDN_LINES];
        for (i, m) in mixed.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (j, out) in outputs.iter().enumerate() {
                acc += HADAMARD[i][j] * out;
            }
            *m = acc * HADAMARD_NORM;
        }

        // Decay, damp, DC-block, inject the diffused input, write back.
        let damp = self.damping * 0.75;
        let inject = diffused * (1.0 / FDN_LINES as f32);
        for (line, &m) in self.lines.iter_mut().zip(mixed.iter()) {
            let v = m * line.feedback_gain;
            line.damp_state = v * (1.0 - damp) + line.damp_state * damp;
            let w = line.dc.process(line.damp_state + inject);
            line.delay.write(w);
            line.current_len += (line.target_len - line.current_len) * LENGTH_SLEW;
        }

        // Late reverb is the raw (pre-matrix) line sum.
        let late = outputs.iter().sum::<f32>() * 0.25;
        (early_l, early_r, late)
    }

    #[inline]
    fn blend_wet(&self, early: f32, late: f32) -> f32 {
        let wet = late * (1.0 - 0.5 * self.early_level) + early * self.early_level;
        // The limiter sits on the wet path so a zero mix stays
        // bit-transparent.
        (wet * 0.7).tanh() * 1.4285
    }

    /// Process one mono sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let (early_l, early_r, late) = self.tick(input);
        let early = (early_l + early_r) * std::f32::consts::FRAC_1_SQRT_2;
        let wet = self.blend_wet(early, late);
        input * (1.0 - self.mix) + wet * self.mix
    }

    /// Process one stereo frame; input channels are summed to mono before
    /// the network, early reflections re-spread by their pan positions.
    #[inline]
    pub fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let (early_l, early_r, late) = self.tick((left + right) * 0.5);
        let wet_l = self.blend_wet(early_l, late);
        let wet_r = self.blend_wet(early_r, late);
        (
            left * (1.0 - self.mix) + wet_l * self.mix,
            right * (1.0 - self.mix) + wet_r * self.mix,
        )
    }

    /// In-place mono block processing.
    pub fn render_block(&mut self, io: &mut [f32]) {
        for sample in io.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.pre_delay.reset();
        self.early_line.reset();
        self.input_dc.reset();
        for ap in self.diffusers.iter_mut() {
            ap.reset();
        }
        for line in self.lines.iter_mut() {
            line.delay.reset();
            line.damp_state = 0.0;
            line.dc.reset();
            line.lfo_phase = 0.0;
        }
    }
}
