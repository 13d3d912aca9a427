use crate::dsp::noise::NoiseSource;
use std::f32::consts::TAU;

/*
Bow Excitation Generator
========================

Produces the raw driving signal for the mode bank from bow physics inputs.
Per sample:

  1. A sawtooth phase advances at the (detuned, vibrato-modulated)
     fundamental rate - the Helmholtz "slip" cycle.
  2. 2nd/3rd harmonic content is added, scaled by bow speed (a faster bow
     drives the string more smoothly and richly).
  3. A small random stick-slip perturbation roughens the cycle.
  4. The tone is blended against broadband noise: more force pushes the
     blend toward noise (pressed, scratchy), more speed pulls it back
     toward tone.
  5. The result is scaled by bow force, the bowing gate envelope, and the
     expression engine's amplitude factor.

Bowing on/off is a slew-limited ramp, not a hard gate; switching mid-note
fades over GATE_RAMP_SECONDS instead of clicking.
*/

/// Full-scale gate ramp time in seconds.
const GATE_RAMP_SECONDS: f32 = 0.04;

/// Stick-slip perturbation depth at full force.
const STICK_SLIP_DEPTH: f32 = 0.04;

pub struct BowExcitation {
    phase: f32,
    envelope: f32,
    bowing: bool,
    noise: NoiseSource,
}

impl BowExcitation {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: 0.0,
            envelope: 0.0,
            bowing: false,
            noise: NoiseSource::new(seed),
        }
    }

    pub fn set_bowing(&mut self, bowing: bool) {
        self.bowing = bowing;
    }

    pub fn is_bowing(&self) -> bool {
        self.bowing
    }

    /// Gate envelope level (0 = silent, 1 = fully bowed).
    pub fn envelope(&self) -> f32 {
        self.envelope
    }

    #[inline]
    pub fn next_sample(
        &mut self,
        freq_hz: f32,
        force: f32,
        speed: f32,
        amp_mod: f32,
        sample_rate: f32,
    ) -> f32 {
        // Slew-limited gate.
        let ramp = 1.0 / (GATE_RAMP_SECONDS * sample_rate);
        let target = if self.bowing { 1.0 } else { 0.0 };
        if self.envelope < target {
            self.envelope = (self.envelope + ramp).min(target);
        } else if self.envelope > target {
            self.envelope = (self.envelope - ramp).max(target);
        }
        if self.envelope == 0.0 {
            return 0.0;
        }

        let force = force.clamp(0.0, 1.0);
        let speed = speed.clamp(0.0, 1.0);

        self.phase += freq_hz / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }

        let saw = 2.0 * self.phase - 1.0;
        let harmonics = (TAU * 2.0 * self.phase).sin() * 0.35 * speed
            + (TAU * 3.0 * self.phase).sin() * 0.2 * speed;
        let slip = self.noise.next_sample() * STICK_SLIP_DEPTH * force;
        let tone = saw * 0.8 + harmonics + slip;

        // Force pushes toward noise, speed pulls back toward tone.
        let noise_mix = (0.12 + 0.45 * force - 0.3 * speed).clamp(0.02, 0.7);
        let noise = self.noise.next_sample();
        let mixed = tone * (1.0 - noise_mix) + noise * noise_mix;

        mixed * (0.2 + 0.8 * force) * self.envelope * amp_mod
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.envelope = 0.0;
    }
}
