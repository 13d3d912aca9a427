use std::f32::consts::TAU;

/// Full-depth vibrato span in semitones (peak, each direction).
const SPAN_SEMITONES: f32 = 0.5;

/// Amplitude share of the modulation.
const AMP_DEPTH: f32 = 0.12;

/// Phase lag of the amplitude component behind the pitch component.
const AMP_LAG: f32 = 1.1;

/// Sinusoidal pitch/amplitude vibrato.
///
/// The master progress shapes rate and depth differently: rate tracks
/// progress linearly while depth tracks progress squared, so on a start the
/// wobble establishes its speed before it grows audible, and on a stop the
/// depth drains away before the rate winds down.
pub struct Vibrato {
    phase: f32,
    progress: f32,
    jitter: f32,
    rng: fastrand::Rng,
}

impl Vibrato {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: 0.0,
            progress: 0.0,
            jitter: 0.0,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// One sample of modulation. Returns (pitch multiplier, amplitude
    /// multiplier).
    pub fn tick(
        &mut self,
        progress: f32,
        rate_hz: f32,
        depth: f32,
        variance: f32,
        sample_rate: f32,
    ) -> (f32, f32) {
        self.progress = progress;
        if progress <= 0.0 {
            self.phase = 0.0;
            return (1.0, 1.0);
        }

        // Bounded random walk; variance scales how far it bends the rate.
        self.jitter = (self.jitter + (self.rng.f32() * 2.0 - 1.0) * 0.02).clamp(-1.0, 1.0);
        let rate = rate_hz * progress * (1.0 + 0.25 * variance * self.jitter);

        self.phase += TAU * rate / sample_rate;
        if self.phase >= TAU {
            self.phase -= TAU;
        }

        let depth_eff = depth.clamp(0.0, 1.0) * progress * progress;
        let pitch = (self.phase.sin() * depth_eff * SPAN_SEMITONES / 12.0).exp2();
        let amplitude = 1.0 + (self.phase - AMP_LAG).sin() * depth_eff * AMP_DEPTH;
        (pitch, amplitude)
    }

    /// Vibrato can stop at any point in its cycle.
    pub fn can_stop_at(&self) -> bool {
        true
    }
}
