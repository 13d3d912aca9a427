use std::f32::consts::PI;

/// Accent gain on the first stroke of each group.
const ACCENT_GAIN: f32 = 1.25;

/// Phase window (fraction of a stroke) treated as a direction reversal.
const SCRATCH_WINDOW: f32 = 0.08;

/// Stroke-phase window accepted as a stroke boundary for stopping.
const STOP_WINDOW: f32 = 0.06;

/// Bow-stroke tremolo: a per-stroke amplitude envelope with
/// speed-dependent "scratchiness" near bow-direction reversals, a group
/// accent every 3-4 strokes (alternating 3,4,3,4 so accents stay
/// deterministic), and an articulation duty-cycle splitting each stroke
/// into sounding and silent portions.
pub struct Tremolo {
    stroke_phase: f32,
    stroke_in_group: u32,
    group_len: u32,
    progress: f32,
    jitter: f32,
    rng: fastrand::Rng,
}

impl Tremolo {
    pub fn new(seed: u64) -> Self {
        Self {
            stroke_phase: 0.0,
            stroke_in_group: 0,
            group_len: 3,
            progress: 0.0,
            jitter: 0.0,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// One sample of modulation. Returns the amplitude multiplier.
    pub fn tick(
        &mut self,
        progress: f32,
        speed_hz: f32,
        depth: f32,
        articulation: f32,
        variance: f32,
        sample_rate: f32,
    ) -> f32 {
        self.progress = progress;
        if progress <= 0.0 {
            self.stroke_phase = 0.0;
            self.stroke_in_group = 0;
            return 1.0;
        }

        let duty = articulation.clamp(0.3, 0.95);
        let speed_hz = speed_hz.clamp(0.5, 20.0);

        self.jitter = (self.jitter + (self.rng.f32() * 2.0 - 1.0) * 0.02).clamp(-1.0, 1.0);
        let rate = speed_hz * (1.0 + 0.25 * variance * self.jitter);

        self.stroke_phase += rate / sample_rate;
        if self.stroke_phase >= 1.0 {
            self.stroke_phase -= 1.0;
            self.stroke_in_group += 1;
            if self.stroke_in_group >= self.group_len {
                self.stroke_in_group = 0;
                self.group_len = if self.group_len == 3 { 4 } else { 3 };
            }
        }

        let ph = self.stroke_phase;
        let accent = if self.stroke_in_group == 0 {
            ACCENT_GAIN
        } else {
            1.0
        };

        let mut envelope = if ph < duty {
            (PI * ph / duty).sin() * accent
        } else {
            0.0
        };

        // Scratchiness: broadband roughness where the bow reverses, louder
        // at higher stroke rates.
        let edge = ph.min((duty - ph).abs());
        if ph < duty && edge < SCRATCH_WINDOW {
            let speed_norm = (speed_hz / 16.0).min(1.0);
            let scratch = (self.rng.f32() * 2.0 - 1.0)
                * (0.2 + 0.8 * speed_norm)
                * (1.0 - edge / SCRATCH_WINDOW)
                * 0.3;
            envelope += scratch;
        }

        let depth_eff = depth.clamp(0.0, 1.0) * progress;
        1.0 - depth_eff + depth_eff * envelope.max(0.0)
    }

    /// Tremolo must stop on a stroke boundary.
    pub fn can_stop_at(&self) -> bool {
        self.stroke_phase < STOP_WINDOW || self.stroke_phase > 1.0 - STOP_WINDOW
    }
}
