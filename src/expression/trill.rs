/// Amplitude of the lift-off (lower) note relative to the hammer-on.
const LIFT_OFF_GAIN: f32 = 0.85;

/// Amplitude floor inside articulation gaps.
const GAP_FLOOR: f32 = 0.15;

/// Cycle-phase window around note boundaries accepted for stopping.
const STOP_WINDOW: f32 = 0.05;

/// Trill: alternation between the base note and note + interval.
///
/// One cycle covers both notes: the base note occupies the first half, the
/// upper note the second. Within each half the articulation duty-cycle
/// splits sounding time from a silent gap. The hammer-on (upper note) is
/// louder than the lift-off, and the pitch multiplier is frozen through
/// gaps so the resonator bank never sees a pitch step under silence.
pub struct Trill {
    cycle_phase: f32,
    held_pitch: f32,
    progress: f32,
    jitter: f32,
    rng: fastrand::Rng,
}

impl Trill {
    pub fn new(seed: u64) -> Self {
        Self {
            cycle_phase: 0.0,
            held_pitch: 1.0,
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
        interval_semitones: f32,
        speed_hz: f32,
        articulation: f32,
        variance: f32,
        sample_rate: f32,
    ) -> (f32, f32) {
        self.progress = progress;
        if progress <= 0.0 {
            self.cycle_phase = 0.0;
            self.held_pitch = 1.0;
            return (1.0, 1.0);
        }

        let interval = interval_semitones.clamp(1.0, 12.0);
        let speed_hz = speed_hz.clamp(1.0, 16.0);
        let duty = articulation.clamp(0.3, 0.95);

        self.jitter = (self.jitter + (self.rng.f32() * 2.0 - 1.0) * 0.02).clamp(-1.0, 1.0);
        let rate = speed_hz * (1.0 + 0.25 * variance * self.jitter);

        self.cycle_phase += rate / sample_rate;
        if self.cycle_phase >= 1.0 {
            self.cycle_phase -= 1.0;
        }

        let upper = self.cycle_phase >= 0.5;
        let half_pos = if upper {
            (self.cycle_phase - 0.5) * 2.0
        } else {
            self.cycle_phase * 2.0
        };

        let gate = if half_pos < duty {
            // Sounding: commit the note's pitch and shape a quick stroke.
            self.held_pitch = if upper {
                (interval * progress / 12.0).exp2()
            } else {
                1.0
            };
            let asym = if upper { 1.0 } else { LIFT_OFF_GAIN };
            let shape = (std::f32::consts::PI * half_pos / duty).sin();
            (shape * 1.6).min(1.0) * asym
        } else {
            GAP_FLOOR
        };

        let amplitude = 1.0 + progress * (gate - 1.0);
        (self.held_pitch, amplitude)
    }

    /// Trill must stop on a note boundary.
    pub fn can_stop_at(&self) -> bool {
        let d0 = self.cycle_phase.min(1.0 - self.cycle_phase);
        let d_half = (self.cycle_phase - 0.5).abs();
        d0 < STOP_WINDOW || d_half < STOP_WINDOW
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    #[test]
    fn neutral_when_inactive() {
        let mut t = Trill::new(1);
        assert_eq!(t.tick(0.0, 2.0, 8.0, 0.7, 0.0, SAMPLE_RATE), (1.0, 1.0));
    }

    #[test]
    fn alternates_between_base_and_interval() {
        let mut t = Trill::new(1);
        let upper = (2.0f32 / 12.0).exp2();
        let mut saw_base = false;
        let mut saw_upper = false;
        for _ in 0..48_000 {
            let (p, _) = t.tick(1.0, 2.0, 8.0, 0.9, 0.0, SAMPLE_RATE);
            if (p - 1.0).abs() < 1e-6 {
                saw_base = true;
            }
            if (p - upper).abs() < 1e-4 {
                saw_upper = true;
            }
            assert!(p >= 1.0 - 1e-6 && p <= upper + 1e-4, "pitch out of range: {}", p);
        }
        assert!(saw_base && saw_upper);
    }

    #[test]
    fn pitch_is_frozen_through_gaps() {
        // Gap samples compute amplitude from the constant floor, so they
        // compare bitwise-equal; across any two consecutive gap samples the
        // pitch must not move.
        let gap_amp = 1.0 + (GAP_FLOOR - 1.0);
        let mut t = Trill::new(1);
        let mut prev: Option<(f32, f32)> = None;
        let mut gap_pairs = 0u32;
        for _ in 0..96_000 {
            let (p, a) = t.tick(1.0, 3.0, 6.0, 0.5, 0.0, SAMPLE_RATE);
            if let Some((pp, pa)) = prev {
                if pa == gap_amp && a == gap_amp {
                    gap_pairs += 1;
                    assert_eq!(p, pp, "pitch stepped inside a gap");
                }
            }
            prev = Some((p, a));
        }
        assert!(gap_pairs > 100, "expected to observe gaps, got {}", gap_pairs);
    }

    #[test]
    fn hammer_on_is_louder_than_lift_off() {
        let mut t = Trill::new(1);
        let upper_target = (2.0f32 / 12.0).exp2();
        let mut peak_upper = 0.0f32;
        let mut peak_base = 0.0f32;
        for _ in 0..96_000 {
            let (p, a) = t.tick(1.0, 2.0, 8.0, 0.9, 0.0, SAMPLE_RATE);
            if (p - upper_target).abs() < 1e-4 {
                peak_upper = peak_upper.max(a);
            } else {
                peak_base = peak_base.max(a);
            }
        }
        assert!(
            peak_upper > peak_base,
            "hammer-on {} should exceed lift-off {}",
            peak_upper,
            peak_base
        );
    }
}
