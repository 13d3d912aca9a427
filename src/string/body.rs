use crate::dsp::biquad::{Biquad, BiquadCoeffs};
use crate::string::material::{BodyType, BODY_MODE_COUNT};

/// Parallel-bank normalization.
const BODY_NORM: f32 = 0.35;

/// Instrument-body coloration: five parallel band-pass formants selected by
/// body type, cross-faded against the dry signal by the body-resonance mix
/// control. Coefficients are recomputed only when the body selector
/// changes.
pub struct BodyResonator {
    filters: [Biquad; BODY_MODE_COUNT],
    gains: [f32; BODY_MODE_COUNT],
    body: BodyType,
    sample_rate: f32,
}

impl BodyResonator {
    pub fn new(sample_rate: f32, body: BodyType) -> Self {
        let mut this = Self {
            filters: [Biquad::silent(); BODY_MODE_COUNT],
            gains: [0.0; BODY_MODE_COUNT],
            body,
            sample_rate,
        };
        this.recompute();
        this
    }

    pub fn body(&self) -> BodyType {
        self.body
    }

    /// Select a body preset. No-op (and no recompute) when the selector is
    /// unchanged.
    pub fn set_body(&mut self, body: BodyType) {
        if body == self.body {
            return;
        }
        self.body = body;
        self.recompute();
    }

    fn recompute(&mut self) {
        for (i, preset) in self.body.modes().iter().enumerate() {
            self.filters[i].set_coeffs(BiquadCoeffs::bandpass(
                self.sample_rate,
                preset.freq_hz,
                preset.q,
            ));
            self.gains[i] = preset.gain;
        }
    }

    /// Cross-fade the dry input against the formant-bank output.
    #[inline]
    pub fn process(&mut self, sample: f32, mix: f32) -> f32 {
        let mix = mix.clamp(0.0, 1.0);

        let mut colored = 0.0;
        for (filter, gain) in self.filters.iter_mut().zip(self.gains.iter()) {
            colored += filter.process(sample) * gain;
        }
        colored *= BODY_NORM;

        sample * (1.0 - mix) + colored * mix
    }

    pub fn reset(&mut self) {
        for filter in self.filters.iter_mut() {
            filter.reset();
        }
    }
}
