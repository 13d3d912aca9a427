use crate::dsp::biquad::{Biquad, BiquadCoeffs};

/// Lowest cutoff of the brightness sweep.
const CUTOFF_FLOOR_HZ: f32 = 200.0;

/// Absolute ceiling of the sweep; the effective ceiling is
/// min(this, 0.45 * sample_rate).
const CUTOFF_CEIL_HZ: f32 = 12_000.0;

/// Relative cutoff change below which the filter is not recomputed.
const RECOMPUTE_TOLERANCE: f32 = 1e-3;

/// Dynamic brightness filter: a single 2nd-order low-pass whose cutoff is
/// exponentially mapped from the 0-1 brightness control, then nudged per
/// block by a bow-force-derived dynamic term so harder playing opens the
/// tone. Recomputes lazily against a small tolerance.
pub struct BrightnessFilter {
    filter: Biquad,
    sample_rate: f32,
    cached_cutoff: f32,
}

impl BrightnessFilter {
    pub fn new(sample_rate: f32) -> Self {
        let mut this = Self {
            filter: Biquad::silent(),
            sample_rate,
            cached_cutoff: 0.0,
        };
        this.update(0.5, 0.0);
        this
    }

    /// Map brightness (0-1) plus the dynamic term into a cutoff and
    /// recompute coefficients if it moved beyond tolerance.
    pub fn update(&mut self, brightness: f32, dynamic: f32) {
        let brightness = brightness.clamp(0.0, 1.0);
        let ceil = CUTOFF_CEIL_HZ.min(0.45 * self.sample_rate);

        let base = CUTOFF_FLOOR_HZ * (ceil / CUTOFF_FLOOR_HZ).powf(brightness);
        let cutoff = (base * (1.0 + dynamic.max(0.0))).clamp(CUTOFF_FLOOR_HZ, ceil);

        if self.cached_cutoff > 0.0
            && ((cutoff - self.cached_cutoff) / self.cached_cutoff).abs() < RECOMPUTE_TOLERANCE
        {
            return;
        }

        self.cached_cutoff = cutoff;
        self.filter
            .set_coeffs(BiquadCoeffs::lowpass(self.sample_rate, cutoff, 0.707));
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        self.filter.process(sample)
    }

    pub fn cutoff_hz(&self) -> f32 {
        self.cached_cutoff
    }

    pub fn reset(&mut self) {
        self.filter.reset();
    }
}
