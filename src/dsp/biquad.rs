use std::f32::consts::TAU;

/*
| type      | passes          | used by                            |
| --------- | --------------- | ---------------------------------- |
| band-pass | around center   | string modes, body formants        |
| low-pass  | below cutoff    | dynamic brightness filter          |

Coefficients follow the standard two-pole resonant design: for a section with
denominator 1 + a1*z^-1 + a2*z^-2 the complex-conjugate pole pair sits at
radius sqrt(a2), so stability is a2 < 1. Both designs below keep a2 strictly
below one for any finite frequency/Q, which is what lets the mode bank
recompute coefficients freely without runtime stability checks.
*/

/// Compiled coefficients for one biquad section.
///
/// A zeroed set is a valid "silenced" section: it outputs nothing and drains
/// its state registers within two samples, which is how modes above Nyquist
/// are parked without shrinking the bank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoeffs {
    /// Silenced section: all-zero coefficients.
    pub fn zero() -> Self {
        Self {
            b0: 0.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    /// Constant-peak-gain resonant band-pass centered on `freq_hz`.
    pub fn bandpass(sample_rate: f32, freq_hz: f32, q: f32) -> Self {
        let freq_hz = freq_hz.clamp(1.0, sample_rate * 0.49);
        let q = q.max(0.1);

        let omega = TAU * freq_hz / sample_rate;
        let alpha = omega.sin() / (2.0 * q);
        let a0 = 1.0 + alpha;

        Self {
            b0: alpha / a0,
            b1: 0.0,
            b2: -alpha / a0,
            a1: -2.0 * omega.cos() / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    /// Second-order low-pass with cutoff `freq_hz`.
    pub fn lowpass(sample_rate: f32, freq_hz: f32, q: f32) -> Self {
        let freq_hz = freq_hz.clamp(1.0, sample_rate * 0.49);
        let q = q.max(0.1);

        let omega = TAU * freq_hz / sample_rate;
        let (sin, cos) = omega.sin_cos();
        let alpha = sin / (2.0 * q);
        let a0 = 1.0 + alpha;

        Self {
            b0: (1.0 - cos) / (2.0 * a0),
            b1: (1.0 - cos) / a0,
            b2: (1.0 - cos) / (2.0 * a0),
            a1: -2.0 * cos / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    /// Pole radius of the section. Valid for the complex-conjugate pole
    /// pairs both designs above produce; must stay below 1.0.
    pub fn pole_radius(&self) -> f32 {
        self.a2.abs().sqrt()
    }

    pub fn is_silent(&self) -> bool {
        self.b0 == 0.0 && self.b1 == 0.0 && self.b2 == 0.0
    }
}

/// One biquad section: compiled coefficients plus two state registers.
///
/// Processing uses transposed direct form II, which keeps exactly the two
/// registers the coefficient update must preserve (coefficients may be
/// swapped under a live signal without resetting state).
#[derive(Debug, Clone, Copy)]
pub struct Biquad {
    coeffs: BiquadCoeffs,
    z1: f32,
    z2: f32,
}

impl Biquad {
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self {
            coeffs,
            z1: 0.0,
            z2: 0.0,
        }
    }

    pub fn silent() -> Self {
        Self::new(BiquadCoeffs::zero())
    }

    /// Swap in new coefficients, preserving filter state.
    pub fn set_coeffs(&mut self, coeffs: BiquadCoeffs) {
        self.coeffs = coeffs;
    }

    pub fn coeffs(&self) -> &BiquadCoeffs {
        &self.coeffs
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let c = &self.coeffs;
        let y = c.b0 * sample + self.z1;
        self.z1 = c.b1 * sample - c.a1 * y + self.z2;
        self.z2 = c.b2 * sample - c.a2 * y;
        y
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}
