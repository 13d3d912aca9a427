use crate::dsp::biquad::{Biquad, BiquadCoeffs};
use crate::string::material::StringMaterial;
use std::f32::consts::PI;

/*
String Modal Resonator Bank
===========================

32 parallel band-pass biquads, one per string harmonic, all driven by the
same excitation signal. For mode n:

  frequency   f_n = f0 * n * sqrt(1 + B*n^2)      (B: material inharmonicity)
  resonance   Q_n falls with n (higher modes decay faster) and with the
              damping control
  weight      rolloff^(n-1), geometric per-material spectral decay
  bow gain    |sin(pi * n * bowPosition)| - the comb imposed by where the
              bow sits: harmonics with a node at the bow point are
              suppressed

Modes whose frequency lands above Nyquist are silenced in place (all-zero
coefficients) so the bank keeps its fixed size and silenced slots cost two
multiplies. Coefficient recomputation preserves the two state registers of
every live mode, so parameter changes never click.
*/

pub const STRING_MODE_COUNT: usize = 32;

/// Summed-bank normalization.
const OUTPUT_NORM: f32 = 0.08;

/// Q falloff per mode index.
const Q_SLOPE: f32 = 0.09;

struct StringMode {
    filter: Biquad,
    weight: f32,
    bow_gain: f32,
}

pub struct ModeBank {
    modes: [StringMode; STRING_MODE_COUNT],
    sample_rate: f32,
}

impl ModeBank {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            modes: std::array::from_fn(|_| StringMode {
                filter: Biquad::silent(),
                weight: 0.0,
                bow_gain: 0.0,
            }),
            sample_rate,
        }
    }

    /// Recompute every mode's coefficients. Called from the control cache
    /// when fundamental (x detune), damping, bow position, or material
    /// changed; idempotent and state-preserving.
    pub fn recompute(
        &mut self,
        fundamental_hz: f32,
        material: StringMaterial,
        damping: f32,
        bow_position: f32,
    ) {
        // Wider than the declared input range: the detune multiplier can
        // push the effective fundamental an octave past either end.
        let fundamental_hz = fundamental_hz.clamp(10.0, 4_000.0);
        let damping = damping.clamp(0.0, 1.0);
        let bow_position = bow_position.clamp(0.02, 0.5);

        let nyquist = self.sample_rate * 0.5;
        let inharmonicity = material.inharmonicity();
        let base_q = material.base_q() * (1.0 - 0.65 * damping);
        let rolloff = material.rolloff();

        for (i, mode) in self.modes.iter_mut().enumerate() {
            let n = (i + 1) as f32;
            let freq = fundamental_hz * n * (1.0 + inharmonicity * n * n).sqrt();

            if freq >= nyquist {
                mode.filter.set_coeffs(BiquadCoeffs::zero());
                mode.weight = 0.0;
                mode.bow_gain = 0.0;
                continue;
            }

            let q = (base_q / (1.0 + Q_SLOPE * (n - 1.0))).max(2.0);
            mode.filter
                .set_coeffs(BiquadCoeffs::bandpass(self.sample_rate, freq, q));
            mode.weight = rolloff.powi(i as i32);
            mode.bow_gain = (PI * n * bow_position).sin().abs();
        }
    }

    /// Drive every mode with the excitation sample and sum.
    #[inline]
    pub fn process(&mut self, excitation: f32) -> f32 {
        let mut sum = 0.0;
        for mode in self.modes.iter_mut() {
            if mode.filter.coeffs().is_silent() {
                continue;
            }
            sum += mode.filter.process(excitation) * mode.weight * mode.bow_gain;
        }
        sum * OUTPUT_NORM
    }

    pub fn reset(&mut self) {
        for mode in self.modes.iter_mut() {
            mode.filter.reset();
        }
    }

    #[cfg(test)]
    fn pole_radii(&self) -> Vec<f32> {
        self.modes
            .iter()
            .filter(|m| !m.filter.coeffs().is_silent())
            .map(|m| m.filter.coeffs().pole_radius())
            .collect()
    }
}
