#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of formant modes in every body preset.
pub const BODY_MODE_COUNT: usize = 5;

/// String material selector. Each material fixes the inharmonicity
/// coefficient, the base resonance, and the spectral rolloff of the mode
/// bank. The numbers are timbral presets reproduced as data.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringMaterial {
    #[default]
    Steel,
    Gut,
    Nylon,
    Wound,
}

impl StringMaterial {
    /// Map an external selector index (0-3) to a material, clamping
    /// out-of-range values to the last preset.
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Steel,
            1 => Self::Gut,
            2 => Self::Nylon,
            _ => Self::Wound,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Self::Steel => 0,
            Self::Gut => 1,
            Self::Nylon => 2,
            Self::Wound => 3,
        }
    }

    /// Inharmonicity coefficient B in f_n = f0 * n * sqrt(1 + B*n^2).
    pub fn inharmonicity(self) -> f32 {
        match self {
            Self::Steel => 1.2e-4,
            Self::Gut => 3.5e-4,
            Self::Nylon => 2.6e-4,
            Self::Wound => 0.8e-4,
        }
    }

    /// Base resonance Q of the fundamental mode.
    pub fn base_q(self) -> f32 {
        match self {
            Self::Steel => 950.0,
            Self::Gut => 420.0,
            Self::Nylon => 360.0,
            Self::Wound => 720.0,
        }
    }

    /// Geometric per-mode amplitude rolloff (weight of mode n is
    /// rolloff^(n-1)).
    pub fn rolloff(self) -> f32 {
        match self {
            Self::Steel => 0.91,
            Self::Gut => 0.85,
            Self::Nylon => 0.82,
            Self::Wound => 0.88,
        }
    }
}

/// One formant of a body preset: center frequency, resonance, gain.
#[derive(Debug, Clone, Copy)]
pub struct BodyMode {
    pub freq_hz: f32,
    pub q: f32,
    pub gain: f32,
}

/// Instrument-body selector. Each body contributes a fixed set of five
/// formant band-passes; the tables below are timbral presets reproduced
/// as data.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyType {
    #[default]
    Violin,
    Viola,
    Cello,
    DoubleBass,
    Guitar,
}

impl BodyType {
    /// Map an external selector index (0-4) to a body, clamping
    /// out-of-range values to the last preset.
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Violin,
            1 => Self::Viola,
            2 => Self::Cello,
            3 => Self::DoubleBass,
            _ => Self::Guitar,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Self::Violin => 0,
            Self::Viola => 1,
            Self::Cello => 2,
            Self::DoubleBass => 3,
            Self::Guitar => 4,
        }
    }

    pub fn modes(self) -> [BodyMode; BODY_MODE_COUNT] {
        const fn m(freq_hz: f32, q: f32, gain: f32) -> BodyMode {
            BodyMode { freq_hz, q, gain }
        }
        match self {
            // Main air/wood resonances, loosely after violin A0/T1/C-bouts.
            Self::Violin => [
                m(275.0, 9.0, 1.2),
                m(460.0, 10.0, 1.0),
                m(700.0, 11.0, 0.8),
                m(1_000.0, 12.0, 0.65),
                m(1_400.0, 9.0, 0.5),
            ],
            Self::Viola => [
                m(220.0, 8.0, 1.2),
                m(370.0, 9.0, 1.0),
                m(590.0, 10.0, 0.85),
                m(880.0, 11.0, 0.6),
                m(1_200.0, 9.0, 0.45),
            ],
            Self::Cello => [
                m(102.0, 7.0, 1.3),
                m(198.0, 8.0, 1.05),
                m(310.0, 9.0, 0.9),
                m(560.0, 10.0, 0.6),
                m(900.0, 8.0, 0.4),
            ],
            Self::DoubleBass => [
                m(60.0, 6.0, 1.4),
                m(118.0, 7.0, 1.1),
                m(210.0, 8.0, 0.85),
                m(400.0, 9.0, 0.55),
                m(720.0, 7.0, 0.35),
            ],
            Self::Guitar => [
                m(95.0, 8.0, 1.25),
                m(190.0, 9.0, 1.0),
                m(390.0, 10.0, 0.8),
                m(690.0, 10.0, 0.55),
                m(1_100.0, 8.0, 0.4),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_indices_round_trip() {
        for i in 0..4u8 {
            assert_eq!(StringMaterial::from_index(i).index(), i);
        }
        for i in 0..5u8 {
            assert_eq!(BodyType::from_index(i).index(), i);
        }
    }

    #[test]
    fn out_of_range_selectors_clamp() {
        assert_eq!(StringMaterial::from_index(200), StringMaterial::Wound);
        assert_eq!(BodyType::from_index(200), BodyType::Guitar);
    }

    #[test]
    fn body_presets_are_ordered_formants() {
        for body in [
            BodyType::Violin,
            BodyType::Viola,
            BodyType::Cello,
            BodyType::DoubleBass,
            BodyType::Guitar,
        ] {
            let modes = body.modes();
            for pair in modes.windows(2) {
                assert!(pair[0].freq_hz < pair[1].freq_hz);
            }
            assert!(modes.iter().all(|m| m.q > 0.0 && m.gain > 0.0));
        }
    }
}
