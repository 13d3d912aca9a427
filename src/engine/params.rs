use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/*
Control Input Table
===================

Every control input the engine exposes is declared once, with its name,
default, bounds, and update cadence. The declarations drive three things:

  - boundary clamping: out-of-range values are pinned to [min, max] at the
    producer side, never rejected (an audio engine keeps rendering),
  - the a-rate/k-rate split: a-rate inputs are read per sample inside the
    render loop, k-rate inputs once per block,
  - external display: the terminal front end renders the table as-is.

Values cross threads as lock-free f32 bit patterns in atomics: the
UI/network side stores, the render thread loads. No locks, no queues, no
tearing (each value is a single 32-bit cell).
*/

/// Update cadence of a control input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateRate {
    /// Sample-accurate: read inside the per-sample loop.
    ARate,
    /// Block-granular: read once at the start of each block.
    KRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamId {
    FundamentalFrequency,
    StringDamping,
    BowForce,
    BowPosition,
    BowSpeed,
    Brightness,
    BodyResonance,
    MasterGain,
    Detune,
    VibratoEnabled,
    VibratoRate,
    VibratoDepth,
    TrillEnabled,
    TrillInterval,
    TrillSpeed,
    TrillArticulation,
    TremoloEnabled,
    TremoloSpeed,
    TremoloDepth,
    TremoloArticulation,
}

pub const PARAM_COUNT: usize = 20;

/// Declaration of one control input.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub id: ParamId,
    pub name: &'static str,
    pub default: f32,
    pub min: f32,
    pub max: f32,
    pub rate: UpdateRate,
}

pub const PARAMS: [ParamSpec; PARAM_COUNT] = [
    ParamSpec {
        id: ParamId::FundamentalFrequency,
        name: "fundamentalFrequency",
        default: 220.0,
        min: 20.0,
        max: 2_000.0,
        rate: UpdateRate::ARate,
    },
    ParamSpec {
        id: ParamId::StringDamping,
        name: "stringDamping",
        default: 0.3,
        min: 0.0,
        max: 1.0,
        rate: UpdateRate::KRate,
    },
    ParamSpec {
        id: ParamId::BowForce,
        name: "bowForce",
        default: 0.5,
        min: 0.0,
        max: 1.0,
        rate: UpdateRate::KRate,
    },
    ParamSpec {
        id: ParamId::BowPosition,
        name: "bowPosition",
        default: 0.12,
        min: 0.0,
        max: 1.0,
        rate: UpdateRate::KRate,
    },
    ParamSpec {
        id: ParamId::BowSpeed,
        name: "bowSpeed",
        default: 0.5,
        min: 0.0,
        max: 1.0,
        rate: UpdateRate::KRate,
    },
    ParamSpec {
        id: ParamId::Brightness,
        name: "brightness",
        default: 0.5,
        min: 0.0,
        max: 1.0,
        rate: UpdateRate::KRate,
    },
    ParamSpec {
        id: ParamId::BodyResonance,
        name: "bodyResonance",
        default: 0.3,
        min: 0.0,
        max: 1.0,
        rate: UpdateRate::KRate,
    },
    ParamSpec {
        id: ParamId::MasterGain,
        name: "masterGain",
        default: 0.8,
        min: 0.0,
        max: 1.0,
        rate: UpdateRate::KRate,
    },
    ParamSpec {
        id: ParamId::Detune,
        name: "detune",
        default: 0.0,
        min: 0.0,
        max: 1.0,
        rate: UpdateRate::KRate,
    },
    ParamSpec {
        id: ParamId::VibratoEnabled,
        name: "vibratoEnabled",
        default: 0.0,
        min: 0.0,
        max: 1.0,
        rate: UpdateRate::KRate,
    },
    ParamSpec {
        id: ParamId::VibratoRate,
        name: "vibratoRate",
        default: 5.0,
        min: 0.5,
        max: 12.0,
        rate: UpdateRate::KRate,
    },
    ParamSpec {
        id: ParamId::VibratoDepth,
        name: "vibratoDepth",
        default: 0.5,
        min: 0.0,
        max: 1.0,
        rate: UpdateRate::KRate,
    },
    ParamSpec {
        id: ParamId::TrillEnabled,
        name: "trillEnabled",
        default: 0.0,
        min: 0.0,
        max: 1.0,
        rate: UpdateRate::KRate,
    },
    ParamSpec {
        id: ParamId::TrillInterval,
        name: "trillInterval",
        default: 2.0,
        min: 1.0,
        max: 12.0,
        rate: UpdateRate::KRate,
    },
    ParamSpec {
        id: ParamId::TrillSpeed,
        name: "trillSpeed",
        default: 8.0,
        min: 1.0,
        max: 16.0,
        rate: UpdateRate::KRate,
    },
    ParamSpec {
        id: ParamId::TrillArticulation,
        name: "trillArticulation",
        default: 0.7,
        min: 0.1,
        max: 1.0,
        rate: UpdateRate::KRate,
    },
    ParamSpec {
        id: ParamId::TremoloEnabled,
        name: "tremoloEnabled",
        default: 0.0,
        min: 0.0,
        max: 1.0,
        rate: UpdateRate::KRate,
    },
    ParamSpec {
        id: ParamId::TremoloSpeed,
        name: "tremoloSpeed",
        default: 8.0,
        min: 0.5,
        max: 20.0,
        rate: UpdateRate::KRate,
    },
    ParamSpec {
        id: ParamId::TremoloDepth,
        name: "tremoloDepth",
        default: 0.8,
        min: 0.0,
        max: 1.0,
        rate: UpdateRate::KRate,
    },
    ParamSpec {
        id: ParamId::TremoloArticulation,
        name: "tremoloArticulation",
        default: 0.7,
        min: 0.1,
        max: 1.0,
        rate: UpdateRate::KRate,
    },
];

impl ParamId {
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn spec(self) -> &'static ParamSpec {
        &PARAMS[self.index()]
    }
}

/// Shared control-input storage: one atomic f32 cell per declared input.
///
/// Clones share the same cells; the UI/network side writes, the render
/// thread reads. Reads and writes are single-cell Relaxed atomics, so
/// neither side ever blocks the other.
#[derive(Clone)]
pub struct ControlTable {
    cells: Arc<[AtomicU32; PARAM_COUNT]>,
}

impl ControlTable {
    pub fn new() -> Self {
        let cells: [AtomicU32; PARAM_COUNT] =
            std::array::from_fn(|i| AtomicU32::new(PARAMS[i].default.to_bits()));
        Self {
            cells: Arc::new(cells),
        }
    }

    /// Store a control value, clamped to the declared bounds. NaN falls
    /// back to the declared default.
    pub fn set(&self, id: ParamId, value: f32) {
        let spec = id.spec();
        let value = if value.is_nan() {
            spec.default
        } else {
            value.clamp(spec.min, spec.max)
        };
        self.cells[id.index()].store(value.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        f32::from_bits(self.cells[id.index()].load(Ordering::Relaxed))
    }

    pub fn reset(&self) {
        for (cell, spec) in self.cells.iter().zip(PARAMS.iter()) {
            cell.store(spec.default.to_bits(), Ordering::Relaxed);
        }
    }
}

impl Default for ControlTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Linear per-sample frequency ramp, driven by the rampFrequency command.
/// While active it overrides the a-rate fundamental input.
pub struct FrequencyRamp {
    current: f32,
    target: f32,
    step: f32,
    remaining: u32,
}

impl FrequencyRamp {
    pub fn new() -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            step: 0.0,
            remaining: 0,
        }
    }

    pub fn start(&mut self, from: f32, to: f32, duration_samples: u32) {
        let duration_samples = duration_samples.max(1);
        self.current = from;
        self.target = to;
        self.step = (to - from) / duration_samples as f32;
        self.remaining = duration_samples;
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    /// Advance one sample. Returns the ramped frequency while active,
    /// None once finished (the caller then falls back to the table and
    /// commits the target there).
    #[inline]
    pub fn tick(&mut self) -> Option<f32> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.current = self.target;
        } else {
            self.current += self.step;
        }
        Some(self.current)
    }

    /// Most recent ramped value; meaningful while active.
    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }
}

impl Default for FrequencyRamp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_match_declaration_order() {
        for (i, spec) in PARAMS.iter().enumerate() {
            assert_eq!(spec.id.index(), i, "{} out of order", spec.name);
        }
    }

    #[test]
    fn defaults_sit_inside_declared_bounds() {
        for spec in PARAMS.iter() {
            assert!(
                spec.min <= spec.default && spec.default <= spec.max,
                "{} default out of bounds",
                spec.name
            );
        }
    }

    #[test]
    fn out_of_range_values_clamp_at_the_boundary() {
        let table = ControlTable::new();
        table.set(ParamId::FundamentalFrequency, 99_999.0);
        assert_eq!(table.get(ParamId::FundamentalFrequency), 2_000.0);
        table.set(ParamId::BowForce, -3.0);
        assert_eq!(table.get(ParamId::BowForce), 0.0);
        table.set(ParamId::Brightness, f32::NAN);
        assert_eq!(table.get(ParamId::Brightness), 0.5);
    }

    #[test]
    fn clones_share_storage() {
        let a = ControlTable::new();
        let b = a.clone();
        a.set(ParamId::BowSpeed, 0.9);
        assert_eq!(b.get(ParamId::BowSpeed), 0.9);
    }

    #[test]
    fn ramp_reaches_target_linearly() {
        let mut ramp = FrequencyRamp::new();
        ramp.start(100.0, 200.0, 100);

        let mut last = 100.0;
        let mut steps = 0;
        while let Some(f) = ramp.tick() {
            assert!(f >= last - 1e-3, "ramp must be monotonic");
            last = f;
            steps += 1;
        }
        assert_eq!(steps, 100);
        assert_eq!(last, 200.0);
        assert!(!ramp.is_active());
    }
}
