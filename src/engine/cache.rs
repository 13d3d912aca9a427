use crate::string::{BodyType, StringMaterial};

/// Absolute tolerance for unit-range controls; fundamental uses the same
/// tolerance scaled by its magnitude.
const EPSILON: f32 = 1e-4;

/// Relative detune-multiplier change that forces a mode recompute.
const DETUNE_THRESHOLD: f32 = 0.01;

/// Block-granular view of every control the coefficient caches depend on.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ControlSnapshot {
    pub fundamental: f32,
    pub detune_multiplier: f32,
    pub damping: f32,
    pub bow_position: f32,
    /// Brightness control with the per-block dynamic term folded in.
    pub brightness_key: f32,
    pub body_mix: f32,
    pub material: StringMaterial,
    pub body: BodyType,
}

/// Which coefficient sets must be recomputed before the block renders.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DirtyFlags {
    pub string_modes: bool,
    pub brightness: bool,
    pub body: bool,
}

impl DirtyFlags {
    fn all() -> Self {
        Self {
            string_modes: true,
            brightness: true,
            body: true,
        }
    }
}

/// Change detector for slowly-varying control inputs.
///
/// Trigonometric coefficient derivation is the expensive part of the voice,
/// so it runs only when an input actually moved: values are compared
/// against the previous block with a small epsilon (the detune multiplier
/// with its own 1% threshold), and only the dependent coefficient set is
/// marked dirty. Recomputation itself is pure, so a spurious dirty flag
/// would cost time but never correctness.
pub(crate) struct ControlCache {
    snap: ControlSnapshot,
    primed: bool,
}

impl ControlCache {
    pub fn new() -> Self {
        Self {
            snap: ControlSnapshot {
                fundamental: 0.0,
                detune_multiplier: 1.0,
                damping: 0.0,
                bow_position: 0.0,
                brightness_key: 0.0,
                body_mix: 0.0,
                material: StringMaterial::Steel,
                body: BodyType::Violin,
            },
            primed: false,
        }
    }

    pub fn update(&mut self, snap: &ControlSnapshot) -> DirtyFlags {
        if !self.primed {
            self.primed = true;
            self.snap = *snap;
            return DirtyFlags::all();
        }

        let mut dirty = DirtyFlags::default();
        let prev = &self.snap;

        let fundamental_moved =
            (snap.fundamental - prev.fundamental).abs() > EPSILON * prev.fundamental.max(1.0);
        let detune_moved = (snap.detune_multiplier / prev.detune_multiplier - 1.0).abs()
            > DETUNE_THRESHOLD;
        if fundamental_moved
            || detune_moved
            || (snap.damping - prev.damping).abs() > EPSILON
            || (snap.bow_position - prev.bow_position).abs() > EPSILON
            || snap.material != prev.material
        {
            dirty.string_modes = true;
        }

        if (snap.brightness_key - prev.brightness_key).abs() > EPSILON {
            dirty.brightness = true;
        }

        if snap.body != prev.body {
            dirty.body = true;
        }

        // Commit only what was accepted as changed, so sub-epsilon creep
        // accumulates toward the threshold instead of being absorbed.
        if dirty.string_modes {
            self.snap.fundamental = snap.fundamental;
            self.snap.detune_multiplier = snap.detune_multiplier;
            self.snap.damping = snap.damping;
            self.snap.bow_position = snap.bow_position;
            self.snap.material = snap.material;
        }
        if dirty.brightness {
            self.snap.brightness_key = snap.brightness_key;
        }
        if dirty.body {
            self.snap.body = snap.body;
        }
        self.snap.body_mix = snap.body_mix;

        dirty
    }

    /// Fundamental (x detune) the mode bank was last recomputed for.
    pub fn effective_fundamental(&self) -> f32 {
        self.snap.fundamental * self.snap.detune_multiplier
    }
}
