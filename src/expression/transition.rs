#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Timing offset applied across an ensemble of transitions.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaggerMode {
    /// All expression types start together.
    #[default]
    Sync,
    /// Types start in declaration order, spaced by the spread window.
    Cascade,
    /// Each start is delayed by a random share of the spread window.
    Random,
}

/// How expression transitions are shaped, supplied by the external
/// collaborator and consumed by the state machine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionSettings {
    /// Transition length in seconds (0.5-5). Per-expression stop/start
    /// rate constants are scaled by 1/duration.
    pub duration: f32,
    /// Fraction of the duration over which staggered starts are spread
    /// (0-1).
    pub spread: f32,
    pub stagger: StaggerMode,
    /// Per-sample jitter applied to effective modulation rates (0-1).
    pub variance: f32,
}

impl TransitionSettings {
    pub fn clamped(self) -> Self {
        Self {
            duration: self.duration.clamp(0.5, 5.0),
            spread: self.spread.clamp(0.0, 1.0),
            stagger: self.stagger,
            variance: self.variance.clamp(0.0, 1.0),
        }
    }
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            duration: 1.0,
            spread: 0.0,
            stagger: StaggerMode::Sync,
            variance: 0.0,
        }
    }
}
