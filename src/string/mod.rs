//! Bowed-string voice components.
//!
//! The signal path is excitation -> modal resonator bank -> brightness
//! filter -> body resonator. Everything here renders per sample and owns
//! fixed-capacity state; coefficient recomputation is triggered from the
//! engine's control cache, never from inside the sample loop.

/// Instrument-body formant bank with wet/dry blend.
pub mod body;
/// Dynamic low-pass driven by the brightness control and bow dynamics.
pub mod brightness;
/// Slow noise-driven pitch drift.
pub mod detune;
/// Bow force/speed/position excitation source.
pub mod excitation;
/// String material and body presets (artistic constants).
pub mod material;
/// The 32-mode string resonator bank.
pub mod modes;

pub use body::BodyResonator;
pub use brightness::BrightnessFilter;
pub use detune::DetuneEngine;
pub use excitation::BowExcitation;
pub use material::{BodyType, StringMaterial};
pub use modes::{ModeBank, STRING_MODE_COUNT};
