pub mod dsp;
pub mod engine; // Owned per-voice engine: controls, commands, render loop
pub mod expression; // Hub-and-spoke musical expression state machine
pub mod reverb; // Independent 12-line FDN reverb unit
pub mod string; // Bowed-string voice components

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

pub use engine::{BowedStringEngine, EngineConfig, EngineError, EngineSnapshot};
pub use expression::Expression;
pub use reverb::FdnReverb;
