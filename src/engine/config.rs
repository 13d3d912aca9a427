use crate::MAX_BLOCK_SIZE;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Engine construction parameters. Everything sized here is allocated once
/// and never resized: the render path performs no allocation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Largest block `render_block` will be asked for.
    pub max_block_size: usize,
    /// Seed for every stochastic element (stick-slip, scratchiness, drift,
    /// random stagger). Same seed, same controls: same output.
    pub seed: u64,
    /// Samples between diagnostic snapshots.
    pub snapshot_interval: u32,
    /// Capacity of the scheduled-command pending list.
    pub pending_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            max_block_size: MAX_BLOCK_SIZE,
            seed: 0xA5C0_BA55,
            snapshot_interval: 4_800,
            pending_capacity: 16,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.sample_rate.is_finite() || self.sample_rate < 8_000.0 {
            return Err(EngineError::InvalidSampleRate(self.sample_rate));
        }
        if self.max_block_size == 0 || self.max_block_size > MAX_BLOCK_SIZE {
            return Err(EngineError::InvalidBlockSize {
                requested: self.max_block_size,
                max: MAX_BLOCK_SIZE,
            });
        }
        Ok(())
    }
}

/// Construction-time validation failures. The render path itself is
/// infallible; anything invalid at runtime is clamped, not reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineError {
    InvalidSampleRate(f32),
    InvalidBlockSize { requested: usize, max: usize },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidSampleRate(rate) => {
                write!(f, "invalid sample rate: {rate}")
            }
            EngineError::InvalidBlockSize { requested, max } => {
                write!(f, "invalid block size {requested} (1..={max})")
            }
        }
    }
}

impl std::error::Error for EngineError {}
