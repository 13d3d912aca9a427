//! Low-level DSP primitives used by the string voice and the reverb unit.
//!
//! These components are allocation-free and realtime-safe once constructed,
//! making them safe to embed directly inside the per-sample render path. They
//! intentionally stay focused on the signal-processing math so the engine can
//! layer on control handling and modulation.

/// Two-pole/two-zero filter sections with compiled coefficients.
pub mod biquad;
/// Time-domain delay line with optional fractional-delay interpolation.
pub mod delay;
/// Seeded white noise and 2-D lattice value noise.
pub mod noise;

pub use biquad::{Biquad, BiquadCoeffs};
pub use delay::DelayLine;
