//! Real-world scenario benchmarks.
//!
//! These model actual usage: a full bowed voice with expression running
//! into the reverb, the way the terminal front end renders.

mod voice;

pub use voice::bench_voice;
