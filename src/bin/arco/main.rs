//! arco - terminal bowed-string instrument
//!
//! Run with: cargo run --bin arco
//!
//! Plays a single bowed-string voice through the default audio output and
//! shows the engine's diagnostic snapshots, output waveform, and control
//! table. Keys drive the same command queue a networked collaborator
//! would.

mod app;
mod ui;

use app::Arco;
use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Logs go to stderr so they never fight the TUI; enable with RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    Arco::new()?.run()
}
