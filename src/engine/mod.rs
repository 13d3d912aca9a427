//! The owned per-voice engine: one bowed-string instance per instance of
//! [`BowedStringEngine`], constructed with an explicit sample rate and
//! driven by a host audio callback.
//!
//! Control flow per block: drain the command queue (promoting scheduled
//! commands whose start time has arrived), read the k-rate control table,
//! run the control cache to recompute only the coefficient sets that
//! actually changed, then render sample by sample. Nothing in the render
//! path locks, blocks, or allocates.

mod cache;
/// Command messages, SPSC queue plumbing, scheduled-command list.
pub mod command;
/// Construction parameters and validation errors.
pub mod config;
/// Declared control-input table and the a-rate frequency ramp.
pub mod params;

pub use command::{Action, EngineCommand, MessageReceiver};
#[cfg(feature = "rtrb")]
pub use command::{command_queue, CommandSender};
pub use config::{EngineConfig, EngineError};
pub use params::{ControlTable, ParamId, ParamSpec, UpdateRate, PARAMS, PARAM_COUNT};

use crate::expression::{
    Expression, ExpressionControls, ExpressionEngine, TransitionPhase, TransitionSettings,
};
use crate::string::{
    BodyResonator, BodyType, BowExcitation, BrightnessFilter, DetuneEngine, ModeBank,
    StringMaterial,
};
use cache::{ControlCache, ControlSnapshot};
use command::PendingCommands;
use params::FrequencyRamp;

/// Periodic state snapshot for external observability. Emitted through a
/// non-blocking queue at a fixed sample interval; dropped when nobody
/// listens fast enough.
#[derive(Debug, Clone, Copy)]
pub struct EngineSnapshot {
    pub clock: u64,
    pub current: Expression,
    pub phase: TransitionPhase,
    pub vibrato_progress: f32,
    pub tremolo_progress: f32,
    pub trill_progress: f32,
    pub settings: TransitionSettings,
    pub pending_commands: u32,
    pub dropped_commands: u32,
}

/// K-rate values latched for the duration of one block.
#[derive(Default)]
struct BlockState {
    force: f32,
    speed: f32,
    body_mix: f32,
    master_gain: f32,
    detune_multiplier: f32,
    expr: ExpressionControls,
}

pub struct BowedStringEngine {
    config: EngineConfig,
    clock: u64,
    controls: ControlTable,
    ramp: FrequencyRamp,
    commands: Option<Box<dyn MessageReceiver>>,
    pending: PendingCommands,
    cache: ControlCache,
    detune: DetuneEngine,
    excitation: BowExcitation,
    modes: ModeBank,
    expressions: ExpressionEngine,
    brightness: BrightnessFilter,
    body: BodyResonator,
    material: StringMaterial,
    body_selector: BodyType,
    enabled: [bool; 3],
    block: BlockState,
    #[cfg(feature = "rtrb")]
    snapshots: Option<rtrb::Producer<EngineSnapshot>>,
    snapshot_countdown: u32,
}

impl BowedStringEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let sr = config.sample_rate;
        let seed = config.seed;

        Ok(Self {
            config,
            clock: 0,
            controls: ControlTable::new(),
            ramp: FrequencyRamp::new(),
            commands: None,
            pending: PendingCommands::new(config.pending_capacity),
            cache: ControlCache::new(),
            detune: DetuneEngine::new(seed ^ 0xD7),
            excitation: BowExcitation::new(seed ^ 0xB0),
            modes: ModeBank::new(sr),
            expressions: ExpressionEngine::new(sr, seed ^ 0xE1),
            brightness: BrightnessFilter::new(sr),
            body: BodyResonator::new(sr, BodyType::default()),
            material: StringMaterial::default(),
            body_selector: BodyType::default(),
            enabled: [false; 3],
            block: BlockState {
                detune_multiplier: 1.0,
                ..Default::default()
            },
            #[cfg(feature = "rtrb")]
            snapshots: None,
            snapshot_countdown: 0,
        })
    }

    /// Shared handle to the control-input table; clone freely onto the
    /// UI/network thread.
    pub fn controls(&self) -> ControlTable {
        self.controls.clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Render-clock position in samples since construction.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Attach the consumer half of a command queue; drained once per
    /// block.
    pub fn set_command_receiver(&mut self, receiver: impl MessageReceiver + 'static) {
        self.commands = Some(Box::new(receiver));
    }

    /// Create and attach a snapshot queue, returning the consumer half.
    #[cfg(feature = "rtrb")]
    pub fn snapshot_queue(&mut self, capacity: usize) -> rtrb::Consumer<EngineSnapshot> {
        let (tx, rx) = rtrb::RingBuffer::new(capacity);
        self.snapshots = Some(tx);
        rx
    }

    /// Apply a command directly (bypassing the queue). Scheduled commands
    /// still wait for their start time.
    pub fn apply(&mut self, command: EngineCommand) {
        match command.start_time {
            Some(t) if t > self.clock => self.pending.push(command),
            _ => self.apply_action(command.action),
        }
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            clock: self.clock,
            current: self.expressions.current(),
            phase: self.expressions.phase(),
            vibrato_progress: self.expressions.progress_of(Expression::Vibrato),
            tremolo_progress: self.expressions.progress_of(Expression::Tremolo),
            trill_progress: self.expressions.progress_of(Expression::Trill),
            settings: self.expressions.settings(),
            pending_commands: self.pending.len() as u32,
            dropped_commands: self.pending.dropped(),
        }
    }

    /// Render one mono block. Oversized buffers are processed in
    /// max-block-sized chunks, each with its own command drain and k-rate
    /// refresh.
    pub fn render_block(&mut self, out: &mut [f32]) {
        for chunk in out.chunks_mut(self.config.max_block_size) {
            self.drain_commands();
            self.begin_block(chunk.len());
            for sample in chunk.iter_mut() {
                *sample = self.next_sample();
            }
        }
    }

    /// Render one block duplicated to a stereo pair.
    pub fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.render_block(left);
        let n = left.len().min(right.len());
        right[..n].copy_from_slice(&left[..n]);
    }

    fn drain_commands(&mut self) {
        if let Some(mut rx) = self.commands.take() {
            while let Some(command) = rx.pop() {
                self.apply(command);
            }
            self.commands = Some(rx);
        }
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::SetBowing(on) => self.excitation.set_bowing(on),
            Action::RampFrequency {
                target_hz,
                duration,
            } => {
                let spec = ParamId::FundamentalFrequency.spec();
                let target = target_hz.clamp(spec.min, spec.max);
                let from = if self.ramp.is_active() {
                    self.ramp.current()
                } else {
                    self.controls.get(ParamId::FundamentalFrequency)
                };
                let samples = (duration.max(crate::MIN_TIME) * self.config.sample_rate) as u32;
                self.ramp.start(from, target, samples);
            }
            Action::SetExpression(expr) => self.expressions.request(expr),
            Action::SetTransitionConfig(settings) => self.expressions.set_settings(settings),
            Action::SetStringMaterial(material) => self.material = material,
            Action::SetBodyType(body) => self.body_selector = body,
        }
    }

    fn begin_block(&mut self, block_len: usize) {
        let sr = self.config.sample_rate;

        // Enable flags are edge-triggered into the state machine, same as
        // an explicit setExpression command.
        let flags = [
            self.controls.get(ParamId::VibratoEnabled) > 0.5,
            self.controls.get(ParamId::TremoloEnabled) > 0.5,
            self.controls.get(ParamId::TrillEnabled) > 0.5,
        ];
        let kinds = [Expression::Vibrato, Expression::Tremolo, Expression::Trill];
        for i in 0..3 {
            if flags[i] != self.enabled[i] {
                if flags[i] {
                    self.expressions.request(kinds[i]);
                } else if self.expressions.current() == kinds[i] {
                    self.expressions.request(Expression::None);
                }
                self.enabled[i] = flags[i];
            }
        }

        let detune_amount = self.controls.get(ParamId::Detune);
        let multiplier = self.detune.advance_block(block_len, sr, detune_amount);

        self.block = BlockState {
            force: self.controls.get(ParamId::BowForce),
            speed: self.controls.get(ParamId::BowSpeed),
            body_mix: self.controls.get(ParamId::BodyResonance),
            master_gain: self.controls.get(ParamId::MasterGain),
            detune_multiplier: multiplier,
            expr: ExpressionControls {
                vibrato_rate_hz: self.controls.get(ParamId::VibratoRate),
                vibrato_depth: self.controls.get(ParamId::VibratoDepth),
                tremolo_speed_hz: self.controls.get(ParamId::TremoloSpeed),
                tremolo_depth: self.controls.get(ParamId::TremoloDepth),
                tremolo_articulation: self.controls.get(ParamId::TremoloArticulation),
                trill_interval_semitones: self.controls.get(ParamId::TrillInterval),
                trill_speed_hz: self.controls.get(ParamId::TrillSpeed),
                trill_articulation: self.controls.get(ParamId::TrillArticulation),
            },
        };

        // Accents were meant to brighten the tone as well, but the boost
        // inputs were never wired in the source instrument; the dynamic
        // term derives from bow force alone.
        let brightness = self.controls.get(ParamId::Brightness);
        let dynamic = self.block.force * 0.3 * self.excitation.envelope();

        let fundamental = if self.ramp.is_active() {
            self.ramp.current()
        } else {
            self.controls.get(ParamId::FundamentalFrequency)
        };

        let snap = ControlSnapshot {
            fundamental,
            detune_multiplier: multiplier,
            damping: self.controls.get(ParamId::StringDamping),
            bow_position: self.controls.get(ParamId::BowPosition),
            brightness_key: brightness + dynamic,
            body_mix: self.block.body_mix,
            material: self.material,
            body: self.body_selector,
        };
        let dirty = self.cache.update(&snap);

        if dirty.string_modes {
            self.modes.recompute(
                self.cache.effective_fundamental(),
                self.material,
                snap.damping,
                snap.bow_position,
            );
        }
        if dirty.brightness {
            self.brightness.update(brightness, dynamic);
        }
        if dirty.body {
            self.body.set_body(self.body_selector);
        }
    }

    #[inline]
    fn next_sample(&mut self) -> f32 {
        let sr = self.config.sample_rate;

        // Scheduled commands promote sample-accurately, so two instances
        // rendering under different host block sizes still switch on the
        // same sample.
        while let Some(command) = self.pending.pop_due(self.clock) {
            self.apply_action(command.action);
        }

        let fundamental = if let Some(f) = self.ramp.tick() {
            if !self.ramp.is_active() {
                // Ramp just landed: commit the target so releasing the
                // override does not step the pitch.
                self.controls.set(ParamId::FundamentalFrequency, f);
            }
            f
        } else {
            self.controls.get(ParamId::FundamentalFrequency)
        };

        let expr = self.expressions.tick(&self.block.expr);
        let freq = fundamental * self.block.detune_multiplier * expr.pitch;

        let excitation =
            self.excitation
                .next_sample(freq, self.block.force, self.block.speed, expr.amplitude, sr);
        let sample = self.modes.process(excitation);
        let sample = self.brightness.process(sample);
        let sample = self.body.process(sample, self.block.body_mix);
        let sample = master_stage(sample, self.block.master_gain);

        self.maybe_snapshot();
        self.clock += 1;
        sample
    }

    fn maybe_snapshot(&mut self) {
        if self.snapshot_countdown == 0 {
            self.snapshot_countdown = self.config.snapshot_interval.max(1);
            #[cfg(feature = "rtrb")]
            {
                let snapshot = self.snapshot();
                if let Some(tx) = self.snapshots.as_mut() {
                    // Full queue: drop the snapshot, never wait.
                    let _ = tx.push(snapshot);
                }
            }
        }
        self.snapshot_countdown -= 1;
    }
}

/// Master gain into a wider musical range, then a soft limiter that is
/// transparent at low level and saturates instead of clipping.
#[inline]
fn master_stage(sample: f32, master_gain: f32) -> f32 {
    let gain = master_gain * master_gain * 4.0;
    (sample * gain * 0.5).tanh() * 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> BowedStringEngine {
        BowedStringEngine::new(EngineConfig::default()).expect("default config")
    }

    #[test]
    fn unbowed_engine_renders_digital_silence() {
        let mut engine = engine();
        let mut a = [1.0f32; 512];
        let mut b = [1.0f32; 512];
        engine.render_block(&mut a);
        engine.render_block(&mut b);

        assert!(a.iter().all(|&s| s == 0.0));
        assert_eq!(a, b, "consecutive silent blocks must not drift");
    }

    #[test]
    fn bowing_produces_bounded_sound() {
        let mut engine = engine();
        engine.apply(EngineCommand::now(Action::SetBowing(true)));

        let mut out = vec![0.0f32; 48_000];
        engine.render_block(&mut out);

        let energy: f32 = out.iter().map(|s| s * s).sum();
        assert!(energy > 0.001, "bowed engine should sound, got {}", energy);
        assert!(out.iter().all(|s| s.is_finite() && s.abs() <= 2.0));
    }

    #[test]
    fn scheduled_bowing_waits_for_its_start_time() {
        let mut engine = engine();
        let start = 4_096u64;
        engine.apply(EngineCommand::at(Action::SetBowing(true), start));

        let mut first = vec![0.0f32; start as usize];
        engine.render_block(&mut first);
        assert!(
            first.iter().all(|&s| s == 0.0),
            "nothing may sound before the scheduled start"
        );

        let mut second = vec![0.0f32; 24_000];
        engine.render_block(&mut second);
        assert!(second.iter().any(|&s| s.abs() > 1e-4));
    }

    #[test]
    fn enable_flag_drives_the_expression_machine() {
        let mut engine = engine();
        engine.controls().set(ParamId::VibratoEnabled, 1.0);

        let mut out = vec![0.0f32; 96_000];
        engine.render_block(&mut out);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.current, Expression::Vibrato);
        assert_eq!(snapshot.vibrato_progress, 1.0);
    }

    #[test]
    fn frequency_ramp_lands_on_target_and_commits() {
        let mut engine = engine();
        engine.apply(EngineCommand::now(Action::RampFrequency {
            target_hz: 440.0,
            duration: 0.25,
        }));

        let mut out = vec![0.0f32; 24_000];
        engine.render_block(&mut out);

        assert_eq!(engine.controls().get(ParamId::FundamentalFrequency), 440.0);
    }

    #[test]
    fn stereo_render_duplicates_the_mono_signal() {
        let mut engine = engine();
        engine.apply(EngineCommand::now(Action::SetBowing(true)));

        let mut left = vec![0.0f32; 1_024];
        let mut right = vec![0.0f32; 1_024];
        engine.render_stereo(&mut left, &mut right);
        assert_eq!(left, right);
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn commands_arrive_through_the_queue() {
        let mut engine = engine();
        let (mut tx, rx) = command_queue(32);
        engine.set_command_receiver(rx);

        assert!(tx.send(EngineCommand::now(Action::SetBowing(true))));

        let mut out = vec![0.0f32; 24_000];
        engine.render_block(&mut out);
        assert!(out.iter().any(|&s| s.abs() > 1e-4));
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn snapshots_flow_through_their_queue() {
        let mut engine = engine();
        let mut rx = engine.snapshot_queue(64);
        engine.apply(EngineCommand::now(Action::SetBowing(true)));

        let mut out = vec![0.0f32; 9_600];
        engine.render_block(&mut out);

        let snapshot = rx.pop().expect("at least one snapshot");
        assert_eq!(snapshot.current, Expression::None);
    }
}
