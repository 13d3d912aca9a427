//! Arco - application wiring and event loop

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{DefaultTerminal, Frame};
use std::time::Duration;

use arco_dsp::{
    engine::{command_queue, Action, CommandSender, ControlTable, EngineCommand, ParamId},
    string::{BodyType, StringMaterial},
    BowedStringEngine, EngineConfig, EngineSnapshot, Expression, FdnReverb, MAX_BLOCK_SIZE,
};

use crate::ui;

/// Samples kept for the oscilloscope view.
const SCOPE_SIZE: usize = 1024;

pub struct Arco {
    controls: ControlTable,
    commands: CommandSender,
    snapshots: rtrb::Consumer<EngineSnapshot>,
    scope_rx: rtrb::Consumer<f32>,
    scope: Vec<f32>,
    scope_pos: usize,
    snapshot: Option<EngineSnapshot>,
    bowing: bool,
    material: u8,
    body: u8,
    sample_rate: f32,
    _stream: cpal::Stream,
    should_quit: bool,
}

impl Arco {
    /// Build the engine, attach its queues, and start the audio stream.
    pub fn new() -> EyreResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let mut engine = BowedStringEngine::new(EngineConfig {
            sample_rate,
            ..Default::default()
        })
        .map_err(|e| eyre!("engine construction failed: {e}"))?;

        let controls = engine.controls();
        let (commands, command_rx) = command_queue(256);
        engine.set_command_receiver(command_rx);
        let snapshots = engine.snapshot_queue(64);

        let mut reverb = FdnReverb::new(sample_rate);
        reverb.set_mix(0.25);

        let (mut scope_tx, scope_rx) = rtrb::RingBuffer::<f32>::new(8_192);

        let mut block = vec![0.0f32; MAX_BLOCK_SIZE];
        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let frames = data.len() / channels;
                let mut done = 0;
                while done < frames {
                    let n = (frames - done).min(MAX_BLOCK_SIZE);
                    let chunk = &mut block[..n];
                    engine.render_block(chunk);
                    for (i, &sample) in chunk.iter().enumerate() {
                        let (l, r) = reverb.process_stereo(sample, sample);
                        let base = (done + i) * channels;
                        for ch in 0..channels {
                            data[base + ch] = if ch % 2 == 0 { l } else { r };
                        }
                        // Scope feed is best-effort; a full ring just skips.
                        let _ = scope_tx.push(l);
                    }
                    done += n;
                }
            },
            |err| tracing::error!("audio stream error: {err}"),
            None,
        )?;
        stream.play()?;
        tracing::info!(sample_rate = sample_rate as f64, channels, "audio stream started");

        Ok(Self {
            controls,
            commands,
            snapshots,
            scope_rx,
            scope: vec![0.0; SCOPE_SIZE],
            scope_pos: 0,
            snapshot: None,
            bowing: false,
            material: 0,
            body: 0,
            sample_rate,
            _stream: stream,
            should_quit: false,
        })
    }

    pub fn run(mut self) -> EyreResult<()> {
        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal);
        ratatui::restore();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_snapshots();

            terminal.draw(|frame| self.render(frame))?;

            // Non-blocking key handling, ~60fps.
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }
        Ok(())
    }

    fn poll_audio(&mut self) {
        while let Ok(sample) = self.scope_rx.pop() {
            self.scope[self.scope_pos] = sample;
            self.scope_pos = (self.scope_pos + 1) % self.scope.len();
        }
    }

    fn poll_snapshots(&mut self) {
        while let Ok(snapshot) = self.snapshots.pop() {
            self.snapshot = Some(snapshot);
        }
    }

    fn send(&mut self, action: Action) {
        self.commands.send(EngineCommand::now(action));
    }

    fn nudge(&self, id: ParamId, delta: f32) {
        let value = self.controls.get(id) + delta;
        self.controls.set(id, value);
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => {
                self.bowing = !self.bowing;
                self.send(Action::SetBowing(self.bowing));
            }
            KeyCode::Char('v') => self.send(Action::SetExpression(Expression::Vibrato)),
            KeyCode::Char('t') => self.send(Action::SetExpression(Expression::Tremolo)),
            KeyCode::Char('r') => self.send(Action::SetExpression(Expression::Trill)),
            KeyCode::Char('n') => self.send(Action::SetExpression(Expression::None)),
            KeyCode::Char('m') => {
                self.material = (self.material + 1) % 4;
                self.send(Action::SetStringMaterial(StringMaterial::from_index(
                    self.material,
                )));
            }
            KeyCode::Char('y') => {
                self.body = (self.body + 1) % 5;
                self.send(Action::SetBodyType(BodyType::from_index(self.body)));
            }
            KeyCode::Up => {
                // One semitone up via a short glide.
                let target = self.controls.get(ParamId::FundamentalFrequency)
                    * 2.0f32.powf(1.0 / 12.0);
                self.send(Action::RampFrequency {
                    target_hz: target,
                    duration: 0.05,
                });
            }
            KeyCode::Down => {
                let target = self.controls.get(ParamId::FundamentalFrequency)
                    * 2.0f32.powf(-1.0 / 12.0);
                self.send(Action::RampFrequency {
                    target_hz: target,
                    duration: 0.05,
                });
            }
            KeyCode::Left => self.nudge(ParamId::BowForce, -0.05),
            KeyCode::Right => self.nudge(ParamId::BowForce, 0.05),
            KeyCode::Char('[') => self.nudge(ParamId::Brightness, -0.05),
            KeyCode::Char(']') => self.nudge(ParamId::Brightness, 0.05),
            KeyCode::Char('-') => self.nudge(ParamId::BowSpeed, -0.05),
            KeyCode::Char('=') => self.nudge(ParamId::BowSpeed, 0.05),
            KeyCode::Char('d') => self.nudge(ParamId::Detune, 0.1),
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        use ratatui::layout::{Constraint, Direction, Layout};

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(35),
                Constraint::Percentage(25),
                Constraint::Length(8),
                Constraint::Min(6),
            ])
            .split(frame.area());

        ui::render_waveform(frame, chunks[0], &self.scope);
        ui::render_spectrum(frame, chunks[1], &self.scope, self.sample_rate);
        ui::render_status(
            frame,
            chunks[2],
            self.snapshot.as_ref(),
            self.bowing,
            self.material,
            self.body,
        );
        ui::render_controls(frame, chunks[3], &self.controls);
    }
}
