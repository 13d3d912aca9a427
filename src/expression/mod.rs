//! Musical expression engine: vibrato, tremolo, and trill modulation under
//! a hub-and-spoke state machine.
//!
//! At most one expression is ever live. A live expression can never hand
//! over to another directly: every change routes through NONE (the hub),
//! giving the listener a moment of plain tone between ornaments. The
//! transition runs IDLE -> STOPPING -> WAITING -> STARTING -> IDLE, where
//! STOPPING completion is gated by the expression's own notion of a
//! musically acceptable stopping point.

/// Per-type modulation parameters read from the control table.
pub mod controls;
/// Transition shaping supplied by the external collaborator.
pub mod transition;
/// Bow-stroke amplitude tremolo.
pub mod tremolo;
/// Base/upper note alternation.
pub mod trill;
/// Sinusoidal pitch/amplitude vibrato.
pub mod vibrato;

pub use controls::ExpressionControls;
pub use transition::{StaggerMode, TransitionSettings};
pub use tremolo::Tremolo;
pub use trill::Trill;
pub use vibrato::Vibrato;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The spoke states, plus the NONE hub.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expression {
    #[default]
    None,
    Vibrato,
    Tremolo,
    Trill,
}

impl Expression {
    fn stagger_rank(self) -> u32 {
        match self {
            Expression::None | Expression::Vibrato => 0,
            Expression::Tremolo => 1,
            Expression::Trill => 2,
        }
    }

    /// Progress-per-transition-duration while ramping in.
    fn start_rate(self) -> f32 {
        match self {
            Expression::None => 1.0,
            Expression::Vibrato => 1.0,
            Expression::Tremolo => 0.9,
            Expression::Trill => 1.1,
        }
    }

    /// Progress-per-transition-duration while ramping out.
    fn stop_rate(self) -> f32 {
        match self {
            Expression::None => 1.0,
            Expression::Vibrato => 1.25,
            Expression::Tremolo => 0.8,
            Expression::Trill => 0.7,
        }
    }
}

/// Where the machine is within a transition.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPhase {
    #[default]
    Idle,
    Stopping,
    Waiting,
    Starting,
}

/// Per-sample modulation produced by the live expression.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionOutput {
    /// Frequency multiplier applied to the excitation pitch.
    pub pitch: f32,
    /// Amplitude multiplier applied to the excitation level.
    pub amplitude: f32,
}

impl ExpressionOutput {
    const NEUTRAL: Self = Self {
        pitch: 1.0,
        amplitude: 1.0,
    };
}

/// Transition progress as a sample counter, so progress lands on exactly
/// 1.0 when the ramp completes instead of drifting in float accumulation.
#[derive(Debug, Clone, Copy)]
struct Ramp {
    elapsed: u32,
    total: u32,
}

impl Ramp {
    fn new(total_samples: f32) -> Self {
        Self {
            elapsed: 0,
            total: (total_samples.max(1.0)) as u32,
        }
    }

    fn from_progress(total_samples: f32, progress: f32) -> Self {
        let total = (total_samples.max(1.0)) as u32;
        Self {
            elapsed: (progress.clamp(0.0, 1.0) * total as f32) as u32,
            total,
        }
    }

    fn advance(&mut self) {
        self.elapsed = (self.elapsed + 1).min(self.total);
    }

    fn progress(&self) -> f32 {
        self.elapsed as f32 / self.total as f32
    }

    fn done(&self) -> bool {
        self.elapsed >= self.total
    }
}

/// Hub-and-spoke pause at the NONE state, in samples.
const WAIT_SAMPLES: u32 = 128;

/// Minimum activity kept on a stopping expression so its cycle keeps
/// advancing toward a legal stopping point.
const STOP_FLOOR: f32 = 0.05;

pub struct ExpressionEngine {
    current: Expression,
    target: Expression,
    final_target: Expression,
    phase: TransitionPhase,
    stop: Ramp,
    start: Ramp,
    start_delay: u32,
    wait_remaining: u32,
    settings: TransitionSettings,
    sample_rate: f32,
    vibrato: Vibrato,
    tremolo: Tremolo,
    trill: Trill,
    rng: fastrand::Rng,
}

impl ExpressionEngine {
    pub fn new(sample_rate: f32, seed: u64) -> Self {
        Self {
            current: Expression::None,
            target: Expression::None,
            final_target: Expression::None,
            phase: TransitionPhase::Idle,
            stop: Ramp::new(1.0),
            start: Ramp::new(1.0),
            start_delay: 0,
            wait_remaining: 0,
            settings: TransitionSettings::default(),
            sample_rate,
            vibrato: Vibrato::new(seed ^ 0x5651),
            tremolo: Tremolo::new(seed ^ 0x5652),
            trill: Trill::new(seed ^ 0x5653),
            rng: fastrand::Rng::with_seed(seed ^ 0x5654),
        }
    }

    pub fn current(&self) -> Expression {
        self.current
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    pub fn settings(&self) -> TransitionSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: TransitionSettings) {
        self.settings = settings.clamped();
    }

    /// Master progress of the given expression type (1.0 = fully
    /// established, 0.0 = absent).
    pub fn progress_of(&self, expr: Expression) -> f32 {
        if expr == self.current && expr != Expression::None {
            self.master_progress()
        } else {
            0.0
        }
    }

    fn stop_total(&self, expr: Expression) -> f32 {
        self.settings.duration * self.sample_rate / expr.stop_rate()
    }

    fn start_total(&self, expr: Expression) -> f32 {
        self.settings.duration * self.sample_rate / expr.start_rate()
    }

    /// Request a new live expression. Requests between two spokes are
    /// redirected through the NONE hub; re-requesting a stopping
    /// expression reverses the transition in place.
    pub fn request(&mut self, desired: Expression) {
        match self.phase {
            TransitionPhase::Idle => {
                if desired == self.current {
                    return;
                }
                if self.current == Expression::None {
                    self.begin_start(desired);
                } else {
                    // Spoke-to-spoke goes through the hub; the true
                    // destination waits in final_target.
                    self.final_target = desired;
                    self.begin_stop();
                }
            }
            TransitionPhase::Stopping => {
                if desired == self.current {
                    // Interrupted stop: mirror the progress back into a
                    // start and keep going from where we are.
                    self.target = self.current;
                    self.final_target = Expression::None;
                    self.start = Ramp::from_progress(
                        self.start_total(self.current),
                        1.0 - self.stop.progress(),
                    );
                    self.start_delay = 0;
                    self.phase = TransitionPhase::Starting;
                } else {
                    self.final_target = desired;
                }
            }
            TransitionPhase::Waiting => {
                self.final_target = desired;
            }
            TransitionPhase::Starting => {
                if desired == self.target {
                    return;
                }
                // Interrupted start: mirror into a stop, then resolve the
                // new destination after the hub.
                self.final_target = desired;
                self.target = Expression::None;
                self.stop = Ramp::from_progress(
                    self.stop_total(self.current),
                    1.0 - self.start.progress(),
                );
                self.phase = TransitionPhase::Stopping;
            }
        }
    }

    fn begin_start(&mut self, expr: Expression) {
        if expr == Expression::None {
            self.target = Expression::None;
            self.phase = TransitionPhase::Idle;
            return;
        }
        self.current = expr;
        self.target = expr;
        self.start = Ramp::new(self.start_total(expr));
        self.start_delay = self.stagger_delay(expr);
        self.phase = TransitionPhase::Starting;
    }

    fn begin_stop(&mut self) {
        self.target = Expression::None;
        self.stop = Ramp::new(self.stop_total(self.current));
        self.phase = TransitionPhase::Stopping;
    }

    fn stagger_delay(&mut self, expr: Expression) -> u32 {
        let window = self.settings.spread * self.settings.duration * self.sample_rate;
        match self.settings.stagger {
            StaggerMode::Sync => 0,
            StaggerMode::Cascade => (expr.stagger_rank() as f32 * window / 3.0) as u32,
            StaggerMode::Random => (self.rng.f32() * window) as u32,
        }
    }

    fn can_stop_current(&self) -> bool {
        match self.current {
            Expression::None => true,
            Expression::Vibrato => self.vibrato.can_stop_at(),
            Expression::Tremolo => self.tremolo.can_stop_at(),
            Expression::Trill => self.trill.can_stop_at(),
        }
    }

    fn master_progress(&self) -> f32 {
        match self.phase {
            TransitionPhase::Idle => {
                if self.current == Expression::None {
                    0.0
                } else {
                    1.0
                }
            }
            TransitionPhase::Stopping => 1.0 - self.stop.progress(),
            TransitionPhase::Waiting => 0.0,
            TransitionPhase::Starting => self.start.progress(),
        }
    }

    fn advance_phase(&mut self) {
        match self.phase {
            TransitionPhase::Idle => {}
            TransitionPhase::Stopping => {
                self.stop.advance();
                if self.stop.done() && self.can_stop_current() {
                    self.current = Expression::None;
                    self.wait_remaining = WAIT_SAMPLES;
                    self.phase = TransitionPhase::Waiting;
                }
            }
            TransitionPhase::Waiting => {
                if self.wait_remaining > 0 {
                    self.wait_remaining -= 1;
                } else {
                    let next = std::mem::replace(&mut self.final_target, Expression::None);
                    self.begin_start(next);
                }
            }
            TransitionPhase::Starting => {
                if self.start_delay > 0 {
                    self.start_delay -= 1;
                    return;
                }
                self.start.advance();
                if self.start.done() {
                    self.phase = TransitionPhase::Idle;
                }
            }
        }
    }

    /// Advance the machine by one sample and produce the live expression's
    /// pitch/amplitude multipliers.
    pub fn tick(&mut self, controls: &ExpressionControls) -> ExpressionOutput {
        self.advance_phase();

        let master = self.master_progress();
        // While stopping, keep a floor of activity so the cycle still
        // advances toward a legal stopping point instead of freezing.
        let active = if self.phase == TransitionPhase::Stopping {
            master.max(STOP_FLOOR)
        } else {
            master
        };

        let variance = self.settings.variance;
        let sr = self.sample_rate;

        match self.current {
            Expression::None => {
                self.vibrato.tick(0.0, 0.0, 0.0, 0.0, sr);
                self.tremolo.tick(0.0, 0.0, 0.0, 0.0, 0.0, sr);
                self.trill.tick(0.0, 0.0, 0.0, 0.0, 0.0, sr);
                ExpressionOutput::NEUTRAL
            }
            Expression::Vibrato => {
                let (pitch, amplitude) = self.vibrato.tick(
                    active,
                    controls.vibrato_rate_hz,
                    controls.vibrato_depth,
                    variance,
                    sr,
                );
                self.tremolo.tick(0.0, 0.0, 0.0, 0.0, 0.0, sr);
                self.trill.tick(0.0, 0.0, 0.0, 0.0, 0.0, sr);
                ExpressionOutput { pitch, amplitude }
            }
            Expression::Tremolo => {
                let amplitude = self.tremolo.tick(
                    active,
                    controls.tremolo_speed_hz,
                    controls.tremolo_depth,
                    controls.tremolo_articulation,
                    variance,
                    sr,
                );
                self.vibrato.tick(0.0, 0.0, 0.0, 0.0, sr);
                self.trill.tick(0.0, 0.0, 0.0, 0.0, 0.0, sr);
                ExpressionOutput {
                    pitch: 1.0,
                    amplitude,
                }
            }
            Expression::Trill => {
                let (pitch, amplitude) = self.trill.tick(
                    active,
                    controls.trill_interval_semitones,
                    controls.trill_speed_hz,
                    controls.trill_articulation,
                    variance,
                    sr,
                );
                self.vibrato.tick(0.0, 0.0, 0.0, 0.0, sr);
                self.tremolo.tick(0.0, 0.0, 0.0, 0.0, 0.0, sr);
                ExpressionOutput { pitch, amplitude }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn machine() -> ExpressionEngine {
        ExpressionEngine::new(SAMPLE_RATE, 77)
    }

    fn run(m: &mut ExpressionEngine, samples: usize) {
        let controls = ExpressionControls::default();
        for _ in 0..samples {
            m.tick(&controls);
        }
    }

    #[test]
    fn vibrato_establishes_in_one_transition_duration() {
        let mut m = machine();
        m.set_settings(TransitionSettings {
            duration: 1.0,
            ..Default::default()
        });
        m.request(Expression::Vibrato);
        run(&mut m, 48_000);

        assert_eq!(m.current(), Expression::Vibrato);
        assert_eq!(m.progress_of(Expression::Vibrato), 1.0);
        assert_eq!(m.phase(), TransitionPhase::Idle);
    }

    #[test]
    fn spoke_to_spoke_passes_through_the_hub() {
        let mut m = machine();
        m.request(Expression::Vibrato);
        run(&mut m, 96_000);
        assert_eq!(m.current(), Expression::Vibrato);

        m.request(Expression::Trill);

        let controls = ExpressionControls::default();
        let mut observed = vec![m.current()];
        for _ in 0..(48_000 * 6) {
            m.tick(&controls);
            if *observed.last().unwrap() != m.current() {
                observed.push(m.current());
            }
            if m.current() == Expression::Trill {
                break;
            }
        }

        assert_eq!(
            observed,
            vec![Expression::Vibrato, Expression::None, Expression::Trill],
            "current must never hop spokes directly"
        );
    }

    #[test]
    fn trill_stop_waits_for_a_note_boundary() {
        let mut m = machine();
        m.request(Expression::Trill);
        run(&mut m, 96_000);
        assert_eq!(m.current(), Expression::Trill);

        m.request(Expression::None);
        let controls = ExpressionControls::default();
        let mut completed_at_legal_boundary = false;
        for _ in 0..(48_000 * 6) {
            let was_stopping = m.phase() == TransitionPhase::Stopping;
            let gate_before = m.trill.can_stop_at();
            m.tick(&controls);
            if was_stopping && m.phase() == TransitionPhase::Waiting {
                completed_at_legal_boundary = gate_before;
                break;
            }
        }
        assert!(
            completed_at_legal_boundary,
            "stopping must complete only when can_stop_at() held"
        );
        assert_eq!(m.current(), Expression::None);
    }

    #[test]
    fn re_requesting_a_stopping_expression_mirrors_progress() {
        let mut m = machine();
        m.set_settings(TransitionSettings {
            duration: 2.0,
            ..Default::default()
        });
        m.request(Expression::Vibrato);
        run(&mut m, 48_000 * 4);
        assert_eq!(m.phase(), TransitionPhase::Idle);

        m.request(Expression::None);
        // Stop rate is 1.25 per 2 s; a quarter of the way out.
        run(&mut m, 24_000);
        assert_eq!(m.phase(), TransitionPhase::Stopping);
        let stopped_so_far = m.stop.progress();
        assert!(stopped_so_far > 0.05 && stopped_so_far < 0.95);

        m.request(Expression::Vibrato);
        assert_eq!(m.phase(), TransitionPhase::Starting);
        assert!((m.start.progress() - (1.0 - stopped_so_far)).abs() < 1e-3);
        assert_eq!(m.current(), Expression::Vibrato);
    }

    #[test]
    fn retarget_while_stopping_updates_the_destination() {
        let mut m = machine();
        m.request(Expression::Vibrato);
        run(&mut m, 96_000);

        m.request(Expression::Tremolo);
        run(&mut m, 1_000);
        assert_eq!(m.phase(), TransitionPhase::Stopping);

        // Change of plans mid-stop; the hub should route to the new spoke.
        m.request(Expression::Trill);
        run(&mut m, 48_000 * 6);
        assert_eq!(m.current(), Expression::Trill);
    }

    #[test]
    fn cascade_stagger_delays_later_ranked_expressions() {
        let mut m = machine();
        m.set_settings(TransitionSettings {
            duration: 2.0,
            spread: 0.6,
            stagger: StaggerMode::Cascade,
            variance: 0.0,
        });

        m.request(Expression::Vibrato);
        assert_eq!(m.start_delay, 0);

        let mut m2 = machine();
        m2.set_settings(m.settings());
        m2.request(Expression::Trill);
        assert!(
            m2.start_delay > 0,
            "trill ranks last in a cascade and must wait"
        );
    }

    #[test]
    fn neutral_output_when_no_expression_is_live() {
        let mut m = machine();
        let controls = ExpressionControls::default();
        for _ in 0..1_000 {
            let out = m.tick(&controls);
            assert_eq!(out.pitch, 1.0);
            assert_eq!(out.amplitude, 1.0);
        }
    }
}
