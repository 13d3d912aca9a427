//! TUI widgets: waveform oscilloscope, engine status, control table.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Line,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use arco_dsp::{
    engine::{ControlTable, UpdateRate, PARAMS},
    EngineSnapshot,
};

/// Render the waveform oscilloscope.
pub fn render_waveform(frame: &mut Frame, area: Rect, audio_buffer: &[f32]) {
    let block = Block::default().title(" Output ").borders(Borders::ALL);

    let data: Vec<(f64, f64)> = audio_buffer
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64 / audio_buffer.len() as f64, sample as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

/// Render a log-magnitude spectrum of the scope buffer.
pub fn render_spectrum(frame: &mut Frame, area: Rect, audio_buffer: &[f32], sample_rate: f32) {
    use rustfft::{num_complex::Complex, FftPlanner};

    let n = audio_buffer.len();
    let mut buf: Vec<Complex<f32>> = audio_buffer
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let w = 0.5 - 0.5 * (std::f32::consts::TAU * i as f32 / n as f32).cos();
            Complex { re: s * w, im: 0.0 }
        })
        .collect();
    FftPlanner::new().plan_fft_forward(n).process(&mut buf);

    // Up to ~6 kHz is where the string's character lives.
    let max_bin = ((6_000.0 / sample_rate) * n as f32) as usize;
    let max_bin = max_bin.clamp(8, n / 2);
    let data: Vec<(f64, f64)> = buf[1..max_bin]
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let db = 20.0 * (c.norm() + 1e-9).log10();
            (i as f64 / max_bin as f64, ((db + 80.0) / 80.0).clamp(0.0, 1.0) as f64)
        })
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Magenta))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(Block::default().title(" Spectrum ").borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

/// Render the latest diagnostic snapshot.
pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    snapshot: Option<&EngineSnapshot>,
    bowing: bool,
    material: u8,
    body: u8,
) {
    let block = Block::default().title(" Engine ").borders(Borders::ALL);

    let mut lines = vec![Line::from(format!(
        "bowing: {}    material: {}    body: {}",
        if bowing { "ON " } else { "off" },
        material,
        body
    ))];

    match snapshot {
        Some(s) => {
            lines.push(Line::from(format!(
                "expression: {:?}  phase: {:?}",
                s.current, s.phase
            )));
            lines.push(Line::from(format!(
                "progress  vib {:.2}  trem {:.2}  trill {:.2}",
                s.vibrato_progress, s.tremolo_progress, s.trill_progress
            )));
            lines.push(Line::from(format!(
                "transition  {:.2}s  spread {:.2}  {:?}  var {:.2}",
                s.settings.duration, s.settings.spread, s.settings.stagger, s.settings.variance
            )));
            lines.push(Line::from(format!(
                "clock: {}  pending: {}  dropped: {}",
                s.clock, s.pending_commands, s.dropped_commands
            )));
        }
        None => lines.push(Line::from("waiting for first snapshot...")),
    }
    lines.push(Line::from(
        "space bow | v/t/r/n expression | m material | y body | arrows pitch/force | q quit",
    ));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Render the declared control-input table with live values.
pub fn render_controls(frame: &mut Frame, area: Rect, controls: &ControlTable) {
    let block = Block::default().title(" Controls ").borders(Borders::ALL);

    let lines: Vec<Line> = PARAMS
        .iter()
        .map(|spec| {
            let rate = match spec.rate {
                UpdateRate::ARate => "a",
                UpdateRate::KRate => "k",
            };
            Line::from(format!(
                "{:<22} {:>9.3}  [{}] {:.0}..{:.0}",
                spec.name,
                controls.get(spec.id),
                rate,
                spec.min,
                spec.max
            ))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
