/// Per-type modulation parameters, assembled by the engine from the k-rate
/// control table once per block.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionControls {
    pub vibrato_rate_hz: f32,
    pub vibrato_depth: f32,
    pub tremolo_speed_hz: f32,
    pub tremolo_depth: f32,
    pub tremolo_articulation: f32,
    pub trill_interval_semitones: f32,
    pub trill_speed_hz: f32,
    pub trill_articulation: f32,
}

impl Default for ExpressionControls {
    fn default() -> Self {
        Self {
            vibrato_rate_hz: 5.0,
            vibrato_depth: 0.5,
            tremolo_speed_hz: 8.0,
            tremolo_depth: 0.8,
            tremolo_articulation: 0.7,
            trill_interval_semitones: 2.0,
            trill_speed_hz: 8.0,
            trill_articulation: 0.7,
        }
    }
}
