/// Pre-sized circular delay line (RT-safe after construction).
///
/// The buffer is sized once for the maximum delay the owner will ever need;
/// length changes happen by moving the read offset, never by resizing.
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    pub fn with_capacity(max_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_samples.max(2)],
            write_pos: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Write one sample and advance the write position.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Read the sample written `delay_samples` writes ago (delay >= 1).
    ///
    /// Out-of-range delays read as silence rather than wrapping into
    /// unrelated history.
    #[inline]
    pub fn read(&self, delay_samples: usize) -> f32 {
        let len = self.buffer.len();
        if delay_samples == 0 || delay_samples > len {
            return 0.0;
        }
        let read_pos = (self.write_pos + len - delay_samples) % len;
        self.buffer[read_pos]
    }

    /// Fractional-delay read with linear interpolation (delay >= 1.0).
    ///
    /// Used by the modulated reverb lines; the same out-of-range-as-silence
    /// fallback applies so a miscomputed modulated index can never corrupt
    /// the read.
    #[inline]
    pub fn read_interpolated(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        if !delay_samples.is_finite() || delay_samples < 1.0 || delay_samples >= (len - 1) as f32 {
            return 0.0;
        }
        let whole = delay_samples as usize;
        let frac = delay_samples - whole as f32;
        let a = self.read(whole);
        let b = self.read(whole + 1);
        a + (b - a) * frac
    }

    /// Combined write-then-read, for fixed-length taps.
    pub fn next_sample(&mut self, sample: f32, delay_samples: usize) -> f32 {
        self.write(sample);
        self.read(delay_samples)
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_by_requested_samples() {
        let mut line = DelayLine::with_capacity(16);
        for i in 0..10 {
            line.write(i as f32);
        }
        // Last write was 9.0; delay of 1 reads it back.
        assert_eq!(line.read(1), 9.0);
        assert_eq!(line.read(4), 6.0);
    }

    #[test]
    fn interpolated_read_blends_neighbors() {
        let mut line = DelayLine::with_capacity(16);
        for s in [0.0, 1.0, 2.0, 3.0] {
            line.write(s);
        }
        // Between the samples written 2 and 3 writes ago (2.0 and 1.0).
        let mid = line.read_interpolated(2.5);
        assert!((mid - 1.5).abs() < 1e-6, "got {}", mid);
    }

    #[test]
    fn out_of_range_reads_are_silent() {
        let mut line = DelayLine::with_capacity(8);
        for _ in 0..8 {
            line.write(1.0);
        }
        assert_eq!(line.read(0), 0.0);
        assert_eq!(line.read(9), 0.0);
        assert_eq!(line.read_interpolated(7.5), 0.0);
        assert_eq!(line.read_interpolated(f32::NAN), 0.0);
    }
}
