//! Sample-rate conversion and frame blocking
//!
//! Capture devices rarely run at the pipeline's 16kHz, and their callbacks
//! deliver arbitrary buffer sizes. `LinearResampler` converts a continuous
//! stream between rates by linear interpolation, and `FrameChunker` re-blocks
//! the result into fixed-size frames.

/// Streaming linear-interpolation resampler
///
/// Stateful across calls: interpolation continues seamlessly over chunk
/// boundaries.
pub struct LinearResampler {
    step: f64,
    pos: f64,
    last: f32,
    primed: bool,
    passthrough: bool,
}

impl LinearResampler {
    pub fn new(src_rate: u32, dst_rate: u32) -> Self {
        Self {
            step: src_rate as f64 / dst_rate as f64,
            pos: 0.0,
            last: 0.0,
            primed: false,
            passthrough: src_rate == dst_rate,
        }
    }

    /// Resample one chunk of mono samples
    pub fn process(&mut self, input: &[f32]) -> Vec<f32> {
        if self.passthrough {
            return input.to_vec();
        }

        let mut out = Vec::with_capacity((input.len() as f64 / self.step) as usize + 1);

        for &sample in input {
            if !self.primed {
                self.last = sample;
                self.primed = true;
                continue;
            }

            // Interpolate over the [last, sample] interval of unit length
            while self.pos < 1.0 {
                out.push(self.last + (sample - self.last) * self.pos as f32);
                self.pos += self.step;
            }
            self.pos -= 1.0;
            self.last = sample;
        }

        out
    }
}

/// Re-blocks a continuous sample stream into fixed-size frames
pub struct FrameChunker {
    frame_samples: usize,
    pending: Vec<f32>,
}

impl FrameChunker {
    pub fn new(frame_samples: usize) -> Self {
        Self {
            frame_samples,
            pending: Vec::with_capacity(frame_samples * 2),
        }
    }

    /// Append samples; returns every complete frame now available
    pub fn push(&mut self, input: &[f32]) -> Vec<Vec<f32>> {
        self.pending.extend_from_slice(input);

        let mut frames = Vec::new();
        while self.pending.len() >= self.frame_samples {
            let rest = self.pending.split_off(self.frame_samples);
            frames.push(std::mem::replace(&mut self.pending, rest));
        }
        frames
    }

    /// Remaining samples padded with silence into one final frame, if any
    pub fn flush(&mut self) -> Option<Vec<f32>> {
        if self.pending.is_empty() {
            return None;
        }
        let mut frame = std::mem::take(&mut self.pending);
        frame.resize(self.frame_samples, 0.0);
        Some(frame)
    }
}
