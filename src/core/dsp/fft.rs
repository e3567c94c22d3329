//! FFT-based autocorrelation

use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Autocorrelation of fixed-length frames via the Wiener-Khinchin theorem.
///
/// The frame is zero padded to at least twice its length so the result is
/// the linear (not circular) autocorrelation.
pub struct Autocorrelator {
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    frame_len: usize,
    fft_size: usize,
    buffer: Vec<Complex<f32>>,
}

impl Autocorrelator {
    pub fn new(frame_len: usize) -> Self {
        let fft_size = (2 * frame_len).next_power_of_two().max(2);
        let mut planner = FftPlanner::new();
        Self {
            forward: planner.plan_fft_forward(fft_size),
            inverse: planner.plan_fft_inverse(fft_size),
            frame_len,
            fft_size,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
        }
    }

    /// Raw autocorrelation r[0..=max_lag] of `frame`.
    ///
    /// `frame` is truncated or zero padded to the configured frame length.
    pub fn compute(&mut self, frame: &[f32], max_lag: usize) -> Vec<f32> {
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let value = if i < self.frame_len {
                frame.get(i).copied().unwrap_or(0.0)
            } else {
                0.0
            };
            *slot = Complex::new(value, 0.0);
        }

        self.forward.process(&mut self.buffer);
        for c in self.buffer.iter_mut() {
            *c = Complex::new(c.re * c.re + c.im * c.im, 0.0);
        }
        self.inverse.process(&mut self.buffer);

        let scale = 1.0 / self.fft_size as f32;
        let max_lag = max_lag.min(self.frame_len.saturating_sub(1));
        self.buffer[..=max_lag].iter().map(|c| c.re * scale).collect()
    }
}
