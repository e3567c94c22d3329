// src/core/prosody/pitch.rs
//
// Frame-synchronous F0 tracking using normalized autocorrelation.
//
// One estimate is produced every `frame_period_ms`. Frames that are too
// quiet or not periodic enough are unvoiced and reported as 0 Hz.

use serde::{Deserialize, Serialize};

use crate::core::dsp::{rms, Autocorrelator};
use crate::error::ExtractionFailure;

/// Pitch tracker parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchConfig {
    /// Distance between frame centres
    pub frame_period_ms: f64,
    /// Lowest F0 searched, in Hz
    pub f0_floor: f32,
    /// Highest F0 searched, in Hz
    pub f0_ceil: f32,
    /// Minimum normalized autocorrelation peak for a voiced frame
    pub voicing_threshold: f32,
    /// Frames this far below the loudest frame are unvoiced
    pub silence_db: f32,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            frame_period_ms: 5.0,
            f0_floor: 71.0,
            f0_ceil: 800.0,
            voicing_threshold: 0.5,
            silence_db: -40.0,
        }
    }
}

/// Candidate peaks within this fraction of the best one win if they sit at a
/// shorter lag. Keeps the tracker off sub-harmonics.
const OCTAVE_TOLERANCE: f32 = 0.85;

#[derive(Debug, Clone, Default)]
pub struct PitchTracker {
    config: PitchConfig,
}

impl PitchTracker {
    pub fn new(config: PitchConfig) -> Self {
        Self { config }
    }

    /// F0 contour in Hz, one value per frame, 0.0 for unvoiced frames
    pub fn contour(&self, samples: &[f32], sample_rate: u32) -> Vec<f32> {
        if samples.is_empty() || sample_rate == 0 {
            return Vec::new();
        }

        let sr = sample_rate as f32;
        let min_lag = ((sr / self.config.f0_ceil).floor() as usize).max(2);
        let max_lag = ((sr / self.config.f0_floor).ceil() as usize).max(min_lag + 2);
        let window = 3 * max_lag;
        let half = window / 2;
        let hop = ((sample_rate as f64 * self.config.frame_period_ms / 1000.0).round() as usize).max(1);
        let n_frames = samples.len() / hop + 1;

        let fill = |buf: &mut [f32], center: usize| {
            for (k, slot) in buf.iter_mut().enumerate() {
                *slot = (center + k)
                    .checked_sub(half)
                    .and_then(|idx| samples.get(idx))
                    .copied()
                    .unwrap_or(0.0);
            }
        };

        // Frame energies first so the silence gate is relative to the loudest frame
        let mut frame = vec![0.0f32; window];
        let energies: Vec<f32> = (0..n_frames)
            .map(|i| {
                fill(&mut frame, i * hop);
                rms(&frame)
            })
            .collect();

        let max_energy = energies.iter().copied().fold(0.0f32, f32::max);
        if max_energy <= 0.0 {
            return vec![0.0; n_frames];
        }
        let gate = max_energy * 10f32.powf(self.config.silence_db / 20.0);

        let mut autocorrelator = Autocorrelator::new(window);
        energies
            .iter()
            .enumerate()
            .map(|(i, &energy)| {
                if energy < gate {
                    return 0.0;
                }
                fill(&mut frame, i * hop);
                let r = autocorrelator.compute(&frame, max_lag + 1);
                self.frame_f0(&r, window, min_lag, max_lag, sr)
            })
            .collect()
    }

    fn frame_f0(&self, r: &[f32], window: usize, min_lag: usize, max_lag: usize, sr: f32) -> f32 {
        let r0 = r[0];
        if r0 <= 0.0 {
            return 0.0;
        }

        // Normalize and undo the taper of the biased estimate
        let norm: Vec<f32> = r
            .iter()
            .enumerate()
            .map(|(lag, &v)| v / r0 * window as f32 / (window - lag) as f32)
            .collect();

        let upper = max_lag.min(norm.len() - 2);
        if min_lag >= upper {
            return 0.0;
        }

        let (best_lag, best) = (min_lag..=upper)
            .map(|lag| (lag, norm[lag]))
            .fold((min_lag, f32::MIN), |acc, cur| if cur.1 > acc.1 { cur } else { acc });

        if best < self.config.voicing_threshold {
            return 0.0;
        }

        let lag = (min_lag.max(1)..=upper)
            .find(|&lag| {
                norm[lag] >= OCTAVE_TOLERANCE * best
                    && norm[lag] >= norm[lag - 1]
                    && norm[lag] >= norm[lag + 1]
            })
            .unwrap_or(best_lag);

        // Parabolic interpolation around the peak
        let (a, b, c) = (norm[lag - 1], norm[lag], norm[lag + 1]);
        let denom = a - 2.0 * b + c;
        let offset = if denom.abs() > 1e-9 {
            (0.5 * (a - c) / denom).clamp(-0.5, 0.5)
        } else {
            0.0
        };

        sr / (lag as f32 + offset)
    }

    /// Average F0 of the contour.
    ///
    /// With `exclude_silence` unvoiced (0 Hz) frames are left out of the
    /// average. No frames to average is an extraction failure.
    pub fn estimate_f0(
        &self,
        samples: &[f32],
        sample_rate: u32,
        exclude_silence: bool,
    ) -> Result<f64, ExtractionFailure> {
        let contour = self.contour(samples, sample_rate);
        let used: Vec<f64> = contour
            .iter()
            .filter(|&&f0| f0 > 0.0 || !exclude_silence)
            .map(|&f0| f0 as f64)
            .collect();

        if used.is_empty() {
            return Err(ExtractionFailure::NoVoicedFrames);
        }
        Ok(used.iter().sum::<f64>() / used.len() as f64)
    }
}
