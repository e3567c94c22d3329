// src/core/prosody/trim.rs
//
// Leading/trailing silence removal

use serde::{Deserialize, Serialize};

use crate::core::dsp::{amplitude_to_db, frame_rms};

/// Silence trimming parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimConfig {
    /// Frames quieter than the loudest frame by more than this are silence
    pub top_db: f32,
    pub frame_length: usize,
    pub hop_length: usize,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            top_db: 60.0,
            frame_length: 2048,
            hop_length: 512,
        }
    }
}

/// Strip leading and trailing silence.
///
/// Returns an empty slice when the whole signal is silent.
pub fn trim_silence<'a>(samples: &'a [f32], config: &TrimConfig) -> &'a [f32] {
    let frames = frame_rms(samples, config.frame_length, config.hop_length);
    let max_rms = frames.iter().copied().fold(0.0f32, f32::max);
    if max_rms <= 0.0 {
        return &samples[..0];
    }

    let is_speech = |rms: &f32| amplitude_to_db(*rms / max_rms) > -config.top_db;

    let first = frames.iter().position(is_speech);
    let last = frames.iter().rposition(is_speech);

    match (first, last) {
        (Some(first), Some(last)) => {
            let start = (first * config.hop_length).min(samples.len());
            let end = ((last + 1) * config.hop_length).min(samples.len());
            &samples[start..end]
        }
        _ => &samples[..0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * 200.0 * i as f32 / 16000.0).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_trims_surrounding_silence() {
        let mut samples = vec![0.0f32; 8000];
        samples.extend(tone(16000));
        samples.extend(vec![0.0f32; 8000]);

        let trimmed = trim_silence(&samples, &TrimConfig::default());
        // Frame granularity leaves at most a frame of slack on either side
        assert!(trimmed.len() >= 16000);
        assert!(trimmed.len() <= 16000 + 2 * 2048);
    }

    #[test]
    fn test_all_silent() {
        let samples = vec![0.0f32; 4000];
        assert!(trim_silence(&samples, &TrimConfig::default()).is_empty());
        assert!(trim_silence(&[], &TrimConfig::default()).is_empty());
    }

    #[test]
    fn test_no_silence_keeps_everything() {
        let samples = tone(8192);
        let trimmed = trim_silence(&samples, &TrimConfig::default());
        assert_eq!(trimmed.len(), samples.len());
    }
}
