//! Prosodic feature extraction
//!
//! Turns one trimmed utterance and its transcript into a speech rate
//! (syllables per second) and an average F0.
//!
//! - `trim` - leading/trailing silence removal
//! - `pitch` - frame-synchronous F0 tracking
//! - `syllables` - vowel-run syllable counting

mod pitch;
mod syllables;
mod trim;

pub use pitch::{PitchConfig, PitchTracker};
pub use syllables::{SyllableCounter, ICELANDIC_VOWELS};
pub use trim::{trim_silence, TrimConfig};

use crate::error::ExtractionFailure;

/// The two features tracked per utterance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prosody {
    /// Syllables per second
    pub speech_rate: f64,
    /// Average fundamental frequency in Hz
    pub f0: f64,
}

/// Computes prosodic features of one utterance.
///
/// `samples` are mono, already trimmed, at `sample_rate`. `text` is the
/// lowercased transcript.
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, samples: &[f32], sample_rate: u32, text: &str)
        -> Result<Prosody, ExtractionFailure>;
}

/// Everything computed while extracting one utterance
#[derive(Debug, Clone, PartialEq)]
pub struct ProsodyAnalysis {
    pub duration_secs: f64,
    pub syllables: usize,
    pub speech_rate: f64,
    pub f0: f64,
}

/// Default extractor: vowel-run syllables over trimmed duration, and the
/// mean of the voiced F0 contour
#[derive(Debug, Clone, Default)]
pub struct ProsodyExtractor {
    syllables: SyllableCounter,
    pitch: PitchTracker,
    include_unvoiced: bool,
}

impl ProsodyExtractor {
    pub fn new(syllables: SyllableCounter, pitch: PitchTracker) -> Self {
        Self {
            syllables,
            pitch,
            include_unvoiced: false,
        }
    }

    /// Average over every frame instead of voiced frames only
    pub fn include_unvoiced(mut self, include: bool) -> Self {
        self.include_unvoiced = include;
        self
    }

    pub fn analyze(
        &self,
        samples: &[f32],
        sample_rate: u32,
        text: &str,
    ) -> Result<ProsodyAnalysis, ExtractionFailure> {
        if samples.is_empty() || sample_rate == 0 {
            return Err(ExtractionFailure::EmptyAudio);
        }
        let duration_secs = samples.len() as f64 / sample_rate as f64;

        let syllables = self.syllables.count(text);
        if syllables == 0 {
            return Err(ExtractionFailure::NoSyllables);
        }
        let speech_rate = syllables as f64 / duration_secs;

        let f0 = self
            .pitch
            .estimate_f0(samples, sample_rate, !self.include_unvoiced)?;

        Ok(ProsodyAnalysis {
            duration_secs,
            syllables,
            speech_rate,
            f0,
        })
    }
}

impl FeatureExtractor for ProsodyExtractor {
    fn extract(
        &self,
        samples: &[f32],
        sample_rate: u32,
        text: &str,
    ) -> Result<Prosody, ExtractionFailure> {
        let analysis = self.analyze(samples, sample_rate, text)?;
        Ok(Prosody {
            speech_rate: analysis.speech_rate,
            f0: analysis.f0,
        })
    }
}
