//! Audio loading and per-utterance feature extraction
//!
//! - `decoder` - decoding, mono mix-down and resampling
//! - `dsp` - framing statistics and autocorrelation
//! - `prosody` - trimming, pitch tracking, syllable counting

pub mod decoder;
pub mod dsp;
pub mod prosody;

pub use decoder::{decode_audio, extract_mono, load_audio, resample, AudioBuffer, AudioData};
pub use prosody::{
    trim_silence, FeatureExtractor, PitchConfig, PitchTracker, Prosody, ProsodyAnalysis,
    ProsodyExtractor, SyllableCounter, TrimConfig,
};
