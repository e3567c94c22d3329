//! Error types for metawave.
//!
//! Every fallible library operation returns [`MetawaveError`]. Each variant
//! belongs to one of the categories in [`ErrorKind`], which the CLI uses to
//! decide how loudly to complain.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Broad category of a [`MetawaveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad dataset identifier, column mapping, pattern or parameter
    Configuration,
    /// The corpus on disk does not match its index
    CorpusIntegrity,
    /// A single utterance produced no usable features
    Extraction,
    /// A persisted feature table cannot be scored
    DataIntegrity,
    /// Plain I/O failure not attributable to the corpus
    Io,
}

/// Which half of an utterance pair a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Audio,
    Text,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Audio => write!(f, "audio"),
            FileKind::Text => write!(f, "text"),
        }
    }
}

/// Reasons a single utterance yields no features.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionFailure {
    /// The transcript has no vowel runs, so speech rate is undefined
    #[error("no syllables found in transcript")]
    NoSyllables,

    /// The pitch tracker found no voiced frames, so F0 is undefined
    #[error("no voiced frames found")]
    NoVoicedFrames,

    /// Nothing is left after silence trimming
    #[error("audio is empty after trimming")]
    EmptyAudio,

    /// A computed feature is NaN, infinite or out of range
    #[error("{feature} is not a valid value: {value}")]
    NonFiniteFeature { feature: &'static str, value: f64 },
}

/// Custom error type for corpus auditing operations.
#[derive(Debug, Error)]
pub enum MetawaveError {
    /// Dataset name is not a known preset and no column layout was given.
    #[error("The dataset '{0}' is not supported and no column layout was given")]
    UnknownDataset(String),

    /// A reverse-index filename pattern could not be compiled.
    #[error("Invalid filename pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A configuration value is out of its allowed range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An index entry references a file that does not exist.
    #[error("Missing {kind} file for '{id}': {path}")]
    MissingFile {
        kind: FileKind,
        id: String,
        path: PathBuf,
    },

    /// An index line has fewer columns than the layout needs.
    #[error("Index line {line} is malformed: {reason}")]
    MalformedIndexLine { line: usize, reason: String },

    /// A transcript filename does not match the reverse-index pattern.
    #[error("Filename '{filename}' does not match pattern '{pattern}'")]
    PatternMismatch { filename: String, pattern: String },

    /// Audio could not be decoded or resampled.
    #[error("Failed to decode audio {path}: {reason}")]
    AudioDecode { path: PathBuf, reason: String },

    /// The resampler rejected the conversion.
    #[error("Failed to resample from {from} Hz to {to} Hz: {reason}")]
    Resample { from: u32, to: u32, reason: String },

    /// A single utterance failed feature extraction.
    #[error("Feature extraction failed for '{id}': {failure}")]
    Extraction {
        id: String,
        failure: ExtractionFailure,
    },

    /// A corpus-wide mean is zero or overflows, so relative error is undefined.
    #[error("Corpus-wide mean {feature} is zero or not finite; relative error scores are undefined")]
    ZeroMean { feature: &'static str },

    /// The feature table holds no rows.
    #[error("Feature table {0} holds no utterances")]
    EmptyTable(PathBuf),

    /// A feature table row could not be parsed.
    #[error("Feature table {path}, line {line}: {reason}")]
    TableFormat {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// I/O error that occurred while processing a file or directory.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A specialized `Result` type for metawave operations.
pub type Result<T> = std::result::Result<T, MetawaveError>;

impl MetawaveError {
    /// Creates a new I/O error with the given path and error.
    pub fn io_error<P: Into<PathBuf>>(path: P, error: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: error,
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownDataset(_) | Self::InvalidPattern { .. } | Self::InvalidConfig(_) => {
                ErrorKind::Configuration
            }
            Self::MissingFile { .. }
            | Self::MalformedIndexLine { .. }
            | Self::PatternMismatch { .. }
            | Self::AudioDecode { .. }
            | Self::Resample { .. } => ErrorKind::CorpusIntegrity,
            Self::Extraction { .. } => ErrorKind::Extraction,
            Self::ZeroMean { .. } | Self::EmptyTable(_) | Self::TableFormat { .. } => {
                ErrorKind::DataIntegrity
            }
            Self::Io { .. } => ErrorKind::Io,
        }
    }
}
