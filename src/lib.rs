//! Metawave - prosodic quality control for text-to-speech corpora
//!
//! Computes speech rate and average F0 for every utterance of a TTS corpus,
//! aggregates them per reader and flags the utterances that deviate most
//! from the corpus as outliers.
//!
//! ## Module Structure
//!
//! - `index` - corpus index lines, known and custom layouts, reverse indexes
//! - `core` - audio loading and per-utterance prosodic features
//! - `pipeline` - extraction runs and the feature table
//! - `stats` - per-reader statistics, outlier ranking and reports
//! - `search` - transcript search
//! - `config` - dataset presets and run settings
//! - `cli` - command-line interface
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use metawave::config::{DatasetPreset, DatasetSpec};
//! use metawave::pipeline::run;
//! use metawave::stats::CorpusStats;
//!
//! let preset = DatasetPreset::IcelandicGoogleFemale;
//! let paths = preset.paths(Path::new("/data/tts"), None);
//! run(22000, &paths, &DatasetSpec::Known(preset), None)?;
//!
//! let mut stats = CorpusStats::load(&paths.out_file)?;
//! stats.set_outliers(0.95)?;
//! stats.write_index(Path::new("/data/tts/summary"))?;
//! stats.write_summary(Path::new("/data/tts/summary"))?;
//! ```
//!
//! ## Weighted error
//!
//! For an utterance with speech rate `s` and F0 `f`, against the corpus-wide
//! means `S` and `F`:
//!
//! ```text
//! error = ((S - s) / S)^2 + ((F - f) / F)^2
//! ```
//!
//! All utterances are ranked by error and the best `keep_fraction` of them
//! are kept as clean.

// Corpus index handling
pub mod index;

// Audio loading and feature extraction
pub mod core;

// Extraction runs
pub mod pipeline;

// Statistics and outlier reports
pub mod stats;

pub mod search;

// Configuration and dataset presets
pub mod config;

pub mod error;

// Command-line interface
pub mod cli;

pub use config::{ColumnLayout, DatasetPreset, DatasetSpec, FailurePolicy, RunConfig, RunPaths};
pub use crate::core::{FeatureExtractor, Prosody, ProsodyExtractor};
pub use error::{ErrorKind, ExtractionFailure, MetawaveError, Result};
pub use index::{append_extension, IndexHandler, ReverseIndexHandler, UtteranceDescriptor};
pub use pipeline::{check, run, FeatureRecord, RunOrchestrator, RunSummary};
pub use stats::{Classification, CorpusStats, Moments, ReaderAggregate};
