// src/cli/args.rs
//
// Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{FailurePolicy, RunConfig};

/// Prosodic quality control for text-to-speech corpora
#[derive(Parser, Debug)]
#[command(name = "metawave", author, version, about, long_about = None)]
pub struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Hide progress bars
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract features for a known dataset
    Run(RunArgs),

    /// Extract features for a custom dataset
    CustomRun(CustomRunArgs),

    /// Build an index from transcript file names
    GenIndex(GenIndexArgs),

    /// Corpus statistics, outlier listings and a summary report
    Summary(SummaryArgs),

    /// Outlier and clean listings only
    Outliers(OutlierArgs),

    /// Features of a single audio/transcript pair
    Check(CheckArgs),

    /// List transcripts containing a term
    Search(SearchArgs),

    /// List the known datasets
    Datasets,
}

/// What to do with an utterance whose features cannot be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailurePolicyArg {
    /// Leave it out of the feature table
    Skip,
    /// Stop the run
    Abort,
}

impl From<FailurePolicyArg> for FailurePolicy {
    fn from(arg: FailurePolicyArg) -> Self {
        match arg {
            FailurePolicyArg::Skip => FailurePolicy::Skip,
            FailurePolicyArg::Abort => FailurePolicy::Abort,
        }
    }
}

/// Options shared by both extraction commands
#[derive(Args, Debug, Clone)]
pub struct ExtractionArgs {
    /// Sample rate audio is analysed at
    #[arg(long, default_value_t = 22000)]
    pub sample_rate: u32,

    /// Stop after this many rows (for quick checks)
    #[arg(long)]
    pub max_samples: Option<usize>,

    #[arg(long, value_enum, default_value = "skip")]
    pub on_extraction_failure: FailurePolicyArg,

    /// Utterances handed to the worker pool at once
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Write a summary next to the feature table when the run is done
    #[arg(long)]
    pub summary: bool,

    /// Fraction of the corpus kept as clean by --summary
    #[arg(long, default_value_t = 0.95)]
    pub keep_fraction: f64,
}

impl ExtractionArgs {
    pub fn run_config(&self, show_progress: bool) -> RunConfig {
        RunConfig::default()
            .sample_rate(self.sample_rate)
            .sample_cap(self.max_samples)
            .batch_size(self.batch_size)
            .failure_policy(self.on_extraction_failure.into())
            .show_progress(show_progress)
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Dataset identifier (see `metawave datasets`)
    #[arg(short, long)]
    pub dataset: String,

    /// Base directory of the dataset
    #[arg(short, long)]
    pub base_dir: PathBuf,

    /// Directory for the feature table (default: the base directory)
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    #[command(flatten)]
    pub extraction: ExtractionArgs,
}

#[derive(Args, Debug)]
pub struct CustomRunArgs {
    /// Directory of audio files
    #[arg(long)]
    pub wav_dir: PathBuf,

    /// Directory of transcripts
    #[arg(long)]
    pub text_dir: PathBuf,

    /// Index file. Without one, an index is generated from transcript names.
    #[arg(long)]
    pub index_path: Option<PathBuf>,

    /// Directory for the feature table (and a generated index)
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Index column of the audio id
    #[arg(long, requires = "index_path")]
    pub audio_col: Option<usize>,

    /// Index column of the transcript id
    #[arg(long, requires = "index_path")]
    pub text_col: Option<usize>,

    /// Index column of the reader id
    #[arg(long, requires = "index_path")]
    pub reader_col: Option<usize>,

    /// Extension appended to transcript ids
    #[arg(long, default_value = "")]
    pub token_ext: String,

    /// Extension appended to audio ids
    #[arg(long, default_value = ".wav")]
    pub audio_ext: String,

    /// File name pattern used when generating an index: `i` id, `r` reader, `*` wildcard
    #[arg(short, long, conflicts_with = "index_path")]
    pub pattern: Option<String>,

    #[command(flatten)]
    pub extraction: ExtractionArgs,
}

#[derive(Args, Debug)]
pub struct GenIndexArgs {
    /// Directory of transcripts
    #[arg(long)]
    pub text_dir: PathBuf,

    /// Index file to write
    #[arg(short, long, default_value = "line_index.tsv")]
    pub out_file: PathBuf,

    /// File name pattern: `i` id, `r` reader, `*` wildcard, anything else literal
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Extension of the audio files
    #[arg(long, default_value = ".wav")]
    pub audio_ext: String,
}

#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Feature table written by a run
    #[arg(short, long)]
    pub meta_path: PathBuf,

    /// Output directory (default: `summary` next to the feature table)
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Fraction of the corpus, best scores first, kept as clean
    #[arg(short, long, default_value_t = 0.95)]
    pub keep_fraction: f64,
}

#[derive(Args, Debug)]
pub struct OutlierArgs {
    /// Feature table written by a run
    #[arg(short, long)]
    pub meta_path: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Fraction of the corpus, best scores first, kept as clean
    #[arg(short, long, default_value_t = 0.95)]
    pub keep_fraction: f64,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[arg(short, long)]
    pub wav_path: PathBuf,

    #[arg(short, long)]
    pub text_path: PathBuf,

    #[arg(long, default_value_t = 22000)]
    pub sample_rate: u32,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Directory of transcripts
    #[arg(long)]
    pub token_dir: PathBuf,

    /// Text to look for
    pub term: String,
}
