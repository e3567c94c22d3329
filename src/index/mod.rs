//! Corpus index handling
//!
//! - `handler` - reads index lines of known and custom datasets
//! - `reverse` - synthesizes an index from transcript filenames

mod handler;
mod reverse;

pub use handler::{append_extension, IndexHandler, UtteranceDescriptor, DEFAULT_READER};
pub use reverse::{
    audio_filename, generate_index, FilenameMatch, FilenamePattern, IndexGenerationReport,
    ReverseIndexHandler,
};
