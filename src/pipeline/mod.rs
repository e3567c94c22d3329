//! Feature extraction over a whole corpus
//!
//! - `feature_table` - the persisted per-utterance table
//! - `run` - the extraction run and single-pair checks

mod feature_table;
mod run;

pub use feature_table::{read_table, write_table, FeatureRecord, FeatureTableWriter};
pub use run::{check, run, CheckReport, RunOrchestrator, RunSummary};
