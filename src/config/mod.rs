//! Configuration module for metawave

mod datasets;
mod run;

pub use datasets::{
    ColumnLayout, DatasetPreset, DatasetSpec, RunPaths, FEATURE_TABLE_NAME, GENERATED_INDEX_NAME,
};
pub use run::{FailurePolicy, RunConfig};
