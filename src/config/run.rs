// src/config/run.rs
//
// Settings for one extraction run

use serde::{Deserialize, Serialize};

use crate::error::{MetawaveError, Result};

/// What to do when a single utterance yields no usable features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Leave the utterance out of the table and report it
    #[default]
    Skip,
    /// Stop the whole run
    Abort,
}

/// Extraction run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Target sample rate; audio is resampled when it differs
    pub sample_rate: u32,
    /// Stop after this many rows have been written
    pub sample_cap: Option<usize>,
    /// Extension appended to transcript ids (overrides the dataset's)
    pub token_extension: Option<String>,
    /// Extension appended to audio ids
    pub audio_extension: String,
    /// Number of utterances handed to the worker pool at once
    pub batch_size: usize,
    pub failure_policy: FailurePolicy,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22000,
            sample_cap: None,
            token_extension: None,
            audio_extension: ".wav".to_string(),
            batch_size: 64,
            failure_policy: FailurePolicy::Skip,
            show_progress: false,
        }
    }
}

impl RunConfig {
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn sample_cap(mut self, cap: Option<usize>) -> Self {
        self.sample_cap = cap;
        self
    }

    pub fn token_extension(mut self, ext: impl Into<String>) -> Self {
        self.token_extension = Some(ext.into());
        self
    }

    pub fn audio_extension(mut self, ext: impl Into<String>) -> Self {
        self.audio_extension = ext.into();
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(MetawaveError::InvalidConfig(
                "sample rate must be positive".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(MetawaveError::InvalidConfig(
                "batch size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.sample_rate, 22000);
        assert_eq!(config.audio_extension, ".wav");
        assert_eq!(config.failure_policy, FailurePolicy::Skip);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        assert!(RunConfig::default().sample_rate(0).validate().is_err());
        assert!(RunConfig::default().batch_size(0).validate().is_err());
    }
}
