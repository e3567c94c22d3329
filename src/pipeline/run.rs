// src/pipeline/run.rs
//
// Extraction run: walk the corpus index, resolve every entry to its
// transcript and audio file, extract prosodic features on the rayon pool
// and write the feature table in index order.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::{DatasetSpec, FailurePolicy, RunConfig, RunPaths};
use crate::core::{
    load_audio, trim_silence, FeatureExtractor, ProsodyAnalysis, ProsodyExtractor, TrimConfig,
};
use crate::error::{ExtractionFailure, FileKind, MetawaveError, Result};
use crate::index::{IndexHandler, UtteranceDescriptor};

use super::feature_table::{FeatureRecord, FeatureTableWriter};

/// Outcome of a completed run
#[derive(Debug)]
pub struct RunSummary {
    /// Rows written to the feature table
    pub written: usize,
    /// Utterances left out because extraction failed
    pub skipped: Vec<(String, ExtractionFailure)>,
    /// The sample cap stopped the run before the end of the index
    pub capped: bool,
    pub out_file: PathBuf,
}

/// An index entry whose files have been found
#[derive(Debug, Clone)]
struct PendingUtterance {
    descriptor: UtteranceDescriptor,
    text: String,
    audio_path: PathBuf,
}

/// Read a transcript and lowercase it
fn read_transcript(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path).map_err(|e| MetawaveError::io_error(path, e))?;
    Ok(text.to_lowercase())
}

/// Non-blank index lines with their 1-based line numbers
fn read_index(path: &Path) -> Result<Vec<(usize, String)>> {
    let file = File::open(path).map_err(|e| MetawaveError::io_error(path, e))?;
    let mut entries = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| MetawaveError::io_error(path, e))?;
        if !line.trim().is_empty() {
            entries.push((idx + 1, line));
        }
    }
    Ok(entries)
}

fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Drives one extraction pass over a corpus
pub struct RunOrchestrator<E: FeatureExtractor = ProsodyExtractor> {
    handler: IndexHandler,
    extractor: E,
    trim: TrimConfig,
    config: RunConfig,
}

impl<E: FeatureExtractor> RunOrchestrator<E> {
    /// Set up a run for `dataset`.
    ///
    /// A token extension in `config` overrides the one implied by a known dataset.
    pub fn new(dataset: &DatasetSpec, extractor: E, config: RunConfig) -> Result<Self> {
        config.validate()?;

        let mut handler = IndexHandler::from_spec(dataset);
        if let Some(ext) = &config.token_extension {
            handler.set_token_extension(ext.clone());
        }
        handler.set_audio_extension(config.audio_extension.clone());

        Ok(Self {
            handler,
            extractor,
            trim: TrimConfig::default(),
            config,
        })
    }

    /// Run over the index at `paths.index` and write `paths.out_file`.
    ///
    /// A malformed index line or a missing transcript or audio file ends the
    /// run with an error. Entries before the failing one are still written.
    pub fn run(&mut self, paths: &RunPaths) -> Result<RunSummary> {
        let entries = read_index(&paths.index)?;
        let cap = self.config.sample_cap;
        let total = cap.map_or(entries.len(), |c| c.min(entries.len()));
        info!(
            "Extracting features for {} utterance(s) listed in {}",
            total,
            paths.index.display()
        );

        let pb = progress_bar(total as u64, self.config.show_progress);
        let mut writer = FeatureTableWriter::create(&paths.out_file)?;
        let mut skipped = Vec::new();
        let mut entries = entries.into_iter().peekable();
        let mut capped = false;

        loop {
            let remaining = cap.map(|c| c.saturating_sub(writer.rows()));
            if remaining == Some(0) {
                capped = entries.peek().is_some();
                break;
            }
            let want = remaining.map_or(self.config.batch_size, |r| r.min(self.config.batch_size));

            // Resolve in index order; the first missing file stops the run
            // after the entries already resolved have been written.
            let mut batch = Vec::with_capacity(want);
            let mut fatal = None;
            while batch.len() < want {
                let Some((line_no, line)) = entries.next() else {
                    break;
                };
                match self.resolve(paths, &line, line_no) {
                    Ok(pending) => batch.push(pending),
                    Err(e) => {
                        fatal = Some(e);
                        break;
                    }
                }
            }

            if batch.is_empty() && fatal.is_none() {
                break;
            }

            for result in self.extract_batch(&batch, &pb) {
                match result {
                    Ok(record) => writer.write(&record)?,
                    Err(MetawaveError::Extraction { id, failure })
                        if self.config.failure_policy == FailurePolicy::Skip =>
                    {
                        warn!("Skipping {}: {}", id, failure);
                        skipped.push((id, failure));
                    }
                    Err(e) => {
                        pb.abandon();
                        writer.finish()?;
                        return Err(e);
                    }
                }
            }

            if let Some(e) = fatal {
                pb.abandon();
                writer.finish()?;
                return Err(e);
            }
        }

        let written = writer.finish()?;
        pb.finish_and_clear();

        if capped {
            info!("Stopping because the sample cap of {} was reached", written);
        }
        if !skipped.is_empty() {
            warn!("{} utterance(s) skipped after failed extraction", skipped.len());
        }
        info!(
            "Feature table with {} row(s) written to {}",
            written,
            paths.out_file.display()
        );

        Ok(RunSummary {
            written,
            skipped,
            capped,
            out_file: paths.out_file.clone(),
        })
    }

    fn resolve(&mut self, paths: &RunPaths, line: &str, line_no: usize) -> Result<PendingUtterance> {
        let descriptor = self.handler.parse(line, line_no)?;

        let text_path = paths.text.join(&descriptor.text_file_id);
        if !text_path.is_file() {
            return Err(MetawaveError::MissingFile {
                kind: FileKind::Text,
                id: descriptor.text_file_id,
                path: text_path,
            });
        }
        let text = read_transcript(&text_path)?;

        let audio_path = paths.wavs.join(&descriptor.audio_file_id);
        if !audio_path.is_file() {
            return Err(MetawaveError::MissingFile {
                kind: FileKind::Audio,
                id: descriptor.text_file_id,
                path: audio_path,
            });
        }

        Ok(PendingUtterance {
            descriptor,
            text,
            audio_path,
        })
    }

    /// Fan the batch out over the pool. Results come back in batch order.
    fn extract_batch(&self, batch: &[PendingUtterance], pb: &ProgressBar) -> Vec<Result<FeatureRecord>> {
        batch
            .par_iter()
            .map(|pending| {
                let result = self.extract_one(pending);
                pb.inc(1);
                result
            })
            .collect()
    }

    fn extract_one(&self, pending: &PendingUtterance) -> Result<FeatureRecord> {
        let id = &pending.descriptor.text_file_id;
        let audio = load_audio(&pending.audio_path, self.config.sample_rate)?;
        let trimmed = trim_silence(&audio.samples, &self.trim);

        let failed = |failure: ExtractionFailure| MetawaveError::Extraction {
            id: id.clone(),
            failure,
        };
        let prosody = self
            .extractor
            .extract(trimmed, audio.sample_rate, &pending.text)
            .map_err(failed)?;
        let record = FeatureRecord::new(id.clone(), pending.descriptor.reader_id.clone(), prosody)
            .map_err(failed)?;

        debug!(
            "{} ({}): speech rate {:.4}, F0 {:.4}",
            record.utterance_id, record.reader_id, record.speech_rate, record.f0
        );
        Ok(record)
    }
}

/// Extract features for every utterance of a corpus with the default extractor
pub fn run(
    sample_rate: u32,
    paths: &RunPaths,
    dataset: &DatasetSpec,
    sample_cap: Option<usize>,
) -> Result<RunSummary> {
    let config = RunConfig::default()
        .sample_rate(sample_rate)
        .sample_cap(sample_cap);
    RunOrchestrator::new(dataset, ProsodyExtractor::default(), config)?.run(paths)
}

/// Features of a single (audio, transcript) pair
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub text: String,
    pub analysis: ProsodyAnalysis,
}

/// Analyse one audio file and its transcript
pub fn check(audio_path: &Path, text_path: &Path, sample_rate: u32) -> Result<CheckReport> {
    for (kind, path) in [(FileKind::Audio, audio_path), (FileKind::Text, text_path)] {
        if !path.is_file() {
            return Err(MetawaveError::MissingFile {
                kind,
                id: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path: path.to_path_buf(),
            });
        }
    }

    let text = read_transcript(text_path)?;
    let audio = load_audio(audio_path, sample_rate)?;
    let trimmed = trim_silence(&audio.samples, &TrimConfig::default());

    let analysis = ProsodyExtractor::default()
        .analyze(trimmed, audio.sample_rate, &text)
        .map_err(|failure| MetawaveError::Extraction {
            id: text_path.display().to_string(),
            failure,
        })?;

    Ok(CheckReport { text, analysis })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnLayout;

    #[test]
    fn test_read_index_skips_blank_lines() {
        let path = std::env::temp_dir().join(format!("metawave_index_{}.tsv", std::process::id()));
        fs::write(&path, "a\tA\n\n  \nb\tB\n").unwrap();
        let entries = read_index(&path).unwrap();
        assert_eq!(entries, vec![(1, "a\tA".to_string()), (4, "b\tB".to_string())]);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_config_token_extension_overrides_dataset() {
        let spec = DatasetSpec::resolve(Some("ivona"), None).unwrap();
        let config = RunConfig::default().token_extension(".lab");
        let mut orchestrator = RunOrchestrator::new(&spec, ProsodyExtractor::default(), config).unwrap();
        let descriptor = orchestrator.handler.parse("utt\tutt_audio\tkristjan", 1).unwrap();
        assert_eq!(descriptor.text_file_id, "utt.lab");
        assert_eq!(descriptor.audio_file_id, "utt_audio.wav");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let spec = DatasetSpec::Custom(ColumnLayout::new(0, 0, None));
        let config = RunConfig::default().batch_size(0);
        assert!(RunOrchestrator::new(&spec, ProsodyExtractor::default(), config).is_err());
    }

    #[test]
    fn test_missing_index_is_io_error() {
        let spec = DatasetSpec::Custom(ColumnLayout::new(0, 0, None));
        let dir = std::env::temp_dir();
        let paths = RunPaths::custom(&dir, &dir, &dir.join("no_such_index.tsv"), &dir);
        let err = run(22000, &paths, &spec, None).unwrap_err();
        assert!(matches!(err, MetawaveError::Io { .. }));
    }
}
