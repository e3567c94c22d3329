// src/stats/report.rs
//
// Report files written from corpus statistics. Each file is opened, written
// and flushed within a single call.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

use super::{CorpusStats, Moments, ReaderAggregate};
use crate::error::{MetawaveError, Result};

pub const OUTLIER_INDEX_NAME: &str = "outlier_index.txt";
pub const CLEAN_INDEX_NAME: &str = "clean_index.txt";
pub const OUTLIERS_LOG_NAME: &str = "outliers.log";
pub const SUMMARY_LOG_NAME: &str = "summary.log";
pub const SUMMARY_JSON_NAME: &str = "summary.json";

const RULE: &str = "===========================================";
const THIN_RULE: &str = "-------------------------------------------";

/// Reader id used for corpus-wide rows
const ALL_READERS: &str = "all";

fn write_report<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let file = File::create(path).map_err(|e| MetawaveError::io_error(path, e))?;
    let mut writer = BufWriter::new(file);
    body(&mut writer)
        .and_then(|_| writer.flush())
        .map_err(|e| MetawaveError::io_error(path, e))
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| MetawaveError::io_error(dir, e))
}

/// Statistics of one reader, or of the whole corpus
#[derive(Debug, Clone, Serialize)]
pub struct ReaderSummary {
    pub reader_id: String,
    pub count: usize,
    pub speech_rate: Moments,
    pub f0: Moments,
    pub outliers: usize,
}

impl From<&ReaderAggregate> for ReaderSummary {
    fn from(reader: &ReaderAggregate) -> Self {
        Self {
            reader_id: reader.reader_id().to_string(),
            count: reader.count(),
            speech_rate: reader.speech_rate(),
            f0: reader.f0(),
            outliers: reader.outlier_count(),
        }
    }
}

/// Machine-readable summary, written as `summary.json`
#[derive(Debug, Clone, Serialize)]
pub struct CorpusSummary {
    pub generated_at: DateTime<Utc>,
    pub feature_table: String,
    pub keep_fraction: Option<f64>,
    pub corpus: ReaderSummary,
    pub readers: Vec<ReaderSummary>,
}

impl CorpusStats {
    pub fn summary(&self) -> CorpusSummary {
        CorpusSummary {
            generated_at: Utc::now(),
            feature_table: self.source.display().to_string(),
            keep_fraction: self.keep_fraction,
            corpus: ReaderSummary {
                reader_id: ALL_READERS.to_string(),
                count: self.total,
                speech_rate: self.speech_rate,
                f0: self.f0,
                outliers: self.outlier_count(),
            },
            readers: self.readers.iter().map(ReaderSummary::from).collect(),
        }
    }

    /// Write the outlier and clean listings and the per-reader outlier log
    /// into `dir`.
    ///
    /// Before [`CorpusStats::set_outliers`] every utterance is clean.
    pub fn write_index(&self, dir: &Path) -> Result<()> {
        ensure_dir(dir)?;

        let outliers = self.outliers();
        write_report(&dir.join(OUTLIER_INDEX_NAME), |w| {
            for u in &outliers {
                writeln!(w, "{}\tWeighted error: {:.3}", u.record.utterance_id, u.error)?;
            }
            Ok(())
        })?;

        let clean = self.clean();
        write_report(&dir.join(CLEAN_INDEX_NAME), |w| {
            for u in &clean {
                writeln!(w, "{}", u.record.utterance_id)?;
            }
            Ok(())
        })?;

        self.write_outlier_log(dir)?;

        info!(
            "{} clean and {} outlier utterance(s) listed in {}",
            clean.len(),
            outliers.len(),
            dir.display()
        );
        Ok(())
    }

    fn write_outlier_log(&self, dir: &Path) -> Result<()> {
        write_report(&dir.join(OUTLIERS_LOG_NAME), |w| {
            for reader in self.readers.iter().filter(|r| r.outlier_count() > 0) {
                writeln!(w, "{}", THIN_RULE)?;
                writeln!(w, "Outliers for {}", reader.reader_id())?;
                for u in reader.outliers() {
                    writeln!(
                        w,
                        "{}. SR is {:.3}, F0 is {:.3}. Weighted error: {:.3}",
                        u.record.utterance_id, u.record.speech_rate, u.record.f0, u.error
                    )?;
                }
            }
            Ok(())
        })
    }

    /// Write `summary.log` into `dir`
    pub fn write_summary(&self, dir: &Path) -> Result<()> {
        ensure_dir(dir)?;
        let path = dir.join(SUMMARY_LOG_NAME);

        write_report(&path, |w| {
            writeln!(w, "{}", RULE)?;
            writeln!(w, "Summary - Meta information")?;
            writeln!(w, "{}", RULE)?;
            writeln!(w, "Number of samples: {}", self.total)?;
            writeln!(w, "Number of speakers: {}", self.readers.len())?;
            writeln!(w, "Number of samples per speaker:")?;
            for reader in &self.readers {
                writeln!(w, "{} : {}", reader.reader_id(), reader.count())?;
            }

            writeln!(w, "{}", RULE)?;
            let rows = self
                .readers
                .iter()
                .map(|r| (r.reader_id(), r.speech_rate(), r.f0()))
                .chain(std::iter::once((ALL_READERS, self.speech_rate, self.f0)));
            for (reader_id, speech_rate, f0) in rows {
                writeln!(w, "Speaker: {}", reader_id)?;
                writeln!(
                    w,
                    "Speech rate: {:.3} +- {:.3}",
                    speech_rate.mean, speech_rate.std_dev
                )?;
                writeln!(w, "Fundm. freq: {:.3} +- {:.3}", f0.mean, f0.std_dev)?;
            }

            writeln!(w, "{}", RULE)?;
            if let Some(keep) = self.keep_fraction {
                writeln!(w, "Keep fraction: {:.3}", keep)?;
            }
            writeln!(w, "Number of outliers: {}", self.outlier_count())?;
            writeln!(w, "Per speaker:")?;
            for reader in &self.readers {
                writeln!(w, "{} : {}", reader.reader_id(), reader.outlier_count())?;
            }
            Ok(())
        })?;

        info!("Summary written to {}", path.display());
        Ok(())
    }

    /// Write `summary.json` into `dir`
    pub fn write_json_summary(&self, dir: &Path) -> Result<()> {
        ensure_dir(dir)?;
        let summary = self.summary();
        write_report(&dir.join(SUMMARY_JSON_NAME), |w| {
            serde_json::to_writer_pretty(&mut *w, &summary)?;
            writeln!(w)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::FeatureRecord;

    fn stats() -> CorpusStats {
        let records = vec![
            FeatureRecord {
                utterance_id: "a1".into(),
                reader_id: "A".into(),
                speech_rate: 5.0,
                f0: 110.0,
            },
            FeatureRecord {
                utterance_id: "a2".into(),
                reader_id: "A".into(),
                speech_rate: 5.2,
                f0: 112.0,
            },
            FeatureRecord {
                utterance_id: "b1".into(),
                reader_id: "B".into(),
                speech_rate: 1.0,
                f0: 300.0,
            },
        ];
        CorpusStats::from_records(records, Path::new("meta.tsv")).unwrap()
    }

    #[test]
    fn test_summary_counts() {
        let mut stats = stats();
        stats.set_outliers(0.67).unwrap();
        let summary = stats.summary();
        assert_eq!(summary.corpus.reader_id, "all");
        assert_eq!(summary.corpus.count, 3);
        assert_eq!(summary.corpus.outliers, 1);
        assert_eq!(summary.readers.len(), 2);
        assert_eq!(summary.readers[0].outliers, 0);
        assert_eq!(summary.readers[1].outliers, 1);
        assert!((summary.readers[0].speech_rate.mean - 5.1).abs() < 1e-12);
    }

    #[test]
    fn test_summary_serializes() {
        let json = serde_json::to_value(stats().summary()).unwrap();
        assert_eq!(json["corpus"]["count"], 3);
        assert!(json["keep_fraction"].is_null());
        assert_eq!(json["readers"][1]["reader_id"], "B");
    }
}
