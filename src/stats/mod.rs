//! Corpus statistics and outlier classification
//!
//! [`CorpusStats`] is built from a feature table. It owns one
//! [`ReaderAggregate`] per reader, in order of first appearance, and each
//! aggregate owns its scored utterances in table order.
//!
//! Every utterance gets a weighted error score: the squared relative
//! deviation from the corpus-wide mean, summed over speech rate and F0.
//! The corpus-wide means are fixed when the table is loaded.
//! [`CorpusStats::set_outliers`] ranks all utterances by that score and marks
//! everything past the kept fraction as an outlier.

mod report;

pub use report::{
    CorpusSummary, ReaderSummary, CLEAN_INDEX_NAME, OUTLIERS_LOG_NAME, OUTLIER_INDEX_NAME,
    SUMMARY_JSON_NAME, SUMMARY_LOG_NAME,
};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::dsp::{mean, std_dev};
use crate::error::{MetawaveError, Result};
use crate::pipeline::{read_table, FeatureRecord};

/// Mean and population standard deviation of one feature
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Moments {
    pub mean: f64,
    pub std_dev: f64,
}

impl Moments {
    pub fn of(values: &[f64]) -> Self {
        Self {
            mean: mean(values),
            std_dev: std_dev(values),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Classification {
    #[default]
    Clean,
    Outlier,
}

/// Weighted error of one utterance against the corpus-wide means.
///
/// Both means must be non-zero.
pub fn error_score(speech_rate: f64, f0: f64, mean_speech_rate: f64, mean_f0: f64) -> f64 {
    let spr = (mean_speech_rate - speech_rate) / mean_speech_rate;
    let pitch = (mean_f0 - f0) / mean_f0;
    spr * spr + pitch * pitch
}

/// One feature table row with its score and class
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredUtterance {
    pub record: FeatureRecord,
    /// Row position in the feature table
    pub position: usize,
    pub error: f64,
    pub class: Classification,
}

impl ScoredUtterance {
    pub fn is_outlier(&self) -> bool {
        self.class == Classification::Outlier
    }
}

/// All utterances of one reader
#[derive(Debug, Clone)]
pub struct ReaderAggregate {
    reader_id: String,
    utterances: Vec<ScoredUtterance>,
    speech_rate: Moments,
    f0: Moments,
}

impl ReaderAggregate {
    /// Per-reader moments are computed here, over every utterance, and do
    /// not change with later classification.
    fn new(reader_id: String, utterances: Vec<ScoredUtterance>) -> Self {
        let rates: Vec<f64> = utterances.iter().map(|u| u.record.speech_rate).collect();
        let pitches: Vec<f64> = utterances.iter().map(|u| u.record.f0).collect();
        Self {
            reader_id,
            speech_rate: Moments::of(&rates),
            f0: Moments::of(&pitches),
            utterances,
        }
    }

    pub fn reader_id(&self) -> &str {
        &self.reader_id
    }

    pub fn utterances(&self) -> &[ScoredUtterance] {
        &self.utterances
    }

    pub fn count(&self) -> usize {
        self.utterances.len()
    }

    pub fn speech_rate(&self) -> Moments {
        self.speech_rate
    }

    pub fn f0(&self) -> Moments {
        self.f0
    }

    pub fn outliers(&self) -> impl Iterator<Item = &ScoredUtterance> {
        self.utterances.iter().filter(|u| u.is_outlier())
    }

    pub fn outlier_count(&self) -> usize {
        self.outliers().count()
    }
}

/// Per-reader and corpus-wide statistics of a feature table
#[derive(Debug, Clone)]
pub struct CorpusStats {
    source: PathBuf,
    readers: Vec<ReaderAggregate>,
    reader_index: HashMap<String, usize>,
    total: usize,
    speech_rate: Moments,
    f0: Moments,
    keep_fraction: Option<f64>,
}

impl CorpusStats {
    /// Load the feature table at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let records = read_table(path)?;
        Self::from_records(records, path)
    }

    /// Build statistics from records in table order.
    ///
    /// `source` names the table in errors and reports. An empty table or a
    /// corpus-wide mean that is zero or overflows is a data integrity error.
    pub fn from_records(records: Vec<FeatureRecord>, source: &Path) -> Result<Self> {
        if records.is_empty() {
            return Err(MetawaveError::EmptyTable(source.to_path_buf()));
        }

        let rates: Vec<f64> = records.iter().map(|r| r.speech_rate).collect();
        let pitches: Vec<f64> = records.iter().map(|r| r.f0).collect();
        let speech_rate = Moments::of(&rates);
        let f0 = Moments::of(&pitches);

        let usable = |mean: f64| mean.is_finite() && mean > 0.0;
        if !usable(speech_rate.mean) {
            return Err(MetawaveError::ZeroMean {
                feature: "speech rate",
            });
        }
        if !usable(f0.mean) {
            return Err(MetawaveError::ZeroMean { feature: "F0" });
        }

        let total = records.len();
        let mut reader_index: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<(String, Vec<ScoredUtterance>)> = Vec::new();

        for (position, record) in records.into_iter().enumerate() {
            let idx = match reader_index.get(&record.reader_id) {
                Some(&idx) => idx,
                None => {
                    reader_index.insert(record.reader_id.clone(), groups.len());
                    groups.push((record.reader_id.clone(), Vec::new()));
                    groups.len() - 1
                }
            };
            let error = error_score(record.speech_rate, record.f0, speech_rate.mean, f0.mean);
            groups[idx].1.push(ScoredUtterance {
                record,
                position,
                error,
                class: Classification::Clean,
            });
        }

        let readers: Vec<ReaderAggregate> = groups
            .into_iter()
            .map(|(reader_id, utterances)| ReaderAggregate::new(reader_id, utterances))
            .collect();

        info!(
            "Loaded {} utterance(s) from {} reader(s) in {}",
            total,
            readers.len(),
            source.display()
        );

        Ok(Self {
            source: source.to_path_buf(),
            readers,
            reader_index,
            total,
            speech_rate,
            f0,
            keep_fraction: None,
        })
    }

    /// Rank every utterance by error score and mark the worst as outliers.
    ///
    /// Utterances are pooled reader by reader, in the order the readers first
    /// appear, and sorted stably. The best `trunc(keep_fraction * N)` stay
    /// clean. Returns the number of outliers.
    pub fn set_outliers(&mut self, keep_fraction: f64) -> Result<usize> {
        if !(0.0..=1.0).contains(&keep_fraction) {
            return Err(MetawaveError::InvalidConfig(format!(
                "keep fraction must be within [0, 1], got {}",
                keep_fraction
            )));
        }

        let mut pooled: Vec<(usize, usize)> = Vec::with_capacity(self.total);
        for (r, reader) in self.readers.iter_mut().enumerate() {
            for (u, utterance) in reader.utterances.iter_mut().enumerate() {
                utterance.class = Classification::Clean;
                pooled.push((r, u));
            }
        }

        let readers = &self.readers;
        pooled.sort_by(|a, b| {
            let ea = readers[a.0].utterances[a.1].error;
            let eb = readers[b.0].utterances[b.1].error;
            ea.total_cmp(&eb)
        });

        let keep = ((keep_fraction * self.total as f64) as usize).min(self.total);
        for &(r, u) in &pooled[keep..] {
            self.readers[r].utterances[u].class = Classification::Outlier;
        }

        let outliers = self.total - keep;
        self.keep_fraction = Some(keep_fraction);
        debug!("Keeping {} of {} utterance(s)", keep, self.total);
        info!("{} outlier(s) at keep fraction {}", outliers, keep_fraction);
        Ok(outliers)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn readers(&self) -> &[ReaderAggregate] {
        &self.readers
    }

    pub fn reader(&self, reader_id: &str) -> Option<&ReaderAggregate> {
        self.reader_index.get(reader_id).map(|&idx| &self.readers[idx])
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Corpus-wide speech rate moments
    pub fn speech_rate(&self) -> Moments {
        self.speech_rate
    }

    /// Corpus-wide F0 moments
    pub fn f0(&self) -> Moments {
        self.f0
    }

    /// Keep fraction of the last classification, if any
    pub fn keep_fraction(&self) -> Option<f64> {
        self.keep_fraction
    }

    pub fn outlier_count(&self) -> usize {
        self.readers.iter().map(ReaderAggregate::outlier_count).sum()
    }

    fn all_utterances(&self) -> impl Iterator<Item = &ScoredUtterance> {
        self.readers.iter().flat_map(|r| r.utterances.iter())
    }

    /// Clean utterances in table order
    pub fn clean(&self) -> Vec<&ScoredUtterance> {
        let mut clean: Vec<&ScoredUtterance> =
            self.all_utterances().filter(|u| !u.is_outlier()).collect();
        clean.sort_by_key(|u| u.position);
        clean
    }

    /// Outliers, worst score first; equal scores in table order
    pub fn outliers(&self) -> Vec<&ScoredUtterance> {
        let mut outliers: Vec<&ScoredUtterance> =
            self.all_utterances().filter(|u| u.is_outlier()).collect();
        outliers.sort_by(|a, b| b.error.total_cmp(&a.error).then(a.position.cmp(&b.position)));
        outliers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, reader: &str, speech_rate: f64, f0: f64) -> FeatureRecord {
        FeatureRecord {
            utterance_id: id.to_string(),
            reader_id: reader.to_string(),
            speech_rate,
            f0,
        }
    }

    fn two_readers() -> CorpusStats {
        CorpusStats::from_records(
            vec![
                record("a1", "A", 5.0, 110.0),
                record("b1", "B", 1.0, 300.0),
                record("a2", "A", 5.2, 112.0),
            ],
            Path::new("meta.tsv"),
        )
        .unwrap()
    }

    #[test]
    fn test_error_score() {
        assert_eq!(error_score(4.0, 100.0, 4.0, 100.0), 0.0);
        // 50% off on both features
        assert!((error_score(2.0, 150.0, 4.0, 100.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_readers_in_first_appearance_order() {
        let stats = two_readers();
        let ids: Vec<&str> = stats.readers().iter().map(|r| r.reader_id()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(stats.reader("A").unwrap().count(), 2);
        assert!(stats.reader("C").is_none());
    }

    #[test]
    fn test_corpus_means_frozen_at_load() {
        let mut stats = two_readers();
        let before: Vec<f64> = stats.all_utterances().map(|u| u.error).collect();
        stats.set_outliers(0.5).unwrap();
        let after: Vec<f64> = stats.all_utterances().map(|u| u.error).collect();
        assert_eq!(before, after);
        assert!((stats.speech_rate().mean - 11.2 / 3.0).abs() < 1e-12);
        assert!((stats.f0().mean - 174.0).abs() < 1e-12);
    }

    #[test]
    fn test_reclassification_resets() {
        let mut stats = two_readers();
        assert_eq!(stats.set_outliers(0.0).unwrap(), 3);
        assert_eq!(stats.set_outliers(1.0).unwrap(), 0);
        assert_eq!(stats.outlier_count(), 0);
        assert_eq!(stats.keep_fraction(), Some(1.0));
    }

    #[test]
    fn test_keep_fraction_bounds() {
        let mut stats = two_readers();
        for bad in [-0.1, 1.5, f64::NAN] {
            assert!(matches!(
                stats.set_outliers(bad),
                Err(MetawaveError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_ties_keep_pooled_order() {
        let mut stats = CorpusStats::from_records(
            vec![
                record("x", "A", 4.0, 100.0),
                record("y", "B", 2.0, 100.0),
                record("z", "A", 6.0, 100.0),
            ],
            Path::new("meta.tsv"),
        )
        .unwrap();
        // y and z deviate equally; readers are pooled A then B, so z ranks first
        stats.set_outliers(2.0 / 3.0).unwrap();
        let outliers: Vec<&str> = stats
            .outliers()
            .iter()
            .map(|u| u.record.utterance_id.as_str())
            .collect();
        assert_eq!(outliers, vec!["y"]);
    }

    #[test]
    fn test_empty_and_zero_mean_tables() {
        let source = Path::new("meta.tsv");
        assert!(matches!(
            CorpusStats::from_records(Vec::new(), source),
            Err(MetawaveError::EmptyTable(_))
        ));
        assert!(matches!(
            CorpusStats::from_records(vec![record("a", "A", 0.0, 100.0)], source),
            Err(MetawaveError::ZeroMean { feature: "speech rate" })
        ));
        assert!(matches!(
            CorpusStats::from_records(vec![record("a", "A", 3.0, 0.0)], source),
            Err(MetawaveError::ZeroMean { feature: "F0" })
        ));
    }
}
