// src/pipeline/feature_table.rs
//
// The feature table: one tab-separated row per utterance
//   <utterance_id>\t<reader_id>\t<speech_rate>\t<f0>

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::Prosody;
use crate::error::{ExtractionFailure, MetawaveError, Result};

/// Features of one successfully processed utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub utterance_id: String,
    pub reader_id: String,
    /// Syllables per second
    pub speech_rate: f64,
    /// Average F0 in Hz
    pub f0: f64,
}

impl FeatureRecord {
    /// Build a record from freshly extracted features.
    ///
    /// Rejects NaN/infinite values, a non-positive speech rate and a negative F0.
    pub fn new(
        utterance_id: impl Into<String>,
        reader_id: impl Into<String>,
        prosody: Prosody,
    ) -> std::result::Result<Self, ExtractionFailure> {
        let Prosody { speech_rate, f0 } = prosody;
        if !speech_rate.is_finite() || speech_rate <= 0.0 {
            return Err(ExtractionFailure::NonFiniteFeature {
                feature: "speech rate",
                value: speech_rate,
            });
        }
        if !f0.is_finite() || f0 < 0.0 {
            return Err(ExtractionFailure::NonFiniteFeature {
                feature: "F0",
                value: f0,
            });
        }
        Ok(Self {
            utterance_id: utterance_id.into(),
            reader_id: reader_id.into(),
            speech_rate,
            f0,
        })
    }

    /// Table row, newline included
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{:.4}\t{:.4}\n",
            self.utterance_id, self.reader_id, self.speech_rate, self.f0
        )
    }

    fn parse_line(line: &str, path: &Path, line_no: usize) -> Result<Self> {
        let format_error = |reason: String| MetawaveError::TableFormat {
            path: path.to_path_buf(),
            line: line_no,
            reason,
        };

        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        if fields.len() != 4 {
            return Err(format_error(format!(
                "expected 4 tab-separated fields, found {}",
                fields.len()
            )));
        }

        // Zero is accepted here so a degenerate corpus surfaces as a zero mean
        let number = |value: &str, name: &str| -> Result<f64> {
            match value.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
                Ok(v) if v.is_finite() => Err(format_error(format!("{} is negative: {}", name, v))),
                Ok(v) => Err(format_error(format!("{} is not finite: {}", name, v))),
                Err(e) => Err(format_error(format!("bad {} '{}': {}", name, value, e))),
            }
        };

        Ok(Self {
            utterance_id: fields[0].to_string(),
            reader_id: fields[1].to_string(),
            speech_rate: number(fields[2], "speech rate")?,
            f0: number(fields[3], "F0")?,
        })
    }
}

/// Appends rows to a feature table. The file is closed when the writer drops.
pub struct FeatureTableWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    rows: usize,
}

impl FeatureTableWriter {
    /// Create (or truncate) the table at `path`
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| MetawaveError::io_error(parent, e))?;
        }
        let file = File::create(path).map_err(|e| MetawaveError::io_error(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            rows: 0,
        })
    }

    pub fn write(&mut self, record: &FeatureRecord) -> Result<()> {
        self.writer
            .write_all(record.to_line().as_bytes())
            .map_err(|e| MetawaveError::io_error(&self.path, e))?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush buffered rows to disk
    pub fn finish(mut self) -> Result<usize> {
        self.writer
            .flush()
            .map_err(|e| MetawaveError::io_error(&self.path, e))?;
        Ok(self.rows)
    }
}

/// Write a complete table in one go
pub fn write_table(path: &Path, records: &[FeatureRecord]) -> Result<()> {
    let mut writer = FeatureTableWriter::create(path)?;
    for record in records {
        writer.write(record)?;
    }
    writer.finish().map(|_| ())
}

/// Read a feature table. Blank lines are ignored.
pub fn read_table(path: &Path) -> Result<Vec<FeatureRecord>> {
    let file = File::open(path).map_err(|e| MetawaveError::io_error(path, e))?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| MetawaveError::io_error(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(FeatureRecord::parse_line(&line, path, idx + 1)?);
    }
    Ok(records)
}
