// tests/test_utils/mod.rs
//
// Shared helpers for integration tests: throwaway corpora on disk, WAV
// fixtures and a deterministic feature extractor.

#![allow(dead_code)]

use std::f32::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};

use metawave::{ExtractionFailure, FeatureExtractor, Prosody};
use uuid::Uuid;

/// A corpus in a fresh temporary directory, removed on drop
pub struct TestCorpus {
    pub root: PathBuf,
    pub wavs: PathBuf,
    pub text: PathBuf,
}

impl TestCorpus {
    pub fn new() -> Self {
        Self::with_layout("wavs", "text")
    }

    /// Corpus with custom audio and transcript directory names under the root
    pub fn with_layout(wavs: &str, text: &str) -> Self {
        let root = std::env::temp_dir().join(format!("metawave_test_{}", Uuid::new_v4()));
        let corpus = Self {
            wavs: root.join(wavs),
            text: root.join(text),
            root,
        };
        fs::create_dir_all(&corpus.wavs).expect("Failed to create wav directory");
        fs::create_dir_all(&corpus.text).expect("Failed to create text directory");
        corpus
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn write_transcript(&self, name: &str, text: &str) -> PathBuf {
        let path = self.text.join(name);
        fs::write(&path, text).expect("Failed to write transcript");
        path
    }

    /// Write a short silent-edged tone; content does not matter to stub extractors
    pub fn write_audio(&self, name: &str) -> PathBuf {
        let path = self.wavs.join(name);
        write_wav(&path, &padded_tone(200.0, 16000, 0.3, 0.05), 16000);
        path
    }

    pub fn write_index(&self, name: &str, lines: &[String]) -> PathBuf {
        let path = self.root.join(name);
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(&path, content).expect("Failed to write index");
        path
    }
}

impl Drop for TestCorpus {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

/// Sine tone at `freq` with `pad_secs` of silence on both sides
pub fn padded_tone(freq: f32, sample_rate: u32, tone_secs: f32, pad_secs: f32) -> Vec<f32> {
    let pad = vec![0.0f32; (sample_rate as f32 * pad_secs) as usize];
    let tone_len = (sample_rate as f32 * tone_secs) as usize;
    let tone = (0..tone_len).map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin() * 0.5);

    pad.iter().copied().chain(tone).chain(pad.iter().copied()).collect()
}

/// Write mono 16-bit PCM
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV");
    for &s in samples {
        writer
            .write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
            .expect("Failed to write sample");
    }
    writer.finalize().expect("Failed to finalize WAV");
}

/// Features derived from the transcript alone:
/// speech rate = character count, F0 = 100 + character count.
/// Transcripts containing "fail" have no syllables.
pub struct StubExtractor;

impl FeatureExtractor for StubExtractor {
    fn extract(
        &self,
        _samples: &[f32],
        _sample_rate: u32,
        text: &str,
    ) -> Result<Prosody, ExtractionFailure> {
        if text.contains("fail") {
            return Err(ExtractionFailure::NoSyllables);
        }
        let n = text.trim().chars().count() as f64;
        Ok(Prosody {
            speech_rate: n,
            f0: 100.0 + n,
        })
    }
}

/// Utterance ids (first column) of a feature table
pub fn table_ids(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("Failed to read feature table")
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.split('\t').next().unwrap_or_default().to_string())
        .collect()
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("Failed to read file")
        .lines()
        .map(str::to_string)
        .collect()
}
