// src/config/datasets.rs
//
// Known corpus layouts and custom column mappings for index files

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::{MetawaveError, Result};

/// Column positions of the fields in one tab-separated index line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    /// Column holding the audio file id
    pub audio: usize,
    /// Column holding the transcript file id
    pub text: usize,
    /// Column holding the reader id, if the index has one
    pub reader: Option<usize>,
    /// Lines may end before the reader column; such utterances get the
    /// placeholder reader
    #[serde(default)]
    pub optional_reader: bool,
}

impl ColumnLayout {
    /// Layout of indexes written by the reverse-index generator:
    /// `<text_filename>\t<audio_filename>[\t<reader_id>]`
    pub const REVERSE_INDEX: ColumnLayout = ColumnLayout {
        audio: 1,
        text: 0,
        reader: Some(2),
        optional_reader: true,
    };

    pub fn new(audio: usize, text: usize, reader: Option<usize>) -> Self {
        Self {
            audio,
            text,
            reader,
            optional_reader: false,
        }
    }

    /// Number of columns every line must have
    pub fn required_columns(&self) -> usize {
        let reader = self.reader.filter(|_| !self.optional_reader).unwrap_or(0);
        self.audio.max(self.text).max(reader) + 1
    }
}

/// Datasets with a built-in index and directory layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetPreset {
    /// Icelandic Google TTS corpus, male voice
    #[serde(rename = "TTS_icelandic_Google_m")]
    IcelandicGoogleMale,
    /// Icelandic Google TTS corpus, female voice
    #[serde(rename = "TTS_icelandic_Google_f")]
    IcelandicGoogleFemale,
    /// Ivona speech export
    #[serde(rename = "ivona_speech_data")]
    Ivona,
}

impl DatasetPreset {
    pub fn all() -> Vec<Self> {
        vec![
            Self::IcelandicGoogleMale,
            Self::IcelandicGoogleFemale,
            Self::Ivona,
        ]
    }

    /// Look a preset up by its dataset identifier
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "TTS_icelandic_Google_m" | "icelandic_google_m" => Some(Self::IcelandicGoogleMale),
            "TTS_icelandic_Google_f" | "icelandic_google_f" => Some(Self::IcelandicGoogleFemale),
            "ivona_speech_data" | "ivona" => Some(Self::Ivona),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::IcelandicGoogleMale => "TTS_icelandic_Google_m",
            Self::IcelandicGoogleFemale => "TTS_icelandic_Google_f",
            Self::Ivona => "ivona_speech_data",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::IcelandicGoogleMale => "Icelandic Google TTS data, male readers (ismData)",
            Self::IcelandicGoogleFemale => "Icelandic Google TTS data, female readers (isfData)",
            Self::Ivona => "Ivona speech export (Kristjan_export + ivona_txt)",
        }
    }

    /// Index columns for this dataset.
    ///
    /// The Google corpora use a single id column for both audio and text;
    /// the extensions tell them apart.
    pub fn columns(&self) -> ColumnLayout {
        match self {
            Self::IcelandicGoogleMale | Self::IcelandicGoogleFemale => ColumnLayout {
                audio: 0,
                text: 0,
                reader: Some(1),
                optional_reader: false,
            },
            Self::Ivona => ColumnLayout {
                audio: 1,
                text: 0,
                reader: Some(2),
                optional_reader: false,
            },
        }
    }

    pub fn token_extension(&self) -> &'static str {
        match self {
            Self::IcelandicGoogleMale | Self::IcelandicGoogleFemale => ".token",
            Self::Ivona => ".txt",
        }
    }

    /// Resolve the on-disk layout under `base_dir`.
    ///
    /// The feature table goes to `out_dir/meta.tsv`, or to the base directory
    /// when no output directory is given.
    pub fn paths(&self, base_dir: &Path, out_dir: Option<&Path>) -> RunPaths {
        let (wavs, text, index) = match self {
            Self::IcelandicGoogleMale => {
                let root = base_dir.join("ismData");
                (root.join("wavs"), root.join("tokens"), root.join("line_index.tsv"))
            }
            Self::IcelandicGoogleFemale => {
                let root = base_dir.join("isfData");
                (root.join("wavs"), root.join("tokens"), root.join("line_index.txt"))
            }
            Self::Ivona => (
                base_dir.join("Kristjan_export"),
                base_dir.join("ivona_txt"),
                base_dir.join("line_index.tsv"),
            ),
        };

        let out_dir = out_dir.unwrap_or(base_dir);
        RunPaths {
            wavs,
            text,
            index,
            out_file: out_dir.join(FEATURE_TABLE_NAME),
        }
    }
}

/// Default file name of the feature table
pub const FEATURE_TABLE_NAME: &str = "meta.tsv";

/// Default file name of a generated index
pub const GENERATED_INDEX_NAME: &str = "line_index.tsv";

/// How index lines of a dataset are interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSpec {
    Known(DatasetPreset),
    Custom(ColumnLayout),
}

impl DatasetSpec {
    /// Pick the index interpretation from a dataset name and/or explicit columns.
    ///
    /// Explicit columns always win. Without them the name must be a known preset.
    pub fn resolve(name: Option<&str>, layout: Option<ColumnLayout>) -> Result<Self> {
        if let Some(layout) = layout {
            return Ok(Self::Custom(layout));
        }
        match name {
            Some(name) => DatasetPreset::from_name(name)
                .map(Self::Known)
                .ok_or_else(|| MetawaveError::UnknownDataset(name.to_string())),
            None => Err(MetawaveError::UnknownDataset(String::new())),
        }
    }

    pub fn columns(&self) -> ColumnLayout {
        match self {
            Self::Known(preset) => preset.columns(),
            Self::Custom(layout) => *layout,
        }
    }

    /// Token extension implied by the dataset, if any
    pub fn token_extension(&self) -> Option<&'static str> {
        match self {
            Self::Known(preset) => Some(preset.token_extension()),
            Self::Custom(_) => None,
        }
    }
}

/// Input and output locations for one extraction run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    /// Directory of audio files
    pub wavs: PathBuf,
    /// Directory of transcript files
    pub text: PathBuf,
    /// Index file
    pub index: PathBuf,
    /// Feature table to write
    pub out_file: PathBuf,
}

impl RunPaths {
    /// Paths for a custom dataset; the table is written to `out_dir/meta.tsv`
    pub fn custom(wavs: &Path, text: &Path, index: &Path, out_dir: &Path) -> Self {
        Self {
            wavs: wavs.to_path_buf(),
            text: text.to_path_buf(),
            index: index.to_path_buf(),
            out_file: out_dir.join(FEATURE_TABLE_NAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_lookup() {
        assert_eq!(
            DatasetPreset::from_name("TTS_icelandic_Google_m"),
            Some(DatasetPreset::IcelandicGoogleMale)
        );
        assert_eq!(DatasetPreset::from_name("ivona"), Some(DatasetPreset::Ivona));
        assert_eq!(DatasetPreset::from_name("librispeech"), None);

        for preset in DatasetPreset::all() {
            assert_eq!(DatasetPreset::from_name(preset.name()), Some(preset));
        }
    }

    #[test]
    fn test_resolve_prefers_explicit_columns() {
        let layout = ColumnLayout::new(2, 0, None);
        let spec = DatasetSpec::resolve(Some("not_a_dataset"), Some(layout)).unwrap();
        assert_eq!(spec, DatasetSpec::Custom(layout));
        assert_eq!(spec.token_extension(), None);
    }

    #[test]
    fn test_resolve_unknown_dataset() {
        let err = DatasetSpec::resolve(Some("not_a_dataset"), None).unwrap_err();
        assert!(matches!(err, MetawaveError::UnknownDataset(ref n) if n == "not_a_dataset"));
        assert!(DatasetSpec::resolve(None, None).is_err());
    }

    #[test]
    fn test_preset_paths() {
        let base = Path::new("/data/tts");
        let paths = DatasetPreset::IcelandicGoogleFemale.paths(base, None);
        assert_eq!(paths.wavs, PathBuf::from("/data/tts/isfData/wavs"));
        assert_eq!(paths.index, PathBuf::from("/data/tts/isfData/line_index.txt"));
        assert_eq!(paths.out_file, PathBuf::from("/data/tts/meta.tsv"));

        let paths = DatasetPreset::Ivona.paths(base, Some(Path::new("/out")));
        assert_eq!(paths.text, PathBuf::from("/data/tts/ivona_txt"));
        assert_eq!(paths.out_file, PathBuf::from("/out/meta.tsv"));
    }

    #[test]
    fn test_required_columns() {
        assert_eq!(DatasetPreset::IcelandicGoogleMale.columns().required_columns(), 2);
        assert_eq!(DatasetPreset::Ivona.columns().required_columns(), 3);
        assert_eq!(ColumnLayout::REVERSE_INDEX.required_columns(), 2);
        assert_eq!(ColumnLayout::new(2, 0, None).required_columns(), 3);
        assert_eq!(ColumnLayout::new(0, 0, Some(5)).required_columns(), 6);
    }
}
