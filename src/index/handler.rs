// src/index/handler.rs
//
// Reads one line of a corpus index at a time and exposes the normalized
// audio id, transcript id and reader id.

use crate::config::{ColumnLayout, DatasetSpec};
use crate::error::{MetawaveError, Result};

/// Reader id used when the index has no reader column
pub const DEFAULT_READER: &str = "Reader";

/// Append `ext` to `fid` unless `fid` already ends with exactly that suffix.
///
/// Idempotent: applying it twice gives the same result as applying it once.
pub fn append_extension(fid: &str, ext: &str) -> String {
    if fid.ends_with(ext) {
        fid.to_string()
    } else {
        format!("{}{}", fid, ext)
    }
}

/// One utterance as described by an index line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceDescriptor {
    /// Audio file name, extension included
    pub audio_file_id: String,
    /// Transcript file name, extension included. Also the utterance id.
    pub text_file_id: String,
    pub reader_id: String,
}

#[derive(Debug, Clone, Default)]
struct CurrentLine {
    audio_fid: String,
    token_fid: String,
    reader: Option<String>,
}

/// Index line interpreter for known and custom datasets
#[derive(Debug, Clone)]
pub struct IndexHandler {
    layout: ColumnLayout,
    token_extension: String,
    audio_extension: String,
    current: CurrentLine,
}

impl IndexHandler {
    /// Build a handler from a dataset identifier and/or an explicit column layout.
    ///
    /// Fails with a configuration error when the name is not a known dataset
    /// and no layout is given.
    pub fn new(dataset: Option<&str>, layout: Option<ColumnLayout>) -> Result<Self> {
        Ok(Self::from_spec(&DatasetSpec::resolve(dataset, layout)?))
    }

    /// Build a handler for an already resolved dataset.
    ///
    /// Known datasets bring their own token extension.
    pub fn from_spec(spec: &DatasetSpec) -> Self {
        let mut handler = Self::with_layout(spec.columns());
        if let Some(ext) = spec.token_extension() {
            handler.set_token_extension(ext);
        }
        handler
    }

    pub fn with_layout(layout: ColumnLayout) -> Self {
        Self {
            layout,
            token_extension: String::new(),
            audio_extension: ".wav".to_string(),
            current: CurrentLine::default(),
        }
    }

    pub fn set_token_extension(&mut self, ext: impl Into<String>) {
        self.token_extension = ext.into();
    }

    pub fn set_audio_extension(&mut self, ext: impl Into<String>) {
        self.audio_extension = ext.into();
    }

    /// Parse one tab-separated index line into the handler's state.
    ///
    /// `line_no` is only used for error messages.
    pub fn set_current(&mut self, line: &str, line_no: usize) -> Result<()> {
        let fields: Vec<&str> = line.trim().split('\t').map(str::trim).collect();
        let required = self.layout.required_columns();
        if fields.len() < required {
            return Err(MetawaveError::MalformedIndexLine {
                line: line_no,
                reason: format!(
                    "expected at least {} column(s), found {}",
                    required,
                    fields.len()
                ),
            });
        }

        let field = |col: usize, what: &str| -> Result<String> {
            match fields.get(col) {
                Some(value) if !value.is_empty() => Ok(value.to_string()),
                _ => Err(MetawaveError::MalformedIndexLine {
                    line: line_no,
                    reason: format!(
                        "expected {} in column {}, found {} column(s)",
                        what,
                        col,
                        fields.len()
                    ),
                }),
            }
        };

        let audio_fid = field(self.layout.audio, "an audio id")?;
        let token_fid = field(self.layout.text, "a text id")?;
        // Only layouts with an optional reader column may leave it out
        let reader = match self.layout.reader {
            Some(col) if self.layout.optional_reader && fields.len() <= col => None,
            Some(col) => Some(field(col, "a reader id")?),
            None => None,
        };

        self.current = CurrentLine {
            audio_fid,
            token_fid,
            reader,
        };
        Ok(())
    }

    /// Audio file name of the current line, with the audio extension
    pub fn audio_fid(&self) -> String {
        append_extension(&self.current.audio_fid, &self.audio_extension)
    }

    /// Transcript file name of the current line, with the token extension
    pub fn token_fid(&self) -> String {
        append_extension(&self.current.token_fid, &self.token_extension)
    }

    /// Reader of the current line, or [`DEFAULT_READER`] when the layout has
    /// no reader column or the line leaves out an optional one
    pub fn reader(&self) -> &str {
        self.current.reader.as_deref().unwrap_or(DEFAULT_READER)
    }

    /// Snapshot of the current line
    pub fn descriptor(&self) -> UtteranceDescriptor {
        UtteranceDescriptor {
            audio_file_id: self.audio_fid(),
            text_file_id: self.token_fid(),
            reader_id: self.reader().to_string(),
        }
    }

    /// Parse a line and return its descriptor in one step
    pub fn parse(&mut self, line: &str, line_no: usize) -> Result<UtteranceDescriptor> {
        self.set_current(line, line_no)?;
        Ok(self.descriptor())
    }
}
