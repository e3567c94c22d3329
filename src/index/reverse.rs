// src/index/reverse.rs
//
// Reverse index generation: build index lines from transcript filenames
// when a corpus ships without an index file.
//
// Pattern language:
//   i   utterance id capture, never empty
//   r   reader id capture (optional), never empty
//   *   wildcard
//   any other character is literal
//
// The pattern describes the filename up to its last extension. Without a
// pattern the whole name before the last '.' is the id and there is no reader.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{info, warn};
use regex::Regex;
use walkdir::WalkDir;

use crate::error::{MetawaveError, Result};

const ID_GROUP: &str = "file";
const READER_GROUP: &str = "reader";

/// Captures extracted from one filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameMatch {
    pub id: String,
    pub reader: Option<String>,
}

/// Compiled filename pattern
#[derive(Debug, Clone)]
pub struct FilenamePattern {
    source: String,
    regex: Regex,
    has_reader: bool,
}

impl FilenamePattern {
    /// Compile a pattern; `None` or an empty pattern means "id is the whole stem".
    pub fn parse(pattern: Option<&str>) -> Result<Self> {
        let source = pattern.unwrap_or("").to_string();
        if source.is_empty() {
            return Self::compile(source, format!("^(?P<{}>.+)\\.[^.]*$", ID_GROUP), false);
        }

        let invalid = |reason: &str| MetawaveError::InvalidPattern {
            pattern: source.clone(),
            reason: reason.to_string(),
        };

        let mut body = String::from("^");
        let mut has_id = false;
        let mut has_reader = false;

        for c in source.chars() {
            match c {
                'i' => {
                    if has_id {
                        return Err(invalid("'i' may appear only once"));
                    }
                    has_id = true;
                    body.push_str(&format!("(?P<{}>.+)", ID_GROUP));
                }
                'r' => {
                    if has_reader {
                        return Err(invalid("'r' may appear only once"));
                    }
                    has_reader = true;
                    body.push_str(&format!("(?P<{}>.+)", READER_GROUP));
                }
                '*' => body.push_str(".*"),
                '\t' | '\n' | '/' | '\\' => {
                    return Err(invalid("tabs, newlines and path separators are not allowed"))
                }
                other => body.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
            }
        }

        if !has_id {
            return Err(invalid("the pattern needs an 'i' to mark the utterance id"));
        }

        body.push_str("\\.[^.]*$");
        Self::compile(source, body, has_reader)
    }

    fn compile(source: String, body: String, has_reader: bool) -> Result<Self> {
        let regex = Regex::new(&body).map_err(|e| MetawaveError::InvalidPattern {
            pattern: source.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source,
            regex,
            has_reader,
        })
    }

    pub fn has_reader(&self) -> bool {
        self.has_reader
    }

    /// The pattern as written by the user
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match a filename; a mismatch is an error, never a silent skip
    pub fn captures(&self, filename: &str) -> Result<FilenameMatch> {
        let caps = self
            .regex
            .captures(filename)
            .ok_or_else(|| MetawaveError::PatternMismatch {
                filename: filename.to_string(),
                pattern: self.source.clone(),
            })?;

        let id = caps
            .name(ID_GROUP)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let reader = caps.name(READER_GROUP).map(|m| m.as_str().to_string());

        Ok(FilenameMatch { id, reader })
    }
}

/// Replace the extension after the last '.' with `audio_ext`
pub fn audio_filename(text_filename: &str, audio_ext: &str) -> String {
    let stem = match text_filename.rfind('.') {
        Some(pos) => &text_filename[..pos],
        None => text_filename,
    };
    format!("{}{}", stem, audio_ext)
}

/// Builds index lines from transcript filenames
#[derive(Debug, Clone)]
pub struct ReverseIndexHandler {
    pattern: FilenamePattern,
    audio_extension: String,
}

impl ReverseIndexHandler {
    pub fn new(pattern: Option<&str>) -> Result<Self> {
        Ok(Self {
            pattern: FilenamePattern::parse(pattern)?,
            audio_extension: ".wav".to_string(),
        })
    }

    pub fn with_audio_extension(mut self, ext: impl Into<String>) -> Self {
        self.audio_extension = ext.into();
        self
    }

    pub fn pattern(&self) -> &FilenamePattern {
        &self.pattern
    }

    /// Index line for one transcript file:
    /// `<text_filename>\t<audio_filename>[\t<reader_id>]`
    pub fn line(&self, filename: &str) -> Result<String> {
        let captures = self.pattern.captures(filename)?;
        let audio = audio_filename(filename, &self.audio_extension);
        Ok(match captures.reader {
            Some(reader) => format!("{}\t{}\t{}", filename, audio, reader),
            None => format!("{}\t{}", filename, audio),
        })
    }
}

/// Outcome of a reverse index generation
#[derive(Debug)]
pub struct IndexGenerationReport {
    /// Lines written
    pub written: usize,
    /// Files that did not match the pattern, with the reason
    pub failures: Vec<(String, MetawaveError)>,
}

/// Write one index line per file in `text_dir` to `out_file`.
///
/// Files are visited in name order. Files that do not match the pattern are
/// logged and returned in the report.
pub fn generate_index(
    text_dir: &Path,
    out_file: &Path,
    handler: &ReverseIndexHandler,
) -> Result<IndexGenerationReport> {
    let mut names = Vec::new();
    for entry in WalkDir::new(text_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(text_dir).to_path_buf();
            MetawaveError::io_error(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }

    let file = File::create(out_file).map_err(|e| MetawaveError::io_error(out_file, e))?;
    let mut writer = BufWriter::new(file);

    let mut report = IndexGenerationReport {
        written: 0,
        failures: Vec::new(),
    };

    for name in names {
        match handler.line(&name) {
            Ok(line) => {
                writeln!(writer, "{}", line).map_err(|e| MetawaveError::io_error(out_file, e))?;
                report.written += 1;
            }
            Err(e) => {
                warn!("Skipping {}: {}", name, e);
                report.failures.push((name, e));
            }
        }
    }

    writer
        .flush()
        .map_err(|e| MetawaveError::io_error(out_file, e))?;

    info!(
        "Index with {} line(s) written to {}",
        report.written,
        out_file.display()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnLayout;
    use crate::index::IndexHandler;

    #[test]
    fn test_default_pattern_uses_whole_stem() {
        let pattern = FilenamePattern::parse(None).unwrap();
        let m = pattern.captures("file101.token").unwrap();
        assert_eq!(m.id, "file101");
        assert_eq!(m.reader, None);
        assert!(!pattern.has_reader());

        // Last dot separates the extension
        let m = pattern.captures("a.b.token").unwrap();
        assert_eq!(m.id, "a.b");

        for f in [".hidden", ".DS_Store", "noext"] {
            assert!(matches!(
                pattern.captures(f),
                Err(MetawaveError::PatternMismatch { .. })
            ));
        }
    }

    #[test]
    fn test_wildcard_pattern() {
        let pattern = FilenamePattern::parse(Some("*-i-r")).unwrap();
        for f in ["text-001-reader7.txt", "text-001-reader7.token"] {
            let m = pattern.captures(f).unwrap();
            assert_eq!(m.id, "001");
            assert_eq!(m.reader.as_deref(), Some("reader7"));
        }
        for f in ["text_001_001.txt", "001.txt", "text--reader7.txt", "text-001-.txt"] {
            assert!(matches!(
                pattern.captures(f),
                Err(MetawaveError::PatternMismatch { .. })
            ));
        }
    }

    #[test]
    fn test_reader_underscore_id_pattern() {
        let handler = ReverseIndexHandler::new(Some("r_i")).unwrap();
        let m = handler.pattern().captures("reader7_text-001.token").unwrap();
        assert_eq!(m.reader.as_deref(), Some("reader7"));
        assert_eq!(m.id, "text-001");

        assert_eq!(
            handler.line("reader7_text-001.token").unwrap(),
            "reader7_text-001.token\treader7_text-001.wav\treader7"
        );

        let handler = ReverseIndexHandler::new(Some("r_*-i")).unwrap();
        let m = handler.pattern().captures("reader7_text-001.token").unwrap();
        assert_eq!(m.id, "001");
    }

    #[test]
    fn test_line_without_reader() {
        let handler = ReverseIndexHandler::new(Some("")).unwrap();
        assert_eq!(
            handler.line("dataset_999.token").unwrap(),
            "dataset_999.token\tdataset_999.wav"
        );
    }

    #[test]
    fn test_literal_characters_are_escaped() {
        let pattern = FilenamePattern::parse(Some("r.i")).unwrap();
        assert!(pattern.captures("abcXdef.txt").is_err());
        let m = pattern.captures("abc.def.txt").unwrap();
        assert_eq!(m.reader.as_deref(), Some("abc"));
        assert_eq!(m.id, "def");
    }

    #[test]
    fn test_invalid_patterns() {
        for bad in ["i_i", "r_r_i", "r_x", "a/i"] {
            assert!(matches!(
                FilenamePattern::parse(Some(bad)),
                Err(MetawaveError::InvalidPattern { .. })
            ));
        }
    }

    #[test]
    fn test_generated_line_round_trip() {
        let handler = ReverseIndexHandler::new(Some("r_*-i")).unwrap();
        let mut index = IndexHandler::with_layout(ColumnLayout::REVERSE_INDEX);

        for (file, reader) in [
            ("reader1_dataset-001.token", "reader1"),
            ("spk.two_set-17.token", "spk.two"),
        ] {
            let line = handler.line(file).unwrap();
            index.set_current(&line, 1).unwrap();
            assert_eq!(index.reader(), reader);
            assert_eq!(index.token_fid(), file);
        }
    }

    #[test]
    fn test_audio_filename() {
        assert_eq!(audio_filename("a.token", ".wav"), "a.wav");
        assert_eq!(audio_filename("a.b.token", ".flac"), "a.b.flac");
        assert_eq!(audio_filename("noext", ".wav"), "noext.wav");
    }
}
