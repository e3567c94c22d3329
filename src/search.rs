// src/search.rs
//
// Substring search over a directory of transcripts

use std::fs;
use std::path::PathBuf;

use log::debug;
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{MetawaveError, Result};

/// A transcript containing the search term
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// Transcript file name
    pub id: String,
    /// Transcript lines, trimmed and joined
    pub text: String,
}

pub struct SearchHandler {
    token_dir: PathBuf,
}

impl SearchHandler {
    pub fn new(token_dir: impl Into<PathBuf>) -> Self {
        Self {
            token_dir: token_dir.into(),
        }
    }

    /// Transcripts whose text contains `term`, in file name order.
    ///
    /// Matching is case sensitive. Files that are not valid UTF-8 are skipped.
    pub fn search(&self, term: &str) -> Result<Vec<SearchHit>> {
        let mut hits = Vec::new();

        for entry in WalkDir::new(&self.token_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(self.token_dir.as_path()).to_path_buf();
                MetawaveError::io_error(path, e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let content = match fs::read_to_string(entry.path()) {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    debug!("Skipping non UTF-8 file {}", entry.path().display());
                    continue;
                }
                Err(e) => return Err(MetawaveError::io_error(entry.path(), e)),
            };

            let text: String = content.lines().map(str::trim).collect();
            if text.contains(term) {
                hits.push(SearchHit {
                    id: entry.file_name().to_string_lossy().into_owned(),
                    text,
                });
            }
        }

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_in_name_order() {
        let dir = std::env::temp_dir().join(format!("metawave_search_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("b.token"), "hér er hestur\n").unwrap();
        fs::write(dir.join("a.token"), "  hestur  \n  og kýr\n").unwrap();
        fs::write(dir.join("c.token"), "engin dýr\n").unwrap();

        let hits = SearchHandler::new(&dir).search("hestur").unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["a.token", "b.token"]);
        assert_eq!(hits[0].text, "hesturog kýr");

        assert!(SearchHandler::new(&dir).search("Hestur").unwrap().is_empty());
        fs::remove_dir_all(&dir).ok();
    }
}
