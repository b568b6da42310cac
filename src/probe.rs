//! Helpers that sit next to the search engine without sharing any of its
//! state: a flat listing of qualifying files and a short text preview.
use crate::error::{FindoraError, Result};
use crate::filter::ExtensionSet;
use crate::processor::decode;
use crate::walker::{walk, WalkOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions listed when the caller does not name any.
pub const DEFAULT_PROBE_EXTENSIONS: &[&str] = &["txt", "md"];

/// Characters of decoded text included in a preview.
pub const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePreview {
    pub path: PathBuf,
    pub name: String,
    pub content_preview: String,
}

/// Every file under `root` whose extension is in `extensions`, in walk order,
/// without reading any content.
pub fn scan_directory(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let extensions = if extensions.is_empty() {
        ExtensionSet::new(DEFAULT_PROBE_EXTENSIONS.iter().copied())?
    } else {
        ExtensionSet::new(extensions)?
    };
    Ok(walk(root, &extensions, &WalkOptions::default())?.collect())
}

/// Name, path and the first [`PREVIEW_CHARS`] characters of a text file.
/// Binary content gives an empty preview.
pub fn read_preview(path: &Path) -> Result<FilePreview> {
    let is_file = fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
    if !is_file {
        return Err(FindoraError::InvalidFile(path.to_path_buf()));
    }

    let bytes = fs::read(path)?;
    let content_preview = decode(&bytes)
        .map(|text| text.chars().take(PREVIEW_CHARS).collect())
        .unwrap_or_default();

    Ok(FilePreview {
        path: path.to_path_buf(),
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string()),
        content_preview,
    })
}
