//! Extension allow-list used to decide which files are worth scanning
use crate::error::{FindoraError, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Normalized set of file extensions: lowercase, no leading dot, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionSet {
    extensions: BTreeSet<String>,
}

impl ExtensionSet {
    /// Build a set from user input such as `["TXT", ".md", " log "]`.
    ///
    /// Blank entries are dropped; if nothing usable remains the input is
    /// rejected as an invalid query.
    pub fn new<I, S>(extensions: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions: BTreeSet<String> = extensions
            .into_iter()
            .filter_map(|ext| normalize(ext.as_ref()))
            .collect();

        if extensions.is_empty() {
            return Err(FindoraError::InvalidQuery(
                "at least one file extension is required".to_string(),
            ));
        }
        Ok(Self { extensions })
    }

    pub fn contains(&self, ext: &str) -> bool {
        self.extensions.contains(ext)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

fn normalize(ext: &str) -> Option<String> {
    let ext = ext.trim().trim_start_matches('.');
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}

/// Whether `file_name` carries one of the allowed extensions.
///
/// The extension is whatever follows the last `.`, compared lowercase. Names
/// without a dot, or ending in one, never qualify.
pub fn qualifies(file_name: &str, extensions: &ExtensionSet) -> bool {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => extensions.contains(&ext.to_lowercase()),
        _ => false,
    }
}

/// [`qualifies`] applied to the final component of `path`.
pub fn path_qualifies(path: &Path, extensions: &ExtensionSet) -> bool {
    path.file_name()
        .map(|name| qualifies(&name.to_string_lossy(), extensions))
        .unwrap_or(false)
}
