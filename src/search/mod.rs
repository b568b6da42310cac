//! Search data model and options
pub mod engine;
pub mod session;

use crate::error::{FindoraError, Result};
use crate::filter::ExtensionSet;
use crate::walker::WalkOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use engine::SearchEngine;
pub use session::{CancelToken, SearchSession};

/// Lines of context kept on each side of a matched line.
pub const DEFAULT_CONTEXT_LINES: usize = 10;

/// Files above this size are not scanned.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// One occurrence of the query inside a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// 1-based line index.
    pub line_number: usize,
    /// 0-based character offset of the match within its line.
    pub column: usize,
    /// The matched line with its surrounding lines, joined by `\n`.
    pub context: String,
    /// The source text at the match, in its original casing.
    pub matched_text: String,
}

/// All matches for one file, in file order, plus the file's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub file_path: PathBuf,
    pub file_name: String,
    pub matches: Vec<Match>,
    pub file_size: u64,
    /// Seconds since the Unix epoch, 0 when unknown.
    pub modified: i64,
}

/// How a search call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Complete(Vec<SearchResult>),
    /// Superseded by a newer search; partial results were discarded.
    Canceled,
}

impl SearchOutcome {
    pub fn is_canceled(&self) -> bool {
        matches!(self, SearchOutcome::Canceled)
    }

    /// The result set, or `None` for a canceled search.
    pub fn into_results(self) -> Option<Vec<SearchResult>> {
        match self {
            SearchOutcome::Complete(results) => Some(results),
            SearchOutcome::Canceled => None,
        }
    }
}

/// Parameters of one search. Validated on construction and not changed once
/// a search has started.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOptions {
    query: String,
    case_sensitive: bool,
    extensions: ExtensionSet,
    context_lines: usize,
    max_file_size: Option<u64>,
    walk: WalkOptions,
}

impl SearchOptions {
    pub fn new<I, S>(query: impl Into<String>, extensions: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let query = query.into();
        validate_query(&query)?;
        Ok(Self {
            query,
            case_sensitive: false,
            extensions: ExtensionSet::new(extensions)?,
            context_lines: DEFAULT_CONTEXT_LINES,
            max_file_size: Some(DEFAULT_MAX_FILE_SIZE),
            walk: WalkOptions::default(),
        })
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_context_lines(mut self, context_lines: usize) -> Self {
        self.context_lines = context_lines;
        self
    }

    pub fn with_max_file_size(mut self, max_file_size: Option<u64>) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub fn with_walk_options(mut self, walk: WalkOptions) -> Self {
        self.walk = walk;
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }

    pub fn context_lines(&self) -> usize {
        self.context_lines
    }

    pub fn max_file_size(&self) -> Option<u64> {
        self.max_file_size
    }

    pub fn walk_options(&self) -> &WalkOptions {
        &self.walk
    }
}

/// Matching is per line, so a query must be non-empty and single-line.
pub fn validate_query(query: &str) -> Result<()> {
    if query.is_empty() {
        return Err(FindoraError::InvalidQuery("query is empty".to_string()));
    }
    if query.contains(['\n', '\r']) {
        return Err(FindoraError::InvalidQuery(
            "query must not span lines".to_string(),
        ));
    }
    Ok(())
}
