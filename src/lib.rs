//! Literal text search over a directory tree.
//!
//! A search walks the tree under a root, scans every file whose extension is
//! in the allow-list for a literal query, and returns one [`SearchResult`] per
//! file that matched, each carrying its matches with surrounding context.
pub mod aggregator;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod output;
pub mod probe;
pub mod processor;
pub mod ranking;
pub mod search;
pub mod walker;

pub use crate::error::{FindoraError, Result};
pub use filter::{qualifies, ExtensionSet};
pub use ranking::{rank, RankCriterion};
pub use search::{
    CancelToken, Match, SearchEngine, SearchOptions, SearchOutcome, SearchResult, SearchSession,
};
pub use walker::{walk, WalkOptions};

use metrics::Metrics;
use std::path::Path;
use std::sync::{Arc, OnceLock};

static SHARED_ENGINE: OnceLock<SearchEngine> = OnceLock::new();

/// Engine behind [`search_files`], built on first use and kept for the life
/// of the process.
fn shared_engine() -> Result<&'static SearchEngine> {
    if let Some(engine) = SHARED_ENGINE.get() {
        return Ok(engine);
    }
    let engine = SearchEngine::new(None, Arc::new(Metrics::new()))?;
    // A racing caller may have installed its engine first; ours is dropped.
    Ok(SHARED_ENGINE.get_or_init(|| engine))
}

/// Search `directory` for `query` in files with one of `file_extensions`.
///
/// Results come back in discovery order; use [`rank`] to order them for
/// display. Fails only with [`FindoraError::InvalidQuery`] (checked before
/// touching the filesystem) or [`FindoraError::InvalidRoot`].
pub fn search_files(
    directory: &Path,
    query: &str,
    case_sensitive: bool,
    file_extensions: &[String],
) -> Result<Vec<SearchResult>> {
    let options = SearchOptions::new(query, file_extensions)?.with_case_sensitive(case_sensitive);
    let outcome = shared_engine()?.collect(directory, &options, &CancelToken::new())?;
    Ok(outcome.into_results().unwrap_or_default())
}
