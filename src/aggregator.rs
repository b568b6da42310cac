use crate::error::FindoraError;
use crate::search::{Match, SearchResult};
use log::warn;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Fold one file's matches into a [`SearchResult`].
///
/// Returns `None` for an empty match list. Size and modification time come
/// from a fresh stat. If the stat fails the result is still produced with
/// `fallback_size` (the bytes already read) and a zero timestamp; if only the
/// timestamp is missing, the stat size is kept.
pub fn aggregate(path: &Path, matches: Vec<Match>, fallback_size: u64) -> Option<SearchResult> {
    if matches.is_empty() {
        return None;
    }

    let (file_size, modified) = match fs::metadata(path) {
        Ok(metadata) => (metadata.len(), modified_seconds(path, metadata.modified())),
        Err(source) => {
            warn_unavailable(path, source);
            (fallback_size, 0)
        }
    };

    Some(SearchResult {
        file_path: path.to_path_buf(),
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        matches,
        file_size,
        modified,
    })
}

/// Modification time in epoch seconds, or 0 when the platform cannot
/// report it.
fn modified_seconds(path: &Path, modified: io::Result<SystemTime>) -> i64 {
    match modified {
        Ok(time) => epoch_seconds(time),
        Err(source) => {
            warn_unavailable(path, source);
            0
        }
    }
}

fn warn_unavailable(path: &Path, source: io::Error) {
    let err = FindoraError::MetadataUnavailable {
        path: path.to_path_buf(),
        source,
    };
    warn!("{err}");
}

/// Seconds since the Unix epoch; negative for earlier timestamps.
pub fn epoch_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}
