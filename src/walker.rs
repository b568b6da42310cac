//! Lazy enumeration of candidate files under a search root.
//!
//! Policy:
//! - hidden (dot-prefixed) files and directories are walked unless
//!   `include_hidden` is turned off;
//! - `.gitignore`/`.ignore` rules only apply with `respect_ignore_files`;
//! - symbolic links are never followed, and symlinked files are never yielded;
//! - unreadable entries are logged and skipped.
use crate::error::{FindoraError, Result};
use crate::filter::{path_qualifies, ExtensionSet};
use crate::search::CancelToken;
use ignore::{Walk, WalkBuilder};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkOptions {
    pub include_hidden: bool,
    pub respect_ignore_files: bool,
    pub max_depth: Option<usize>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            include_hidden: true,
            respect_ignore_files: false,
            max_depth: None,
        }
    }
}

/// Iterator over the regular files under a root whose extension is allowed.
///
/// Produced by [`walk`]; yields absolute paths and ends once the subtree is
/// exhausted or the attached [`CancelToken`] fires.
pub struct CandidatePaths {
    inner: Walk,
    extensions: ExtensionSet,
    cancel: Option<CancelToken>,
}

impl CandidatePaths {
    /// Stop the walk as soon as `cancel` fires. The token is checked before
    /// every directory entry, not only before each yielded path.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

impl Iterator for CandidatePaths {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        for entry in self.inner.by_ref() {
            if self.cancel.as_ref().is_some_and(CancelToken::is_canceled) {
                debug!("Walk stopped: search canceled");
                return None;
            }
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {e}");
                    continue;
                }
            };

            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_symlink() {
                debug!("Skipping symlink: {}", entry.path().display());
                continue;
            }
            if !file_type.is_file() {
                continue;
            }
            if !path_qualifies(entry.path(), &self.extensions) {
                continue;
            }
            return Some(entry.into_path());
        }
        None
    }
}

/// Resolve `root` to an absolute directory, or fail with
/// [`FindoraError::InvalidRoot`].
pub fn resolve_root(root: &Path) -> Result<PathBuf> {
    let is_dir = fs::metadata(root).map(|m| m.is_dir()).unwrap_or(false);
    if !is_dir {
        return Err(FindoraError::InvalidRoot(root.to_path_buf()));
    }
    fs::canonicalize(root).map_err(|_| FindoraError::InvalidRoot(root.to_path_buf()))
}

/// Start walking `root`. The root is validated before anything is yielded.
pub fn walk(root: &Path, extensions: &ExtensionSet, options: &WalkOptions) -> Result<CandidatePaths> {
    let root = resolve_root(root)?;
    let inner = WalkBuilder::new(&root)
        .standard_filters(options.respect_ignore_files)
        .hidden(!options.include_hidden)
        .follow_links(false)
        .max_depth(options.max_depth)
        .build();

    Ok(CandidatePaths {
        inner,
        extensions: extensions.clone(),
        cancel: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("a.txt"), "alpha").unwrap();
        fs::write(root.join("b.rs"), "fn main() {}").unwrap();
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::write(root.join("sub/c.MD"), "# title").unwrap();
        fs::write(root.join("sub/deeper/d.txt"), "delta").unwrap();
        fs::write(root.join(".hidden.txt"), "secret").unwrap();
        fs::create_dir_all(root.join(".cache")).unwrap();
        fs::write(root.join(".cache/e.txt"), "cached").unwrap();
        dir
    }

    fn names(paths: impl Iterator<Item = PathBuf>) -> Vec<String> {
        let mut names: Vec<String> = paths
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn exts(list: &[&str]) -> ExtensionSet {
        ExtensionSet::new(list.iter().copied()).unwrap()
    }

    #[test]
    fn yields_only_allowed_extensions_including_hidden() {
        let dir = fixture();
        let paths = walk(dir.path(), &exts(&["txt", "md"]), &WalkOptions::default()).unwrap();
        assert_eq!(
            names(paths),
            vec![".hidden.txt", "a.txt", "c.MD", "d.txt", "e.txt"]
        );
    }

    #[test]
    fn hidden_entries_can_be_excluded() {
        let dir = fixture();
        let options = WalkOptions {
            include_hidden: false,
            ..Default::default()
        };
        let paths = walk(dir.path(), &exts(&["txt", "md"]), &options).unwrap();
        assert_eq!(names(paths), vec!["a.txt", "c.MD", "d.txt"]);
    }

    #[test]
    fn yielded_paths_are_absolute_files_under_root() {
        let dir = fixture();
        let root = fs::canonicalize(dir.path()).unwrap();
        for path in walk(dir.path(), &exts(&["txt"]), &WalkOptions::default()).unwrap() {
            assert!(path.is_absolute());
            assert!(path.starts_with(&root));
            assert!(path.is_file());
        }
    }

    #[test]
    fn max_depth_limits_recursion() {
        let dir = fixture();
        let options = WalkOptions {
            max_depth: Some(1),
            ..Default::default()
        };
        let paths = walk(dir.path(), &exts(&["txt", "md"]), &options).unwrap();
        assert_eq!(names(paths), vec![".hidden.txt", "a.txt"]);
    }

    #[test]
    fn missing_root_is_invalid() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            walk(&missing, &exts(&["txt"]), &WalkOptions::default()),
            Err(FindoraError::InvalidRoot(_))
        ));
    }

    #[test]
    fn file_root_is_invalid() {
        let dir = fixture();
        assert!(matches!(
            walk(&dir.path().join("a.txt"), &exts(&["txt"]), &WalkOptions::default()),
            Err(FindoraError::InvalidRoot(_))
        ));
    }

    #[test]
    fn canceled_walk_stops_before_the_next_entry() {
        let dir = TempDir::new().unwrap();
        for i in 0..50 {
            fs::write(dir.path().join(format!("f{i:02}.txt")), "x").unwrap();
        }

        let token = CancelToken::new();
        let mut paths = walk(dir.path(), &exts(&["txt"]), &WalkOptions::default())
            .unwrap()
            .with_cancel(token.clone());
        assert!(paths.next().is_some());

        token.cancel();
        assert!(paths.next().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_never_yielded_or_followed() {
        let dir = fixture();
        let root = dir.path();
        std::os::unix::fs::symlink(root.join("a.txt"), root.join("link.txt")).unwrap();
        std::os::unix::fs::symlink(root, root.join("sub/loop")).unwrap();

        let paths = walk(root, &exts(&["txt"]), &WalkOptions::default()).unwrap();
        assert_eq!(
            names(paths),
            vec![".hidden.txt", "a.txt", "d.txt", "e.txt"]
        );
    }
}
