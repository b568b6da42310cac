//! Search coordinator: walk, scan in parallel, aggregate, rank
use crate::aggregator::aggregate;
use crate::error::{FindoraError, Result};
use crate::metrics::Metrics;
use crate::processor::{scan_file, ScannedFile};
use crate::ranking::{rank, RankCriterion};
use crate::search::{CancelToken, SearchOptions, SearchOutcome, SearchResult};
use crate::walker;
use log::{debug, info, warn};
use rayon::iter::{ParallelBridge, ParallelIterator};
use rayon::ThreadPool;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Candidate paths buffered between the walker and the scan workers, per worker.
const PATHS_PER_WORKER: usize = 64;

/// Runs searches over a dedicated scan pool. One engine can serve any number
/// of sequential or concurrent searches; no state is shared between them
/// apart from the metrics counters.
pub struct SearchEngine {
    pool: ThreadPool,
    metrics: Arc<Metrics>,
}

impl SearchEngine {
    /// Build an engine with `threads` scan workers, defaulting to the number
    /// of logical CPUs.
    pub fn new(threads: Option<usize>, metrics: Arc<Metrics>) -> Result<Self> {
        let threads = threads.unwrap_or_else(num_cpus::get).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("findora-scan-{i}"))
            .build()
            .map_err(|e| FindoraError::Other(format!("Failed to start scan pool: {e}")))?;

        Ok(Self { pool, metrics })
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Search `root` and rank the result set by `criterion`.
    pub fn search(
        &self,
        root: &Path,
        options: &SearchOptions,
        criterion: RankCriterion,
        cancel: &CancelToken,
    ) -> Result<SearchOutcome> {
        Ok(match self.collect(root, options, cancel)? {
            SearchOutcome::Complete(results) => SearchOutcome::Complete(rank(results, criterion)),
            SearchOutcome::Canceled => SearchOutcome::Canceled,
        })
    }

    /// Search `root` and return results in discovery order.
    ///
    /// Only an invalid root fails the call. Unreadable entries are logged and
    /// skipped. If `cancel` fires, dispatch stops and whatever was scanned is
    /// dropped.
    pub fn collect(
        &self,
        root: &Path,
        options: &SearchOptions,
        cancel: &CancelToken,
    ) -> Result<SearchOutcome> {
        let start = Instant::now();
        let candidates = walker::walk(root, options.extensions(), options.walk_options())?
            .with_cancel(cancel.clone());
        if cancel.is_canceled() {
            return Ok(self.canceled(root));
        }

        let (tx, rx) = crossbeam_channel::bounded::<(usize, PathBuf)>(
            self.threads() * PATHS_PER_WORKER,
        );

        let mut scanned: Vec<(usize, PathBuf, ScannedFile)> = thread::scope(|scope| {
            scope.spawn(move || {
                for (seq, path) in candidates.enumerate() {
                    if tx.send((seq, path)).is_err() {
                        break;
                    }
                }
            });

            self.pool.install(|| {
                rx.into_iter()
                    .par_bridge()
                    .filter_map(|(seq, path)| {
                        if cancel.is_canceled() {
                            return None;
                        }
                        self.scan_one(seq, path, options)
                    })
                    .collect()
            })
        });

        if cancel.is_canceled() {
            return Ok(self.canceled(root));
        }

        // Completion order across workers is arbitrary; restore walk order.
        scanned.sort_unstable_by_key(|(seq, _, _)| *seq);

        let results: Vec<SearchResult> = scanned
            .into_iter()
            .filter_map(|(_, path, file)| aggregate(&path, file.matches, file.bytes_read))
            .collect();

        let match_count: usize = results.iter().map(|r| r.matches.len()).sum();
        self.metrics.files_matched.inc_by(results.len() as u64);
        self.metrics.matches_found.inc_by(match_count as u64);
        info!(
            "Found {} matches in {} files under {} in {:.2?}",
            match_count,
            results.len(),
            root.display(),
            start.elapsed()
        );

        Ok(SearchOutcome::Complete(results))
    }

    fn scan_one(
        &self,
        seq: usize,
        path: PathBuf,
        options: &SearchOptions,
    ) -> Option<(usize, PathBuf, ScannedFile)> {
        self.metrics.files_scanned.inc();
        match scan_file(&path, options) {
            Ok(file) if !file.matches.is_empty() => Some((seq, path, file)),
            Ok(_) => None,
            Err(e) => {
                warn!("{e}");
                self.metrics.entries_skipped.inc();
                None
            }
        }
    }

    fn canceled(&self, root: &Path) -> SearchOutcome {
        debug!("Search under {} canceled", root.display());
        self.metrics.searches_canceled.inc();
        SearchOutcome::Canceled
    }
}
