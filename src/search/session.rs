//! Supersession of in-flight searches.
//!
//! Every search owns a [`CancelToken`]. A [`SearchSession`] remembers the
//! token of its latest search and cancels it when a new one starts, so a
//! caller that fires searches as the user types only ever receives the
//! newest result set; older calls resolve to [`SearchOutcome::Canceled`].
use crate::error::{FindoraError, Result};
use crate::ranking::RankCriterion;
use crate::search::{SearchEngine, SearchOptions, SearchOutcome};
use log::debug;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag for one search call.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn same_as(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

pub struct SearchSession {
    engine: Arc<SearchEngine>,
    current: Mutex<Option<CancelToken>>,
}

impl SearchSession {
    pub fn new(engine: Arc<SearchEngine>) -> Self {
        Self {
            engine,
            current: Mutex::new(None),
        }
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    /// Cancel the running search, if any, and hand out the token for the next one.
    pub fn begin(&self) -> CancelToken {
        let token = CancelToken::new();
        if let Some(previous) = self.current.lock().replace(token.clone()) {
            debug!("Superseding previous search");
            previous.cancel();
        }
        token
    }

    /// Cancel the running search without starting another.
    pub fn cancel(&self) {
        if let Some(current) = self.current.lock().take() {
            current.cancel();
        }
    }

    fn finish(&self, token: &CancelToken) {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|c| c.same_as(token)) {
            *current = None;
        }
    }

    /// Run a ranked search on the calling thread, superseding any search
    /// still running on this session.
    pub fn search_blocking(
        &self,
        root: &Path,
        options: &SearchOptions,
        criterion: RankCriterion,
    ) -> Result<SearchOutcome> {
        let token = self.begin();
        let outcome = self.engine.search(root, options, criterion, &token);
        self.finish(&token);
        settle(outcome, &token)
    }

    /// Async form of [`search_blocking`](Self::search_blocking); the scan runs
    /// on tokio's blocking pool.
    pub async fn search(
        &self,
        root: PathBuf,
        options: SearchOptions,
        criterion: RankCriterion,
    ) -> Result<SearchOutcome> {
        let token = self.begin();
        let engine = self.engine.clone();
        let task_token = token.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            engine.search(&root, &options, criterion, &task_token)
        })
        .await
        .map_err(|e| FindoraError::Other(format!("Search task failed: {e}")))?;

        self.finish(&token);
        settle(outcome, &token)
    }
}

/// A search whose token fired is reported as canceled even if it got as far
/// as producing results.
fn settle(outcome: Result<SearchOutcome>, token: &CancelToken) -> Result<SearchOutcome> {
    let outcome = outcome?;
    if token.is_canceled() {
        return Ok(SearchOutcome::Canceled);
    }
    Ok(outcome)
}
