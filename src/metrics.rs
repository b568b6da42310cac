use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};
use std::sync::Arc;

#[derive(Clone)]
pub struct Metrics {
    pub files_scanned: IntCounter,
    pub files_matched: IntCounter,
    pub matches_found: IntCounter,
    pub entries_skipped: IntCounter,
    pub searches_canceled: IntCounter,
    registry: Arc<Registry>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn counter(name: &str, help: &str) -> IntCounter {
    IntCounter::with_opts(Opts::new(name, help)).expect("static counter options are valid")
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let files_scanned = counter("files_scanned", "Number of candidate files scanned");
        let files_matched = counter("files_matched", "Number of files with at least one match");
        let matches_found = counter("matches_found", "Number of matches found");
        let entries_skipped = counter(
            "entries_skipped",
            "Number of files skipped because they could not be read",
        );
        let searches_canceled =
            counter("searches_canceled", "Number of searches superseded before completion");

        registry.register(Box::new(files_scanned.clone())).ok();
        registry.register(Box::new(files_matched.clone())).ok();
        registry.register(Box::new(matches_found.clone())).ok();
        registry.register(Box::new(entries_skipped.clone())).ok();
        registry.register(Box::new(searches_canceled.clone())).ok();

        Metrics {
            files_scanned,
            files_matched,
            matches_found,
            entries_skipped,
            searches_canceled,
            registry: Arc::new(registry),
        }
    }

    /// Render every counter in the prometheus text format.
    pub fn gather(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if TextEncoder::new().encode(&metric_families, &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
