//! Rendering of result sets for the command line
pub mod formats;

use crate::search::SearchResult;
use clap::ValueEnum;
use std::fmt;
use std::path::Path;

pub use formats::{JsonFormatter, TextFormatter};

/// Trait for output formatters
pub trait OutputFormatterTrait: Send + Sync {
    fn format(&self, results: &[SearchResult], query: &str, root: &Path) -> String;
    fn name(&self) -> &str;
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Formatter for `format`; `context_lines` must be the value the search ran with.
pub fn formatter(format: OutputFormat, context_lines: usize) -> Box<dyn OutputFormatterTrait> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(context_lines)),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
    }
}
