use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FindoraError {
    #[error("Invalid directory path: {}", .0.display())]
    InvalidRoot(PathBuf),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid file path: {}", .0.display())]
    InvalidFile(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    #[error("Failed to read '{}': {}", .path.display(), .source)]
    EntryUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Metadata unavailable for '{}': {}", .path.display(), .source)]
    MetadataUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("An unexpected error occurred: {0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl FindoraError {
    /// Hard errors abort a search call; everything else is contained per entry
    /// and only ever logged.
    pub fn is_hard(&self) -> bool {
        !matches!(
            self,
            FindoraError::EntryUnreadable { .. } | FindoraError::MetadataUnavailable { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FindoraError>;
