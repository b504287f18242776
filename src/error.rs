use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid color {0:?}, expected #rrggbb")]
pub struct ColorParseError(pub String);

/// Drag verbs called out of order by the pointer adapter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DragError {
    #[error("a drag is already in progress")]
    AlreadyDragging,
    #[error("no drag in progress")]
    NotDragging,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("cell index {index} is outside the {len}-cell grid")]
    CellOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("search backend unavailable: {0}")]
    Backend(String),
    #[error("search worker stopped before replying")]
    Disconnected,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value: {0}")]
    Invalid(String),
}
