// code-todos/src/error.rs

use std::{io, path::PathBuf};
use thiserror::Error;

/// Errors raised by the scanner, the file surgery and the cache.
///
/// Every variant describes a single aborted operation; none of them leave a
/// source file half-written.
#[derive(Debug, Error)]
pub enum TodoError {
    #[error("i/o error on {}: {source}", .path.display())]
    Io { path: PathBuf, #[source] source: io::Error },

    #[error("{} looks like a binary file", .path.display())]
    Binary { path: PathBuf },

    #[error("{} is not valid UTF-8", .path.display())]
    NotUtf8 { path: PathBuf },

    #[error("line {line} is past the end of {} ({len} lines)", .path.display())]
    LineOutOfRange { path: PathBuf, line: usize, len: usize },

    #[error("no annotation marker on line {line} of {}; rescan first", .path.display())]
    TokenMissing { path: PathBuf, line: usize },

    #[error("no annotation recorded at {}:{line}", .script.display())]
    NotFound { script: PathBuf, line: usize },

    #[error("annotation marker must not be empty")]
    InvalidMarker,

    #[error("invalid task text: {0}")]
    InvalidTask(String),

    #[error("invalid exclusion pattern {pattern:?}: {source}")]
    Pattern { pattern: String, #[source] source: globset::Error },

    #[error("no external editor configured (set editor.command, $VISUAL or $EDITOR)")]
    NoEditor,

    #[error("failed to launch editor {command:?}: {source}")]
    Editor { command: String, #[source] source: io::Error },
}

impl TodoError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, TodoError>;
