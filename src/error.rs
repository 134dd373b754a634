// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = StatsError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("invalid repository path: {}", path.display())]
    InvalidRepository { path: PathBuf },

    #[error("cannot find a CODEOWNERS file at {}, is the repository located there?", path.display())]
    MissingCodeowners { path: PathBuf },

    #[error("CODEOWNERS line {line}: {message}")]
    Ownership { line: usize, message: String },

    #[error("empty date range, no business days elapsed since the first observation")]
    EmptyDateRange,

    #[error("unknown revision `{revision}`")]
    UnknownRevision { revision: String },

    #[error("invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("git: {0}")]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
